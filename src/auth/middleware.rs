use crate::auth::auth::AuthUser;
use crate::auth::jwt::{token_from, verify_token};
use crate::config::Config;
use crate::error::ApiError;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, ResponseError,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use tracing::debug;

pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .cloned()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?;

    let token = match token_from(&req, &config.auth_cookie) {
        Some(t) => t,
        None => {
            let resp = ApiError::Auth("Missing session token".into()).error_response();
            return Ok(req.into_response(resp));
        }
    };

    let claims = match verify_token(&token, &config.jwt_secret) {
        Ok(c) => c,
        Err(e) => {
            debug!(error = %e, path = %req.path(), "Rejected session token");
            let resp = ApiError::Auth("Invalid or expired session".into()).error_response();
            return Ok(req.into_response(resp));
        }
    };

    let user = AuthUser::from(claims);
    debug!(user = %user.username, role = %user.role, path = %req.path(), "Authenticated request");
    req.extensions_mut().insert(user);

    next.call(req).await
}
