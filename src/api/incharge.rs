use actix_web::{HttpResponse, web};
use sqlx::MySqlPool;

use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::incharge::{Incharge, InchargeChanges, NewIncharge};
use crate::service::incharge as incharges;

#[utoipa::path(
    post,
    path = "/api/admin/incharges",
    request_body(content = NewIncharge, description = "Incharge account and departments", content_type = "application/json"),
    responses(
        (status = 201, description = "Incharge created", body = Incharge),
        (status = 400, description = "Invalid email or no departments"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Email already registered")
    ),
    security(("bearer_auth" = [])),
    tag = "Incharge"
)]
pub async fn create_incharge(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<NewIncharge>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;
    let incharge = incharges::create(pool.get_ref(), payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(incharge))
}

#[utoipa::path(
    get,
    path = "/api/admin/incharges",
    responses(
        (status = 200, description = "All incharges by name", body = [Incharge]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Incharge"
)]
pub async fn list_incharges(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;
    let data = incharges::list(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(data))
}

#[utoipa::path(
    patch,
    path = "/api/admin/incharges/{incharge_id}",
    params(("incharge_id" = u64, Path, description = "Incharge ID")),
    request_body(content = InchargeChanges, description = "Activation flag and/or departments", content_type = "application/json"),
    responses(
        (status = 200, description = "Incharge updated", body = Incharge),
        (status = 400, description = "Empty change set"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Incharge not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Incharge"
)]
pub async fn update_incharge(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<InchargeChanges>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;
    let incharge = incharges::update(pool.get_ref(), path.into_inner(), payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(incharge))
}
