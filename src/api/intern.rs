use actix_web::{HttpResponse, web};
use serde::Serialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::intern::{Intern, InternApplication, InternChanges, InternStatus};
use crate::service::access::staff_scope;
use crate::service::intern::{self as interns, InternQuery};

#[derive(Serialize, ToSchema)]
pub struct InternListResponse {
    pub data: Vec<Intern>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: i64,
}

#[derive(Serialize, ToSchema)]
#[schema(example = json!({
    "message": "Application received",
    "intern_code": "INT-4F2A9C1B",
    "status": "Applied"
}))]
pub struct ApplicationReceipt {
    pub message: String,
    pub intern_code: String,
    pub status: InternStatus,
}

#[utoipa::path(
    post,
    path = "/api/interns/apply",
    request_body(content = InternApplication, description = "Internship application", content_type = "application/json"),
    responses(
        (status = 201, description = "Application received", body = ApplicationReceipt),
        (status = 400, description = "Invalid application"),
        (status = 409, description = "Email already registered", body = Object, example = json!({
            "message": "An application with this email already exists"
        })),
        (status = 429, description = "Too many requests")
    ),
    tag = "Intern"
)]
pub async fn apply(
    pool: web::Data<MySqlPool>,
    payload: web::Json<InternApplication>,
) -> Result<HttpResponse, ApiError> {
    let intern = interns::apply(pool.get_ref(), payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApplicationReceipt {
        message: "Application received".to_string(),
        intern_code: intern.intern_code,
        status: intern.status,
    }))
}

#[utoipa::path(
    get,
    path = "/api/intern/profile",
    responses(
        (status = 200, description = "Own intern record", body = Intern),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Intern"
)]
pub async fn profile(auth: AuthUser, pool: web::Data<MySqlPool>) -> Result<HttpResponse, ApiError> {
    let intern_id = auth.intern_id()?;
    let intern = interns::profile(pool.get_ref(), intern_id).await?;
    Ok(HttpResponse::Ok().json(intern))
}

async fn scoped_list(
    auth: &AuthUser,
    pool: &MySqlPool,
    query: &InternQuery,
) -> Result<HttpResponse, ApiError> {
    let scope = staff_scope(pool, auth).await?;
    let (data, total, page) = interns::list(pool, &scope, query).await?;
    Ok(HttpResponse::Ok().json(InternListResponse {
        data,
        page: page.page,
        per_page: page.per_page,
        total,
    }))
}

#[utoipa::path(
    get,
    path = "/api/admin/interns",
    params(InternQuery),
    responses(
        (status = 200, description = "Paginated interns, incharges see their departments only", body = InternListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Intern"
)]
pub async fn list_interns(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<InternQuery>,
) -> Result<HttpResponse, ApiError> {
    auth.require_staff()?;
    scoped_list(&auth, pool.get_ref(), &query).await
}

#[utoipa::path(
    get,
    path = "/api/incharge/interns",
    params(InternQuery),
    responses(
        (status = 200, description = "Interns in the incharge's departments", body = InternListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Incharge"
)]
pub async fn incharge_interns(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<InternQuery>,
) -> Result<HttpResponse, ApiError> {
    auth.require_incharge()?;
    scoped_list(&auth, pool.get_ref(), &query).await
}

#[utoipa::path(
    get,
    path = "/api/admin/interns/{intern_id}",
    params(("intern_id" = u64, Path, description = "Intern ID")),
    responses(
        (status = 200, description = "Intern found", body = Intern),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Intern not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Intern"
)]
pub async fn get_intern(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_staff()?;
    let scope = staff_scope(pool.get_ref(), &auth).await?;
    let intern = interns::get(pool.get_ref(), &scope, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(intern))
}

#[utoipa::path(
    patch,
    path = "/api/admin/interns/{intern_id}",
    params(("intern_id" = u64, Path, description = "Intern ID")),
    request_body(content = InternChanges, description = "Fields to change", content_type = "application/json"),
    responses(
        (status = 200, description = "Intern updated", body = Intern),
        (status = 400, description = "Empty or inconsistent change set"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Intern not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Intern"
)]
pub async fn update_intern(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<InternChanges>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;
    let intern = interns::update(pool.get_ref(), path.into_inner(), payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(intern))
}
