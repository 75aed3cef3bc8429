use actix_web::{HttpResponse, web};
use serde::Serialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::performance::PerformanceEntry;
use crate::service::access::{Scope, staff_scope};
use crate::service::performance::{self as performance, MonthlyReport, PerformanceSummary};

#[derive(Serialize, ToSchema)]
pub struct PerformanceOverview {
    pub summary: PerformanceSummary,
    pub entries: Vec<PerformanceEntry>,
}

#[utoipa::path(
    post,
    path = "/api/admin/performance/{intern_id}",
    params(("intern_id" = u64, Path, description = "Intern ID")),
    request_body(content = MonthlyReport, description = "Monthly review; derived fields are recomputed", content_type = "application/json"),
    responses(
        (status = 201, description = "Month recorded", body = PerformanceEntry),
        (status = 400, description = "Rating or task counts out of range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Intern not found"),
        (status = 409, description = "Concurrent entry for the same month")
    ),
    security(("bearer_auth" = [])),
    tag = "Performance"
)]
pub async fn record_performance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<MonthlyReport>,
) -> Result<HttpResponse, ApiError> {
    auth.require_staff()?;
    let scope = staff_scope(pool.get_ref(), &auth).await?;
    let entry =
        performance::record_month(pool.get_ref(), &scope, path.into_inner(), payload.into_inner())
            .await?;
    Ok(HttpResponse::Created().json(entry))
}

#[utoipa::path(
    get,
    path = "/api/admin/performance/{intern_id}",
    params(("intern_id" = u64, Path, description = "Intern ID")),
    responses(
        (status = 200, description = "Entries ordered by month", body = [PerformanceEntry]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Intern not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Performance"
)]
pub async fn performance_history(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_staff()?;
    let scope = staff_scope(pool.get_ref(), &auth).await?;
    let entries = performance::history(pool.get_ref(), &scope, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(entries))
}

#[utoipa::path(
    get,
    path = "/api/admin/performance/{intern_id}/summary",
    params(("intern_id" = u64, Path, description = "Intern ID")),
    responses(
        (status = 200, description = "Current and average rating", body = PerformanceSummary),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Intern not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Performance"
)]
pub async fn performance_summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_staff()?;
    let scope = staff_scope(pool.get_ref(), &auth).await?;
    let summary = performance::summary(pool.get_ref(), &scope, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(summary))
}

#[utoipa::path(
    get,
    path = "/api/intern/performance",
    responses(
        (status = 200, description = "Own monthly entries and summary", body = PerformanceOverview),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Performance"
)]
pub async fn my_performance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    let intern_id = auth.intern_id()?;
    let entries = performance::history(pool.get_ref(), &Scope::All, intern_id).await?;
    let summary = performance::summarize(intern_id, &entries);
    Ok(HttpResponse::Ok().json(PerformanceOverview { summary, entries }))
}
