use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::Page;
use crate::model::leave::{Leave, LeaveApplication, LeaveDecision, LeaveFilter, LeaveStatus};
use crate::service::leave as leaves;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaveQuery {
    /// Filter by intern ID
    pub intern_id: Option<u64>,
    /// Filter by leave status
    pub status: Option<LeaveStatus>,
    /// Pagination page number (start with 1)
    pub page: Option<u32>,
    /// Items per page, at most 100
    pub per_page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<Leave>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

/* ========================= Intern self-service ========================= */

#[utoipa::path(
    post,
    path = "/api/intern/leaves",
    request_body(content = LeaveApplication, description = "Leave request payload", content_type = "application/json"),
    responses(
        (status = 201, description = "Leave request submitted", body = Leave),
        (status = 400, description = "Invalid dates or reason", body = Object, example = json!({
            "message": "reason must be at least 10 characters"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Intern not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn apply_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<LeaveApplication>,
) -> Result<HttpResponse, ApiError> {
    let intern_id = auth.intern_id()?;
    let leave = leaves::submit(pool.get_ref(), intern_id, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(leave))
}

#[utoipa::path(
    get,
    path = "/api/intern/leaves",
    responses(
        (status = 200, description = "Own leave requests, newest first", body = [Leave]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn my_leaves(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    let intern_id = auth.intern_id()?;
    let data = leaves::mine(pool.get_ref(), intern_id).await?;
    Ok(HttpResponse::Ok().json(data))
}

/* ========================= Administration ========================= */

#[utoipa::path(
    get,
    path = "/api/admin/leaves",
    params(LeaveQuery),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveQuery>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let query = query.into_inner();
    let filter = LeaveFilter {
        intern_id: query.intern_id,
        status: query.status,
    };
    let page = Page::new(query.page, query.per_page);
    let (data, total) = leaves::list(pool.get_ref(), &filter, page).await?;

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        data,
        page: page.page,
        per_page: page.per_page,
        total,
    }))
}

#[utoipa::path(
    get,
    path = "/api/admin/leaves/{leave_id}",
    params(("leave_id" = u64, Path, description = "ID of the leave request to fetch")),
    responses(
        (status = 200, description = "Leave request found", body = Leave),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "message": "Leave request not found"
        }))
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;
    let leave = leaves::get(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(leave))
}

async fn decide(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    leave_id: u64,
    decision: LeaveDecision,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;
    let leave = leaves::decide(pool.get_ref(), leave_id, decision, auth.user_id).await?;
    Ok(HttpResponse::Ok().json(leave))
}

#[utoipa::path(
    post,
    path = "/api/admin/leaves/{leave_id}/approve",
    params(("leave_id" = u64, Path, description = "ID of the leave request to approve")),
    responses(
        (status = 200, description = "Leave approved", body = Leave),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave request already decided", body = Object, example = json!({
            "message": "Leave request is already Rejected"
        }))
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    decide(auth, pool, path.into_inner(), LeaveDecision::Approve).await
}

#[utoipa::path(
    post,
    path = "/api/admin/leaves/{leave_id}/reject",
    params(("leave_id" = u64, Path, description = "ID of the leave request to reject")),
    responses(
        (status = 200, description = "Leave rejected", body = Leave),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave request already decided", body = Object, example = json!({
            "message": "Leave request is already Approved"
        }))
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    decide(auth, pool, path.into_inner(), LeaveDecision::Reject).await
}

#[cfg(test)]
mod tests {
    use crate::api::testing::{as_role, test_app};
    use crate::model::role::Role;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::json;

    #[actix_web::test]
    async fn decisions_are_admin_only() {
        let app = test_app!();
        for role in [Role::Incharge, Role::Intern] {
            let req = as_role(test::TestRequest::post().uri("/api/admin/leaves/1/approve"), 4, role)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        }
    }

    #[actix_web::test]
    async fn staff_cannot_use_intern_endpoint() {
        let app = test_app!();
        let req = as_role(test::TestRequest::get().uri("/api/intern/leaves"), 1, Role::Admin)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn reversed_dates_are_rejected() {
        let app = test_app!();
        let req = as_role(test::TestRequest::post().uri("/api/intern/leaves"), 7, Role::Intern)
            .set_json(json!({
                "leave_type": "Sick",
                "start_date": "2025-01-12",
                "end_date": "2025-01-10",
                "reason": "Fever and rest"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn malformed_payload_is_a_validation_error() {
        let app = test_app!();
        let req = as_role(test::TestRequest::post().uri("/api/intern/leaves"), 7, Role::Intern)
            .set_json(json!({ "leave_type": "Vacation", "reason": "Long weekend away" }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert!(body["message"].is_string());
    }

    #[actix_web::test]
    async fn non_numeric_leave_id_is_bad_request() {
        let app = test_app!();
        let req = as_role(test::TestRequest::get().uri("/api/admin/leaves/abc"), 1, Role::Admin)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
