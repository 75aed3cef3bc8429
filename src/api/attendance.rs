use actix_web::{HttpResponse, web};
use serde_json::json;
use sqlx::MySqlPool;

use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::attendance::MeetingLog;
use crate::service::access::staff_scope;
use crate::service::attendance::{
    self as attendance, AttendanceFilter, AttendanceHistory, DepartmentReport, InternAttendance,
};

#[utoipa::path(
    post,
    path = "/api/admin/attendance",
    request_body(content = MeetingLog, description = "One meeting, one mark per intern", content_type = "application/json"),
    responses(
        (status = 201, description = "Attendance recorded", body = Object, example = json!({
            "message": "Attendance recorded",
            "recorded": 2
        })),
        (status = 400, description = "Empty or duplicated entries"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Intern not found"),
        (status = 409, description = "Attendance already logged for that meeting")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn log_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<MeetingLog>,
) -> Result<HttpResponse, ApiError> {
    auth.require_staff()?;
    let scope = staff_scope(pool.get_ref(), &auth).await?;
    let recorded = attendance::log_meeting(pool.get_ref(), &scope, payload.into_inner()).await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Attendance recorded",
        "recorded": recorded
    })))
}

#[utoipa::path(
    get,
    path = "/api/admin/attendance/interns",
    params(AttendanceFilter),
    responses(
        (status = 200, description = "Interns with attendance counts and rate", body = [InternAttendance]),
        (status = 400, description = "Bad filter value"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn intern_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceFilter>,
) -> Result<HttpResponse, ApiError> {
    auth.require_staff()?;
    let scope = staff_scope(pool.get_ref(), &auth).await?;
    let rows = attendance::list_with_stats(pool.get_ref(), &scope, &query).await?;
    Ok(HttpResponse::Ok().json(rows))
}

#[utoipa::path(
    get,
    path = "/api/admin/attendance/departments",
    responses(
        (status = 200, description = "Per-department attendance and overall summary", body = DepartmentReport),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn department_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    auth.require_staff()?;
    let scope = staff_scope(pool.get_ref(), &auth).await?;
    let report = attendance::department_stats(pool.get_ref(), &scope).await?;
    Ok(HttpResponse::Ok().json(report))
}

#[utoipa::path(
    get,
    path = "/api/intern/attendance",
    responses(
        (status = 200, description = "Own attendance records and rate", body = AttendanceHistory),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn my_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    let intern_id = auth.intern_id()?;
    let history = attendance::history(pool.get_ref(), intern_id).await?;
    Ok(HttpResponse::Ok().json(history))
}
