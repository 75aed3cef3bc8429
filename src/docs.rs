use crate::api::Health;
use crate::api::intern::{ApplicationReceipt, InternListResponse};
use crate::api::leave::LeaveListResponse;
use crate::api::performance::PerformanceOverview;
use crate::model::attendance::{Attendance, AttendanceStatus, MeetingLog, NewAttendance};
use crate::model::incharge::{Incharge, InchargeChanges, NewIncharge};
use crate::model::intern::{
    Intern, InternApplication, InternChanges, InternStatus, PerformanceTag,
};
use crate::model::leave::{Leave, LeaveApplication, LeaveStatus, LeaveType};
use crate::model::performance::PerformanceEntry;
use crate::service::attendance::{
    AttendanceHistory, AttendanceStats, AttendanceSummary, DepartmentAttendance,
    DepartmentReport, InternAttendance,
};
use crate::service::performance::{MonthlyReport, PerformanceSummary, Ratings};
use utoipa::Modify;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Intern Portal API",
        version = "1.0.0",
        description = r#"
## Internship Management System

Backend for running an internship programme: intake, reviews, attendance, leave and monthly performance.

### Key Features
- **Intern Management**
  - Public application intake, admin review and profile updates
- **Leave Management**
  - Interns apply for leave; admins approve or reject exactly once
- **Attendance Management**
  - Meeting attendance logged per intern, with per-intern and per-department rates
- **Performance Management**
  - Monthly task and rating entries with server-computed overall rating
- **Incharges**
  - Department-scoped staff accounts that can be deactivated

### Security
Protected endpoints accept the session token either from the `token` cookie or as a
**JWT Bearer** header. Admins see everything, incharges only their departments,
interns only their own records.

### Response Format
- JSON everywhere; errors are `{"message": "..."}`
- Pagination on intern and leave listings
"#,
    ),
    paths(
        crate::api::health,

        crate::api::intern::apply,
        crate::api::intern::profile,
        crate::api::intern::list_interns,
        crate::api::intern::get_intern,
        crate::api::intern::update_intern,
        crate::api::intern::incharge_interns,

        crate::api::leave::apply_leave,
        crate::api::leave::my_leaves,
        crate::api::leave::leave_list,
        crate::api::leave::get_leave,
        crate::api::leave::approve_leave,
        crate::api::leave::reject_leave,

        crate::api::attendance::log_attendance,
        crate::api::attendance::intern_attendance,
        crate::api::attendance::department_attendance,
        crate::api::attendance::my_attendance,

        crate::api::performance::record_performance,
        crate::api::performance::performance_history,
        crate::api::performance::performance_summary,
        crate::api::performance::my_performance,

        crate::api::incharge::create_incharge,
        crate::api::incharge::list_incharges,
        crate::api::incharge::update_incharge
    ),
    components(
        schemas(
            Health,
            Intern,
            InternStatus,
            PerformanceTag,
            InternApplication,
            InternChanges,
            InternListResponse,
            ApplicationReceipt,
            Leave,
            LeaveType,
            LeaveStatus,
            LeaveApplication,
            LeaveListResponse,
            Attendance,
            AttendanceStatus,
            NewAttendance,
            MeetingLog,
            AttendanceStats,
            InternAttendance,
            DepartmentAttendance,
            AttendanceSummary,
            DepartmentReport,
            AttendanceHistory,
            PerformanceEntry,
            Ratings,
            MonthlyReport,
            PerformanceSummary,
            PerformanceOverview,
            Incharge,
            NewIncharge,
            InchargeChanges
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness probe"),
        (name = "Intern", description = "Intern intake and management APIs"),
        (name = "Leave", description = "Leave management APIs"),
        (name = "Attendance", description = "Attendance management APIs"),
        (name = "Performance", description = "Monthly performance APIs"),
        (name = "Incharge", description = "Incharge management APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        components.add_security_scheme(
            "cookie_auth",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("token"))),
        );
    }
}
