use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
pub enum AttendanceStatus {
    Present,
    Absent,
    Leave,
}

text_column!(AttendanceStatus);

/// One intern at one meeting. Never updated after insert.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Attendance {
    pub id: u64,
    pub intern_id: u64,
    #[schema(value_type = String, format = "date")]
    pub meeting_date: NaiveDate,
    pub status: AttendanceStatus,
    pub remarks: Option<String>,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

/// One intern's mark within a logged meeting
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct NewAttendance {
    pub intern_id: u64,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub remarks: Option<String>,
}

/// Attendance for every intern present on the meeting's roll
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
#[schema(example = json!({
    "meeting_date": "2025-01-15",
    "entries": [
        { "intern_id": 12, "status": "Present" },
        { "intern_id": 13, "status": "Leave", "remarks": "Approved leave" }
    ]
}))]
pub struct MeetingLog {
    #[schema(value_type = String, format = "date")]
    pub meeting_date: NaiveDate,
    pub entries: Vec<NewAttendance>,
}
