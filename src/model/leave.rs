use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
pub enum LeaveType {
    Sick,
    Casual,
    Personal,
    Emergency,
    Academic,
    Other,
}

#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

text_column!(LeaveType);
text_column!(LeaveStatus);

/// Administrator verdict on a pending request
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LeaveDecision {
    Approve,
    Reject,
}

impl LeaveDecision {
    pub fn target_status(self) -> LeaveStatus {
        match self {
            LeaveDecision::Approve => LeaveStatus::Approved,
            LeaveDecision::Reject => LeaveStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "intern_id": 12,
    "leave_type": "Sick",
    "start_date": "2025-01-10",
    "end_date": "2025-01-12",
    "total_days": 3,
    "reason": "Fever and rest",
    "status": "Pending",
    "decided_by": null,
    "decided_at": null,
    "created_at": "2025-01-09T08:30:00Z"
}))]
pub struct Leave {
    pub id: u64,
    pub intern_id: u64,
    pub leave_type: LeaveType,
    #[schema(value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub end_date: NaiveDate,
    pub total_days: u32,
    pub reason: String,
    pub status: LeaveStatus,
    pub decided_by: Option<u64>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub decided_at: Option<DateTime<Utc>>,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

/// Leave request as submitted by an intern
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
#[schema(example = json!({
    "leave_type": "Sick",
    "start_date": "2025-01-10",
    "end_date": "2025-01-12",
    "reason": "Fever and rest"
}))]
pub struct LeaveApplication {
    pub leave_type: LeaveType,
    #[schema(value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub end_date: NaiveDate,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct NewLeave {
    pub intern_id: u64,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_days: u32,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct LeaveFilter {
    pub intern_id: Option<u64>,
    pub status: Option<LeaveStatus>,
}
