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
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
pub enum InternStatus {
    Applied,
    Selected,
    Active,
    Completed,
    Rejected,
}

impl InternStatus {
    /// Interns that are part of the programme rather than applicants
    pub const ENROLLED: [InternStatus; 3] = [
        InternStatus::Selected,
        InternStatus::Active,
        InternStatus::Completed,
    ];
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
pub enum PerformanceTag {
    Average,
    Good,
    Excellent,
}

text_column!(InternStatus);
text_column!(PerformanceTag);

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "intern_code": "INT-4F2A9C1B",
    "name": "Asha Rao",
    "email": "asha@example.com",
    "phone": "+919812345678",
    "domain": "Web Development",
    "college": "City Engineering College",
    "resume_url": "https://files.example.com/asha.pdf",
    "duration_months": 3,
    "status": "Active",
    "performance": "Good",
    "join_date": "2025-01-06",
    "end_date": null,
    "created_at": "2025-01-01T10:00:00Z"
}))]
pub struct Intern {
    pub id: u64,
    pub intern_code: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Department the intern works in
    pub domain: String,
    pub college: String,
    pub resume_url: Option<String>,
    pub duration_months: u8,
    pub status: InternStatus,
    pub performance: PerformanceTag,
    #[schema(value_type = Option<String>, format = "date")]
    pub join_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = "date")]
    pub end_date: Option<NaiveDate>,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

/// Validated application ready to persist
#[derive(Debug, Clone)]
pub struct NewIntern {
    pub intern_code: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub domain: String,
    pub college: String,
    pub resume_url: Option<String>,
    pub duration_months: u8,
}

/// Application form submitted by a candidate
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
#[schema(example = json!({
    "name": "Asha Rao",
    "email": "asha@example.com",
    "phone": "+919812345678",
    "domain": "Web Development",
    "college": "City Engineering College",
    "resume_url": "https://files.example.com/asha.pdf",
    "duration_months": 3
}))]
pub struct InternApplication {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub domain: String,
    pub college: String,
    #[serde(default)]
    pub resume_url: Option<String>,
    pub duration_months: u8,
}

/// Admin-side profile changes; `None` leaves the column untouched
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
#[schema(example = json!({ "status": "Active", "performance": "Good" }))]
pub struct InternChanges {
    #[serde(default)]
    pub status: Option<InternStatus>,
    #[serde(default)]
    pub performance: Option<PerformanceTag>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>, format = "date")]
    pub join_date: Option<NaiveDate>,
    #[serde(default)]
    #[schema(value_type = Option<String>, format = "date")]
    pub end_date: Option<NaiveDate>,
}

impl InternChanges {
    pub fn is_empty(&self) -> bool {
        *self == InternChanges::default()
    }
}

/// Conjunctive intern filter. Empty vectors mean "any".
#[derive(Debug, Clone, Default)]
pub struct InternFilter {
    pub domains: Vec<String>,
    pub statuses: Vec<InternStatus>,
    pub search: Option<String>,
}
