use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 4,
    "intern_id": 12,
    "month": 2,
    "total_tasks": 10,
    "tasks_completed": 7,
    "initiative": 8,
    "communication": 9,
    "behaviour": 7,
    "overall_rating": 8.0,
    "completion_percentage": 70.0,
    "remarks": "Steady progress",
    "created_at": "2025-03-01T09:00:00Z"
}))]
pub struct PerformanceEntry {
    pub id: u64,
    pub intern_id: u64,
    /// 1-based, fixed when the entry is created
    pub month: u32,
    pub total_tasks: u32,
    pub tasks_completed: u32,
    pub initiative: u8,
    pub communication: u8,
    pub behaviour: u8,
    pub overall_rating: f64,
    pub completion_percentage: f64,
    pub remarks: Option<String>,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

/// A month entry whose derived fields have already been computed
#[derive(Debug, Clone, PartialEq)]
pub struct NewPerformanceEntry {
    pub total_tasks: u32,
    pub tasks_completed: u32,
    pub initiative: u8,
    pub communication: u8,
    pub behaviour: u8,
    pub overall_rating: f64,
    pub completion_percentage: f64,
    pub remarks: Option<String>,
}
