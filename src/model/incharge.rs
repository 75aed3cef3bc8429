use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": 3,
    "name": "Ravi Kumar",
    "email": "ravi@example.com",
    "phone": null,
    "departments": ["Web Development", "Design"],
    "is_active": true,
    "created_at": "2024-12-01T12:00:00Z"
}))]
pub struct Incharge {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub departments: Vec<String>,
    pub is_active: bool,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

/// Incharge row without its department assignments
#[derive(Debug, sqlx::FromRow)]
pub struct InchargeRow {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl InchargeRow {
    pub fn with_departments(self, departments: Vec<String>) -> Incharge {
        Incharge {
            id: self.id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            departments,
            is_active: self.is_active,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
#[schema(example = json!({
    "name": "Ravi Kumar",
    "email": "ravi@example.com",
    "departments": ["Web Development"]
}))]
pub struct NewIncharge {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub departments: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
#[schema(example = json!({ "is_active": false }))]
pub struct InchargeChanges {
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub departments: Option<Vec<String>>,
}

impl InchargeChanges {
    pub fn is_empty(&self) -> bool {
        *self == InchargeChanges::default()
    }
}
