use serde::{Deserialize, Serialize};

use crate::model::role::Role;

/// Claims of the signed session token issued by the login service
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Intern or incharge id, depending on `role`
    pub user_id: u64,
    /// Account email
    pub sub: String,
    pub role: Role,
    pub exp: usize,
}
