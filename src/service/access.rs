use tracing::warn;

use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::role::Role;
use crate::store::InchargeStore;

/// Departments a staff principal may act on
#[derive(Debug, Clone, PartialEq)]
pub enum Scope {
    All,
    Departments(Vec<String>),
}

impl Scope {
    pub fn allows(&self, domain: &str) -> bool {
        match self {
            Scope::All => true,
            Scope::Departments(departments) => departments.iter().any(|d| d == domain),
        }
    }

    pub fn ensure(&self, domain: &str) -> Result<(), ApiError> {
        if self.allows(domain) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(format!(
                "Department {domain} is outside your assignment"
            )))
        }
    }

    /// Domain list for an intern filter. Empty means unrestricted.
    pub fn domains(&self, requested: Option<&str>) -> Result<Vec<String>, ApiError> {
        let requested = requested.map(str::trim).filter(|d| !d.is_empty());
        match (self, requested) {
            (_, Some(domain)) => {
                self.ensure(domain)?;
                Ok(vec![domain.to_string()])
            }
            (Scope::All, None) => Ok(Vec::new()),
            (Scope::Departments(departments), None) if departments.is_empty() => Err(
                ApiError::Forbidden("No departments are assigned to this account".into()),
            ),
            (Scope::Departments(departments), None) => Ok(departments.clone()),
        }
    }
}

/// Resolves the scope of an admin or an active incharge.
pub async fn staff_scope<S: InchargeStore>(store: &S, auth: &AuthUser) -> Result<Scope, ApiError> {
    match auth.role {
        Role::Admin => Ok(Scope::All),
        Role::Incharge => {
            let incharge = store
                .find_incharge(auth.user_id)
                .await?
                .ok_or_else(|| ApiError::Forbidden("Incharge account not found".into()))?;
            if !incharge.is_active {
                warn!(incharge_id = incharge.id, "Inactive incharge attempted access");
                return Err(ApiError::Forbidden("Incharge account is inactive".into()));
            }
            Ok(Scope::Departments(incharge.departments))
        }
        Role::Intern => Err(ApiError::Forbidden("Admin/Incharge only".into())),
    }
}
