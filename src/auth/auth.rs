use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload};
use futures::future::{Ready, ready};

use crate::error::ApiError;
use crate::model::role::Role;
use crate::models::Claims;

/// Principal placed in request extensions by the auth middleware
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Intern id for interns, incharge id for incharges
    pub user_id: u64,
    pub username: String,
    pub role: Role,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        AuthUser {
            user_id: claims.user_id,
            username: claims.sub,
            role: claims.role,
        }
    }
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthUser>()
                .cloned()
                .ok_or_else(|| ApiError::Auth("Not authenticated".into())),
        )
    }
}

impl AuthUser {
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Admin only".into()))
        }
    }

    /// Admins and incharges. Incharge activity is checked against the store
    /// when the department scope is resolved.
    pub fn require_staff(&self) -> Result<(), ApiError> {
        if self.role.is_staff() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Admin/Incharge only".into()))
        }
    }

    pub fn require_incharge(&self) -> Result<(), ApiError> {
        if self.role == Role::Incharge {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Incharge only".into()))
        }
    }

    pub fn intern_id(&self) -> Result<u64, ApiError> {
        if self.role == Role::Intern {
            Ok(self.user_id)
        } else {
            Err(ApiError::Forbidden("Intern only".into()))
        }
    }
}
