//! Request-scoped auth context and the auth error taxonomy.

use thiserror::Error;

use crate::auth::jwt::JwtError;
use crate::auth::role::Role;
use crate::auth::user::User;
use crate::domain::UserId;
use crate::errors::Error;

/// Identity resolved for an authenticated request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: UserId,
    pub role: Role,
    /// Fresh store record; `None` when the identity came from token claims only
    pub user: Option<User>,
}

impl AuthContext {
    /// Context backed by a record loaded from the credential store.
    pub fn from_user(user: User) -> Self {
        Self { user_id: user.id.clone(), role: user.role, user: Some(user) }
    }

    /// Context built from verified token claims alone.
    pub fn from_claims(user_id: UserId, role: Role) -> Self {
        Self { user_id, role, user: None }
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }
}

/// Errors returned by authentication middleware/services.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("unauthorized: bearer token missing")]
    MissingToken,
    #[error("unauthorized: malformed authorization header")]
    MalformedToken,
    #[error("unauthorized: invalid or expired token")]
    InvalidToken(#[source] JwtError),
    #[error("unauthorized: user not found")]
    IdentityNotFound,
    #[error("forbidden: not authenticated")]
    Unauthenticated,
    #[error("forbidden: access denied for role '{role}'")]
    AccessDenied { role: Role },
    #[error(transparent)]
    Persistence(#[from] Error),
}

impl AuthError {
    /// Label recorded on the authentication outcome counter
    pub fn metric_label(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "missing_token",
            AuthError::MalformedToken => "malformed",
            AuthError::InvalidToken(_) => "invalid_token",
            AuthError::IdentityNotFound => "not_found",
            AuthError::Unauthenticated | AuthError::AccessDenied { .. } => "forbidden",
            AuthError::Persistence(_) => "error",
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        AuthError::InvalidToken(err)
    }
}
