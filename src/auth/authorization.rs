//! Role gate applied after authentication.

use crate::auth::models::{AuthContext, AuthError};
use crate::auth::role::Role;

/// Check that the request is authenticated and its role is in `allowed`.
///
/// A missing context is `Unauthenticated`, a role outside the set is
/// `AccessDenied`. Both surface as 403.
///
/// ```rust
/// use classgate::auth::authorization::require_role;
/// use classgate::auth::models::AuthContext;
/// use classgate::auth::Role;
/// use classgate::domain::UserId;
///
/// let ctx = AuthContext::from_claims(UserId::from("u-1"), Role::Host);
/// assert!(require_role(Some(&ctx), &[Role::Admin, Role::Host]).is_ok());
/// assert!(require_role(Some(&ctx), &[Role::Admin]).is_err());
/// assert!(require_role(None, &[Role::Admin]).is_err());
/// ```
pub fn require_role(context: Option<&AuthContext>, allowed: &[Role]) -> Result<(), AuthError> {
    let context = context.ok_or(AuthError::Unauthenticated)?;
    if context.has_any_role(allowed) {
        Ok(())
    } else {
        Err(AuthError::AccessDenied { role: context.role })
    }
}
