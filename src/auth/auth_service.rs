//! Bearer token verification and identity resolution.

use std::sync::Arc;

use tracing::{field, info, instrument, warn};

use crate::auth::jwt::JwtService;
use crate::auth::models::{AuthContext, AuthError};
use crate::config::IdentityResolution;
use crate::observability::metrics;
use crate::storage::repositories::{SqlxUserRepository, UserRepository};

/// Extract the token from an `Authorization` header value.
///
/// The scheme is matched case-insensitively. An empty header is
/// `MissingToken`; anything other than `Bearer <token>` is `MalformedToken`.
pub fn parse_bearer(header: &str) -> Result<&str, AuthError> {
    let header = header.trim();
    if header.is_empty() {
        return Err(AuthError::MissingToken);
    }

    let (scheme, token) = header.split_once(' ').ok_or(AuthError::MalformedToken)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MalformedToken);
    }

    let token = token.trim();
    if token.is_empty() || token.contains(' ') {
        return Err(AuthError::MalformedToken);
    }

    Ok(token)
}

#[derive(Clone)]
pub struct AuthService {
    jwt: Arc<JwtService>,
    repository: Arc<dyn UserRepository>,
    resolution: IdentityResolution,
}

impl AuthService {
    pub fn new(
        jwt: Arc<JwtService>,
        repository: Arc<dyn UserRepository>,
        resolution: IdentityResolution,
    ) -> Self {
        Self { jwt, repository, resolution }
    }

    pub fn with_sqlx(
        jwt: Arc<JwtService>,
        pool: crate::storage::DbPool,
        resolution: IdentityResolution,
    ) -> Self {
        Self::new(jwt, Arc::new(SqlxUserRepository::new(pool)), resolution)
    }

    pub fn resolution(&self) -> IdentityResolution {
        self.resolution
    }

    /// Verify the header's token and resolve the caller's identity.
    #[instrument(skip(self, header), fields(user_id = field::Empty, resolution = %self.resolution))]
    pub async fn authenticate(&self, header: &str) -> Result<AuthContext, AuthError> {
        let result = self.resolve(header).await;

        match &result {
            Ok(context) => {
                tracing::Span::current().record("user_id", context.user_id.as_str());
                metrics::record_authentication("success");
                info!(user_id = %context.user_id, role = %context.role, "request authenticated");
            }
            Err(err) => metrics::record_authentication(err.metric_label()),
        }

        result
    }

    async fn resolve(&self, header: &str) -> Result<AuthContext, AuthError> {
        let token = parse_bearer(header)?;

        let claims = self.jwt.verify_token(token).map_err(|err| {
            warn!(error = %err, "token verification failed");
            AuthError::from(err)
        })?;
        let user_id = claims.user_id();

        match self.resolution {
            IdentityResolution::FullFetch => {
                let user = self.repository.find_by_id(&user_id).await?.ok_or_else(|| {
                    warn!(user_id = %user_id, "token subject no longer exists");
                    AuthError::IdentityNotFound
                })?;
                Ok(AuthContext::from_user(user))
            }
            IdentityResolution::ClaimsOnly => {
                let role = claims.role().ok_or_else(|| {
                    warn!(user_id = %user_id, role = ?claims.role, "token carries no usable role");
                    AuthError::InvalidToken(crate::auth::jwt::JwtError::Malformed(
                        "role claim missing or unknown".to_string(),
                    ))
                })?;
                Ok(AuthContext::from_claims(user_id, role))
            }
        }
    }
}
