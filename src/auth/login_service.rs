//! Registration and email/password login.

use std::sync::{Arc, LazyLock};

use tracing::{info, instrument, warn};
use validator::{Validate, ValidateEmail};

use crate::auth::jwt::{IssuedToken, JwtService};
use crate::auth::role::Role;
use crate::auth::user::{AuthResponse, LoginRequest, NewUser, RegisterRequest, User};
use crate::auth::hashing;
use crate::domain::UserId;
use crate::errors::{Error, Result};
use crate::observability::metrics;
use crate::storage::repositories::{SqlxUserRepository, UserRepository};

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const MIN_PASSWORD_LENGTH: usize = 8;

/// Hash verified against when the email is unknown, so both failure paths
/// cost one Argon2 verification.
static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
    hashing::hash_password("classgate-dummy-value")
        .unwrap_or_else(|_| "$argon2id$v=19$m=768,t=1,p=1$ZHVtbXlzYWx0$ZHVtbXloYXNo".to_string())
});

#[derive(Clone)]
pub struct LoginService {
    user_repository: Arc<dyn UserRepository>,
    jwt: Arc<JwtService>,
}

impl LoginService {
    pub fn new(user_repository: Arc<dyn UserRepository>, jwt: Arc<JwtService>) -> Self {
        Self { user_repository, jwt }
    }

    pub fn with_sqlx(pool: crate::storage::DbPool, jwt: Arc<JwtService>) -> Self {
        Self::new(Arc::new(SqlxUserRepository::new(pool)), jwt)
    }

    /// Self-service registration. Admin accounts cannot be self-registered.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, mut request: RegisterRequest) -> Result<AuthResponse> {
        request.email = User::normalize_email(&request.email);
        request.validate()?;

        let role = request.role.unwrap_or_default();
        if role.is_admin() {
            warn!("self-registration attempted with admin role");
            return Err(Error::validation_field(
                "Admin accounts cannot be self-registered",
                "role",
            ));
        }

        let user = self.provision(&request.name, &request.email, &request.password, role).await?;
        self.issue_response(user)
    }

    /// Create an identity with any role.
    pub async fn provision(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<User> {
        provision_user(self.user_repository.as_ref(), name, email, password, role).await
    }

    /// Verify credentials and issue a token.
    ///
    /// Unknown email and wrong password fail with the same message.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse> {
        request.validate()?;
        let email = User::normalize_email(&request.email);

        let (user, password_hash) =
            match self.user_repository.find_with_password_by_email(&email).await? {
                Some(found) => found,
                None => {
                    if let Err(e) = hashing::verify_password(&request.password, &DUMMY_HASH) {
                        warn!(error = %e, "dummy hash verification failed unexpectedly");
                    }
                    warn!(email = %email, "login attempt for non-existent user");
                    metrics::record_login(false);
                    return Err(Error::auth(INVALID_CREDENTIALS));
                }
            };

        if !hashing::verify_password(&request.password, &password_hash)? {
            warn!(user_id = %user.id, "login attempt with incorrect password");
            metrics::record_login(false);
            return Err(Error::auth(INVALID_CREDENTIALS));
        }

        metrics::record_login(true);
        info!(user_id = %user.id, role = %user.role, "user logged in");
        self.issue_response(user)
    }

    fn issue_response(&self, user: User) -> Result<AuthResponse> {
        let IssuedToken { token, expires_at } = self
            .jwt
            .issue_token(&user.id, user.role)
            .map_err(|e| Error::internal(format!("Failed to issue token: {}", e)))?;
        metrics::record_token_issued();

        Ok(AuthResponse { token, expires_at, user })
    }
}

/// Hash the password and store a new identity. Also used by the operator CLI
/// to bootstrap admins, which self-registration refuses.
#[instrument(skip(repository, name, password), fields(email = %email, role = %role))]
pub async fn provision_user(
    repository: &dyn UserRepository,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
) -> Result<User> {
    let email = User::normalize_email(email);
    if !email.validate_email() {
        return Err(Error::validation_field("Email must be a valid address", "email"));
    }
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation_field("Name cannot be empty", "name"));
    }
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(Error::validation_field("Password must be at least 8 characters", "password"));
    }

    let password_hash = hashing::hash_password(password)?;
    let user = repository
        .create_user(NewUser { id: UserId::new(), email, password_hash, name: name.to_string(), role })
        .await?;

    info!(user_id = %user.id, role = %user.role, "user registered");
    Ok(user)
}
