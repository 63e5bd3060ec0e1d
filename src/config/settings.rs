//! # Configuration Settings
//!
//! Defines the configuration structure for the classgate service.

use crate::errors::{ClassgateError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use validator::Validate;

/// Minimum accepted length of the token signing secret, in bytes.
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Longest accepted token validity window, in hours (30 days).
pub const MAX_TOKEN_TTL_HOURS: u64 = 720;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct AppConfig {
    /// HTTP API configuration
    #[validate(nested)]
    pub server: ApiServerConfig,

    /// Credential store configuration
    #[validate(nested)]
    pub database: DatabaseConfig,

    /// Token issuing and verification configuration
    #[validate(nested)]
    pub auth: AuthConfig,

    /// Logging and metrics configuration
    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(ClassgateError::from)?;
        self.validate_custom()
    }

    fn validate_custom(&self) -> Result<()> {
        if !self.database.is_sqlite() {
            return Err(ClassgateError::validation_field(
                "Database URL must start with 'sqlite:'",
                "database.url",
            ));
        }

        if self.auth.jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(ClassgateError::validation_field(
                format!("JWT secret must be at least {} bytes long", MIN_JWT_SECRET_LENGTH),
                "auth.jwt_secret",
            ));
        }

        if let Some(metrics_port) = self.observability.metrics_port {
            if metrics_port == self.server.port {
                return Err(ClassgateError::validation(
                    "API and metrics ports cannot be the same",
                ));
            }
        }

        Ok(())
    }
}

/// HTTP API server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApiServerConfig {
    /// Server bind address
    #[validate(length(min = 1, message = "Bind address cannot be empty"))]
    pub bind_address: String,

    /// Server port
    #[validate(range(min = 1, message = "Port must be between 1 and 65535"))]
    pub port: u16,

    /// CORS allowed origins (empty = allow any)
    pub cors_origins: Vec<String>,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self { bind_address: "0.0.0.0".to_string(), port: 8080, cors_origins: Vec::new() }
    }
}

impl ApiServerConfig {
    /// Get the `host:port` string the listener binds to
    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DatabaseConfig {
    /// Database connection URL
    #[validate(length(min = 1, message = "Database URL cannot be empty"))]
    pub url: String,

    /// Maximum number of connections in the pool
    #[validate(range(min = 1, max = 100, message = "Max connections must be between 1 and 100"))]
    pub max_connections: u32,

    /// Connection timeout in seconds
    #[validate(range(
        min = 1,
        max = 60,
        message = "Connect timeout must be between 1 and 60 seconds"
    ))]
    pub connect_timeout_seconds: u64,

    /// Run embedded migrations when the pool is created
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./data/classgate.db".to_string(),
            max_connections: 10,
            connect_timeout_seconds: 10,
            auto_migrate: true,
        }
    }
}

impl DatabaseConfig {
    /// Get connection timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    /// Check if this is a SQLite configuration
    pub fn is_sqlite(&self) -> bool {
        self.url.starts_with("sqlite:")
    }
}

/// How the verifier turns a valid token into the caller's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityResolution {
    /// Load the identity record from the store on every request.
    #[default]
    FullFetch,
    /// Trust the subject and role carried in the token.
    ClaimsOnly,
}

impl IdentityResolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityResolution::FullFetch => "full_fetch",
            IdentityResolution::ClaimsOnly => "claims_only",
        }
    }
}

impl fmt::Display for IdentityResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdentityResolution {
    type Err = ClassgateError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "full_fetch" => Ok(IdentityResolution::FullFetch),
            "claims_only" => Ok(IdentityResolution::ClaimsOnly),
            other => Err(ClassgateError::validation_field(
                format!("Unknown identity resolution mode '{}'", other),
                "auth.identity_resolution",
            )),
        }
    }
}

/// Token issuing and verification configuration
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct AuthConfig {
    /// HMAC secret for token signing/verification
    #[validate(length(min = 1, message = "JWT secret cannot be empty"))]
    pub jwt_secret: String,

    /// Token validity window in hours
    #[validate(range(
        min = 1,
        max = 720,
        message = "Token TTL must be between 1 hour and 30 days"
    ))]
    pub token_ttl_hours: u64,

    /// Identity resolution strategy for authenticated requests
    pub identity_resolution: IdentityResolution,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_hours: 24,
            identity_resolution: IdentityResolution::default(),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_hours", &self.token_ttl_hours)
            .field("identity_resolution", &self.identity_resolution)
            .finish()
    }
}

impl AuthConfig {
    /// Build an auth config around a secret, keeping the other defaults
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self { jwt_secret: secret.into(), ..Default::default() }
    }

    /// Token validity window, clamped to 1..=MAX_TOKEN_TTL_HOURS hours
    pub fn token_ttl(&self) -> chrono::Duration {
        let hours = self.token_ttl_hours.clamp(1, MAX_TOKEN_TTL_HOURS);
        chrono::Duration::hours(hours as i64)
    }
}

/// Observability configuration for logging and metrics
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ObservabilityConfig {
    /// Log level or `EnvFilter` directive
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,

    /// Prometheus exporter port (None = disabled)
    pub metrics_port: Option<u16>,

    /// Service name attached to startup logs
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logging: false,
            metrics_port: None,
            service_name: crate::APP_NAME.to_string(),
        }
    }
}

impl ObservabilityConfig {
    /// Get metrics bind address (None if disabled)
    pub fn metrics_bind_address(&self) -> Option<String> {
        self.metrics_port.map(|port| format!("0.0.0.0:{}", port))
    }
}
