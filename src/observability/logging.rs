//! # Structured Logging
//!
//! Request span macro, subscriber setup and startup logging built on the tracing ecosystem.

use crate::config::AppConfig;
use crate::errors::{ClassgateError, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Create a tracing span for request tracking.
///
/// ```rust,ignore
/// let span = request_span!("GET", "/api/auth/me");
/// let span = request_span!("POST", "/api/auth/login", email = %email);
/// ```
#[macro_export]
macro_rules! request_span {
    ($method:expr, $path:expr) => {
        tracing::info_span!(
            "http_request",
            method = %$method,
            path = %$path,
            request_id = %uuid::Uuid::new_v4(),
            user_id = tracing::field::Empty
        )
    };
    ($method:expr, $path:expr, $($field:tt)*) => {
        tracing::info_span!(
            "http_request",
            method = %$method,
            path = %$path,
            request_id = %uuid::Uuid::new_v4(),
            user_id = tracing::field::Empty,
            $($field)*
        )
    };
}

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over the configured level when set. Installing twice is an
/// error, which callers in tests are free to ignore.
pub fn init_logging(log_level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .map_err(|e| {
            ClassgateError::config(format!("Invalid log filter '{}': {}", log_level, e))
        })?;

    let builder = fmt().with_env_filter(filter).with_target(true);
    let installed = if json {
        builder.json().with_current_span(true).try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| ClassgateError::internal(format!("Failed to install logger: {}", e)))
}

/// Log configuration at startup
pub fn log_config_info(config: &AppConfig) {
    tracing::info!(
        api_address = %config.server.socket_address(),
        database_url = %config.database.url,
        identity_resolution = %config.auth.identity_resolution,
        token_ttl_hours = config.auth.token_ttl_hours,
        cors_origins = config.server.cors_origins.len(),
        metrics_port = ?config.observability.metrics_port,
        "classgate configuration"
    );
}
