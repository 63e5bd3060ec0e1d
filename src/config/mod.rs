//! # Configuration Management
//!
//! Loads [`AppConfig`] from `CLASSGATE_*` environment variables. A `.env` file
//! in the working directory is honoured through `dotenvy`.

pub mod settings;

pub use settings::{
    ApiServerConfig, AppConfig, AuthConfig, DatabaseConfig, IdentityResolution,
    ObservabilityConfig, MIN_JWT_SECRET_LENGTH,
};

use crate::errors::{ClassgateError, Result};
use std::str::FromStr;

impl AppConfig {
    /// Create configuration from the process environment and validate it.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();

        let server = ApiServerConfig {
            bind_address: lookup("CLASSGATE_API_BIND_ADDRESS")
                .unwrap_or(defaults.server.bind_address),
            port: parse_var(&lookup, "CLASSGATE_API_PORT")?.unwrap_or(defaults.server.port),
            cors_origins: lookup("CLASSGATE_CORS_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|origin| !origin.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        };

        let database = DatabaseConfig::from_lookup(&lookup)?;

        let jwt_secret = lookup("CLASSGATE_JWT_SECRET").ok_or_else(|| {
            ClassgateError::config("CLASSGATE_JWT_SECRET must be set to a secret of at least 32 bytes")
        })?;

        let auth = AuthConfig {
            jwt_secret,
            token_ttl_hours: parse_var(&lookup, "CLASSGATE_TOKEN_TTL_HOURS")?
                .unwrap_or(defaults.auth.token_ttl_hours),
            identity_resolution: parse_var(&lookup, "CLASSGATE_IDENTITY_RESOLUTION")?
                .unwrap_or(defaults.auth.identity_resolution),
        };

        let observability = ObservabilityConfig {
            log_level: lookup("CLASSGATE_LOG_LEVEL").unwrap_or(defaults.observability.log_level),
            json_logging: lookup("CLASSGATE_LOG_JSON")
                .map(|value| parse_bool(&value))
                .unwrap_or(defaults.observability.json_logging),
            metrics_port: parse_var(&lookup, "CLASSGATE_METRICS_PORT")?,
            service_name: defaults.observability.service_name,
        };

        let config = AppConfig { server, database, auth, observability };
        config.validate()?;
        Ok(config)
    }
}

impl DatabaseConfig {
    /// Database settings alone; operator commands need no JWT secret.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(&|key: &str| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = DatabaseConfig::default();
        Ok(DatabaseConfig {
            url: lookup("CLASSGATE_DATABASE_URL").unwrap_or(defaults.url),
            max_connections: parse_var(lookup, "CLASSGATE_DATABASE_MAX_CONNECTIONS")?
                .unwrap_or(defaults.max_connections),
            connect_timeout_seconds: defaults.connect_timeout_seconds,
            auto_migrate: lookup("CLASSGATE_DATABASE_AUTO_MIGRATE")
                .map(|value| parse_bool(&value))
                .unwrap_or(defaults.auto_migrate),
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ClassgateError::config(format!("Invalid value for {}: {}", key, e))),
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
