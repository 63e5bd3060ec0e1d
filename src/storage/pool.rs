//! # Database Connection Pool Management

use crate::config::DatabaseConfig;
use crate::errors::{ClassgateError, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Pool, Sqlite,
};
use std::{str::FromStr, time::Duration};

/// Type alias for the database connection pool
pub type DbPool = Pool<Sqlite>;

const SQLITE_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Create a database connection pool with the specified configuration
pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool> {
    validate_config(config)?;

    let connect_options = SqliteConnectOptions::from_str(&config.url)
        .map_err(|e| {
            ClassgateError::database(e, format!("Invalid SQLite connection string: {}", config.url))
        })?
        .create_if_missing(true)
        .busy_timeout(SQLITE_BUSY_TIMEOUT)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.connect_timeout())
        .test_before_acquire(true)
        .connect_with(connect_options)
        .await
        .map_err(|e| {
            tracing::error!(
                error = %e,
                url = %config.url,
                busy_timeout_ms = SQLITE_BUSY_TIMEOUT.as_millis(),
                "Failed to create SQLite database pool"
            );
            ClassgateError::database(e, format!("Failed to connect to database: {}", config.url))
        })?;

    tracing::info!(
        url = %config.url,
        max_connections = config.max_connections,
        connect_timeout_ms = config.connect_timeout().as_millis(),
        "Database connection pool created"
    );

    if config.auto_migrate {
        tracing::info!("Auto-migration enabled, running database migrations");
        crate::storage::run_migrations(&pool).await?;
    }

    Ok(pool)
}

/// Create a private in-memory database with the schema applied.
///
/// The pool holds exactly one connection that never expires, since every new
/// `:memory:` connection would open an empty database.
pub async fn create_memory_pool() -> Result<DbPool> {
    let connect_options = SqliteConnectOptions::from_str("sqlite::memory:")
        .map_err(|e| ClassgateError::database(e, "Invalid in-memory SQLite options"))?;

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(connect_options)
        .await
        .map_err(|e| ClassgateError::database(e, "Failed to open in-memory database"))?;

    crate::storage::run_migrations(&pool).await?;
    Ok(pool)
}

fn validate_config(config: &DatabaseConfig) -> Result<()> {
    if config.max_connections == 0 {
        return Err(ClassgateError::validation("max_connections must be greater than 0"));
    }

    if config.url.is_empty() {
        return Err(ClassgateError::validation("database URL cannot be empty"));
    }

    if !config.is_sqlite() {
        return Err(ClassgateError::validation("database URL must start with 'sqlite:'"));
    }

    Ok(())
}
