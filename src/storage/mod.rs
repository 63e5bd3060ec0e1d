//! # Storage and Persistence
//!
//! SQLite-backed credential store. The schema lives in `migrations/` and is
//! embedded into the binary.

pub mod pool;
pub mod repositories;

pub use pool::{create_memory_pool, create_pool, DbPool};
pub use repositories::{SqlxUserRepository, UserRepository};

use crate::errors::{ClassgateError, Result};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    MIGRATOR.run(pool).await.map_err(|e| {
        tracing::error!(error = %e, "Database migration failed");
        ClassgateError::from(e)
    })?;
    tracing::debug!(migrations = MIGRATOR.iter().count(), "Database migrations applied");
    Ok(())
}

/// Check database connectivity
pub async fn check_connection(pool: &DbPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .fetch_one(pool)
        .await
        .map_err(|e| ClassgateError::database(e, "Database connectivity check failed"))?;

    Ok(())
}
