//! Credential store repository.
//!
//! Identity lookups for the verifier and CRUD for registration and the admin
//! endpoints. The credential hash only leaves this module through
//! [`UserRepository::find_with_password_by_email`].

use crate::auth::role::Role;
use crate::auth::user::{NewUser, User};
use crate::domain::UserId;
use crate::errors::{ClassgateError, Result};
use crate::storage::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::str::FromStr;
use tracing::instrument;

const USER_COLUMNS: &str = "id, email, password_hash, name, role, created_at, updated_at";

#[derive(Debug, Clone, FromRow)]
struct UserRow {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new identity. A taken email is a `Conflict`.
    async fn create_user(&self, user: NewUser) -> Result<User>;

    /// Resolve an identity by id
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>>;

    /// Resolve an identity together with its credential hash
    async fn find_with_password_by_email(&self, email: &str) -> Result<Option<(User, String)>>;

    /// List identities, newest first
    async fn list_users(&self, limit: i64, offset: i64) -> Result<Vec<User>>;

    /// Count all identities
    async fn count_users(&self) -> Result<i64>;

    /// Delete an identity; returns whether a row was removed
    async fn delete_user(&self, id: &UserId) -> Result<bool>;
}

#[derive(Debug, Clone)]
pub struct SqlxUserRepository {
    pool: DbPool,
}

impl SqlxUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn row_to_user(&self, row: UserRow) -> Result<User> {
        let role = Role::from_str(&row.role).map_err(|_| {
            ClassgateError::validation(format!("Unknown role '{}' stored for user", row.role))
        })?;

        Ok(User {
            id: UserId::from_string(row.id),
            name: row.name,
            email: row.email,
            role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    async fn fetch_row_by_email(&self, email: &str, context: &str) -> Result<Option<UserRow>> {
        sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = ?",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| ClassgateError::database(err, context))
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error().is_some_and(|db_err| db_err.is_unique_violation())
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    #[instrument(skip(self, user), fields(user_email = %user.email, user_id = %user.id), name = "db_create_user")]
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, name, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(user.role.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                ClassgateError::conflict(
                    format!("An account with email '{}' already exists", user.email),
                    "user",
                )
            } else {
                ClassgateError::database(err, "Failed to create user")
            }
        })?;

        self.find_by_id(&user.id)
            .await?
            .ok_or_else(|| ClassgateError::internal("User not found after creation"))
    }

    #[instrument(skip(self), fields(user_id = %id), name = "db_find_user_by_id")]
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = ?",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| ClassgateError::database(err, "Failed to fetch user"))?;

        row.map(|r| self.row_to_user(r)).transpose()
    }

    #[instrument(skip(self), fields(user_email = %email), name = "db_find_user_with_password")]
    async fn find_with_password_by_email(&self, email: &str) -> Result<Option<(User, String)>> {
        let row = self.fetch_row_by_email(email, "Failed to fetch user with password").await?;

        match row {
            Some(row) => {
                let password_hash = row.password_hash.clone();
                let user = self.row_to_user(row)?;
                Ok(Some((user, password_hash)))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self), fields(limit = limit, offset = offset), name = "db_list_users")]
    async fn list_users(&self, limit: i64, offset: i64) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users ORDER BY created_at DESC, id LIMIT ? OFFSET ?",
            USER_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|err| ClassgateError::database(err, "Failed to list users"))?;

        rows.into_iter().map(|r| self.row_to_user(r)).collect()
    }

    #[instrument(skip(self), name = "db_count_users")]
    async fn count_users(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|err| ClassgateError::database(err, "Failed to count users"))
    }

    #[instrument(skip(self), fields(user_id = %id), name = "db_delete_user")]
    async fn delete_user(&self, id: &UserId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|err| ClassgateError::database(err, "Failed to delete user"))?;

        Ok(result.rows_affected() > 0)
    }
}
