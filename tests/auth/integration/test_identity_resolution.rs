use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use classgate::auth::{NewUser, Role, User};
use classgate::config::IdentityResolution;
use classgate::domain::UserId;
use classgate::storage::{create_memory_pool, SqlxUserRepository, UserRepository};
use classgate::Result;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;

use crate::support::{send_request, setup_test_app_with_repository, TestApp, TEST_SECRET};

/// Delegates to SQLite and counts identity lookups.
struct CountingRepository {
    inner: SqlxUserRepository,
    lookups: AtomicUsize,
}

#[async_trait]
impl UserRepository for CountingRepository {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        self.inner.create_user(user).await
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_id(id).await
    }

    async fn find_with_password_by_email(&self, email: &str) -> Result<Option<(User, String)>> {
        self.inner.find_with_password_by_email(email).await
    }

    async fn list_users(&self, limit: i64, offset: i64) -> Result<Vec<User>> {
        self.inner.list_users(limit, offset).await
    }

    async fn count_users(&self) -> Result<i64> {
        self.inner.count_users().await
    }

    async fn delete_user(&self, id: &UserId) -> Result<bool> {
        self.inner.delete_user(id).await
    }
}

async fn counting_app(resolution: IdentityResolution) -> (TestApp, Arc<CountingRepository>) {
    let pool = create_memory_pool().await.expect("create sqlite pool");
    let repository = Arc::new(CountingRepository {
        inner: SqlxUserRepository::new(pool.clone()),
        lookups: AtomicUsize::new(0),
    });
    let app = setup_test_app_with_repository(pool, repository.clone(), resolution);
    (app, repository)
}

#[tokio::test]
async fn claims_only_performs_no_lookup() {
    let (app, repository) = counting_app(IdentityResolution::ClaimsOnly).await;
    let (_, token) = app.login_as("teacher@example.com", Role::Teacher).await;

    let response = send_request(&app, Method::GET, "/api/host/overview", Some(&token), None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(repository.lookups.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn full_fetch_looks_up_once_per_request() {
    let (app, repository) = counting_app(IdentityResolution::FullFetch).await;
    let (_, token) = app.login_as("teacher@example.com", Role::Teacher).await;

    for expected in 1..=2 {
        let response =
            send_request(&app, Method::GET, "/api/host/overview", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(repository.lookups.load(Ordering::SeqCst), expected);
    }
}

#[tokio::test]
async fn claims_only_gates_on_token_role() {
    let (app, _) = counting_app(IdentityResolution::ClaimsOnly).await;
    let (_, token) = app.login_as("student@example.com", Role::Student).await;

    let response = send_request(&app, Method::GET, "/api/admin/users", Some(&token), None).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn claims_only_rejects_token_without_role() {
    let (app, _) = counting_app(IdentityResolution::ClaimsOnly).await;
    let user = app.create_user("legacy@example.com", Role::Teacher).await;
    let exp = (Utc::now() + Duration::hours(1)).timestamp();
    let token = encode(
        &Header::default(),
        &json!({ "userId": user.id.as_str(), "exp": exp }),
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("sign token");

    let response = send_request(&app, Method::GET, "/api/host/overview", Some(&token), None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
