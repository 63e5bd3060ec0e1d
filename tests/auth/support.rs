use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, Response},
    Router,
};
use classgate::{
    api::{build_router, ApiState},
    auth::{login_service::provision_user, JwtService, Role, User},
    config::{AuthConfig, IdentityResolution},
    storage::{create_memory_pool, DbPool, SqlxUserRepository, UserRepository},
};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const PASSWORD: &str = "correct-horse-battery";

pub struct TestApp {
    pub state: ApiState,
    pub pool: DbPool,
    pub jwt: Arc<JwtService>,
}

impl TestApp {
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    pub async fn create_user(&self, email: &str, role: Role) -> User {
        let repository = SqlxUserRepository::new(self.pool.clone());
        provision_user(&repository, "Test User", email, PASSWORD, role).await.expect("create user")
    }

    pub fn token_for(&self, user: &User) -> String {
        self.jwt.issue_token(&user.id, user.role).expect("issue token").token
    }

    /// Create an identity and a valid token for it.
    pub async fn login_as(&self, email: &str, role: Role) -> (User, String) {
        let user = self.create_user(email, role).await;
        let token = self.token_for(&user);
        (user, token)
    }
}

pub fn auth_config(resolution: IdentityResolution) -> AuthConfig {
    let mut config = AuthConfig::with_secret(TEST_SECRET);
    config.identity_resolution = resolution;
    config
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(IdentityResolution::FullFetch).await
}

pub async fn setup_test_app_with(resolution: IdentityResolution) -> TestApp {
    let pool = create_memory_pool().await.expect("create sqlite pool");
    let repository: Arc<dyn UserRepository> = Arc::new(SqlxUserRepository::new(pool.clone()));
    setup_test_app_with_repository(pool, repository, resolution)
}

pub fn setup_test_app_with_repository(
    pool: DbPool,
    repository: Arc<dyn UserRepository>,
    resolution: IdentityResolution,
) -> TestApp {
    let config = auth_config(resolution);
    let jwt = Arc::new(JwtService::new(&config));
    let state = ApiState::new(jwt.clone(), repository, &config);
    TestApp { state, pool, jwt }
}

pub async fn send_request(
    app: &TestApp,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }

    let request = if let Some(json) = body {
        let bytes = serde_json::to_vec(&json).expect("serialize body");
        builder
            .header("content-type", "application/json")
            .body(Body::from(bytes))
            .expect("build request")
    } else {
        builder.body(Body::empty()).expect("build request")
    };

    app.router().oneshot(request).await.expect("request")
}

pub async fn send_with_authorization(
    app: &TestApp,
    path: &str,
    authorization: &str,
) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(path)
        .header("Authorization", authorization)
        .body(Body::empty())
        .expect("build request");
    app.router().oneshot(request).await.expect("request")
}

pub async fn read_json<T: DeserializeOwned>(response: Response<Body>) -> T {
    let bytes = response.into_body().collect().await.expect("read body").to_bytes();
    serde_json::from_slice(&bytes).expect("parse json")
}
