use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::auth::{
    auth_service::AuthService,
    jwt::JwtService,
    login_service::LoginService,
    middleware::{authenticate, ensure_roles, RoleState},
    role::Role,
};
use crate::config::AuthConfig;
use crate::storage::{DbPool, SqlxUserRepository, UserRepository};

use super::handlers::{
    delete_user_handler, get_user_handler, health_handler, host_overview_handler,
    list_users_handler, login_handler, logout_handler, me_handler, register_handler,
};

#[derive(Clone)]
pub struct ApiState {
    pub auth_service: Arc<AuthService>,
    pub login_service: Arc<LoginService>,
    pub user_repository: Arc<dyn UserRepository>,
}

impl ApiState {
    pub fn new(
        jwt: Arc<JwtService>,
        user_repository: Arc<dyn UserRepository>,
        auth: &AuthConfig,
    ) -> Self {
        Self {
            auth_service: Arc::new(AuthService::new(
                jwt.clone(),
                user_repository.clone(),
                auth.identity_resolution,
            )),
            login_service: Arc::new(LoginService::new(user_repository.clone(), jwt)),
            user_repository,
        }
    }

    /// Wire every service against one SQLite pool.
    pub fn from_pool(pool: DbPool, auth: &AuthConfig) -> Self {
        let jwt = Arc::new(JwtService::new(auth));
        Self::new(jwt, Arc::new(SqlxUserRepository::new(pool)), auth)
    }
}

pub fn build_router(state: ApiState) -> Router {
    let auth_layer = middleware::from_fn_with_state(state.auth_service.clone(), authenticate);

    let role_layer = |roles: &[Role]| {
        let allowed: RoleState = Arc::new(roles.to_vec());
        middleware::from_fn_with_state(allowed, ensure_roles)
    };

    let secured_api = Router::new()
        .merge(
            Router::new()
                .route("/api/auth/me", get(me_handler))
                .route("/api/auth/logout", post(logout_handler)),
        )
        .merge(
            Router::new()
                .route("/api/admin/users", get(list_users_handler))
                .route("/api/admin/users/{id}", get(get_user_handler).delete(delete_user_handler))
                .route_layer(role_layer(&[Role::Admin])),
        )
        .merge(
            Router::new()
                .route("/api/host/overview", get(host_overview_handler))
                .route_layer(role_layer(&Role::STAFF)),
        )
        .with_state(state.clone())
        .layer(auth_layer);

    let public_api = Router::new()
        .route("/health", get(health_handler))
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/login", post(login_handler))
        .with_state(state);

    Router::new().merge(public_api).merge(secured_api).layer(TraceLayer::new_for_http())
}
