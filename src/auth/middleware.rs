//! Axum middleware for authentication and role gating.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Method, Request},
    middleware::Next,
    response::Response,
};
use tracing::{field, warn, Instrument};

use crate::api::error::ApiError;
use crate::auth::auth_service::AuthService;
use crate::auth::authorization::require_role;
use crate::auth::models::{AuthContext, AuthError};
use crate::auth::role::Role;

pub type AuthServiceState = Arc<AuthService>;
pub type RoleState = Arc<Vec<Role>>;

/// Middleware entry point that authenticates requests using the configured [`AuthService`].
///
/// On success the resolved [`AuthContext`] is inserted into the request
/// extensions. `OPTIONS` requests pass through untouched for CORS preflight.
pub async fn authenticate(
    State(auth_service): State<AuthServiceState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    if request.method() == Method::OPTIONS {
        return Ok(next.run(request).await);
    }

    let span = crate::request_span!(request.method(), request.uri().path());

    let header = match request.headers().get(AUTHORIZATION) {
        None => String::new(),
        Some(value) => match value.to_str() {
            Ok(value) => value.to_string(),
            Err(_) => {
                span.in_scope(|| warn!("authorization header is not valid UTF-8"));
                return Err(map_auth_error(AuthError::MalformedToken));
            }
        },
    };

    let result = auth_service.authenticate(&header).instrument(span.clone()).await;

    match result {
        Ok(context) => {
            span.record("user_id", field::display(&context.user_id));
            request.extensions_mut().insert(context);
            Ok(next.run(request).instrument(span).await)
        }
        Err(err) => {
            span.in_scope(|| warn!(error = %err, "authentication failed"));
            Err(map_auth_error(err))
        }
    }
}

/// Middleware entry point that verifies the caller holds one of the allowed roles.
pub async fn ensure_roles(
    State(allowed): State<RoleState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let context = request.extensions().get::<AuthContext>();

    if let Err(err) = require_role(context, &allowed) {
        let allowed_summary =
            allowed.iter().map(Role::as_str).collect::<Vec<_>>().join(" ");
        warn!(
            http.method = %request.method(),
            http.path = %request.uri().path(),
            user_id = ?context.map(|ctx| ctx.user_id.as_str()),
            allowed = %allowed_summary,
            error = %err,
            "role check failed"
        );
        return Err(map_auth_error(err));
    }

    Ok(next.run(request).await)
}

fn map_auth_error(err: AuthError) -> ApiError {
    ApiError::from(err)
}
