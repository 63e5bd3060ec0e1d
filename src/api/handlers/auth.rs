//! Registration, login and session endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::api::error::ApiError;
use crate::api::handlers::json_body;
use crate::api::routes::ApiState;
use crate::auth::models::AuthContext;
use crate::auth::user::{AuthResponse, LoginRequest, RegisterRequest, UserProfile};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub message: String,
}

#[instrument(skip(state, payload))]
pub async fn register_handler(
    State(state): State<ApiState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let request = json_body(payload)?;
    let response = state.login_service.register(request).await.map_err(ApiError::from)?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[instrument(skip(state, payload))]
pub async fn login_handler(
    State(state): State<ApiState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let request = json_body(payload)?;
    let response = state.login_service.login(&request).await.map_err(ApiError::from)?;
    Ok(Json(response))
}

/// "Who am I". Claims-only contexts carry no record, so one is loaded here.
#[instrument(skip(state, context), fields(user_id = %context.user_id))]
pub async fn me_handler(
    State(state): State<ApiState>,
    Extension(context): Extension<AuthContext>,
) -> Result<Json<UserProfile>, ApiError> {
    if let Some(user) = context.user {
        return Ok(Json(user));
    }

    state
        .user_repository
        .find_by_id(&context.user_id)
        .await
        .map_err(ApiError::from)?
        .map(Json)
        .ok_or_else(|| ApiError::unauthorized("User not found"))
}

/// Tokens are stateless; logout only acknowledges so clients can clear theirs.
#[instrument(skip(context), fields(user_id = %context.user_id))]
pub async fn logout_handler(
    Extension(context): Extension<AuthContext>,
) -> (StatusCode, Json<LogoutResponse>) {
    info!(user_id = %context.user_id, "user logged out");
    (StatusCode::OK, Json(LogoutResponse { message: "Logged out successfully".to_string() }))
}
