//! Admin-only identity management and the staff overview.
//!
//! Role checks happen in the router via `ensure_roles`; handlers here only
//! see requests that already passed the gate.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::api::error::ApiError;
use crate::api::handlers::pagination::{PaginatedResponse, PaginationQuery, MAX_LIMIT};
use crate::api::routes::ApiState;
use crate::auth::models::AuthContext;
use crate::auth::role::Role;
use crate::auth::user::User;
use crate::domain::UserId;
use crate::errors::Error;

#[instrument(skip(state))]
pub async fn list_users_handler(
    State(state): State<ApiState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<User>>, ApiError> {
    let (limit, offset) = query.clamp(MAX_LIMIT);

    let users = state.user_repository.list_users(limit, offset).await.map_err(ApiError::from)?;
    let total = state.user_repository.count_users().await.map_err(ApiError::from)?;

    Ok(Json(PaginatedResponse::new(users, total, limit, offset)))
}

#[instrument(skip(state))]
pub async fn get_user_handler(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let user_id = UserId::from_string(id);
    state
        .user_repository
        .find_by_id(&user_id)
        .await
        .map_err(ApiError::from)?
        .map(Json)
        .ok_or_else(|| Error::not_found("User", user_id.as_str()).into())
}

#[instrument(skip(state, context), fields(admin_id = %context.user_id))]
pub async fn delete_user_handler(
    State(state): State<ApiState>,
    Extension(context): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let user_id = UserId::from_string(id);
    if user_id == context.user_id {
        return Err(ApiError::bad_request("Administrators cannot delete their own account"));
    }

    let deleted = state.user_repository.delete_user(&user_id).await.map_err(ApiError::from)?;
    if !deleted {
        return Err(Error::not_found("User", user_id.as_str()).into());
    }

    info!(user_id = %user_id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewResponse {
    pub user_id: UserId,
    pub role: Role,
    pub user: Option<User>,
}

/// Staff-only check endpoint; echoes the caller's resolved identity.
#[instrument(skip(context), fields(user_id = %context.user_id))]
pub async fn host_overview_handler(
    Extension(context): Extension<AuthContext>,
) -> Json<OverviewResponse> {
    Json(OverviewResponse { user_id: context.user_id, role: context.role, user: context.user })
}
