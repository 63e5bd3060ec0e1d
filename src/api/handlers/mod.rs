//! HTTP request handlers organized by resource type

pub mod admin;
pub mod auth;
pub mod health;
pub mod pagination;

pub use admin::{
    delete_user_handler, get_user_handler, host_overview_handler, list_users_handler,
};
pub use auth::{login_handler, logout_handler, me_handler, register_handler};
pub use health::health_handler;

use axum::{extract::rejection::JsonRejection, Json};

use crate::api::error::ApiError;

/// Unwrap a JSON body, reporting syntax and shape errors as 400.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(body)| body).map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}
