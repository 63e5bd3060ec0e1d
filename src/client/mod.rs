//! Client-side session cache.
//!
//! Persists the bearer token, attaches it to every request, and turns any
//! 401 into a login-required signal. [`session::SessionManager`] exposes the
//! resulting state machine to callers.

pub mod api_client;
pub mod session;
pub mod storage;

use thiserror::Error;

pub use api_client::{ApiClient, ClientConfig, ClientEvent, LoginRedirect};
pub use session::{Session, SessionManager, SessionState};
pub use storage::{FileStorage, MemoryStorage, SessionStorage};

/// Storage key of the persisted bearer token
pub const TOKEN_KEY: &str = "token";

/// Storage key of the server base URL remembered by the CLI
pub const BASE_URL_KEY: &str = "base_url";

#[derive(Debug, Error)]
pub enum ClientError {
    /// Server answered 401; the persisted token has already been cleared.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Session storage error: {0}")]
    Storage(String),
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
