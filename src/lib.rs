//! # classgate
//!
//! Authentication and session layer shared by the classroom quiz and
//! peer-evaluation dashboards.
//!
//! ## Architecture
//!
//! ```text
//! credentials → LoginService → JWT → client SessionManager
//!                                      ↓ Authorization: Bearer
//! request → authenticate middleware → AuthService → UserRepository
//!                     ↓
//!              ensure_roles (role gate) → handler
//! ```
//!
//! ## Core Components
//!
//! - **Credential store**: SQLx over SQLite, one `users` table
//! - **Token issuer/verifier**: HS256 JWTs via `jsonwebtoken`
//! - **Session middleware and role gate**: axum `from_fn_with_state` layers
//! - **Client session cache**: persisted token plus a login-required signal
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use classgate::{api::{build_router, ApiState}, config::AppConfig, storage::create_pool};
//!
//! #[tokio::main]
//! async fn main() -> classgate::Result<()> {
//!     let config = AppConfig::from_env()?;
//!     let pool = create_pool(&config.database).await?;
//!     let router = build_router(ApiState::from_pool(pool, &config.auth));
//!     let listener = tokio::net::TcpListener::bind(config.server.socket_address()).await?;
//!     axum::serve(listener, router).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod storage;

// Re-export commonly used types and traits
pub use config::AppConfig;
pub use errors::{Error, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
