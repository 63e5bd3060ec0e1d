//! # REST API Components
//!
//! HTTP surface of the auth layer: routing, handlers, error mapping and the
//! server bootstrap.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;

pub use error::{ApiError, ErrorBody};
pub use routes::{build_router, ApiState};
pub use server::start_api_server;
