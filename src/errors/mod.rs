//! # Error Handling
//!
//! Error types shared by the storage, auth and API layers.

pub mod types;

pub use types::{ClassgateError, Result};

/// Short alias used throughout the crate.
pub type Error = ClassgateError;
