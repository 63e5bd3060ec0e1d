//! Domain types shared across the storage, auth and API layers.

pub mod id;

pub use id::UserId;
