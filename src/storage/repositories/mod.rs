//! Repository modules for data access

pub mod user;

pub use user::{SqlxUserRepository, UserRepository};
