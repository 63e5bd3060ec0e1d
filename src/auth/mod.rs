//! Authentication and authorization module entry point.
//!
//! Token issuing and verification, identity resolution against the credential
//! store, the role gate and the axum middleware that wires them together.

pub mod auth_service;
pub mod authorization;
pub mod hashing;
pub mod jwt;
pub mod login_service;
pub mod middleware;
pub mod models;
pub mod role;
pub mod user;

pub use auth_service::{parse_bearer, AuthService};
pub use jwt::{Claims, IssuedToken, JwtError, JwtService};
pub use login_service::LoginService;
pub use models::{AuthContext, AuthError};
pub use role::Role;
pub use user::{AuthResponse, LoginRequest, NewUser, RegisterRequest, User, UserProfile};
