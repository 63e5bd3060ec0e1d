//! Signed session tokens.
//!
//! Tokens are HS256 JWTs carrying the identity id in `sub` plus the role. The
//! decoder also accepts the subject under `id` or `userId`, the field names
//! used by tokens minted for the older dashboards.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::auth::role::Role;
use crate::config::AuthConfig;
use crate::domain::UserId;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (identity id)
    #[serde(default, alias = "id", alias = "userId")]
    pub sub: String,
    /// Role at issue time; informational unless identity resolution is claims-only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> UserId {
        UserId::from_string(self.sub.clone())
    }

    /// Role carried by the token, if present and known
    pub fn role(&self) -> Option<Role> {
        self.role.as_deref().and_then(|role| Role::from_str(role).ok())
    }
}

/// A freshly signed token and its expiry.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JwtError {
    #[error("token subject is missing")]
    MissingSubject,
    #[error("token has expired")]
    Expired,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token is malformed: {0}")]
    Malformed(String),
    #[error("failed to sign token: {0}")]
    Encoding(String),
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => JwtError::InvalidSignature,
            _ => JwtError::Malformed(err.to_string()),
        }
    }
}

/// Issues and verifies session tokens with a shared HMAC secret
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtService {
    pub fn new(config: &AuthConfig) -> Self {
        Self::from_secret(config.jwt_secret.as_bytes(), config.token_ttl())
    }

    pub fn from_secret(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Sign a token for the identity, valid from now for the configured window
    pub fn issue_token(&self, user_id: &UserId, role: Role) -> Result<IssuedToken, JwtError> {
        self.issue_token_at(user_id, role, Utc::now())
    }

    /// Sign a token as if issued at `issued_at`
    pub fn issue_token_at(
        &self,
        user_id: &UserId,
        role: Role,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, JwtError> {
        if user_id.is_blank() {
            return Err(JwtError::MissingSubject);
        }

        let expires_at = issued_at + self.ttl;
        let claims = Claims {
            sub: user_id.to_string(),
            role: Some(role.to_string()),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| JwtError::Encoding(err.to_string()))?;

        let expires_at = Utc.timestamp_opt(claims.exp, 0).single().unwrap_or(expires_at);
        Ok(IssuedToken { token, expires_at })
    }

    /// Check signature and expiry and return the claims
    pub fn verify_token(&self, token: &str) -> Result<Claims, JwtError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        if data.claims.sub.trim().is_empty() {
            return Err(JwtError::MissingSubject);
        }
        Ok(data.claims)
    }
}
