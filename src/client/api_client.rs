//! HTTP client that carries the session token and reacts to 401s.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::storage::SessionStorage;
use super::{ClientError, ClientResult, BASE_URL_KEY, TOKEN_KEY};
use crate::api::error::ErrorBody;
use crate::api::handlers::auth::LogoutResponse;
use crate::auth::user::{AuthResponse, LoginRequest, RegisterRequest, UserProfile};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const BASE_URL_ENV: &str = "CLASSGATE_BASE_URL";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the classgate API (e.g., "http://localhost:8080")
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_BASE_URL.to_string(), timeout: 30 }
    }
}

impl ClientConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), ..Self::default() }
    }

    /// Resolve the base URL.
    ///
    /// Checks sources in the following priority order:
    /// 1. explicit flag
    /// 2. value remembered in session storage
    /// 3. `CLASSGATE_BASE_URL` environment variable
    /// 4. `http://localhost:8080`
    pub fn resolve_base_url(flag: Option<String>, storage: &dyn SessionStorage) -> String {
        if let Some(url) = flag {
            return url;
        }

        match storage.get(BASE_URL_KEY) {
            Ok(Some(url)) => return url,
            Ok(None) => {}
            Err(e) => warn!(error = %e, "failed to read base URL from session storage"),
        }

        std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
    }
}

/// Events published by the client to interested listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// A request was rejected with 401 and the token was cleared.
    LoginRequired,
}

/// Hook invoked whenever the client needs the user to log in again.
pub trait LoginRedirect: Send + Sync {
    fn login_required(&self);
}

pub struct ApiClient {
    client: Client,
    config: ClientConfig,
    storage: Arc<dyn SessionStorage>,
    events: broadcast::Sender<ClientEvent>,
    redirect: Option<Arc<dyn LoginRedirect>>,
}

impl ApiClient {
    pub fn new(config: ClientConfig, storage: Arc<dyn SessionStorage>) -> ClientResult<Self> {
        let client = Client::builder().timeout(Duration::from_secs(config.timeout)).build()?;
        let (events, _) = broadcast::channel(16);

        Ok(Self { client, config, storage, events, redirect: None })
    }

    pub fn with_login_redirect(mut self, redirect: Arc<dyn LoginRedirect>) -> Self {
        self.redirect = Some(redirect);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn storage(&self) -> &Arc<dyn SessionStorage> {
        &self.storage
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub fn token(&self) -> ClientResult<Option<String>> {
        self.storage.get(TOKEN_KEY)
    }

    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<AuthResponse> {
        self.post_json("/api/auth/register", request).await
    }

    pub async fn login(&self, request: &LoginRequest) -> ClientResult<AuthResponse> {
        self.post_json("/api/auth/login", request).await
    }

    pub async fn me(&self) -> ClientResult<UserProfile> {
        self.get_json("/api/auth/me").await
    }

    pub async fn logout(&self) -> ClientResult<LogoutResponse> {
        self.post_json("/api/auth/logout", &serde_json::json!({})).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = self.url(path);
        debug!("GET {}", url);
        self.send(self.client.get(&url)).await
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let url = self.url(path);
        debug!("POST {}", url);
        self.send(self.client.post(&url).json(body)).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        let builder = match self.token()? {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };

        let response = builder.send().await?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> ClientResult<T> {
        let status = response.status();
        debug!("Response status: {}", status);

        let body = response.text().await?;

        if status == reqwest::StatusCode::UNAUTHORIZED {
            self.handle_unauthorized();
            return Err(ClientError::Unauthorized(error_message(&body, status)));
        }

        if !status.is_success() {
            return Err(ClientError::Server {
                status: status.as_u16(),
                message: error_message(&body, status),
            });
        }

        serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Clear the token, broadcast [`ClientEvent::LoginRequired`] and run the redirect hook.
    fn handle_unauthorized(&self) {
        if let Err(e) = self.storage.remove(TOKEN_KEY) {
            warn!(error = %e, "failed to clear token after 401");
        }

        // No subscribers is fine.
        let _ = self.events.send(ClientEvent::LoginRequired);

        if let Some(redirect) = &self.redirect {
            redirect.login_required();
        }
    }
}

/// Prefer the server's `message` field, fall back to the raw body.
fn error_message(body: &str, status: reqwest::StatusCode) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(error) => error.message,
        Err(_) if body.trim().is_empty() => status.to_string(),
        Err(_) => body.trim().to_string(),
    }
}
