//! Session state machine restored from and torn down to session storage.
//!
//! ```text
//! Unknown --start--> Loading --me ok--> Authenticated(profile)
//!                       |
//!                       +--no token / me failed--> Unauthenticated
//! ```
//!
//! `login`, `logout` and the login-required signal may move the session
//! between `Authenticated` and `Unauthenticated` at any time. Concurrent
//! `login`/`logout` calls are not serialized; the last write wins.

use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use super::api_client::{ApiClient, ClientEvent};
use super::{ClientError, ClientResult, TOKEN_KEY};
use crate::auth::user::{LoginRequest, UserProfile};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Unknown,
    Loading,
    Authenticated(UserProfile),
    Unauthenticated,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    pub state: SessionState,
    pub token: Option<String>,
    pub error: Option<String>,
}

impl Session {
    pub fn loading(&self) -> bool {
        self.state == SessionState::Loading
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        match &self.state {
            SessionState::Authenticated(profile) => Some(profile),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.profile().is_some()
    }

    fn unauthenticated(error: Option<String>) -> Self {
        Self { state: SessionState::Unauthenticated, token: None, error }
    }
}

pub struct SessionManager {
    client: Arc<ApiClient>,
    session: Arc<RwLock<Session>>,
}

impl SessionManager {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client, session: Arc::new(RwLock::new(Session::default())) }
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    pub async fn snapshot(&self) -> Session {
        self.session.read().await.clone()
    }

    async fn set(&self, session: Session) -> Session {
        *self.session.write().await = session.clone();
        session
    }

    /// Restore the session from storage, validating any persisted token.
    #[instrument(skip(self))]
    pub async fn start(&self) -> Session {
        self.session.write().await.state = SessionState::Loading;

        match self.client.token() {
            Ok(Some(_)) => self.revalidate().await,
            Ok(None) => {
                debug!("no persisted token");
                self.set(Session::unauthenticated(None)).await
            }
            Err(e) => {
                warn!(error = %e, "failed to read persisted token");
                self.set(Session::unauthenticated(Some(e.to_string()))).await
            }
        }
    }

    /// Ask the server who the persisted token belongs to.
    #[instrument(skip(self))]
    pub async fn revalidate(&self) -> Session {
        self.session.write().await.state = SessionState::Loading;

        let result = async {
            let token = self.client.token()?;
            let profile = self.client.me().await?;
            Ok::<_, ClientError>((token, profile))
        }
        .await;

        match result {
            Ok((token, profile)) => {
                info!(user_id = %profile.id, role = %profile.role, "session restored");
                self.set(Session { state: SessionState::Authenticated(profile), token, error: None })
                    .await
            }
            Err(e) => {
                warn!(error = %e, "session validation failed");
                if let Err(remove_err) = self.client.storage().remove(TOKEN_KEY) {
                    warn!(error = %remove_err, "failed to clear persisted token");
                }
                self.set(Session::unauthenticated(Some(failure_message(&e)))).await
            }
        }
    }

    /// Persist `token` and validate it.
    #[instrument(skip(self, token))]
    pub async fn login(&self, token: &str) -> ClientResult<Session> {
        self.client.storage().set(TOKEN_KEY, token)?;
        Ok(self.revalidate().await)
    }

    /// Exchange credentials for a token, then [`login`](Self::login) with it.
    #[instrument(skip(self, password))]
    pub async fn login_with_credentials(&self, email: &str, password: &str) -> ClientResult<Session> {
        let request = LoginRequest { email: email.to_string(), password: password.to_string() };

        match self.client.login(&request).await {
            Ok(response) => self.login(&response.token).await,
            Err(e) => {
                self.set(Session::unauthenticated(Some(failure_message(&e)))).await;
                Err(e)
            }
        }
    }

    /// Tell the server, then forget the token regardless of the outcome.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Session {
        match self.client.token() {
            Ok(Some(_)) => {
                if let Err(e) = self.client.logout().await {
                    warn!(error = %e, "server logout failed");
                }
            }
            Ok(None) => debug!("no token to revoke server-side"),
            Err(e) => warn!(error = %e, "failed to read persisted token"),
        }

        if let Err(e) = self.client.storage().remove(TOKEN_KEY) {
            warn!(error = %e, "failed to clear persisted token");
        }
        self.set(Session::unauthenticated(None)).await
    }

    /// React to a login-required signal. The token is already cleared.
    pub async fn handle_login_required(&self) -> Session {
        apply_login_required(&self.session).await
    }

    /// Listen for [`ClientEvent::LoginRequired`] until the client is dropped.
    pub fn spawn_event_listener(&self) -> JoinHandle<()> {
        let mut events = self.client.subscribe();
        let session = self.session.clone();

        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(ClientEvent::LoginRequired) => {
                        apply_login_required(&session).await;
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "session listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

async fn apply_login_required(session: &RwLock<Session>) -> Session {
    let mut guard = session.write().await;
    guard.state = SessionState::Unauthenticated;
    guard.token = None;
    guard.clone()
}

fn failure_message(err: &ClientError) -> String {
    match err {
        ClientError::Unauthorized(message) | ClientError::Server { message, .. } => message.clone(),
        other => other.to_string(),
    }
}
