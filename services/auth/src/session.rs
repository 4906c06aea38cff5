//! Client session management
//!
//! [`SessionManager`] is the single owner of the authentication state. The
//! persisted credentials are the source of truth across restarts; the
//! in-memory [`Session`] is a cache of them that consumers observe through a
//! `watch` channel.

use chrono::Utc;
use common::storage::KeyValueStore;
use common::StorageResult;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::api::TokenRefresher;
use crate::jwt::{AccessToken, RefreshToken};
use crate::models::{Credentials, Session, SessionStatus};

/// Storage key of the access token
pub const ACCESS_TOKEN_KEY: &str = "accessToken";
/// Storage key of the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
/// Storage key of the username
pub const USERNAME_KEY: &str = "username";

const SESSION_KEYS: [&str; 3] = [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USERNAME_KEY];

/// Session manager for the client process
///
/// Cloning is cheap and every clone shares the same state, so one instance
/// created at the process root can be handed to every component that needs
/// credentials.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
    refresher: Arc<dyn TokenRefresher>,
    state: Arc<watch::Sender<Session>>,
}

impl SessionManager {
    /// Create a new session manager in the `Uninitialized` state
    pub fn new(store: Arc<dyn KeyValueStore>, refresher: Arc<dyn TokenRefresher>) -> Self {
        Self {
            store,
            refresher,
            state: Arc::new(watch::Sender::new(Session::uninitialized())),
        }
    }

    /// Current session snapshot
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Current session status
    pub fn status(&self) -> SessionStatus {
        self.state.borrow().status()
    }

    /// Watch the session for changes
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Value for the `Authorization` header, if signed in
    pub fn authorization_header_value(&self) -> Option<String> {
        self.state.borrow().access_token().map(AccessToken::bearer)
    }

    /// Restore the persisted session at process start
    ///
    /// A non-expired access token is adopted without any network call. An
    /// expired or undecodable one triggers a single silent refresh; if that
    /// fails the session ends up `Anonymous` with storage cleared.
    pub async fn restore(&self) -> SessionStatus {
        self.state.send_replace(Session::restoring());
        info!("Restoring session");

        let stored = match self.read_stored().await {
            Ok(Some(credentials)) => credentials,
            Ok(None) => {
                info!("No stored session");
                return self.settle_restore(Session::anonymous());
            }
            Err(e) => {
                warn!("Failed to read stored session: {}", e);
                self.clear_storage().await;
                return self.settle_restore(Session::anonymous());
            }
        };

        if !stored.access_token.is_expired_at(Utc::now()) {
            info!("Restored session for user: {}", stored.username);
            return self.settle_restore(Session::authenticated(stored));
        }

        info!("Stored access token expired, refreshing");
        self.refresh(stored, Session::restoring()).await
    }

    /// Refresh the in-memory access token if it has expired
    ///
    /// Nothing refreshes in the background; long-running callers invoke this
    /// before authenticated work.
    pub async fn revalidate(&self) -> SessionStatus {
        let current = self.snapshot();
        let Some(credentials) = current.credentials().cloned() else {
            return current.status();
        };

        if !credentials.access_token.is_expired_at(Utc::now()) {
            return current.status();
        }

        info!("Access token expired, refreshing");
        self.refresh(credentials, current).await
    }

    /// Adopt freshly issued credentials
    ///
    /// This is a local state assignment and always succeeds. Persistence
    /// failures are logged; the in-memory session is still updated.
    pub async fn login(
        &self,
        username: impl Into<String>,
        access_token: AccessToken,
        refresh_token: RefreshToken,
    ) {
        let credentials = Credentials {
            username: username.into(),
            access_token,
            refresh_token,
        };
        info!("Logging in user: {}", credentials.username);

        self.state
            .send_replace(Session::authenticated(credentials.clone()));

        if let Err(e) = self.persist(&credentials).await {
            error!("Failed to persist session: {}", e);
        }
    }

    /// Drop the session from memory and storage
    pub async fn logout(&self) {
        info!("Logging out");
        self.state.send_replace(Session::anonymous());
        self.clear_storage().await;
    }

    /// Exchange the refresh token, then log in or out depending on the outcome.
    ///
    /// `before` is the session as it was when the refresh started. If a login
    /// or logout lands while the request is in flight, the result is dropped.
    async fn refresh(&self, stored: Credentials, before: Session) -> SessionStatus {
        let result = self.refresher.refresh(&stored.refresh_token).await;

        if *self.state.borrow() != before {
            info!("Session changed during refresh, discarding result");
            return self.status();
        }

        match result {
            Ok(tokens) => {
                let refresh_token = tokens.refresh.unwrap_or(stored.refresh_token);
                self.login(stored.username, tokens.access, refresh_token)
                    .await;
            }
            Err(e) => {
                warn!("Token refresh failed: {}", e);
                self.logout().await;
            }
        }
        self.status()
    }

    fn settle_restore(&self, session: Session) -> SessionStatus {
        let status = session.status();
        self.state.send_if_modified(|current| {
            // A login or logout during restore wins.
            if current.status() != SessionStatus::Restoring {
                return false;
            }
            *current = session;
            true
        });
        if self.status() != status {
            info!("Session changed during restore, keeping newer state");
        }
        self.status()
    }

    async fn read_stored(&self) -> StorageResult<Option<Credentials>> {
        let access = self.store.get(ACCESS_TOKEN_KEY).await?;
        let refresh = self.store.get(REFRESH_TOKEN_KEY).await?;
        let username = self.store.get(USERNAME_KEY).await?;

        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
        match (non_empty(access), non_empty(refresh), non_empty(username)) {
            (Some(access), Some(refresh), Some(username)) => Ok(Some(Credentials {
                username,
                access_token: AccessToken::new(access),
                refresh_token: RefreshToken::new(refresh),
            })),
            (None, None, None) => Ok(None),
            _ => {
                warn!("Stored session is incomplete, discarding it");
                self.clear_storage().await;
                Ok(None)
            }
        }
    }

    async fn persist(&self, credentials: &Credentials) -> StorageResult<()> {
        self.store
            .set(ACCESS_TOKEN_KEY, credentials.access_token.as_str())
            .await?;
        self.store
            .set(REFRESH_TOKEN_KEY, credentials.refresh_token.as_str())
            .await?;
        self.store.set(USERNAME_KEY, &credentials.username).await?;
        Ok(())
    }

    async fn clear_storage(&self) {
        for key in SESSION_KEYS {
            if let Err(e) = self.store.delete(key).await {
                error!("Failed to delete {} from storage: {}", key, e);
            }
        }
    }
}
