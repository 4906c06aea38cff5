//! Session model and related functionality

use crate::jwt::{AccessToken, RefreshToken};

/// Lifecycle state of the client session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// Process started, `restore` has not run yet
    #[default]
    Uninitialized,
    /// Persisted credentials are being checked. Consumers must neither prompt
    /// for a login nor start authenticated actions while in this state.
    Restoring,
    Authenticated,
    Anonymous,
}

/// Credentials of the signed-in user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
}

/// Session snapshot
///
/// Credentials are held if and only if the status is `Authenticated`, so an
/// access token never exists without its username or the other way round.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    status: SessionStatus,
    credentials: Option<Credentials>,
}

impl Session {
    pub fn uninitialized() -> Self {
        Self::default()
    }

    pub fn restoring() -> Self {
        Self {
            status: SessionStatus::Restoring,
            credentials: None,
        }
    }

    pub fn anonymous() -> Self {
        Self {
            status: SessionStatus::Anonymous,
            credentials: None,
        }
    }

    pub fn authenticated(credentials: Credentials) -> Self {
        Self {
            status: SessionStatus::Authenticated,
            credentials: Some(credentials),
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn username(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.username.as_str())
    }

    pub fn access_token(&self) -> Option<&AccessToken> {
        self.credentials.as_ref().map(|c| &c.access_token)
    }

    pub fn refresh_token(&self) -> Option<&RefreshToken> {
        self.credentials.as_ref().map(|c| &c.refresh_token)
    }
}
