//! Custom error types for the feed client
//!
//! `Unauthenticated` and `Rejected` are meant to be shown to the user as is.

use auth::{ApiError, SessionManager, SessionStatus};
use thiserror::Error;

/// Custom error type for feed interactions
#[derive(Error, Debug)]
pub enum FeedError {
    /// No active session; nothing was sent
    #[error("Please log in to {action}!")]
    Unauthenticated { action: &'static str },

    /// The session is still being restored; nothing was sent
    #[error("Still checking your session, try again in a moment")]
    SessionNotReady,

    /// The server refused the change or could not be reached. Local state was
    /// rolled back.
    #[error("Could not {action}. Please try again.")]
    Rejected {
        action: &'static str,
        #[source]
        source: ApiError,
    },

    /// The request was cut short before it settled. Local state was rolled
    /// back.
    #[error("Could not {action}. Please try again.")]
    Interrupted { action: &'static str },

    /// Any other API failure
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

/// Type alias for feed results
pub type FeedResult<T> = Result<T, FeedError>;

/// Read the `Authorization` header value for an action that needs a session
///
/// The value is read at call time and never cached, so a logout is honored by
/// the very next request.
pub fn require_bearer(session: &SessionManager, action: &'static str) -> FeedResult<String> {
    match session.status() {
        SessionStatus::Uninitialized | SessionStatus::Restoring => Err(FeedError::SessionNotReady),
        SessionStatus::Anonymous => Err(FeedError::Unauthenticated { action }),
        SessionStatus::Authenticated => session
            .authorization_header_value()
            .ok_or(FeedError::Unauthenticated { action }),
    }
}
