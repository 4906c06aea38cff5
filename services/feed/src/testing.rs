//! Shared fixtures for unit tests

use auth::api::http_client;
use auth::{AccessToken, RefreshToken, SessionManager, TokenApi};
use common::MemoryStore;
use std::sync::Arc;
use std::time::Duration;
use wiremock::MockServer;

use crate::api::FeedApi;

pub(crate) fn feed_api(server: &MockServer) -> FeedApi {
    FeedApi::new(http_client(Duration::from_secs(5)).unwrap(), server.uri())
}

/// Session that has not been restored yet
pub(crate) fn uninitialized_session(server: &MockServer) -> SessionManager {
    let tokens = TokenApi::new(http_client(Duration::from_secs(5)).unwrap(), server.uri());
    SessionManager::new(Arc::new(MemoryStore::new()), Arc::new(tokens))
}

/// Session holding the bearer `access-token`
pub(crate) async fn signed_in_session(server: &MockServer) -> SessionManager {
    let session = uninitialized_session(server);
    session
        .login(
            "ada",
            AccessToken::new("access-token"),
            RefreshToken::new("refresh-token"),
        )
        .await;
    session
}

/// Restored session with nothing stored
pub(crate) async fn anonymous_session(server: &MockServer) -> SessionManager {
    let session = uninitialized_session(server);
    session.restore().await;
    session
}
