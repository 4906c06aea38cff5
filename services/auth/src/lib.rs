//! Client-side authentication for the Facts client
//!
//! This crate owns the session lifecycle: persisted credentials, access-token
//! expiry detection, silent refresh, and login/logout transitions.
//!
//! ```rust,no_run
//! use auth::{SessionManager, TokenApi, api::http_client};
//! use common::ClientConfig;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::from_env()?;
//!     let client = http_client(config.request_timeout())?;
//!     let tokens = TokenApi::new(client, config.api_base_url());
//!     let session = SessionManager::new(config.open_store()?, Arc::new(tokens));
//!     println!("Session status: {:?}", session.restore().await);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod jwt;
pub mod models;
pub mod session;

pub use api::{ApiError, ApiResult, TokenApi, TokenRefresher};
pub use jwt::{AccessToken, RefreshToken};
pub use models::{Credentials, Session, SessionStatus};
pub use session::SessionManager;
