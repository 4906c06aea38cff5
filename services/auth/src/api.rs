//! HTTP client for the token endpoints of the facts API

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::jwt::{AccessToken, RefreshToken};

/// Errors raised while talking to the facts API
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced a response (connection, timeout, ...)
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("Server responded with {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The response body did not have the expected shape
    #[error("Invalid response body: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

/// Build the shared HTTP client with a request timeout
pub fn http_client(timeout: Duration) -> ApiResult<Client> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Turn a non-success response into [`ApiError::Status`]
pub async fn check_status(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status { status, body })
}

/// Request for a new token pair
#[derive(Serialize)]
struct ObtainTokenRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Response carrying a token pair
#[derive(Deserialize)]
struct TokenPairResponse {
    access: String,
    refresh: String,
}

/// Request for token refresh
#[derive(Serialize)]
struct RefreshTokenRequest<'a> {
    refresh: &'a str,
}

/// Response for token refresh
#[derive(Deserialize)]
struct RefreshTokenResponse {
    access: String,
    #[serde(default)]
    refresh: Option<String>,
}

/// Credentials issued by a successful password login
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: AccessToken,
    pub refresh: RefreshToken,
}

/// Credentials issued by a successful refresh
#[derive(Debug, Clone)]
pub struct RefreshedTokens {
    pub access: AccessToken,
    /// Present only when the server rotated the refresh token
    pub refresh: Option<RefreshToken>,
}

/// Exchanges a refresh token for a new access token
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &RefreshToken) -> ApiResult<RefreshedTokens>;
}

/// Client for `/api/accounts/token/` and `/api/accounts/token/refresh/`
#[derive(Debug, Clone)]
pub struct TokenApi {
    client: Client,
    base_url: String,
}

impl TokenApi {
    /// Create a new token API client
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Authenticate with a username and password
    pub async fn obtain(&self, username: &str, password: &str) -> ApiResult<TokenPair> {
        info!("Obtaining token pair for user: {}", username);

        let response = self
            .client
            .post(format!("{}/api/accounts/token/", self.base_url))
            .json(&ObtainTokenRequest { username, password })
            .send()
            .await?;
        let response = check_status(response).await?;

        let pair: TokenPairResponse = response.json().await.map_err(ApiError::Decode)?;
        Ok(TokenPair {
            access: AccessToken::new(pair.access),
            refresh: RefreshToken::new(pair.refresh),
        })
    }
}

#[async_trait]
impl TokenRefresher for TokenApi {
    async fn refresh(&self, refresh_token: &RefreshToken) -> ApiResult<RefreshedTokens> {
        debug!("Token refresh request");

        let response = self
            .client
            .post(format!("{}/api/accounts/token/refresh/", self.base_url))
            .json(&RefreshTokenRequest {
                refresh: refresh_token.as_str(),
            })
            .send()
            .await?;
        let response = check_status(response).await?;

        let tokens: RefreshTokenResponse = response.json().await.map_err(ApiError::Decode)?;
        Ok(RefreshedTokens {
            access: AccessToken::new(tokens.access),
            refresh: tokens.refresh.map(RefreshToken::new),
        })
    }
}
