//! Access and refresh token handling
//!
//! The client never holds a signing key, so it cannot validate tokens. It only
//! reads the `exp` claim of the access token to decide, without a network
//! round-trip, whether the token can still be used. A token whose claims
//! cannot be decoded is treated as expired.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Errors raised while reading token claims
#[derive(Error, Debug)]
pub enum TokenError {
    /// The token is not a decodable JWT or lacks an `exp` claim
    #[error("Malformed token: {0}")]
    Malformed(#[from] jsonwebtoken::errors::Error),

    /// The `exp` claim is not a representable timestamp
    #[error("Token expiry out of range: {0}")]
    ExpiryOutOfRange(i64),
}

/// Claims the client cares about
#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    /// Expiration time, seconds since the epoch
    exp: i64,
}

fn insecure_validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation
}

/// Decode the expiry of a JWT without verifying its signature
pub fn decode_expiry(token: &str) -> Result<DateTime<Utc>, TokenError> {
    let data = decode::<ExpiryClaims>(
        token,
        &DecodingKey::from_secret(&[]),
        &insecure_validation(),
    )?;
    let exp = data.claims.exp;
    DateTime::from_timestamp(exp, 0).ok_or(TokenError::ExpiryOutOfRange(exp))
}

/// Whether the token is expired at `now`. Undecodable tokens count as expired.
pub fn is_expired(token: &str, now: DateTime<Utc>) -> bool {
    match decode_expiry(token) {
        Ok(expires_at) => expires_at < now,
        Err(_) => true,
    }
}

/// Short-lived bearer credential
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        is_expired(&self.0, now)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Long-lived credential, only ever sent to the refresh endpoint
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshToken(String);

impl RefreshToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RefreshToken(***)")
    }
}
