//! Client configuration
//!
//! Settings are read with the `config` crate: built-in defaults first, then
//! environment variables prefixed with `FACTS_`.

use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

use crate::cache::{RedisConfig, RedisStore};
use crate::error::StorageResult;
use crate::storage::{FileStore, KeyValueStore, MemoryStore};

/// Which backend persists the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// JSON file on local disk
    File,
    /// Redis server
    Redis,
    /// In-process only, nothing survives a restart
    Memory,
}

/// Client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the facts API (e.g., "http://127.0.0.1:8000")
    pub api_base_url: String,
    /// Timeout applied to every API request, in seconds
    pub request_timeout_secs: u64,
    /// Storage backend for the persisted session
    pub storage_backend: StorageBackend,
    /// Session file used by the `file` backend
    pub storage_path: PathBuf,
    /// Redis connection URL used by the `redis` backend
    pub redis_url: String,
    /// Key prefix used by the `redis` backend
    pub redis_prefix: String,
    /// Maximum log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl ClientConfig {
    /// Create a new ClientConfig from environment variables
    ///
    /// # Environment Variables
    /// - `FACTS_API_BASE_URL` (default: "http://127.0.0.1:8000")
    /// - `FACTS_REQUEST_TIMEOUT_SECS` (default: 15)
    /// - `FACTS_STORAGE_BACKEND`: file, redis or memory (default: file)
    /// - `FACTS_STORAGE_PATH` (default: ".facts/session.json")
    /// - `FACTS_REDIS_URL` (default: "redis://localhost:6379")
    /// - `FACTS_REDIS_PREFIX` (default: "facts:")
    /// - `FACTS_LOG_LEVEL` (default: "info")
    pub fn from_env() -> Result<Self, ConfigError> {
        let config: ClientConfig = Config::builder()
            .set_default("api_base_url", "http://127.0.0.1:8000")?
            .set_default("request_timeout_secs", 15)?
            .set_default("storage_backend", "file")?
            .set_default("storage_path", ".facts/session.json")?
            .set_default("redis_url", "redis://localhost:6379")?
            .set_default("redis_prefix", "facts:")?
            .set_default("log_level", "info")?
            .add_source(Environment::with_prefix("FACTS").try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::Message("api_base_url must not be empty".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "request_timeout_secs must be greater than zero".into(),
            ));
        }
        self.max_log_level()?;
        Ok(())
    }

    /// API base URL without a trailing slash
    pub fn api_base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    /// Request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Parsed maximum log level
    pub fn max_log_level(&self) -> Result<Level, ConfigError> {
        Level::from_str(&self.log_level)
            .map_err(|_| ConfigError::Message(format!("invalid log_level: {}", self.log_level)))
    }

    /// Redis settings for the `redis` backend
    pub fn redis_config(&self) -> RedisConfig {
        RedisConfig {
            url: self.redis_url.clone(),
            key_prefix: self.redis_prefix.clone(),
        }
    }

    /// Open the configured storage backend
    pub fn open_store(&self) -> StorageResult<Arc<dyn KeyValueStore>> {
        Ok(match self.storage_backend {
            StorageBackend::File => Arc::new(FileStore::new(&self.storage_path)),
            StorageBackend::Redis => Arc::new(RedisStore::new(&self.redis_config())?),
            StorageBackend::Memory => Arc::new(MemoryStore::new()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 4] = [
        "FACTS_API_BASE_URL",
        "FACTS_REQUEST_TIMEOUT_SECS",
        "FACTS_STORAGE_BACKEND",
        "FACTS_LOG_LEVEL",
    ];

    fn clear_env() {
        for var in VARS {
            // SAFETY: tests touching the environment are serialized
            unsafe { std::env::remove_var(var) };
        }
    }

    #[test]
    #[serial]
    fn test_client_config_defaults() {
        clear_env();

        let config = ClientConfig::from_env().expect("Failed to create client config");
        assert_eq!(config.api_base_url(), "http://127.0.0.1:8000");
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
        assert_eq!(config.storage_backend, StorageBackend::File);
        assert_eq!(config.storage_path, PathBuf::from(".facts/session.json"));
        assert_eq!(config.max_log_level().unwrap(), Level::INFO);
    }

    #[test]
    #[serial]
    fn test_client_config_from_env_overrides() {
        clear_env();
        unsafe {
            std::env::set_var("FACTS_API_BASE_URL", "https://facts.example.com/");
            std::env::set_var("FACTS_REQUEST_TIMEOUT_SECS", "3");
            std::env::set_var("FACTS_STORAGE_BACKEND", "memory");
        }

        let config = ClientConfig::from_env().expect("Failed to create client config");
        clear_env();

        assert_eq!(config.api_base_url(), "https://facts.example.com");
        assert_eq!(config.request_timeout_secs, 3);
        assert_eq!(config.storage_backend, StorageBackend::Memory);
    }

    #[test]
    #[serial]
    fn test_client_config_rejects_bad_values() {
        clear_env();
        unsafe { std::env::set_var("FACTS_LOG_LEVEL", "loud") };
        assert!(ClientConfig::from_env().is_err());

        clear_env();
        unsafe { std::env::set_var("FACTS_STORAGE_BACKEND", "floppy") };
        assert!(ClientConfig::from_env().is_err());
        clear_env();
    }
}
