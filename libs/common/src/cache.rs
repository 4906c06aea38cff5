//! Redis-backed key-value store
//!
//! This module provides a [`KeyValueStore`] that keeps client state in Redis,
//! for setups where several client processes share one session.

use async_trait::async_trait;
use redis::{AsyncCommands, Client};
use tracing::info;

use crate::error::{StorageError, StorageResult};
use crate::storage::KeyValueStore;

/// Configuration for Redis connection
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379")
    pub url: String,
    /// Prefix prepended to every key
    pub key_prefix: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            key_prefix: "facts:".to_string(),
        }
    }
}

/// Redis key-value store
pub struct RedisStore {
    client: Client,
    key_prefix: String,
}

impl RedisStore {
    /// Initialize a new Redis store
    pub fn new(config: &RedisConfig) -> StorageResult<Self> {
        let client = Client::open(config.url.clone()).map_err(StorageError::Connection)?;
        info!("Redis client initialized with URL: {}", config.url);
        Ok(RedisStore {
            client,
            key_prefix: config.key_prefix.clone(),
        })
    }

    /// Get a connection from the client
    async fn get_connection(&self) -> StorageResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(StorageError::Connection)
    }

    fn prefixed(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let mut conn = self.get_connection().await?;
        conn.get(self.prefixed(key))
            .await
            .map_err(StorageError::Command)
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut conn = self.get_connection().await?;
        let _: () = conn
            .set(self.prefixed(key), value)
            .await
            .map_err(StorageError::Command)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let mut conn = self.get_connection().await?;
        let _: u64 = conn
            .del(self.prefixed(key))
            .await
            .map_err(StorageError::Command)?;
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<bool> {
        let mut conn = self.get_connection().await?;
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(StorageError::Command)?;
        Ok(pong == "PONG")
    }
}
