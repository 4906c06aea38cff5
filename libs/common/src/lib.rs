//! Common library for the Facts client
//!
//! This crate provides shared functionality used by the client crates,
//! including durable key-value storage, error handling and configuration.
//!
//! ```rust,no_run
//! use common::{ClientConfig, KeyValueStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::from_env()?;
//!     let store = config.open_store()?;
//!     let is_healthy = store.health_check().await?;
//!     println!("Storage health check: {}", is_healthy);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod storage;

pub use crate::config::{ClientConfig, StorageBackend};
pub use error::{StorageError, StorageResult};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
