//! Custom error types for the common library
//!
//! This module defines the error types shared by the storage backends.

use thiserror::Error;

/// Custom error type for key-value storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// The backend could not be reached
    #[error("Storage connection error: {0}")]
    Connection(#[source] redis::RedisError),

    /// A Redis command failed
    #[error("Storage command error: {0}")]
    Command(#[source] redis::RedisError),

    /// Reading or writing the backing file failed
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted data could not be parsed
    #[error("Storage data is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),
}

/// Type alias for Result with StorageError
pub type StorageResult<T> = Result<T, StorageError>;
