//! Durable key-value storage for client-side state
//!
//! The session layer persists its credentials through the [`KeyValueStore`]
//! trait so it never depends on a particular backend. Two local backends live
//! here; the Redis backend lives in [`crate::cache`].

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};

/// String-keyed, string-valued persistence surface.
///
/// No transactional guarantees are assumed: each call stands on its own.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Set a key-value pair, replacing any previous value
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete a key. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check if the backend is usable
    async fn health_check(&self) -> StorageResult<bool>;
}

/// Process-local store, lost when the process exits
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Create an empty memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the store holds no keys
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<bool> {
        Ok(true)
    }
}

/// Store backed by a single JSON object file on disk
///
/// A missing file reads as an empty store. Every write rewrites the whole
/// file through a temporary sibling and a rename, so a crash mid-write
/// leaves the previous contents intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Arc<Mutex<()>>,
}

impl FileStore {
    /// Create a file store at the given path. The file is created lazily.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        info!("File store using {}", path.display());
        Self {
            path,
            lock: Arc::new(Mutex::new(())),
        }
    }

    async fn load(&self) -> StorageResult<HashMap<String, String>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(HashMap::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(StorageError::Corrupt),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, entries: &HashMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let bytes = serde_json::to_vec_pretty(entries).map_err(StorageError::Corrupt)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!("Wrote {} keys to {}", entries.len(), self.path.display());
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        if entries.remove(key).is_some() {
            self.save(&entries).await?;
        }
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<bool> {
        let _guard = self.lock.lock().await;
        self.load().await.map(|_| true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_set_get_delete() -> StorageResult<()> {
        let store = MemoryStore::new();

        store.set("username", "ada").await?;
        assert_eq!(store.get("username").await?, Some("ada".to_string()));

        store.set("username", "grace").await?;
        assert_eq!(store.get("username").await?, Some("grace".to_string()));

        store.delete("username").await?;
        assert_eq!(store.get("username").await?, None);

        // Deleting twice is fine
        store.delete("username").await?;
        assert!(store.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn test_file_store_survives_reopen() -> StorageResult<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("session.json");

        let store = FileStore::new(&path);
        assert_eq!(store.get("accessToken").await?, None);
        store.set("accessToken", "abc").await?;
        store.set("username", "ada").await?;
        drop(store);

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("accessToken").await?, Some("abc".to_string()));
        assert_eq!(reopened.get("username").await?, Some("ada".to_string()));

        reopened.delete("accessToken").await?;
        assert_eq!(reopened.get("accessToken").await?, None);
        assert!(reopened.health_check().await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_file_store_reports_corrupt_file() -> StorageResult<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, b"{not json").await?;

        let store = FileStore::new(&path);
        let err = store.get("username").await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupt(_)));
        Ok(())
    }
}
