//! In-memory storage backend.
//!
//! Everything lives in a `BTreeMap` behind a `RwLock` and disappears with the
//! process, which matches the "nothing beyond the browser" persistence model
//! of the front-end closely enough for development servers and tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{StorageBackend, StorageError};

/// A non-persistent backend. Clones share the same map.
///
/// # Examples
///
/// ```
/// # use secureauth_storage::{MemoryBackend, StorageBackend};
/// # #[tokio::main]
/// # async fn main() -> Result<(), secureauth_storage::StorageError> {
/// let store = MemoryBackend::new();
/// store.put("authUser", b"{}").await?;
/// assert_eq!(store.get("authUser").await?, Some(b"{}".to_vec()));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryBackend {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl StorageBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.entries
            .write()
            .await
            .insert(key.to_owned(), value.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let store = MemoryBackend::new();
        assert_eq!(store.get("authUser").await.unwrap(), None);
    }

    #[tokio::test]
    async fn put_replaces_previous_value() {
        let store = MemoryBackend::new();
        store.put("authUser", b"first").await.unwrap();
        store.put("authUser", b"second").await.unwrap();
        assert_eq!(
            store.get("authUser").await.unwrap(),
            Some(b"second".to_vec())
        );
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryBackend::new();
        store.put("redirectLogs", b"[]").await.unwrap();
        store.delete("redirectLogs").await.unwrap();
        store.delete("redirectLogs").await.unwrap();
        assert_eq!(store.get("redirectLogs").await.unwrap(), None);
    }

    #[tokio::test]
    async fn clones_see_each_others_writes() {
        let store = MemoryBackend::new();
        let other = store.clone();
        store.put("authUser", b"x").await.unwrap();
        assert_eq!(other.get("authUser").await.unwrap(), Some(b"x".to_vec()));
    }
}
