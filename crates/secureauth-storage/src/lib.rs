//! Local key-value storage for `SecureAuth`.
//!
//! The front-end keeps two things on the visitor's side: the current session
//! record and a bounded history of redirect attempts. Both are plain values
//! under fixed keys, so the only abstraction needed is the [`StorageBackend`]
//! trait defined here.
//!
//! Two implementations are provided:
//!
//! - [`MemoryBackend`]: non-persistent, the default for development and tests
//! - [`RedbBackend`]: a single redb file on disk (feature `redb-backend`)

mod error;
mod memory;
#[cfg(feature = "redb-backend")]
mod redb_backend;

pub use error::StorageError;
pub use memory::MemoryBackend;
#[cfg(feature = "redb-backend")]
pub use redb_backend::RedbBackend;

/// A pluggable key-value store.
///
/// Keys are short UTF-8 names (`authUser`, `redirectLogs`). Values are opaque
/// bytes; callers decide the encoding (JSON everywhere in this workspace).
///
/// Implementations must be safe to share across async tasks (`Send + Sync`).
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync + 'static {
    /// Fetch the value stored under `key`, or `None` if it was never written.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the backend fails.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Store `value` under `key`, replacing whatever was there.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] if the backend fails.
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Delete`] if the backend fails.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}
