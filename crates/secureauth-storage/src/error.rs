//! Storage error types.

/// Errors raised by a [`StorageBackend`](crate::StorageBackend).
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backing file could not be opened or created.
    #[error("failed to open storage at '{path}': {reason}")]
    Open { path: String, reason: String },

    /// Reading a key failed.
    #[error("failed to read key '{key}': {reason}")]
    Read { key: String, reason: String },

    /// Writing a key failed.
    #[error("failed to write key '{key}': {reason}")]
    Write { key: String, reason: String },

    /// Deleting a key failed.
    #[error("failed to delete key '{key}': {reason}")]
    Delete { key: String, reason: String },

    /// A transaction could not be started or committed.
    #[error("transaction failed: {reason}")]
    Transaction { reason: String },
}
