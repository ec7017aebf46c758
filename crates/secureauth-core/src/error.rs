//! Error types for `secureauth-core`.
//!
//! Redirect validation has no error type: invalid input produces an invalid
//! [`Verdict`](crate::redirect::Verdict), never an `Err`. The types below
//! cover the storage-backed collaborators and the link helpers.

use secureauth_storage::StorageError;

use crate::auth::FormErrors;

/// Errors from the redirect attempt log.
#[derive(Debug, thiserror::Error)]
pub enum AttemptLogError {
    /// The stored log could not be encoded or decoded.
    #[error("attempt log serialization failed: {reason}")]
    Serialization { reason: String },

    /// The storage backend failed.
    #[error("attempt log storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Errors from the session store.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The stored session could not be encoded or decoded.
    #[error("session serialization failed: {reason}")]
    Serialization { reason: String },

    /// The storage backend failed.
    #[error("session storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Errors from the mocked sign-in flow.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// One or more form fields were rejected. Nothing was persisted.
    #[error("invalid form: {0}")]
    InvalidForm(FormErrors),

    /// Anything that went wrong after the form was accepted. The cause is
    /// logged, never shown.
    #[error("authentication failed, please try again")]
    Failed,
}

/// Errors from building integration links.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// A required redirect parameter was missing or empty.
    #[error("{field} is required to build a redirect link")]
    MissingRequired { field: &'static str },

    /// The base URL or website could not be parsed as a URL.
    #[error("invalid url '{input}': {reason}")]
    InvalidUrl { input: String, reason: String },
}
