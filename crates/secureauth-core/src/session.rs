//! Single-slot session store.
//!
//! The signed-in user is kept as one JSON document under [`SESSION_KEY`].
//! Signing in again overwrites it; there is no multi-user bookkeeping.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use secureauth_storage::StorageBackend;

use crate::error::SessionError;

/// Storage key holding the current session.
pub const SESSION_KEY: &str = "authUser";

/// The signed-in user as persisted after a (mock) login or signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub email: String,
    pub name: String,
    pub family: String,
    /// Opaque session token.
    pub token: String,
    /// Only issued on signup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl UserRecord {
    /// `"name family"`, or whichever half is non-empty.
    #[must_use]
    pub fn display_name(&self) -> String {
        match (self.name.is_empty(), self.family.is_empty()) {
            (false, false) => format!("{} {}", self.name, self.family),
            (false, true) => self.name.clone(),
            (true, _) => self.family.clone(),
        }
    }
}

/// Persists the current [`UserRecord`].
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn StorageBackend>,
}

impl SessionStore {
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    /// Replace the current session with `user`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if encoding or the write fails.
    pub async fn persist(&self, user: &UserRecord) -> Result<(), SessionError> {
        let bytes = serde_json::to_vec(user).map_err(|e| SessionError::Serialization {
            reason: e.to_string(),
        })?;
        self.storage.put(SESSION_KEY, &bytes).await?;
        Ok(())
    }

    /// The current session, if any.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the read fails or the stored document is
    /// not a valid [`UserRecord`].
    pub async fn load(&self) -> Result<Option<UserRecord>, SessionError> {
        let Some(bytes) = self.storage.get(SESSION_KEY).await? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| SessionError::Serialization {
                reason: e.to_string(),
            })
    }

    /// Sign out. Clearing an empty store succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Storage`] if the delete fails.
    pub async fn clear(&self) -> Result<(), SessionError> {
        self.storage.delete(SESSION_KEY).await?;
        Ok(())
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}
