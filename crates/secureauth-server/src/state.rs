//! Shared application state for the `SecureAuth` server.
//!
//! Built once at startup and shared across handlers via `Arc`.

use std::sync::Arc;

use secureauth_core::attempt_log::{AttemptLog, StoredAttemptLog};
use secureauth_core::auth::MockAuthenticator;
use secureauth_core::link::IncomingLink;
use secureauth_core::session::SessionStore;
use secureauth_storage::StorageBackend;

use crate::config::ServerConfig;

/// State passed to every HTTP handler.
pub struct AppState {
    /// Sink for redirect attempts.
    pub attempt_log: Arc<dyn AttemptLog>,
    /// Mock sign-in flow; also owns the session store.
    pub authenticator: MockAuthenticator,
    /// Builder for sample `/incoming` links shown in the docs.
    pub links: IncomingLink,
}

impl AppState {
    /// Wire the collaborators over one storage backend.
    ///
    /// # Errors
    ///
    /// Returns an error if `config.public_url` is not an absolute URL.
    pub fn new(
        storage: Arc<dyn StorageBackend>,
        config: &ServerConfig,
    ) -> anyhow::Result<Self> {
        let attempt_log = Arc::new(StoredAttemptLog::with_capacity(
            Arc::clone(&storage),
            config.attempt_log_capacity,
        ));
        let authenticator =
            MockAuthenticator::with_delay(SessionStore::new(storage), config.auth_delay);
        let links = IncomingLink::new(&config.public_url)?;

        Ok(Self {
            attempt_log,
            authenticator,
            links,
        })
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        self.authenticator.sessions()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
