//! Server configuration for `SecureAuth`.
//!
//! Loaded from `SECUREAUTH_*` environment variables with defaults suitable
//! for local development.

use std::net::SocketAddr;
use std::time::Duration;

use secureauth_core::attempt_log::DEFAULT_CAPACITY;
use secureauth_core::auth::DEFAULT_DELAY;

const DEFAULT_PORT: u16 = 8300;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// Where sessions and the attempt log are kept.
    pub storage_backend: StorageBackendType,
    /// Log filter used when `RUST_LOG` is not set.
    pub log_level: String,
    /// Artificial latency of the mock sign-in.
    pub auth_delay: Duration,
    /// How many redirect attempts to retain.
    pub attempt_log_capacity: usize,
    /// Public base URL, used for sample links in the docs.
    pub public_url: String,
}

/// Supported storage backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackendType {
    /// In-memory, lost on restart.
    Memory,
    /// A redb file at `path`.
    Redb { path: String },
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// - `SECUREAUTH_BIND_ADDR`: full bind address (default `127.0.0.1:8300`)
    /// - `PORT`: port on `0.0.0.0`, used when `SECUREAUTH_BIND_ADDR` is unset
    /// - `SECUREAUTH_STORAGE`: `memory` or `redb` (default `memory`)
    /// - `SECUREAUTH_STORAGE_PATH`: redb file (default `./data/secureauth.redb`)
    /// - `SECUREAUTH_LOG_LEVEL`: log filter (default `info`)
    /// - `SECUREAUTH_AUTH_DELAY_MS`: mock sign-in delay (default `2000`)
    /// - `SECUREAUTH_ATTEMPT_LOG_CAPACITY`: retained attempts (default `100`)
    /// - `SECUREAUTH_PUBLIC_URL`: public base URL (default `https://secureauth.ir`)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    #[must_use]
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let bind_addr = if let Some(addr) = var("SECUREAUTH_BIND_ADDR") {
            addr.parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)))
        } else if let Some(port) = var("PORT") {
            SocketAddr::from(([0, 0, 0, 0], port.parse().unwrap_or(DEFAULT_PORT)))
        } else {
            SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT))
        };

        let storage_backend = match var("SECUREAUTH_STORAGE")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "redb" => StorageBackendType::Redb {
                path: var("SECUREAUTH_STORAGE_PATH")
                    .unwrap_or_else(|| "./data/secureauth.redb".to_owned()),
            },
            _ => StorageBackendType::Memory,
        };

        let auth_delay = var("SECUREAUTH_AUTH_DELAY_MS")
            .and_then(|v| v.parse().ok())
            .map_or(DEFAULT_DELAY, Duration::from_millis);

        let attempt_log_capacity = var("SECUREAUTH_ATTEMPT_LOG_CAPACITY")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_CAPACITY);

        Self {
            bind_addr,
            storage_backend,
            log_level: var("SECUREAUTH_LOG_LEVEL").unwrap_or_else(|| "info".to_owned()),
            auth_delay,
            attempt_log_capacity,
            public_url: var("SECUREAUTH_PUBLIC_URL")
                .unwrap_or_else(|| "https://secureauth.ir".to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]);
        assert_eq!(cfg.bind_addr, SocketAddr::from(([127, 0, 0, 1], 8300)));
        assert_eq!(cfg.storage_backend, StorageBackendType::Memory);
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.auth_delay, Duration::from_secs(2));
        assert_eq!(cfg.attempt_log_capacity, 100);
        assert_eq!(cfg.public_url, "https://secureauth.ir");
    }

    #[test]
    fn port_binds_all_interfaces_unless_addr_given() {
        let cfg = config(&[("PORT", "9000")]);
        assert_eq!(cfg.bind_addr, SocketAddr::from(([0, 0, 0, 0], 9000)));

        let cfg = config(&[("PORT", "9000"), ("SECUREAUTH_BIND_ADDR", "127.0.0.1:7000")]);
        assert_eq!(cfg.bind_addr, SocketAddr::from(([127, 0, 0, 1], 7000)));
    }

    #[test]
    fn redb_storage_and_tuning() {
        let cfg = config(&[
            ("SECUREAUTH_STORAGE", "REDB"),
            ("SECUREAUTH_STORAGE_PATH", "/tmp/sa.redb"),
            ("SECUREAUTH_AUTH_DELAY_MS", "0"),
            ("SECUREAUTH_ATTEMPT_LOG_CAPACITY", "10"),
        ]);
        assert_eq!(
            cfg.storage_backend,
            StorageBackendType::Redb {
                path: "/tmp/sa.redb".to_owned()
            }
        );
        assert_eq!(cfg.auth_delay, Duration::ZERO);
        assert_eq!(cfg.attempt_log_capacity, 10);
    }

    #[test]
    fn garbage_values_fall_back() {
        let cfg = config(&[
            ("SECUREAUTH_BIND_ADDR", "nowhere"),
            ("SECUREAUTH_AUTH_DELAY_MS", "soon"),
            ("SECUREAUTH_STORAGE", "rocks"),
        ]);
        assert_eq!(cfg.bind_addr.port(), 8300);
        assert_eq!(cfg.auth_delay, Duration::from_secs(2));
        assert_eq!(cfg.storage_backend, StorageBackendType::Memory);
    }
}
