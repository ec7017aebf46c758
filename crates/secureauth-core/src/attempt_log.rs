//! Bounded history of redirect validation attempts.
//!
//! Every time the landing page computes a [`Verdict`], the caller appends an
//! [`AttemptRecord`] here. The validator itself never logs; recording is the
//! caller's side effect, injected through the [`AttemptLog`] trait.
//!
//! [`StoredAttemptLog`] keeps the whole history as one JSON array under the
//! fixed storage key [`ATTEMPT_LOG_KEY`] and drops the oldest entries once
//! it holds more than its capacity (100 by default).
//!
//! # Thread safety
//!
//! An append is a read-modify-write of a single value, so appends are
//! serialized with a `tokio::sync::Mutex`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use secureauth_storage::StorageBackend;

use crate::error::AttemptLogError;
use crate::redirect::{RedirectParams, Verdict};

/// Storage key holding the attempt history.
pub const ATTEMPT_LOG_KEY: &str = "redirectLogs";

/// Number of attempts kept when no capacity is given.
pub const DEFAULT_CAPACITY: usize = 100;

/// One recorded redirect attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    pub timestamp: DateTime<Utc>,
    /// The raw parameters as reported in the verdict.
    #[serde(flatten)]
    pub params: RedirectParams,
    pub is_valid: bool,
    #[serde(default)]
    pub user_agent: String,
    #[serde(default)]
    pub referrer: String,
}

impl AttemptRecord {
    /// Build a record for `verdict` observed at `timestamp`.
    #[must_use]
    pub fn from_verdict(
        verdict: &Verdict,
        timestamp: DateTime<Utc>,
        user_agent: impl Into<String>,
        referrer: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            params: verdict.data.clone(),
            is_valid: verdict.is_valid,
            user_agent: user_agent.into(),
            referrer: referrer.into(),
        }
    }
}

/// Sink for redirect attempts.
#[async_trait::async_trait]
pub trait AttemptLog: Send + Sync {
    /// Record one attempt.
    ///
    /// # Errors
    ///
    /// Returns an error if the attempt could not be persisted.
    async fn append(&self, record: AttemptRecord) -> Result<(), AttemptLogError>;

    /// The retained attempts, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the history could not be read.
    async fn recent(&self) -> Result<Vec<AttemptRecord>, AttemptLogError>;
}

/// [`AttemptLog`] kept in a [`StorageBackend`] as a capped JSON array.
pub struct StoredAttemptLog {
    storage: Arc<dyn StorageBackend>,
    capacity: usize,
    append_lock: Mutex<()>,
}

impl StoredAttemptLog {
    /// Log with the default capacity of [`DEFAULT_CAPACITY`] entries.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self::with_capacity(storage, DEFAULT_CAPACITY)
    }

    /// Log keeping at most `capacity` entries (at least one).
    #[must_use]
    pub fn with_capacity(storage: Arc<dyn StorageBackend>, capacity: usize) -> Self {
        Self {
            storage,
            capacity: capacity.max(1),
            append_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    async fn load(&self) -> Result<Vec<AttemptRecord>, AttemptLogError> {
        match self.storage.get(ATTEMPT_LOG_KEY).await? {
            None => Ok(Vec::new()),
            Some(bytes) => {
                serde_json::from_slice(&bytes).map_err(|e| AttemptLogError::Serialization {
                    reason: e.to_string(),
                })
            }
        }
    }
}

#[async_trait::async_trait]
impl AttemptLog for StoredAttemptLog {
    async fn append(&self, record: AttemptRecord) -> Result<(), AttemptLogError> {
        let _guard = self.append_lock.lock().await;

        let mut records = self.load().await?;
        records.push(record);
        let overflow = records.len().saturating_sub(self.capacity);
        if overflow > 0 {
            records.drain(..overflow);
        }

        let bytes = serde_json::to_vec(&records).map_err(|e| AttemptLogError::Serialization {
            reason: e.to_string(),
        })?;
        self.storage.put(ATTEMPT_LOG_KEY, &bytes).await?;

        debug!(retained = records.len(), dropped = overflow, "redirect attempt recorded");
        Ok(())
    }

    async fn recent(&self) -> Result<Vec<AttemptRecord>, AttemptLogError> {
        self.load().await
    }
}

impl std::fmt::Debug for StoredAttemptLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredAttemptLog")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::TimeZone;
    use secureauth_storage::MemoryBackend;

    use super::*;
    use crate::redirect::validate;

    fn record(n: u32) -> AttemptRecord {
        let verdict = validate(&RedirectParams {
            role: Some("visitor".to_owned()),
            website: Some("example.com".to_owned()),
            name: Some(format!("visitor-{n}")),
            family: None,
        });
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::seconds(n.into());
        AttemptRecord::from_verdict(&verdict, at, "test-agent", "https://partner.example.com/")
    }

    #[tokio::test]
    async fn empty_log_has_no_records() {
        let log = StoredAttemptLog::new(Arc::new(MemoryBackend::new()));
        assert!(log.recent().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn keeps_only_most_recent_entries() {
        let log = StoredAttemptLog::with_capacity(Arc::new(MemoryBackend::new()), 3);
        for n in 0..5 {
            log.append(record(n)).await.unwrap();
        }

        let names: Vec<_> = log
            .recent()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.params.name.unwrap())
            .collect();
        assert_eq!(names, vec!["visitor-2", "visitor-3", "visitor-4"]);
    }

    #[tokio::test]
    async fn default_capacity_is_one_hundred() {
        let log = StoredAttemptLog::new(Arc::new(MemoryBackend::new()));
        for n in 0..105 {
            log.append(record(n)).await.unwrap();
        }
        let records = log.recent().await.unwrap();
        assert_eq!(records.len(), DEFAULT_CAPACITY);
        assert_eq!(records[0].params.name.as_deref(), Some("visitor-5"));
    }

    #[tokio::test]
    async fn zero_capacity_keeps_latest() {
        let log = StoredAttemptLog::with_capacity(Arc::new(MemoryBackend::new()), 0);
        assert_eq!(log.capacity(), 1);
        log.append(record(1)).await.unwrap();
        log.append(record(2)).await.unwrap();
        assert_eq!(log.recent().await.unwrap(), vec![record(2)]);
    }

    #[tokio::test]
    async fn stored_format_is_flat_camel_case() {
        let storage = Arc::new(MemoryBackend::new());
        let log = StoredAttemptLog::new(storage.clone());
        log.append(record(0)).await.unwrap();

        let raw = storage.get(ATTEMPT_LOG_KEY).await.unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        let entry = &json[0];
        assert_eq!(entry["role"], "visitor");
        assert_eq!(entry["website"], "example.com");
        assert_eq!(entry["isValid"], true);
        assert_eq!(entry["userAgent"], "test-agent");
        assert_eq!(entry["referrer"], "https://partner.example.com/");
        assert!(entry.get("family").is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_are_all_kept() {
        let log = Arc::new(StoredAttemptLog::new(Arc::new(MemoryBackend::new())));
        let tasks: Vec<_> = (0..50)
            .map(|n| {
                let log = Arc::clone(&log);
                tokio::spawn(async move { log.append(record(n)).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let mut names: Vec<_> = log
            .recent()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.params.name.unwrap())
            .collect();
        assert_eq!(names.len(), 50);
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 50);
    }

    #[tokio::test]
    async fn corrupted_history_is_reported() {
        let storage = Arc::new(MemoryBackend::new());
        storage.put(ATTEMPT_LOG_KEY, b"not json").await.unwrap();
        let log = StoredAttemptLog::new(storage);
        assert!(matches!(
            log.append(record(0)).await,
            Err(AttemptLogError::Serialization { .. })
        ));
    }
}
