//! File-backed storage using redb.
//!
//! A single-file, pure-Rust store for deployments that want sessions and the
//! attempt log to survive a restart. Feature-gated behind `redb-backend`.
//!
//! redb calls block, so every operation is shipped to the Tokio blocking pool.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use redb::{Database, ReadOnlyTable, ReadableTable, Table, TableDefinition};

use crate::{StorageBackend, StorageError};

const ENTRIES: TableDefinition<&str, &[u8]> = TableDefinition::new("entries");

type ReadTable = ReadOnlyTable<&'static str, &'static [u8]>;
type WriteTable<'txn> = Table<'txn, &'static str, &'static [u8]>;

/// A storage backend persisted to one redb file.
///
/// # Examples
///
/// ```no_run
/// # use secureauth_storage::RedbBackend;
/// let store = RedbBackend::open("./data/secureauth.redb").unwrap();
/// ```
#[derive(Clone)]
pub struct RedbBackend {
    db: Arc<Database>,
    path: PathBuf,
}

impl std::fmt::Debug for RedbBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbBackend")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl RedbBackend {
    /// Open the database at `path`, creating the file and table if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the file cannot be opened, or
    /// [`StorageError::Transaction`] if the table cannot be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let db = Database::create(path).map_err(|e| StorageError::Open {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        write_txn(&db, |_| Ok(()))?;
        tracing::debug!(path = %path.display(), "redb store opened");

        Ok(Self {
            db: Arc::new(db),
            path: path.to_path_buf(),
        })
    }

    /// Location of the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T, StorageError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || op(&db))
            .await
            .map_err(|e| StorageError::Transaction {
                reason: format!("blocking task failed: {e}"),
            })?
    }
}

fn txn_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Transaction {
        reason: e.to_string(),
    }
}

fn read_txn<T>(
    db: &Database,
    op: impl FnOnce(&ReadTable) -> Result<T, StorageError>,
) -> Result<T, StorageError> {
    let txn = db.begin_read().map_err(txn_error)?;
    let table = txn.open_table(ENTRIES).map_err(txn_error)?;
    op(&table)
}

fn write_txn<T>(
    db: &Database,
    op: impl FnOnce(&mut WriteTable<'_>) -> Result<T, StorageError>,
) -> Result<T, StorageError> {
    let txn = db.begin_write().map_err(txn_error)?;
    let out = {
        let mut table = txn.open_table(ENTRIES).map_err(txn_error)?;
        op(&mut table)?
    };
    txn.commit().map_err(txn_error)?;
    Ok(out)
}

#[async_trait::async_trait]
impl StorageBackend for RedbBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let key = key.to_owned();
        self.blocking(move |db| {
            read_txn(db, |table| {
                let found = table.get(key.as_str()).map_err(|e| StorageError::Read {
                    key: key.clone(),
                    reason: e.to_string(),
                })?;
                Ok(found.map(|v| v.value().to_vec()))
            })
        })
        .await
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let key = key.to_owned();
        let value = value.to_vec();
        self.blocking(move |db| {
            write_txn(db, |table| {
                table
                    .insert(key.as_str(), value.as_slice())
                    .map_err(|e| StorageError::Write {
                        key: key.clone(),
                        reason: e.to_string(),
                    })?;
                Ok(())
            })
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let key = key.to_owned();
        self.blocking(move |db| {
            write_txn(db, |table| {
                table
                    .remove(key.as_str())
                    .map_err(|e| StorageError::Delete {
                        key: key.clone(),
                        reason: e.to_string(),
                    })?;
                Ok(())
            })
        })
        .await
    }
}
