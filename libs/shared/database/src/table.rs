use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::sync::{OwnedRwLockWriteGuard, RwLock, RwLockReadGuard};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::error::DatabaseError;

/// A value that can live in a [`Table`], addressed by its own key.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    fn key(&self) -> String;
}

/// A stored row together with its write version.
///
/// Versions start at 1 and grow by one on every committed write, which is what
/// optimistic writers compare against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Versioned<T> {
    pub version: u64,
    pub value: T,
}

type Rows<T> = BTreeMap<String, Versioned<T>>;

/// Ordered, versioned key-value table with optional JSON snapshot persistence.
///
/// Every access waits at most `timeout` for the table lock. Writes replace
/// whole rows. When a snapshot path is configured, the snapshot holding the
/// new row is renamed into place first and memory is updated only after that
/// succeeds. The commit runs on its own task, so a caller that is dropped or
/// times out never leaves memory and snapshot disagreeing.
///
/// Clones share the same rows.
#[derive(Clone)]
pub struct Table<T: Record> {
    name: String,
    rows: Arc<RwLock<Rows<T>>>,
    timeout: Duration,
    snapshot_path: Option<PathBuf>,
}

impl<T: Record> Table<T> {
    pub fn in_memory(name: impl Into<String>, timeout: Duration) -> Self {
        Self {
            name: name.into(),
            rows: Arc::new(RwLock::new(BTreeMap::new())),
            timeout,
            snapshot_path: None,
        }
    }

    /// Open a table backed by the snapshot at `path`, loading it if it exists.
    pub async fn open(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Result<Self, DatabaseError> {
        let name = name.into();
        let path = path.into();

        let rows = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let stored: Vec<Versioned<T>> = serde_json::from_slice(&bytes)?;
                stored
                    .into_iter()
                    .map(|row| (row.value.key(), row))
                    .collect::<Rows<T>>()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        info!("Opened table {} with {} rows from {}", name, rows.len(), path.display());

        Ok(Self {
            name,
            rows: Arc::new(RwLock::new(rows)),
            timeout,
            snapshot_path: Some(path),
        })
    }

    /// Persistent when a path is given, memory-only otherwise.
    pub async fn open_or_in_memory(
        name: impl Into<String>,
        path: Option<PathBuf>,
        timeout: Duration,
    ) -> Result<Self, DatabaseError> {
        match path {
            Some(path) => Self::open(name, path, timeout).await,
            None => Ok(Self::in_memory(name, timeout)),
        }
    }

    pub async fn get(&self, key: &str) -> Result<Option<Versioned<T>>, DatabaseError> {
        let rows = self.read().await?;
        Ok(rows.get(key).cloned())
    }

    pub async fn get_value(&self, key: &str) -> Result<Option<T>, DatabaseError> {
        Ok(self.get(key).await?.map(|row| row.value))
    }

    /// All rows matching `filter`, in key order.
    pub async fn scan<F>(&self, filter: F) -> Result<Vec<T>, DatabaseError>
    where
        F: Fn(&T) -> bool + Send,
    {
        let rows = self.read().await?;
        Ok(rows
            .values()
            .filter(|row| filter(&row.value))
            .map(|row| row.value.clone())
            .collect())
    }

    pub async fn len(&self) -> Result<usize, DatabaseError> {
        Ok(self.read().await?.len())
    }

    pub async fn is_empty(&self) -> Result<bool, DatabaseError> {
        Ok(self.len().await? == 0)
    }

    pub async fn insert(&self, value: T) -> Result<Versioned<T>, DatabaseError> {
        let key = value.key();
        let rows = self.write().await?;

        if rows.contains_key(&key) {
            return Err(DatabaseError::DuplicateKey {
                table: self.name.clone(),
                key,
            });
        }

        let row = Versioned { version: 1, value };
        self.commit(rows, key, row.clone()).await?;
        Ok(row)
    }

    pub async fn upsert(&self, value: T) -> Result<Versioned<T>, DatabaseError> {
        let key = value.key();
        let rows = self.write().await?;

        let version = rows.get(&key).map_or(1, |row| row.version + 1);
        let row = Versioned { version, value };
        self.commit(rows, key, row.clone()).await?;
        Ok(row)
    }

    /// Replace an existing row. With `expected_version` the write only lands if
    /// nobody committed to the row since that version was read.
    pub async fn replace(
        &self,
        value: T,
        expected_version: Option<u64>,
    ) -> Result<Versioned<T>, DatabaseError> {
        let key = value.key();
        let rows = self.write().await?;

        let current = match rows.get(&key) {
            Some(row) => row.version,
            None => {
                return Err(DatabaseError::NotFound {
                    table: self.name.clone(),
                    key,
                })
            }
        };

        if let Some(expected) = expected_version {
            if expected != current {
                return Err(DatabaseError::VersionConflict {
                    table: self.name.clone(),
                    key,
                    expected,
                    found: current,
                });
            }
        }

        let row = Versioned {
            version: current + 1,
            value,
        };
        self.commit(rows, key, row.clone()).await?;
        Ok(row)
    }

    async fn read(&self) -> Result<RwLockReadGuard<'_, Rows<T>>, DatabaseError> {
        timeout(self.timeout, self.rows.read())
            .await
            .map_err(|_| self.timeout_error())
    }

    async fn write(&self) -> Result<OwnedRwLockWriteGuard<Rows<T>>, DatabaseError> {
        timeout(self.timeout, self.rows.clone().write_owned())
            .await
            .map_err(|_| self.timeout_error())
    }

    async fn commit(
        &self,
        mut rows: OwnedRwLockWriteGuard<Rows<T>>,
        key: String,
        row: Versioned<T>,
    ) -> Result<(), DatabaseError> {
        let Some(path) = self.snapshot_path.clone() else {
            debug!("Committed {}/{} at version {}", self.name, key, row.version);
            rows.insert(key, row);
            return Ok(());
        };

        let bytes = {
            let snapshot: Vec<&Versioned<T>> = rows
                .iter()
                .filter(|(existing, _)| **existing != key)
                .map(|(_, existing)| existing)
                .chain(std::iter::once(&row))
                .collect();
            serde_json::to_vec_pretty(&snapshot)?
        };

        let write = SnapshotWrite {
            table: self.name.clone(),
            path,
            limit: self.timeout,
        };

        // Owns the write guard, so it finishes even if this future is dropped.
        let task = tokio::spawn(async move {
            match write.run(bytes).await {
                Ok(()) => {
                    debug!("Committed {}/{} at version {}", write.table, key, row.version);
                    rows.insert(key, row);
                    Ok(())
                }
                Err(e) => {
                    error!("Discarded write to {}/{}: {}", write.table, key, e);
                    Err(e)
                }
            }
        });

        task.await
            .map_err(|e| DatabaseError::Io(format!("commit task failed: {}", e)))?
    }

    fn timeout_error(&self) -> DatabaseError {
        DatabaseError::Timeout {
            table: self.name.clone(),
            timeout_ms: self.timeout.as_millis() as u64,
        }
    }
}

static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteState {
    Pending,
    Renamed,
    Abandoned,
}

/// One snapshot replacement. The rename is the commit point: a write that
/// outlives `limit` is abandoned and can no longer rename.
struct SnapshotWrite {
    table: String,
    path: PathBuf,
    limit: Duration,
}

impl SnapshotWrite {
    async fn run(&self, bytes: Vec<u8>) -> Result<(), DatabaseError> {
        let state = Arc::new(Mutex::new(WriteState::Pending));
        let worker_state = state.clone();
        let path = self.path.clone();

        let worker =
            tokio::task::spawn_blocking(move || write_atomically(&path, &bytes, &worker_state));

        match timeout(self.limit, worker).await {
            Ok(joined) => joined.map_err(|e| DatabaseError::Io(format!("snapshot writer failed: {}", e)))?,
            Err(_) => {
                let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
                if *state == WriteState::Renamed {
                    return Ok(());
                }
                *state = WriteState::Abandoned;
                warn!("Abandoned snapshot write for {} after {}ms", self.table, self.limit.as_millis());
                Err(DatabaseError::Timeout {
                    table: self.table.clone(),
                    timeout_ms: self.limit.as_millis() as u64,
                })
            }
        }
    }
}

fn write_atomically(path: &Path, bytes: &[u8], state: &Mutex<WriteState>) -> Result<(), DatabaseError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let seq = STAGING_SEQ.fetch_add(1, Ordering::Relaxed);
    let staging = path.with_extension(format!("json.{}.tmp", seq));
    std::fs::write(&staging, bytes)?;

    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    if *state == WriteState::Abandoned {
        let _ = std::fs::remove_file(&staging);
        return Err(DatabaseError::Io("snapshot write abandoned".to_string()));
    }

    if let Err(e) = std::fs::rename(&staging, path) {
        let _ = std::fs::remove_file(&staging);
        return Err(e.into());
    }
    *state = WriteState::Renamed;
    Ok(())
}
