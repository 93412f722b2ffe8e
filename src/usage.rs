//! Usage counters
//!
//! Counts provider requests answered for the suggestion engine. Counters
//! are persisted as JSON so they survive restarts and only go back to zero on
//! an explicit reset.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UsageError {
    #[error("Failed to access usage file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize usage stats: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Usage write task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    pub request_count: u64,
    pub last_reset: DateTime<Utc>,
}

impl UsageStats {
    fn fresh() -> Self {
        Self {
            request_count: 0,
            last_reset: Utc::now(),
        }
    }
}

/// Request counters shared between the engine and the presentation layer
#[derive(Debug)]
pub struct UsageStore {
    path: Option<PathBuf>,
    data: RwLock<UsageStats>,
    /// Serializes file writes so the newest counters land last
    file: Mutex<()>,
}

impl UsageStore {
    /// Opens the store at `path`, creating the parent directory if needed.
    ///
    /// A missing file starts fresh counters; an unparsable one is replaced.
    pub fn open(path: PathBuf) -> Result<Self, UsageError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| UsageError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let data = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|source| UsageError::Io {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&contents).unwrap_or_else(|e| {
                log::warn!("Discarding unreadable usage file {}: {}", path.display(), e);
                UsageStats::fresh()
            })
        } else {
            UsageStats::fresh()
        };

        let store = Self {
            path: Some(path),
            data: RwLock::new(data),
            file: Mutex::new(()),
        };
        store.persist(&store.read())?;
        Ok(store)
    }

    /// Counters that live only as long as the process
    pub fn in_memory() -> Self {
        Self {
            path: None,
            data: RwLock::new(UsageStats::fresh()),
            file: Mutex::new(()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn stats(&self) -> UsageStats {
        *self.read()
    }

    /// Adds one answered request and returns the new total.
    ///
    /// The count moves immediately; the file is written on the blocking pool.
    pub async fn record_request(self: &Arc<Self>) -> Result<u64, UsageError> {
        let count = {
            let mut guard = self.write();
            guard.request_count += 1;
            guard.request_count
        };

        if self.path.is_some() {
            let store = Arc::clone(self);
            tokio::task::spawn_blocking(move || store.persist_latest()).await??;
        }
        Ok(count)
    }

    pub fn reset(&self) -> Result<UsageStats, UsageError> {
        let _file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        let mut guard = self.write();
        *guard = UsageStats::fresh();
        self.persist(&guard)?;
        Ok(*guard)
    }

    /// Writes whatever the counters hold by the time the file is free
    fn persist_latest(&self) -> Result<(), UsageError> {
        let _file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        let stats = self.stats();
        self.persist(&stats)
    }

    fn persist(&self, data: &UsageStats) -> Result<(), UsageError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(path, serialized).map_err(|source| UsageError::Io {
            path: path.clone(),
            source,
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, UsageStats> {
        self.data.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, UsageStats> {
        self.data.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// Default location of the usage file: `<data dir>/nudge/usage.json`
pub fn default_usage_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nudge")
        .join("usage.json")
}
