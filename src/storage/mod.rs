//! Filesystem storage.
//!
//! The data directory holds a single snapshot file with the last
//! aggregated roster. See [`SnapshotStore`].

use std::path::PathBuf;
use thiserror::Error;

mod snapshot;

pub use snapshot::SnapshotStore;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No snapshot available at {0}")]
    NotAvailable(PathBuf),
}

impl StorageError {
    /// Whether this error only means nothing has been saved yet.
    pub fn is_not_available(&self) -> bool {
        matches!(self, StorageError::NotAvailable(_))
    }
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join("playerStats.json")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}
