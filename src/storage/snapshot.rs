//! Snapshot persistence.
//!
//! The snapshot file is a pretty-printed JSON array of player stats. A save
//! writes a sibling temp file and renames it over the target, so a reader of
//! the file sees either the previous snapshot or the new one in full. The
//! last saved snapshot is also kept in memory as an `Arc` that is swapped,
//! never edited.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use super::{StorageConfig, StorageError};
use crate::models::Snapshot;

/// Owner of the current snapshot.
pub struct SnapshotStore {
    path: PathBuf,
    current: RwLock<Option<Arc<Snapshot>>>,
    write_lock: Mutex<()>,
}

impl SnapshotStore {
    /// Create a store backed by the given file.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            current: RwLock::new(None),
            write_lock: Mutex::new(()),
        }
    }

    /// Create a store at the configured snapshot path.
    pub fn for_config(config: &StorageConfig) -> Self {
        Self::new(config.snapshot_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Durably replace the stored snapshot. Concurrent saves are serialized.
    pub async fn save(&self, snapshot: Snapshot) -> Result<Arc<Snapshot>, StorageError> {
        let _guard = self.write_lock.lock().await;

        let json = serde_json::to_string_pretty(&snapshot)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let temp_path = self.temp_path();
        let written = match fs::write(&temp_path, json).await {
            Ok(()) => fs::rename(&temp_path, &self.path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            // Best effort: the previous snapshot file is left untouched.
            if let Err(cleanup) = fs::remove_file(&temp_path).await {
                debug!("Could not remove {:?}: {}", temp_path, cleanup);
            }
            return Err(e.into());
        }

        let snapshot = Arc::new(snapshot);
        *self.current.write().await = Some(snapshot.clone());

        info!("Saved snapshot of {} players to {:?}", snapshot.len(), self.path);
        Ok(snapshot)
    }

    /// Return the last saved snapshot.
    ///
    /// Falls back to the file when nothing has been saved by this process,
    /// so a snapshot written before a restart is still served.
    pub async fn load(&self) -> Result<Arc<Snapshot>, StorageError> {
        if let Some(snapshot) = self.current.read().await.as_ref() {
            return Ok(snapshot.clone());
        }

        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotAvailable(self.path.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        let snapshot: Snapshot = serde_json::from_str(&contents)?;
        debug!("Loaded snapshot of {} players from {:?}", snapshot.len(), self.path);

        // A save that finished meanwhile wins over the file we just read.
        let mut current = self.current.write().await;
        Ok(current.get_or_insert_with(|| Arc::new(snapshot)).clone())
    }
}
