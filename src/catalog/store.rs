use super::{record::records_from_json, snapshot::CatalogSnapshot};
use crate::{info, warn};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use strum_macros::Display;
use tokio::sync::RwLock;

#[derive(Debug, Display)]
pub enum StoreError {
    /// No snapshot has ever been stored at this location.
    SnapshotMissing,
    Io(std::io::Error),
    Serialization(serde_json::Error),
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        if value.kind() == std::io::ErrorKind::NotFound {
            StoreError::SnapshotMissing
        } else {
            StoreError::Io(value)
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self { StoreError::Serialization(value) }
}

/// Holder of the current catalog snapshot.
///
/// One writer replaces the whole snapshot, many readers take a reference to whatever
/// snapshot is current when they start. A reader never sees a partially written snapshot:
/// implementations must make `replace` an all-or-nothing swap.
#[async_trait::async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Atomically installs `snapshot` as the current one.
    ///
    /// On error the previously stored snapshot stays current.
    async fn replace(&self, snapshot: CatalogSnapshot) -> Result<(), StoreError>;

    /// Returns the current snapshot, or `None` if none was ever stored.
    async fn current(&self) -> Option<Arc<CatalogSnapshot>>;
}

/// Snapshot slot kept purely in memory.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    slot: RwLock<Option<Arc<CatalogSnapshot>>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self { Self::default() }

    pub fn with_snapshot(snapshot: CatalogSnapshot) -> Self {
        Self { slot: RwLock::new(Some(Arc::new(snapshot))) }
    }
}

#[async_trait::async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn replace(&self, snapshot: CatalogSnapshot) -> Result<(), StoreError> {
        let next = Arc::new(snapshot);
        *self.slot.write().await = Some(next);
        Ok(())
    }

    async fn current(&self) -> Option<Arc<CatalogSnapshot>> {
        self.slot.read().await.as_ref().map(Arc::clone)
    }
}

/// Memory-backed snapshot slot mirrored to a JSON cache file.
///
/// The file is written to a temporary sibling first and renamed over the cache afterwards,
/// the in-memory slot is only swapped once the rename succeeded.
#[derive(Debug)]
pub struct FileSnapshotStore {
    path: PathBuf,
    memory: MemorySnapshotStore,
}

impl FileSnapshotStore {
    /// Opens the cache at `path`, loading the persisted snapshot if there is one.
    ///
    /// A missing or unreadable cache yields an empty store, so the service can still start.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let memory = match load_persisted(&path).await {
            Ok(snapshot) => {
                info!("Loaded {} cached records from {}.", snapshot.len(), path.display());
                MemorySnapshotStore::with_snapshot(snapshot)
            }
            Err(StoreError::SnapshotMissing) => {
                info!("No cached catalog at {}, waiting for first refresh.", path.display());
                MemorySnapshotStore::new()
            }
            Err(e) => {
                warn!("Ignoring unreadable catalog cache {}: {e:?}", path.display());
                MemorySnapshotStore::new()
            }
        };
        Self { path, memory }
    }

    pub fn path(&self) -> &Path { &self.path }
}

#[async_trait::async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn replace(&self, snapshot: CatalogSnapshot) -> Result<(), StoreError> {
        persist(&self.path, &snapshot).await?;
        self.memory.replace(snapshot).await
    }

    async fn current(&self) -> Option<Arc<CatalogSnapshot>> { self.memory.current().await }
}

/// Reads a snapshot from its persisted JSON array form. Undecodable entries are skipped,
/// a file that is not a JSON array at all is a [`StoreError::Serialization`].
pub async fn load_persisted(path: &Path) -> Result<CatalogSnapshot, StoreError> {
    let raw = tokio::fs::read(path).await?;
    let records = records_from_json(serde_json::from_slice(&raw)?);
    let fetched_at = tokio::fs::metadata(path)
        .await
        .and_then(|meta| meta.modified())
        .map_or_else(|_| chrono::Utc::now(), chrono::DateTime::<chrono::Utc>::from);
    Ok(CatalogSnapshot::new(fetched_at, records))
}

/// Writes `snapshot` to `path` through a temporary file and a single rename.
pub async fn persist(path: &Path, snapshot: &CatalogSnapshot) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(StoreError::Io)?;
    }
    let payload = serde_json::to_vec(snapshot.records())?;
    let tmp_path = temporary_sibling(path);
    tokio::fs::write(&tmp_path, payload).await.map_err(StoreError::Io)?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(StoreError::Io(e));
    }
    Ok(())
}

fn temporary_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(std::ffi::OsStr::to_os_string).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
