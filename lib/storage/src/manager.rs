use outfitx_core::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::catalog::CatalogStore;
use crate::snapshot::{CatalogSnapshot, SnapshotDescription, SnapshotManager};

const MIN_SAVE_INTERVAL: Duration = Duration::from_secs(1);

/// Owns the catalog store and its on-disk snapshot
pub struct StorageManager {
    store: Arc<CatalogStore>,
    snapshots: Arc<SnapshotManager>,
    data_dir: PathBuf,
}

impl StorageManager {
    /// Open the catalog under `data_dir`, restoring the last snapshot if present
    pub fn new<P: AsRef<Path>>(data_dir: P, vector_dim: usize) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        let snapshots = Arc::new(
            SnapshotManager::new(&data_dir).map_err(|e| Error::Storage(e.to_string()))?,
        );
        let store = Arc::new(CatalogStore::new(vector_dim));

        if let Some(snapshot) = snapshots.load().map_err(|e| Error::Storage(e.to_string()))? {
            if snapshot.vector_dim != vector_dim {
                return Err(Error::Configuration(format!(
                    "catalog snapshot has vector dimension {}, configured dimension is {}",
                    snapshot.vector_dim, vector_dim
                )));
            }
            let count = snapshot.products.len();
            store.batch_upsert(snapshot.products)?;
            store.take_dirty();
            info!(products = count, created_at = %snapshot.created_at, "catalog snapshot loaded");
        }

        Ok(Self {
            store,
            snapshots,
            data_dir,
        })
    }

    #[inline]
    #[must_use]
    pub fn store(&self) -> Arc<CatalogStore> {
        self.store.clone()
    }

    #[inline]
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Force save
    pub fn save(&self) -> Result<SnapshotDescription> {
        self.store.take_dirty();
        save_store(&self.store, &self.snapshots)
    }

    /// Save only when the catalog changed since the last save
    pub fn save_if_dirty(&self) -> Result<Option<SnapshotDescription>> {
        if !self.store.take_dirty() {
            return Ok(None);
        }
        save_store(&self.store, &self.snapshots).map(Some)
    }

    /// Start background save thread; the interval is at least one second
    pub fn start_background_save(&self, interval: Duration) {
        let interval = save_interval(interval);
        let store = self.store.clone();
        let snapshots = self.snapshots.clone();

        std::thread::spawn(move || loop {
            std::thread::sleep(interval);

            if store.take_dirty() {
                match save_store(&store, &snapshots) {
                    Ok(desc) => info!(products = desc.products, bytes = desc.size, "catalog saved"),
                    Err(e) => error!(error = %e, "background catalog save failed"),
                }
            }
        });
    }
}

fn save_interval(requested: Duration) -> Duration {
    requested.max(MIN_SAVE_INTERVAL)
}

/// Write a snapshot whose dirty flag was already taken; a failed write re-flags the catalog
fn save_store(store: &CatalogStore, snapshots: &SnapshotManager) -> Result<SnapshotDescription> {
    let snapshot = CatalogSnapshot::new(store.vector_dim(), store.iter());
    snapshots.save(&snapshot).map_err(|e| {
        store.mark_dirty();
        Error::Storage(e.to_string())
    })
}
