// Gzip-compressed JSON snapshots of the catalog
use anyhow::{anyhow, Result};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use outfitx_core::ProductRecord;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

pub const SNAPSHOT_FILENAME: &str = "catalog.snapshot";

#[derive(Debug, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub vector_dim: usize,
    pub created_at: DateTime<Utc>,
    pub products: Vec<ProductRecord>,
}

impl CatalogSnapshot {
    pub fn new(vector_dim: usize, products: Vec<ProductRecord>) -> Self {
        Self {
            vector_dim,
            created_at: Utc::now(),
            products,
        }
    }
}

/// Summary of a written snapshot
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotDescription {
    pub path: PathBuf,
    pub products: usize,
    pub size: u64,
    pub created_at: DateTime<Utc>,
}

pub struct SnapshotManager {
    path: PathBuf,
}

impl SnapshotManager {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        fs::create_dir_all(data_dir)?;
        Ok(Self {
            path: data_dir.join(SNAPSHOT_FILENAME),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the snapshot, replacing any previous one atomically
    pub fn save(&self, snapshot: &CatalogSnapshot) -> Result<SnapshotDescription> {
        let json_data = serde_json::to_vec(snapshot)?;

        AtomicFile::new(&self.path, OverwriteBehavior::AllowOverwrite)
            .write(|file| -> std::io::Result<()> {
                let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
                encoder.write_all(&json_data)?;
                encoder.finish()?.flush()
            })
            .map_err(|e| anyhow!("Failed to write snapshot {}: {}", self.path.display(), e))?;

        let metadata = fs::metadata(&self.path)?;
        Ok(SnapshotDescription {
            path: self.path.clone(),
            products: snapshot.products.len(),
            size: metadata.len(),
            created_at: snapshot.created_at,
        })
    }

    /// Load the snapshot if one has been written
    pub fn load(&self) -> Result<Option<CatalogSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let file = File::open(&self.path)?;
        let mut decoder = GzDecoder::new(BufReader::new(file));
        let mut json_data = Vec::new();
        decoder.read_to_end(&mut json_data)?;

        let snapshot: CatalogSnapshot = serde_json::from_slice(&json_data)?;
        Ok(Some(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outfitx_core::{Slot, Vector};
    use tempfile::TempDir;

    #[test]
    fn test_missing_snapshot_loads_as_none() {
        let dir = TempDir::new().unwrap();
        let manager = SnapshotManager::new(dir.path()).unwrap();
        assert!(manager.load().unwrap().is_none());
    }

    #[test]
    fn test_save_overwrites_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let manager = SnapshotManager::new(dir.path().join("nested")).unwrap();

        let first = CatalogSnapshot::new(2, vec![ProductRecord::new("old", Some(Slot::Top))]);
        manager.save(&first).unwrap();

        let product = ProductRecord::new("p1", Some(Slot::Shoes))
            .with_title("Canvas sneaker")
            .with_eco_score(72)
            .with_price(49.5)
            .with_embedding(Vector::new(vec![0.25, -1.0]));
        let unclassified = ProductRecord::new("p2", None);
        let desc = manager
            .save(&CatalogSnapshot::new(2, vec![product, unclassified]))
            .unwrap();
        assert_eq!(desc.products, 2);
        assert!(desc.size > 0);

        let loaded = manager.load().unwrap().unwrap();
        assert_eq!(loaded.vector_dim, 2);
        let ids: Vec<&str> = loaded.products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
        assert_eq!(loaded.products[0].slot, Some(Slot::Shoes));
        assert_eq!(loaded.products[0].embedding, Some(Vector::new(vec![0.25, -1.0])));
        assert_eq!(loaded.products[1].slot, None);
    }

    #[test]
    fn test_corrupt_snapshot_is_an_error() {
        let dir = TempDir::new().unwrap();
        let manager = SnapshotManager::new(dir.path()).unwrap();
        fs::write(manager.path(), b"not gzip").unwrap();
        assert!(manager.load().is_err());
    }
}
