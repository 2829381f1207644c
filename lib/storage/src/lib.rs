pub mod catalog;
pub mod manager;
pub mod snapshot;

pub use catalog::CatalogStore;
pub use manager::StorageManager;
pub use snapshot::{CatalogSnapshot, SnapshotDescription, SnapshotManager};
