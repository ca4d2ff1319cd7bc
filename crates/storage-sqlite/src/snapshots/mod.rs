//! SQLite storage for serialized engine snapshots.

mod model;
mod repository;

pub use model::AppStorageDB;
pub use repository::SqliteSnapshotStorage;

// Re-export trait from core for convenience
pub use tickerfolio_core::persistence::SnapshotStorageTrait;
