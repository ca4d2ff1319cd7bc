use async_trait::async_trait;

use crate::errors::Result;

/// Key/value storage for serialized snapshots.
#[async_trait]
pub trait SnapshotStorageTrait: Send + Sync {
    /// Returns the payload stored under `key`, if any.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Overwrites the payload stored under `key`.
    async fn write(&self, key: &str, payload: String) -> Result<()>;
}
