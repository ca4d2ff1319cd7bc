use std::sync::Arc;

use log::{debug, warn};

use super::persistence_traits::SnapshotStorageTrait;
use crate::constants::SNAPSHOT_STORAGE_KEY;
use crate::errors::Result;
use crate::portfolios::{portfolios_store, Snapshot};

/// Durable mirror of the snapshot: read once at startup, written through
/// after every commit.
#[derive(Clone)]
pub struct PersistenceGateway {
    storage: Arc<dyn SnapshotStorageTrait>,
    key: String,
}

impl PersistenceGateway {
    pub fn new(storage: Arc<dyn SnapshotStorageTrait>) -> Self {
        Self::with_key(storage, SNAPSHOT_STORAGE_KEY)
    }

    pub fn with_key(storage: Arc<dyn SnapshotStorageTrait>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Last persisted snapshot.
    ///
    /// A missing, unparsable or invalid payload yields an empty snapshot;
    /// only a failing storage backend is an error.
    pub fn load(&self) -> Result<Snapshot> {
        let Some(payload) = self.storage.read(&self.key)? else {
            debug!("No persisted snapshot under '{}'", self.key);
            return Ok(Snapshot::default());
        };

        match serde_json::from_str::<Snapshot>(&payload) {
            Ok(snapshot) => {
                if let Err(e) = portfolios_store::validate_snapshot(&snapshot) {
                    warn!(
                        "Persisted snapshot under '{}' is invalid, starting empty: {}",
                        self.key, e
                    );
                    return Ok(Snapshot::default());
                }
                debug!(
                    "Loaded {} portfolios from '{}'",
                    snapshot.len(),
                    self.key
                );
                Ok(snapshot)
            }
            Err(e) => {
                warn!(
                    "Persisted snapshot under '{}' is unreadable, starting empty: {}",
                    self.key, e
                );
                Ok(Snapshot::default())
            }
        }
    }

    /// Overwrites the mirror with the full snapshot.
    pub async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let payload = serde_json::to_string(snapshot)?;
        self.storage.write(&self.key, payload).await
    }
}
