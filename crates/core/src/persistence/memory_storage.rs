use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use super::persistence_traits::SnapshotStorageTrait;
use crate::errors::{DatabaseError, Result};

/// Snapshot storage kept in process memory.
///
/// Writes can be made to fail on demand to exercise degraded persistence.
#[derive(Default)]
pub struct InMemorySnapshotStorage {
    entries: RwLock<HashMap<String, String>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl InMemorySnapshotStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with `payload` under `key`.
    pub fn with_entry(key: &str, payload: &str) -> Self {
        let storage = Self::default();
        storage
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), payload.to_string());
        storage
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

#[async_trait]
impl SnapshotStorageTrait for InMemorySnapshotStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get(key))
    }

    async fn write(&self, key: &str, payload: String) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DatabaseError::QueryFailed("storage unavailable".to_string()).into());
        }
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), payload);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
