//! Per-portfolio busy flags.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Set of portfolio ids with a refresh in flight.
///
/// Owned by one engine instance; clones share the same set.
#[derive(Clone, Default)]
pub struct BusySet {
    ids: Arc<Mutex<HashSet<String>>>,
}

impl BusySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `portfolio_id` busy. Returns `None` if it already is.
    pub fn try_acquire(&self, portfolio_id: &str) -> Option<BusyGuard> {
        if !self.ids().insert(portfolio_id.to_string()) {
            return None;
        }
        Some(BusyGuard {
            set: self.clone(),
            portfolio_id: portfolio_id.to_string(),
        })
    }

    pub fn contains(&self, portfolio_id: &str) -> bool {
        self.ids().contains(portfolio_id)
    }

    /// Busy ids, sorted.
    pub fn snapshot(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.ids().iter().cloned().collect();
        ids.sort();
        ids
    }

    fn ids(&self) -> MutexGuard<'_, HashSet<String>> {
        self.ids.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// RAII guard that clears the busy flag when dropped, whether the refresh
/// finished, failed, was cancelled or panicked.
pub struct BusyGuard {
    set: BusySet,
    portfolio_id: String,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.set.ids().remove(&self.portfolio_id);
    }
}
