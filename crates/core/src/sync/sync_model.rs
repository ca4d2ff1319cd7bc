//! Sync configuration and results.

use std::time::Duration;

use serde::Serialize;

/// Retry and pacing policy for provider calls made by the sync engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Attempts per symbol, including the first. Only errors classified
    /// `RetryClass::WithBackoff` are retried.
    pub max_attempts: u32,
    /// Delay before the second attempt; grows linearly after that.
    pub retry_backoff: Duration,
    /// Pause between consecutive symbols of one refresh. The provider's
    /// `RateLimit::min_delay` applies when it is longer.
    pub request_spacing: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            retry_backoff: Duration::from_secs(2),
            request_spacing: Duration::ZERO,
        }
    }
}

/// Outcome of one refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshSummary {
    pub portfolio_id: String,
    pub refreshed: usize,
    pub failed: usize,
    /// Holdings removed while the refresh was running.
    pub skipped: usize,
    pub failed_symbols: Vec<String>,
}

impl RefreshSummary {
    pub fn new(portfolio_id: &str) -> Self {
        Self {
            portfolio_id: portfolio_id.to_string(),
            ..Default::default()
        }
    }

    pub(crate) fn record_failure(&mut self, symbol: &str) {
        self.failed += 1;
        self.failed_symbols.push(symbol.to_string());
    }
}
