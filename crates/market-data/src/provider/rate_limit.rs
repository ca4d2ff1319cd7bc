//! Rate limiting configuration.
//!
//! Providers describe how fast they may be called. Callers issuing
//! sequential requests wait at least `min_delay` between them.

use std::time::Duration;

/// Rate limiting configuration for a provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimit {
    /// Maximum requests allowed per minute.
    pub requests_per_minute: u32,

    /// Minimum delay between consecutive requests.
    pub min_delay: Duration,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            requests_per_minute: 60,
            min_delay: Duration::ZERO,
        }
    }
}
