//! Sync module - refresh orchestration over the quote client and the
//! portfolio service.
//!
//! # Architecture
//!
//! ```text
//! SyncEngine
//!       │
//!       ├─► BusySet (one in-flight refresh per portfolio)
//!       ├─► QuoteClient (one request at a time, retries per SyncOptions)
//!       └─► PortfolioService (apply_quote + write-through per holding)
//! ```

mod busy;
mod sync_engine;
mod sync_model;

#[cfg(test)]
mod sync_engine_tests;

pub use busy::{BusyGuard, BusySet};
pub use sync_engine::SyncEngine;
pub use sync_model::{RefreshSummary, SyncOptions};
