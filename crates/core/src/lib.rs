//! Tickerfolio Core - portfolio store, sync engine and persistence gateway.
//!
//! This crate holds the engine state and every rule about it. It is
//! database-agnostic: the durable mirror is reached through
//! [`persistence::SnapshotStorageTrait`], implemented by `storage-sqlite`.

pub mod constants;
pub mod errors;
pub mod events;
pub mod fx;
pub mod history;
pub mod persistence;
pub mod portfolios;
pub mod sync;

// Re-export error types
pub use errors::Error;
pub use errors::ErrorKind;
pub use errors::Result;
