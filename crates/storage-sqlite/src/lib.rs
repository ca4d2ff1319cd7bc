//! SQLite storage implementation for Tickerfolio.
//!
//! This crate provides the durable mirror behind the core persistence gateway
//! using Diesel ORM with SQLite. It contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - The single-writer actor that serializes writes
//! - A key/value snapshot store implementing `SnapshotStorageTrait`
//!
//! # Architecture
//!
//! This crate is the only place in the workspace where Diesel dependencies exist.
//! The core crate is database-agnostic and only sees the storage trait.
//!
//! ```text
//!   core (PersistenceGateway)
//!              │
//!              ▼  SnapshotStorageTrait
//!   storage-sqlite (this crate)
//!              │
//!              ▼
//!          SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;
pub mod snapshots;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use snapshots::SqliteSnapshotStorage;

// Re-export from tickerfolio-core for convenience
pub use tickerfolio_core::errors::{DatabaseError, Error, Result};
