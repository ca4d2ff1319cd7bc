//! Persistence module - durable mirror of the portfolio snapshot.
//!
//! The gateway serializes the whole snapshot under one storage key. Backends
//! implement [`SnapshotStorageTrait`]; `storage-sqlite` provides the durable one.

mod memory_storage;
mod persistence_gateway;
mod persistence_model;
mod persistence_traits;

pub use memory_storage::InMemorySnapshotStorage;
pub use persistence_gateway::PersistenceGateway;
pub use persistence_model::PersistenceStatus;
pub use persistence_traits::SnapshotStorageTrait;
