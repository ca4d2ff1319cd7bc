//! Domain event sink trait and implementations.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::DomainEvent;

/// Receiver for domain events.
///
/// `emit()` is called while the engine still holds its commit lock, so it
/// must return quickly: queue or forward the event, never block on I/O.
/// A sink that drops events must not affect the operation that produced them.
pub trait DomainEventSink: Send + Sync {
    fn emit(&self, event: DomainEvent);

    /// Emit several events in order.
    fn emit_batch(&self, events: Vec<DomainEvent>) {
        for event in events {
            self.emit(event);
        }
    }
}

/// Discards every event.
#[derive(Clone, Default)]
pub struct NoOpDomainEventSink;

impl DomainEventSink for NoOpDomainEventSink {
    fn emit(&self, _event: DomainEvent) {}
}

/// Keeps every emitted event in memory, in emission order.
#[derive(Clone, Default)]
pub struct RecordingEventSink {
    events: Arc<Mutex<Vec<DomainEvent>>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DomainEvent> {
        self.recorded().clone()
    }

    pub fn clear(&self) {
        self.recorded().clear();
    }

    pub fn len(&self) -> usize {
        self.recorded().len()
    }

    pub fn is_empty(&self) -> bool {
        self.recorded().is_empty()
    }

    fn recorded(&self) -> MutexGuard<'_, Vec<DomainEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DomainEventSink for RecordingEventSink {
    fn emit(&self, event: DomainEvent) {
        self.recorded().push(event);
    }
}
