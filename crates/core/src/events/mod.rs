//! Domain events module.
//!
//! Provides domain event types and the sink trait for emitting events
//! after committed changes. The server implements the sink to push events
//! onto its SSE stream.

mod domain_event;
mod sink;

pub use domain_event::*;
pub use sink::*;
