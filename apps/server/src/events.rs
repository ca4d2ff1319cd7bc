use serde_json::Value;
use tickerfolio_core::events::{DomainEvent, DomainEventSink};
use tokio::sync::broadcast;

/// Canonical event names sent to the presentation layer.
pub const PORTFOLIO_CREATED: &str = "portfolio:created";
pub const PORTFOLIO_DELETED: &str = "portfolio:deleted";
pub const HOLDINGS_CHANGED: &str = "holdings:changed";
pub const REFRESH_START: &str = "refresh:start";
pub const REFRESH_COMPLETE: &str = "refresh:complete";
pub const PERSISTENCE_FAILED: &str = "persistence:failed";
pub const PERSISTENCE_RESTORED: &str = "persistence:restored";
pub const FX_UPDATED: &str = "fx:updated";
pub const FX_ERROR: &str = "fx:error";

/// Serializable envelope that carries event names and optional payloads.
#[derive(Clone, Debug)]
pub struct ServerEvent {
    pub name: &'static str,
    pub payload: Option<Value>,
}

impl ServerEvent {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            payload: None,
        }
    }

    pub fn with_payload(name: &'static str, payload: Value) -> Self {
        Self {
            name,
            payload: Some(payload),
        }
    }
}

impl From<&DomainEvent> for ServerEvent {
    fn from(event: &DomainEvent) -> Self {
        let name = match event {
            DomainEvent::PortfolioCreated { .. } => PORTFOLIO_CREATED,
            DomainEvent::PortfolioDeleted { .. } => PORTFOLIO_DELETED,
            DomainEvent::HoldingsChanged { .. } => HOLDINGS_CHANGED,
            DomainEvent::RefreshStarted { .. } => REFRESH_START,
            DomainEvent::RefreshCompleted { .. } => REFRESH_COMPLETE,
            DomainEvent::PersistenceFailed { .. } => PERSISTENCE_FAILED,
            DomainEvent::PersistenceRestored => return ServerEvent::new(PERSISTENCE_RESTORED),
            DomainEvent::ExchangeRateUpdated { .. } => FX_UPDATED,
            DomainEvent::ExchangeRateFailed { .. } => FX_ERROR,
        };
        match serde_json::to_value(event) {
            Ok(payload) => ServerEvent::with_payload(name, payload),
            Err(e) => {
                tracing::error!("Failed to serialize {} payload: {}", name, e);
                ServerEvent::new(name)
            }
        }
    }
}

/// Lightweight broadcast bus that fans out events to any connected clients.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ServerEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: ServerEvent) {
        // No subscribers, or all lagging: the event is dropped.
        let _ = self.sender.send(event);
    }
}

/// Forwards core domain events onto the [`EventBus`].
#[derive(Clone)]
pub struct WebDomainEventSink {
    bus: EventBus,
}

impl WebDomainEventSink {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }
}

impl DomainEventSink for WebDomainEventSink {
    fn emit(&self, event: DomainEvent) {
        tracing::debug!("domain event: {:?}", event);
        self.bus.publish(ServerEvent::from(&event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sink_publishes_named_events() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        let sink = WebDomainEventSink::new(bus);

        sink.emit(DomainEvent::refresh_completed("p1", 2, 1, 0));
        sink.emit(DomainEvent::PersistenceRestored);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.name, REFRESH_COMPLETE);
        let payload = first.payload.unwrap();
        assert_eq!(payload["portfolio_id"], "p1");
        assert_eq!(payload["failed"], 1);

        let second = rx.recv().await.unwrap();
        assert_eq!(second.name, PERSISTENCE_RESTORED);
        assert!(second.payload.is_none());
    }
}
