#[cfg(test)]
mod tests {
    use crate::constants::SNAPSHOT_STORAGE_KEY;
    use crate::errors::{Error, ErrorKind};
    use crate::events::{DomainEvent, RecordingEventSink};
    use crate::persistence::{InMemorySnapshotStorage, PersistenceGateway, PersistenceStatus};
    use crate::portfolios::{PortfolioCommand, PortfolioService, Snapshot};
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use tickerfolio_market_data::Quote;

    struct Fixture {
        storage: Arc<InMemorySnapshotStorage>,
        sink: RecordingEventSink,
        service: PortfolioService,
    }

    fn fixture() -> Fixture {
        let storage = Arc::new(InMemorySnapshotStorage::new());
        let sink = RecordingEventSink::new();
        let service = PortfolioService::create(
            PersistenceGateway::new(storage.clone()),
            Arc::new(sink.clone()),
        );
        Fixture {
            storage,
            sink,
            service,
        }
    }

    fn quote(symbol: &str, price: Decimal) -> Quote {
        Quote::new(symbol, price, Utc::now())
    }

    fn persisted(storage: &InMemorySnapshotStorage) -> Snapshot {
        serde_json::from_str(&storage.get(SNAPSHOT_STORAGE_KEY).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_every_commit_is_written_through() {
        let f = fixture();

        let tech = f.service.add_portfolio("Tech").await.unwrap();
        assert_eq!(f.storage.write_count(), 1);

        f.service
            .add_holding(&tech.id, "AAPL", 10, quote("AAPL", dec!(150.00)))
            .await
            .unwrap();
        assert_eq!(f.storage.write_count(), 2);

        let stored = persisted(&f.storage);
        assert_eq!(stored, *f.service.snapshot().await);
        assert_eq!(stored.portfolio(&tech.id).unwrap().holdings[0].symbol, "AAPL");
    }

    #[tokio::test]
    async fn test_rejected_command_changes_nothing() {
        let f = fixture();
        let tech = f.service.add_portfolio("Tech").await.unwrap();
        f.service
            .add_holding(&tech.id, "AAPL", 10, quote("AAPL", dec!(150.00)))
            .await
            .unwrap();
        let before = f.service.snapshot().await;
        let writes = f.storage.write_count();
        f.sink.clear();

        let err = f
            .service
            .add_holding(&tech.id, "aapl", 5, quote("AAPL", dec!(1)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateSymbol);

        assert_eq!(f.service.snapshot().await, before);
        assert_eq!(f.storage.write_count(), writes);
        assert!(f.sink.is_empty());
    }

    #[tokio::test]
    async fn test_tech_example() {
        let f = fixture();
        let tech = f.service.add_portfolio("Tech").await.unwrap();
        f.service
            .add_holding(&tech.id, "AAPL", 10, quote("AAPL", dec!(150.00)))
            .await
            .unwrap();

        let err = f
            .service
            .add_holding(&tech.id, "AAPL", 5, quote("AAPL", dec!(150.00)))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateSymbol(_)));

        let snapshot = f
            .service
            .add_holding(&tech.id, "MSFT", 5, quote("MSFT", dec!(300.00)))
            .await
            .unwrap();
        let portfolio = snapshot.portfolio(&tech.id).unwrap();
        assert_eq!(portfolio.holdings.len(), 2);
        assert_eq!(portfolio.holdings[1].total_value(), dec!(1500.00));
    }

    #[tokio::test]
    async fn test_save_failure_degrades_then_restores() {
        let f = fixture();
        f.storage.set_fail_writes(true);

        let tech = f.service.add_portfolio("Tech").await.unwrap();
        assert_eq!(f.service.snapshot().await.len(), 1);
        assert!(f.service.persistence_status().await.is_degraded());
        assert!(f
            .sink
            .events()
            .iter()
            .any(|e| matches!(e, DomainEvent::PersistenceFailed { .. })));

        // still usable in memory
        f.service
            .add_holding(&tech.id, "AAPL", 1, quote("AAPL", dec!(1)))
            .await
            .unwrap();

        f.storage.set_fail_writes(false);
        f.sink.clear();
        f.service.toggle_holding_selection(&tech.id, "missing").await.unwrap();

        assert_eq!(f.service.persistence_status().await, PersistenceStatus::Healthy);
        assert_eq!(f.sink.events(), vec![DomainEvent::PersistenceRestored]);
        assert_eq!(persisted(&f.storage), *f.service.snapshot().await);
    }

    #[tokio::test]
    async fn test_load_restores_saved_state() {
        let f = fixture();
        let tech = f.service.add_portfolio("Tech").await.unwrap();
        f.service
            .add_holding(&tech.id, "AAPL", 10, quote("AAPL", dec!(150.00)))
            .await
            .unwrap();

        let reloaded = PortfolioService::load(
            PersistenceGateway::new(f.storage.clone()),
            Arc::new(RecordingEventSink::new()),
        )
        .unwrap();
        assert_eq!(reloaded.snapshot().await, f.service.snapshot().await);
        assert_eq!(reloaded.portfolio(&tech.id).await.unwrap().name, "Tech");
    }

    #[tokio::test]
    async fn test_teardown_flushes_current_snapshot() {
        let f = fixture();
        f.storage.set_fail_writes(true);
        f.service.add_portfolio("Tech").await.unwrap();
        assert!(f.storage.get(SNAPSHOT_STORAGE_KEY).is_none());

        f.storage.set_fail_writes(false);
        f.service.teardown().await.unwrap();
        assert_eq!(persisted(&f.storage).len(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_emits_domain_events() {
        let f = fixture();
        let tech = f.service.add_portfolio("Tech").await.unwrap();
        f.service
            .dispatch(PortfolioCommand::RemovePortfolio {
                portfolio_id: tech.id.clone(),
            })
            .await
            .unwrap();

        assert_eq!(
            f.sink.events(),
            vec![
                DomainEvent::portfolio_created(tech.id.clone()),
                DomainEvent::portfolio_deleted(tech.id),
            ]
        );
    }
}
