//! The portfolio service written through to SQLite survives a restart.

use chrono::Utc;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tempfile::tempdir;
use tickerfolio_core::events::NoOpDomainEventSink;
use tickerfolio_core::persistence::PersistenceGateway;
use tickerfolio_core::portfolios::PortfolioService;
use tickerfolio_market_data::Quote;
use tickerfolio_storage_sqlite::{create_pool, init, run_migrations, spawn_writer, SqliteSnapshotStorage};

fn open(db_path: &str) -> PersistenceGateway {
    let pool = create_pool(&init(db_path).unwrap()).unwrap();
    run_migrations(&pool).unwrap();
    let writer = spawn_writer((*pool).clone());
    PersistenceGateway::new(Arc::new(SqliteSnapshotStorage::new(pool, writer)))
}

#[tokio::test]
async fn test_snapshot_survives_restart() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("app.db").to_string_lossy().to_string();

    let service = PortfolioService::load(open(&db_path), Arc::new(NoOpDomainEventSink)).unwrap();
    assert!(service.snapshot().await.is_empty());

    let tech = service.add_portfolio("Tech").await.unwrap();
    service
        .add_holding(&tech.id, "aapl", 10, Quote::new("AAPL", dec!(189.456), Utc::now()))
        .await
        .unwrap();
    let before = service.snapshot().await;
    service.teardown().await.unwrap();
    drop(service);

    let reloaded = PortfolioService::load(open(&db_path), Arc::new(NoOpDomainEventSink)).unwrap();
    let after = reloaded.snapshot().await;
    assert_eq!(after, before);

    let holding = &after.portfolio(&tech.id).unwrap().holdings[0];
    assert_eq!(holding.symbol, "AAPL");
    assert_eq!(holding.unit_price, dec!(189.46));
    assert_eq!(holding.total_value(), dec!(1894.60));
}

#[tokio::test]
async fn test_corrupt_payload_loads_empty() {
    use tickerfolio_core::persistence::SnapshotStorageTrait;

    let dir = tempdir().unwrap();
    let db_path = dir.path().join("app.db").to_string_lossy().to_string();
    let pool = create_pool(&init(&db_path).unwrap()).unwrap();
    run_migrations(&pool).unwrap();
    let storage = Arc::new(SqliteSnapshotStorage::new(pool.clone(), spawn_writer((*pool).clone())));
    storage.write("portfolios", "{not json".to_string()).await.unwrap();

    let gateway = PersistenceGateway::new(storage);
    assert!(gateway.load().unwrap().is_empty());
}
