use std::sync::Arc;

use crate::{
    config::Config,
    events::{EventBus, WebDomainEventSink},
};
use tickerfolio_core::{
    events::DomainEventSink,
    fx::ExchangeRateService,
    history::HistoryService,
    persistence::PersistenceGateway,
    portfolios::PortfolioService,
    sync::SyncEngine,
};
use tickerfolio_market_data::{AlphaVantageProvider, QuoteClient, QuoteProvider};
use tickerfolio_storage_sqlite::{db, SqliteSnapshotStorage};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub portfolio_service: Arc<PortfolioService>,
    pub sync_engine: Arc<SyncEngine>,
    pub history_service: Arc<HistoryService>,
    pub fx_service: Arc<ExchangeRateService>,
    pub event_bus: EventBus,
    pub db_path: String,
}

pub fn init_tracing() {
    let log_format = std::env::var("TF_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let provider = Arc::new(AlphaVantageProvider::new(config.alpha_vantage_api_key.clone()));
    build_state_with_provider(config, provider).await
}

/// Wires every service around the given quote provider.
pub async fn build_state_with_provider(
    config: &Config,
    provider: Arc<dyn QuoteProvider>,
) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());
    let storage = Arc::new(SqliteSnapshotStorage::new(pool.clone(), writer));

    let event_bus = EventBus::new(256);
    let domain_event_sink: Arc<dyn DomainEventSink> =
        Arc::new(WebDomainEventSink::new(event_bus.clone()));

    let portfolio_service = Arc::new(PortfolioService::load(
        PersistenceGateway::new(storage),
        domain_event_sink.clone(),
    )?);

    let quotes = QuoteClient::new(provider).with_timeout(config.quote_timeout);
    tracing::info!(
        "Quote provider {} ({} requests/min)",
        quotes.provider_id(),
        quotes.rate_limit().requests_per_minute
    );

    let sync_engine = Arc::new(
        SyncEngine::new(portfolio_service.clone(), quotes.clone())
            .with_options(config.sync.clone())
            .with_event_sink(domain_event_sink.clone()),
    );

    let fx_service = Arc::new(
        ExchangeRateService::new(quotes.clone(), &config.base_currency, &config.display_currency)
            .with_event_sink(domain_event_sink.clone()),
    );
    {
        // Failure is logged by the service; conversion stays unavailable.
        let fx_service = fx_service.clone();
        tokio::spawn(async move {
            let _ = fx_service.refresh_rate().await;
        });
    }

    let history_service = Arc::new(HistoryService::new(
        portfolio_service.clone(),
        quotes,
        fx_service.clone(),
    ));

    Ok(Arc::new(AppState {
        portfolio_service,
        sync_engine,
        history_service,
        fx_service,
        event_bus,
        db_path,
    }))
}
