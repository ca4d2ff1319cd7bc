#[cfg(test)]
mod tests {
    use crate::constants::SNAPSHOT_STORAGE_KEY;
    use crate::errors::{Error, ErrorKind};
    use crate::events::{DomainEvent, RecordingEventSink};
    use crate::persistence::{InMemorySnapshotStorage, PersistenceGateway};
    use crate::portfolios::{PortfolioService, Snapshot};
    use crate::sync::{SyncEngine, SyncOptions};
    use async_trait::async_trait;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::{HashMap, VecDeque};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tickerfolio_market_data::{
        ExchangeRate, MarketDataError, PricePoint, Quote, QuoteClient, QuoteProvider, RateLimit,
    };
    use tokio::sync::Notify;
    use tokio::time::Instant;

    type Scripted = Result<Decimal, MarketDataError>;

    /// Parks the request for one symbol until released.
    struct Gate {
        symbol: String,
        entered: Notify,
        release: Notify,
    }

    /// Provider answering from per-symbol queues. The last answer of a
    /// queue repeats; unknown symbols are not found.
    #[derive(Default)]
    struct ScriptedProvider {
        responses: Mutex<HashMap<String, VecDeque<Scripted>>>,
        calls: Mutex<Vec<String>>,
        call_times: Mutex<Vec<Instant>>,
        gate: Option<Arc<Gate>>,
        min_delay: Duration,
    }

    impl ScriptedProvider {
        fn with(mut self, symbol: &str, answers: Vec<Scripted>) -> Self {
            self.responses
                .get_mut()
                .unwrap()
                .insert(symbol.to_string(), answers.into());
            self
        }

        fn gated(mut self, symbol: &str) -> (Self, Arc<Gate>) {
            let gate = Arc::new(Gate {
                symbol: symbol.to_string(),
                entered: Notify::new(),
                release: Notify::new(),
            });
            self.gate = Some(gate.clone());
            (self, gate)
        }

        fn throttled(mut self, min_delay: Duration) -> Self {
            self.min_delay = min_delay;
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        /// Gaps between consecutive calls.
        fn gaps(&self) -> Vec<Duration> {
            let times = self.call_times.lock().unwrap();
            times.windows(2).map(|w| w[1] - w[0]).collect()
        }
    }

    #[async_trait]
    impl QuoteProvider for ScriptedProvider {
        fn id(&self) -> &'static str {
            "SCRIPTED"
        }

        fn rate_limit(&self) -> RateLimit {
            RateLimit {
                min_delay: self.min_delay,
                ..RateLimit::default()
            }
        }

        async fn latest_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
            self.calls.lock().unwrap().push(symbol.to_string());
            self.call_times.lock().unwrap().push(Instant::now());

            if let Some(gate) = self.gate.as_ref().filter(|g| g.symbol == symbol) {
                gate.entered.notify_one();
                gate.release.notified().await;
            }

            let answer = {
                let mut responses = self.responses.lock().unwrap();
                match responses.get_mut(symbol) {
                    Some(queue) if queue.len() > 1 => queue.pop_front(),
                    Some(queue) => queue.front().cloned(),
                    None => None,
                }
            };
            match answer {
                Some(Ok(price)) => Ok(Quote::new(symbol, price, Utc::now())),
                Some(Err(e)) => Err(e),
                None => Err(MarketDataError::SymbolNotFound(symbol.to_string())),
            }
        }

        async fn daily_series(&self, symbol: &str) -> Result<Vec<PricePoint>, MarketDataError> {
            Err(MarketDataError::SymbolNotFound(symbol.to_string()))
        }

        async fn exchange_rate(&self, _: &str, _: &str) -> Result<ExchangeRate, MarketDataError> {
            Err(MarketDataError::provider("SCRIPTED", "not scripted"))
        }
    }

    struct Harness {
        engine: Arc<SyncEngine>,
        service: Arc<PortfolioService>,
        provider: Arc<ScriptedProvider>,
        storage: Arc<InMemorySnapshotStorage>,
        sink: RecordingEventSink,
    }

    fn harness(provider: ScriptedProvider, options: SyncOptions) -> Harness {
        let sink = RecordingEventSink::new();
        let storage = Arc::new(InMemorySnapshotStorage::new());
        let service = Arc::new(PortfolioService::create(
            PersistenceGateway::new(storage.clone()),
            Arc::new(sink.clone()),
        ));
        let provider = Arc::new(provider);
        let engine = SyncEngine::new(service.clone(), QuoteClient::new(provider.clone()))
            .with_options(options)
            .with_event_sink(Arc::new(sink.clone()));
        Harness {
            engine: Arc::new(engine),
            service,
            provider,
            storage,
            sink,
        }
    }

    async fn seed(service: &PortfolioService, name: &str, holdings: &[(&str, Decimal)]) -> String {
        let portfolio = service.add_portfolio(name).await.unwrap();
        for (symbol, price) in holdings {
            service
                .add_holding(&portfolio.id, symbol, 10, Quote::new(*symbol, *price, Utc::now()))
                .await
                .unwrap();
        }
        portfolio.id
    }

    async fn prices(service: &PortfolioService, portfolio_id: &str) -> Vec<Decimal> {
        service
            .portfolio(portfolio_id)
            .await
            .unwrap()
            .holdings
            .iter()
            .map(|h| h.unit_price)
            .collect()
    }

    fn rate_limited() -> MarketDataError {
        MarketDataError::RateLimited {
            provider: "SCRIPTED".to_string(),
        }
    }

    #[tokio::test]
    async fn test_partial_failure_updates_the_rest() {
        let provider = ScriptedProvider::default()
            .with("AAPL", vec![Ok(dec!(151.00))])
            .with("BAD", vec![Err(MarketDataError::provider("SCRIPTED", "malformed"))])
            .with("MSFT", vec![Ok(dec!(301.00))]);
        let h = harness(provider, SyncOptions::default());
        let id = seed(
            &h.service,
            "Tech",
            &[("AAPL", dec!(150)), ("BAD", dec!(20)), ("MSFT", dec!(300))],
        )
        .await;

        let summary = h.engine.refresh_portfolio(&id).await.unwrap();

        assert_eq!(summary.refreshed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failed_symbols, vec!["BAD"]);
        assert_eq!(
            prices(&h.service, &id).await,
            vec![dec!(151.00), dec!(20), dec!(301.00)]
        );
        assert!(!h.engine.is_busy(&id));
        assert_eq!(h.provider.calls(), vec!["AAPL", "BAD", "MSFT"]);
        assert!(h
            .service
            .portfolio(&id)
            .await
            .unwrap()
            .last_refreshed_at
            .is_some());
    }

    #[tokio::test]
    async fn test_refresh_saves_after_every_holding() {
        let provider = ScriptedProvider::default()
            .with("AAPL", vec![Ok(dec!(151))])
            .with("BAD", vec![Err(MarketDataError::provider("SCRIPTED", "malformed"))])
            .with("MSFT", vec![Ok(dec!(301))]);
        let h = harness(provider, SyncOptions::default());
        let id = seed(
            &h.service,
            "Tech",
            &[("AAPL", dec!(150)), ("BAD", dec!(20)), ("MSFT", dec!(300))],
        )
        .await;
        let before = h.storage.write_count();

        h.engine.refresh_portfolio(&id).await.unwrap();

        // two committed quotes plus the final flush
        assert_eq!(h.storage.write_count(), before + 3);
        let saved: Snapshot =
            serde_json::from_str(&h.storage.get(SNAPSHOT_STORAGE_KEY).unwrap()).unwrap();
        let saved_prices: Vec<Decimal> = saved
            .portfolio(&id)
            .unwrap()
            .holdings
            .iter()
            .map(|h| h.unit_price)
            .collect();
        assert_eq!(saved_prices, vec![dec!(151), dec!(20), dec!(301)]);
    }

    #[tokio::test]
    async fn test_refresh_continues_when_saves_fail() {
        let (provider, gate) = ScriptedProvider::default()
            .with("AAPL", vec![Ok(dec!(151))])
            .with("MSFT", vec![Ok(dec!(301))])
            .gated("MSFT");
        let h = harness(provider, SyncOptions::default());
        let id = seed(&h.service, "Tech", &[("AAPL", dec!(150)), ("MSFT", dec!(300))]).await;
        h.storage.set_fail_writes(true);

        let engine = h.engine.clone();
        let task_id = id.clone();
        let task = tokio::spawn(async move { engine.refresh_portfolio(&task_id).await });
        gate.entered.notified().await;

        // AAPL is committed in memory even though its save failed
        assert!(h.service.persistence_status().await.is_degraded());
        assert_eq!(prices(&h.service, &id).await, vec![dec!(151), dec!(300)]);

        h.storage.set_fail_writes(false);
        gate.release.notify_one();
        let summary = task.await.unwrap().unwrap();

        assert_eq!((summary.refreshed, summary.failed), (2, 0));
        assert!(!h.service.persistence_status().await.is_degraded());
        let saved: Snapshot =
            serde_json::from_str(&h.storage.get(SNAPSHOT_STORAGE_KEY).unwrap()).unwrap();
        let saved_prices: Vec<Decimal> = saved
            .portfolio(&id)
            .unwrap()
            .holdings
            .iter()
            .map(|h| h.unit_price)
            .collect();
        assert_eq!(saved_prices, vec![dec!(151), dec!(301)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_waits_provider_min_delay_between_symbols() {
        let provider = ScriptedProvider::default()
            .with("AAPL", vec![Ok(dec!(151))])
            .with("MSFT", vec![Ok(dec!(301))])
            .with("XOM", vec![Ok(dec!(99))])
            .throttled(Duration::from_secs(12));
        let h = harness(provider, SyncOptions::default());
        let id = seed(
            &h.service,
            "Tech",
            &[("AAPL", dec!(150)), ("MSFT", dec!(300)), ("XOM", dec!(100))],
        )
        .await;

        let summary = h.engine.refresh_portfolio(&id).await.unwrap();
        assert_eq!(summary.refreshed, 3);
        for gap in h.provider.gaps() {
            assert!(gap >= Duration::from_secs(12), "gap was {:?}", gap);
        }
        assert_eq!(h.provider.gaps().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_configured_spacing_wins_when_longer() {
        let provider = ScriptedProvider::default()
            .with("AAPL", vec![Ok(dec!(151))])
            .with("MSFT", vec![Ok(dec!(301))])
            .throttled(Duration::from_secs(1));
        let options = SyncOptions {
            request_spacing: Duration::from_secs(30),
            ..SyncOptions::default()
        };
        let h = harness(provider, options);
        let id = seed(&h.service, "Tech", &[("AAPL", dec!(150)), ("MSFT", dec!(300))]).await;

        h.engine.refresh_portfolio(&id).await.unwrap();
        assert!(h.provider.gaps()[0] >= Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_refresh_emits_started_and_completed() {
        let provider = ScriptedProvider::default().with("AAPL", vec![Ok(dec!(1))]);
        let h = harness(provider, SyncOptions::default());
        let id = seed(&h.service, "Tech", &[("AAPL", dec!(150))]).await;
        h.sink.clear();

        h.engine.refresh_portfolio(&id).await.unwrap();

        let events = h.sink.events();
        assert_eq!(events.first(), Some(&DomainEvent::refresh_started(id.clone())));
        assert_eq!(
            events.last(),
            Some(&DomainEvent::refresh_completed(id.clone(), 1, 0, 0))
        );
    }

    #[tokio::test]
    async fn test_second_refresh_of_same_portfolio_is_rejected() {
        let (provider, gate) = ScriptedProvider::default()
            .with("AAPL", vec![Ok(dec!(151))])
            .with("MSFT", vec![Ok(dec!(301))])
            .gated("AAPL");
        let h = harness(provider, SyncOptions::default());
        let id = seed(&h.service, "Tech", &[("AAPL", dec!(150)), ("MSFT", dec!(300))]).await;

        let engine = h.engine.clone();
        let first_id = id.clone();
        let first = tokio::spawn(async move { engine.refresh_portfolio(&first_id).await });

        gate.entered.notified().await;
        assert!(h.engine.is_busy(&id));
        assert_eq!(h.engine.busy_portfolios(), vec![id.clone()]);

        let err = h.engine.refresh_portfolio(&id).await.unwrap_err();
        assert!(matches!(err, Error::AlreadyInProgress(_)));
        assert_eq!(h.provider.calls(), vec!["AAPL"]);

        gate.release.notify_one();
        let summary = first.await.unwrap().unwrap();
        assert_eq!(summary.refreshed, 2);
        assert!(!h.engine.is_busy(&id));
    }

    #[tokio::test]
    async fn test_refreshes_of_different_portfolios_overlap() {
        let (provider, gate) = ScriptedProvider::default()
            .with("AAPL", vec![Ok(dec!(151))])
            .with("XOM", vec![Ok(dec!(99))])
            .gated("AAPL");
        let h = harness(provider, SyncOptions::default());
        let tech = seed(&h.service, "Tech", &[("AAPL", dec!(150))]).await;
        let energy = seed(&h.service, "Energy", &[("XOM", dec!(100))]).await;

        let engine = h.engine.clone();
        let tech_id = tech.clone();
        let slow = tokio::spawn(async move { engine.refresh_portfolio(&tech_id).await });
        gate.entered.notified().await;

        let summary = h.engine.refresh_portfolio(&energy).await.unwrap();
        assert_eq!(summary.refreshed, 1);
        assert_eq!(prices(&h.service, &energy).await, vec![dec!(99)]);

        gate.release.notify_one();
        slow.await.unwrap().unwrap();
        assert_eq!(prices(&h.service, &tech).await, vec![dec!(151)]);
    }

    #[tokio::test]
    async fn test_cancelled_refresh_clears_busy_flag() {
        let (provider, gate) = ScriptedProvider::default()
            .with("AAPL", vec![Ok(dec!(151))])
            .gated("AAPL");
        let h = harness(provider, SyncOptions::default());
        let id = seed(&h.service, "Tech", &[("AAPL", dec!(150))]).await;

        let engine = h.engine.clone();
        let task_id = id.clone();
        let task = tokio::spawn(async move { engine.refresh_portfolio(&task_id).await });
        gate.entered.notified().await;
        assert!(h.engine.is_busy(&id));

        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());
        assert!(!h.engine.is_busy(&id));
        assert_eq!(prices(&h.service, &id).await, vec![dec!(150)]);
    }

    #[tokio::test]
    async fn test_holding_removed_during_refresh_is_skipped() {
        let (provider, gate) = ScriptedProvider::default()
            .with("AAPL", vec![Ok(dec!(151))])
            .with("MSFT", vec![Ok(dec!(301))])
            .gated("AAPL");
        let h = harness(provider, SyncOptions::default());
        let id = seed(&h.service, "Tech", &[("AAPL", dec!(150)), ("MSFT", dec!(300))]).await;
        let msft_id = h.service.portfolio(&id).await.unwrap().holdings[1].id.clone();

        let engine = h.engine.clone();
        let task_id = id.clone();
        let task = tokio::spawn(async move { engine.refresh_portfolio(&task_id).await });
        gate.entered.notified().await;

        h.service.toggle_holding_selection(&id, &msft_id).await.unwrap();
        h.service.remove_selected_holdings(&id).await.unwrap();
        gate.release.notify_one();

        let summary = task.await.unwrap().unwrap();
        assert_eq!((summary.refreshed, summary.failed, summary.skipped), (1, 0, 1));
        assert_eq!(h.provider.calls(), vec!["AAPL"]);
    }

    #[tokio::test]
    async fn test_refresh_unknown_portfolio() {
        let h = harness(ScriptedProvider::default(), SyncOptions::default());
        let err = h.engine.refresh_portfolio("missing").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(h.engine.busy_portfolios().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_are_retried_when_configured() {
        let provider = ScriptedProvider::default()
            .with("AAPL", vec![Err(rate_limited()), Ok(dec!(151))]);
        let options = SyncOptions {
            max_attempts: 2,
            retry_backoff: Duration::from_secs(5),
            request_spacing: Duration::ZERO,
        };
        let h = harness(provider, options);
        let id = seed(&h.service, "Tech", &[("AAPL", dec!(150))]).await;

        let summary = h.engine.refresh_portfolio(&id).await.unwrap();
        assert_eq!(summary.refreshed, 1);
        assert_eq!(h.provider.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_no_retry_by_default() {
        let provider = ScriptedProvider::default()
            .with("AAPL", vec![Err(rate_limited()), Ok(dec!(151))]);
        let h = harness(provider, SyncOptions::default());
        let id = seed(&h.service, "Tech", &[("AAPL", dec!(150))]).await;

        let summary = h.engine.refresh_portfolio(&id).await.unwrap();
        assert_eq!(summary.failed, 1);
        assert_eq!(h.provider.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_symbol_not_found_is_never_retried() {
        let options = SyncOptions {
            max_attempts: 3,
            ..SyncOptions::default()
        };
        let h = harness(ScriptedProvider::default(), options);
        let id = seed(&h.service, "Tech", &[("GONE", dec!(1))]).await;

        let summary = h.engine.refresh_portfolio(&id).await.unwrap();
        assert_eq!(summary.failed_symbols, vec!["GONE"]);
        assert_eq!(h.provider.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_add_duplicate_symbol_never_contacts_provider() {
        let provider = ScriptedProvider::default().with("AAPL", vec![Ok(dec!(151))]);
        let h = harness(provider, SyncOptions::default());
        let id = seed(&h.service, "Tech", &[("AAPL", dec!(150))]).await;

        let err = h
            .engine
            .add_symbol_to_portfolio(&id, " aapl ", 5)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateSymbol(_)));
        assert!(h.provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_add_symbol_fetches_and_commits() {
        let provider = ScriptedProvider::default().with("MSFT", vec![Ok(dec!(300.00))]);
        let h = harness(provider, SyncOptions::default());
        let id = seed(&h.service, "Tech", &[("AAPL", dec!(150))]).await;

        let holding = h.engine.add_symbol_to_portfolio(&id, "msft", 5).await.unwrap();
        assert_eq!(holding.symbol, "MSFT");
        assert_eq!(holding.total_value(), dec!(1500.00));
        assert_eq!(h.service.portfolio(&id).await.unwrap().holdings.len(), 2);
    }

    #[tokio::test]
    async fn test_add_unknown_symbol_adds_nothing() {
        let h = harness(ScriptedProvider::default(), SyncOptions::default());
        let id = seed(&h.service, "Tech", &[]).await;

        let err = h.engine.add_symbol_to_portfolio(&id, "ZZZZ", 1).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SymbolNotFound);
        assert!(h.service.portfolio(&id).await.unwrap().holdings.is_empty());
    }

    #[tokio::test]
    async fn test_add_invalid_quantity_never_contacts_provider() {
        let h = harness(ScriptedProvider::default(), SyncOptions::default());
        let id = seed(&h.service, "Tech", &[]).await;

        let err = h.engine.add_symbol_to_portfolio(&id, "AAPL", 0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(h.provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_single_holding() {
        let provider = ScriptedProvider::default()
            .with("AAPL", vec![Ok(dec!(155.555))])
            .with("MSFT", vec![Ok(dec!(301))]);
        let h = harness(provider, SyncOptions::default());
        let id = seed(&h.service, "Tech", &[("AAPL", dec!(150)), ("MSFT", dec!(300))]).await;
        let aapl_id = h.service.portfolio(&id).await.unwrap().holdings[0].id.clone();

        let holding = h.engine.refresh_holding(&id, &aapl_id).await.unwrap();
        assert_eq!(holding.unit_price, dec!(155.56));
        assert_eq!(prices(&h.service, &id).await, vec![dec!(155.56), dec!(300)]);
        assert_eq!(h.provider.calls(), vec!["AAPL"]);
        assert!(!h.engine.is_busy(&id));
    }

    #[tokio::test]
    async fn test_refresh_single_holding_reports_provider_failure() {
        let provider = ScriptedProvider::default()
            .with("AAPL", vec![Err(MarketDataError::provider("SCRIPTED", "down"))]);
        let h = harness(provider, SyncOptions::default());
        let id = seed(&h.service, "Tech", &[("AAPL", dec!(150))]).await;
        let aapl_id = h.service.portfolio(&id).await.unwrap().holdings[0].id.clone();

        let err = h.engine.refresh_holding(&id, &aapl_id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Provider);
        assert_eq!(prices(&h.service, &id).await, vec![dec!(150)]);
        assert!(!h.engine.is_busy(&id));

        let err = h.engine.refresh_holding(&id, "missing").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
