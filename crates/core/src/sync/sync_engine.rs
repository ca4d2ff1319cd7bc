//! Refresh orchestration.
//!
//! Holdings are refreshed strictly one at a time. Each successful quote is
//! committed (and written through) before the next request goes out, so a
//! failing or slow symbol never costs the work already done.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tickerfolio_market_data::{Quote, QuoteClient, RetryClass};

use super::busy::{BusyGuard, BusySet};
use super::sync_model::{RefreshSummary, SyncOptions};
use crate::errors::{Error, Result};
use crate::events::{DomainEvent, DomainEventSink, NoOpDomainEventSink};
use crate::portfolios::{self, Holding, PortfolioService};

pub struct SyncEngine {
    portfolios: Arc<PortfolioService>,
    quotes: QuoteClient,
    options: SyncOptions,
    busy: BusySet,
    event_sink: Arc<dyn DomainEventSink>,
}

impl SyncEngine {
    pub fn new(portfolios: Arc<PortfolioService>, quotes: QuoteClient) -> Self {
        Self {
            portfolios,
            quotes,
            options: SyncOptions::default(),
            busy: BusySet::new(),
            event_sink: Arc::new(NoOpDomainEventSink),
        }
    }

    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the domain event sink for this engine.
    pub fn with_event_sink(mut self, event_sink: Arc<dyn DomainEventSink>) -> Self {
        self.event_sink = event_sink;
        self
    }

    pub fn is_busy(&self, portfolio_id: &str) -> bool {
        self.busy.contains(portfolio_id)
    }

    pub fn busy_portfolios(&self) -> Vec<String> {
        self.busy.snapshot()
    }

    /// Gap between consecutive symbols of one refresh: the configured
    /// spacing, but never shorter than the provider's minimum delay.
    fn request_spacing(&self) -> Duration {
        self.options
            .request_spacing
            .max(self.quotes.rate_limit().min_delay)
    }

    fn acquire(&self, portfolio_id: &str) -> Result<BusyGuard> {
        self.busy.try_acquire(portfolio_id).ok_or_else(|| {
            debug!("Refresh of {} rejected, already in progress", portfolio_id);
            Error::AlreadyInProgress(portfolio_id.to_string())
        })
    }

    /// Refreshes every holding of a portfolio.
    ///
    /// Fails up front with `NotFound` or `AlreadyInProgress`. After that,
    /// per-symbol failures are logged and counted, never fatal.
    pub async fn refresh_portfolio(&self, portfolio_id: &str) -> Result<RefreshSummary> {
        let portfolio = self
            .portfolios
            .portfolio(portfolio_id)
            .await
            .ok_or_else(|| Error::NotFound(format!("portfolio {}", portfolio_id)))?;
        let busy = self.acquire(portfolio_id)?;

        info!(
            "Refreshing {} holdings of portfolio '{}'",
            portfolio.holdings.len(),
            portfolio.name
        );
        self.event_sink
            .emit(DomainEvent::refresh_started(portfolio_id));

        let spacing = self.request_spacing();
        let mut summary = RefreshSummary::new(portfolio_id);
        for (index, holding) in portfolio.holdings.iter().enumerate() {
            if index > 0 && !spacing.is_zero() {
                tokio::time::sleep(spacing).await;
            }
            self.refresh_one(portfolio_id, holding, &mut summary).await;
        }

        // Each step was already written through; this covers a save that
        // failed midway and has since recovered.
        if let Err(e) = self.portfolios.flush().await {
            warn!("Final save after refresh of {} failed: {}", portfolio_id, e);
        }

        drop(busy);
        self.finish(&summary);
        Ok(summary)
    }

    /// Refreshes a single holding under the portfolio's busy flag.
    ///
    /// Unlike a portfolio refresh, a provider failure is returned to the caller.
    pub async fn refresh_holding(&self, portfolio_id: &str, holding_id: &str) -> Result<Holding> {
        let holding = self
            .portfolios
            .portfolio(portfolio_id)
            .await
            .ok_or_else(|| Error::NotFound(format!("portfolio {}", portfolio_id)))?
            .holding(holding_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("holding {}", holding_id)))?;
        let busy = self.acquire(portfolio_id)?;
        self.event_sink
            .emit(DomainEvent::refresh_started(portfolio_id));

        let mut summary = RefreshSummary::new(portfolio_id);
        let result = async {
            let quote = self.fetch_quote(&holding.symbol).await?;
            let snapshot = self
                .portfolios
                .apply_quote(portfolio_id, holding_id, quote)
                .await?;
            snapshot
                .portfolio(portfolio_id)
                .and_then(|p| p.holding(holding_id))
                .cloned()
                .ok_or_else(|| Error::NotFound(format!("holding {}", holding_id)))
        }
        .await;

        match &result {
            Ok(_) => summary.refreshed = 1,
            Err(Error::NotFound(_)) => summary.skipped = 1,
            Err(e) => {
                warn!("Failed to refresh {}: {}", holding.symbol, e);
                summary.record_failure(&holding.symbol);
            }
        }
        drop(busy);
        self.finish(&summary);
        result
    }

    /// Adds a new holding priced from a fresh quote.
    ///
    /// Duplicate and capacity checks run locally first so a doomed add never
    /// reaches the provider. The store checks again when committing.
    pub async fn add_symbol_to_portfolio(
        &self,
        portfolio_id: &str,
        symbol: &str,
        quantity: u32,
    ) -> Result<Holding> {
        let symbol = portfolios::normalize_symbol(symbol)?;
        portfolios::validate_quantity(quantity)?;
        {
            let snapshot = self.portfolios.snapshot().await;
            portfolios::portfolios_store::check_can_add_holding(&snapshot, portfolio_id, &symbol)?;
        }

        let quote = self.fetch_quote(&symbol).await?;
        let snapshot = self
            .portfolios
            .add_holding(portfolio_id, &symbol, quantity, quote)
            .await?;

        info!("Added {} x{} to portfolio {}", symbol, quantity, portfolio_id);
        snapshot
            .portfolio(portfolio_id)
            .and_then(|p| p.holding_by_symbol(&symbol))
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("holding {}", symbol)))
    }

    async fn refresh_one(&self, portfolio_id: &str, holding: &Holding, summary: &mut RefreshSummary) {
        // Deleted while earlier symbols were being fetched
        let still_present = self
            .portfolios
            .portfolio(portfolio_id)
            .await
            .is_some_and(|p| p.holding(&holding.id).is_some());
        if !still_present {
            debug!("Skipping {}, no longer in portfolio {}", holding.symbol, portfolio_id);
            summary.skipped += 1;
            return;
        }

        let quote = match self.fetch_quote(&holding.symbol).await {
            Ok(quote) => quote,
            Err(e) => {
                warn!("Failed to refresh {}: {}", holding.symbol, e);
                summary.record_failure(&holding.symbol);
                return;
            }
        };

        match self
            .portfolios
            .apply_quote(portfolio_id, &holding.id, quote)
            .await
        {
            Ok(_) => summary.refreshed += 1,
            Err(Error::NotFound(_)) => {
                debug!("Skipping {}, removed during fetch", holding.symbol);
                summary.skipped += 1;
            }
            Err(e) => {
                warn!("Failed to apply quote for {}: {}", holding.symbol, e);
                summary.record_failure(&holding.symbol);
            }
        }
    }

    /// One quote, retried per [`SyncOptions`] on transient errors only.
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote> {
        let max_attempts = self.options.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.quotes.fetch_latest_quote(symbol).await {
                Ok(quote) => return Ok(quote),
                Err(e) if attempt < max_attempts && e.retry_class() == RetryClass::WithBackoff => {
                    let delay = self.options.retry_backoff * attempt;
                    debug!(
                        "Attempt {}/{} for {} failed ({}), retrying in {:?}",
                        attempt, max_attempts, symbol, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn finish(&self, summary: &RefreshSummary) {
        info!(
            "Refresh of {} finished: {} refreshed, {} failed, {} skipped",
            summary.portfolio_id, summary.refreshed, summary.failed, summary.skipped
        );
        self.event_sink.emit(DomainEvent::refresh_completed(
            summary.portfolio_id.clone(),
            summary.refreshed,
            summary.failed,
            summary.skipped,
        ));
    }
}
