//! Quote client.
//!
//! Thin front over a [`QuoteProvider`] that applies the caller's timeout and
//! hands historical series back oldest first. Failures surface as typed
//! [`MarketDataError`]s; nothing here retries.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::debug;

use crate::errors::MarketDataError;
use crate::models::{ExchangeRate, HistoricalSeries, Quote};
use crate::provider::{QuoteProvider, RateLimit};

/// Fetches quotes, daily series and exchange rates from one provider.
#[derive(Clone)]
pub struct QuoteClient {
    provider: Arc<dyn QuoteProvider>,
    timeout: Option<Duration>,
}

impl QuoteClient {
    pub fn new(provider: Arc<dyn QuoteProvider>) -> Self {
        Self {
            provider,
            timeout: None,
        }
    }

    /// Bound every request by `timeout`. Expiry yields [`MarketDataError::Timeout`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn provider_id(&self) -> &'static str {
        self.provider.id()
    }

    pub fn rate_limit(&self) -> RateLimit {
        self.provider.rate_limit()
    }

    /// Latest normalized quote for `symbol`.
    pub async fn fetch_latest_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        let symbol = symbol.trim().to_uppercase();
        debug!("Fetching latest quote for {} from {}", symbol, self.provider_id());
        self.bounded(self.provider.latest_quote(&symbol)).await
    }

    /// Daily closes for `symbol`, iterated oldest first.
    pub async fn fetch_historical_series(
        &self,
        symbol: &str,
    ) -> Result<HistoricalSeries, MarketDataError> {
        let symbol = symbol.trim().to_uppercase();
        debug!("Fetching daily series for {} from {}", symbol, self.provider_id());
        let newest_first = self.bounded(self.provider.daily_series(&symbol)).await?;
        Ok(HistoricalSeries::from_newest_first(newest_first))
    }

    /// Rate converting `from` into `to`.
    pub async fn fetch_exchange_rate(
        &self,
        from: &str,
        to: &str,
    ) -> Result<ExchangeRate, MarketDataError> {
        let (from, to) = (from.trim().to_uppercase(), to.trim().to_uppercase());
        debug!("Fetching exchange rate {}/{} from {}", from, to, self.provider_id());
        self.bounded(self.provider.exchange_rate(&from, &to)).await
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, MarketDataError>
    where
        F: Future<Output = Result<T, MarketDataError>>,
    {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| {
                MarketDataError::Timeout {
                    provider: self.provider_id().to_string(),
                }
            })?,
            None => fut.await,
        }
    }
}
