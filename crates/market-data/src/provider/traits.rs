//! Quote provider trait definition.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{ExchangeRate, PricePoint, Quote};

use super::rate_limit::RateLimit;

/// Trait for external quote providers.
///
/// Each method issues exactly one request and maps the response either to a
/// normalized value or to a [`MarketDataError`]:
///
/// - `SymbolNotFound` when the provider says it has no data for the symbol
/// - `RateLimited` when the provider throttles the caller
/// - `ProviderError` for transport failures and malformed payloads
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Unique identifier for this provider, e.g. "ALPHA_VANTAGE".
    fn id(&self) -> &'static str;

    /// Rate limiting configuration.
    fn rate_limit(&self) -> RateLimit {
        RateLimit::default()
    }

    /// Fetch the latest quote for a symbol.
    async fn latest_quote(&self, symbol: &str) -> Result<Quote, MarketDataError>;

    /// Fetch the daily close series for a symbol.
    ///
    /// Points are returned newest first, the order the provider sends them.
    async fn daily_series(&self, symbol: &str) -> Result<Vec<PricePoint>, MarketDataError>;

    /// Fetch the current rate for a currency pair.
    async fn exchange_rate(&self, from: &str, to: &str) -> Result<ExchangeRate, MarketDataError>;
}
