use std::sync::Arc;

use chrono::Utc;
use log::{info, warn};
use rust_decimal::Decimal;
use tickerfolio_market_data::{ExchangeRate, QuoteClient};
use tokio::sync::RwLock;

use super::currency_converter;
use crate::errors::{Error, Result};
use crate::events::{DomainEvent, DomainEventSink, NoOpDomainEventSink};

/// Fetches and caches the base to display currency rate.
///
/// Conversion is unavailable until a rate has been cached once. A failed
/// refresh keeps whatever was cached before.
pub struct ExchangeRateService {
    quotes: QuoteClient,
    base_currency: String,
    display_currency: String,
    cached: RwLock<Option<ExchangeRate>>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl ExchangeRateService {
    pub fn new(quotes: QuoteClient, base_currency: &str, display_currency: &str) -> Self {
        Self {
            quotes,
            base_currency: base_currency.trim().to_uppercase(),
            display_currency: display_currency.trim().to_uppercase(),
            cached: RwLock::new(None),
            event_sink: Arc::new(NoOpDomainEventSink),
        }
    }

    /// Sets the domain event sink for this service.
    pub fn with_event_sink(mut self, event_sink: Arc<dyn DomainEventSink>) -> Self {
        self.event_sink = event_sink;
        self
    }

    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    pub fn display_currency(&self) -> &str {
        &self.display_currency
    }

    /// Fetches the current rate and caches it.
    pub async fn refresh_rate(&self) -> Result<ExchangeRate> {
        let fetched = if self.base_currency == self.display_currency {
            Ok(ExchangeRate::new(
                &self.base_currency,
                &self.display_currency,
                Decimal::ONE,
                Utc::now(),
            ))
        } else {
            self.quotes
                .fetch_exchange_rate(&self.base_currency, &self.display_currency)
                .await
                .map_err(Error::from)
                .and_then(|rate| self.check_pair(rate))
        };

        match fetched {
            Ok(rate) => {
                info!(
                    "Exchange rate {}/{} = {}",
                    rate.from_currency, rate.to_currency, rate.rate
                );
                *self.cached.write().await = Some(rate.clone());
                self.event_sink.emit(DomainEvent::exchange_rate_updated(
                    &rate.from_currency,
                    &rate.to_currency,
                    rate.rate,
                ));
                Ok(rate)
            }
            Err(e) => {
                warn!(
                    "Failed to refresh {}/{} exchange rate: {}",
                    self.base_currency, self.display_currency, e
                );
                self.event_sink
                    .emit(DomainEvent::exchange_rate_failed(e.to_string()));
                Err(e)
            }
        }
    }

    fn check_pair(&self, rate: ExchangeRate) -> Result<ExchangeRate> {
        if !rate.is_pair(&self.base_currency, &self.display_currency) {
            return Err(Error::Provider(format!(
                "expected {}/{} rate, got {}/{}",
                self.base_currency, self.display_currency, rate.from_currency, rate.to_currency
            )));
        }
        if rate.rate <= Decimal::ZERO {
            return Err(Error::Provider(format!("invalid exchange rate {}", rate.rate)));
        }
        Ok(rate)
    }

    pub async fn cached_rate(&self) -> Option<ExchangeRate> {
        self.cached.read().await.clone()
    }

    pub async fn is_conversion_available(&self) -> bool {
        self.cached.read().await.is_some()
    }

    /// Converts a base currency amount using the cached rate.
    pub async fn convert_to_display(&self, amount: Decimal) -> Result<Decimal> {
        self.cached
            .read()
            .await
            .as_ref()
            .map(|rate| currency_converter::convert(amount, rate.rate))
            .ok_or_else(|| self.unavailable())
    }

    /// The error returned while no rate is cached.
    pub fn unavailable(&self) -> Error {
        Error::RateUnavailable {
            from: self.base_currency.clone(),
            to: self.display_currency.clone(),
        }
    }
}
