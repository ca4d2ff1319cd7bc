//! Alpha Vantage quote provider implementation.
//!
//! This module provides market data from the Alpha Vantage API:
//! - Latest prices via the TIME_SERIES_INTRADAY endpoint (1min interval)
//! - Daily closes via the TIME_SERIES_DAILY endpoint
//! - The display currency rate via the CURRENCY_EXCHANGE_RATE endpoint
//!
//! Note: Alpha Vantage free tier is limited to 5 API calls per minute.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use log::{debug, warn};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::time::Duration;

use crate::errors::MarketDataError;
use crate::models::{ExchangeRate, PricePoint, Quote};
use crate::provider::{QuoteProvider, RateLimit};

const BASE_URL: &str = "https://www.alphavantage.co/query";
const PROVIDER_ID: &str = "ALPHA_VANTAGE";
const INTRADAY_INTERVAL: &str = "1min";

/// Alpha Vantage quote provider.
///
/// Free tier is limited to 5 API calls per minute.
pub struct AlphaVantageProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

// ============================================================================
// Response structures for Alpha Vantage API
// ============================================================================

/// Status fields Alpha Vantage puts in place of data when something is off.
#[derive(Debug, Default, Deserialize)]
struct ApiStatus {
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

/// TIME_SERIES_INTRADAY response
#[derive(Debug, Deserialize)]
struct IntradayResponse {
    #[serde(rename = "Meta Data")]
    meta: Option<SeriesMeta>,
    #[serde(rename = "Time Series (1min)")]
    time_series: Option<HashMap<String, Bar>>,
    #[serde(flatten)]
    status: ApiStatus,
}

/// TIME_SERIES_DAILY response
#[derive(Debug, Deserialize)]
struct DailyResponse {
    #[serde(rename = "Meta Data")]
    meta: Option<SeriesMeta>,
    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<BTreeMap<String, Bar>>,
    #[serde(flatten)]
    status: ApiStatus,
}

#[derive(Debug, Deserialize)]
struct SeriesMeta {
    #[serde(rename = "3. Last Refreshed")]
    last_refreshed: String,
    #[serde(rename = "6. Time Zone", alias = "5. Time Zone")]
    time_zone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Bar {
    #[serde(rename = "4. close")]
    close: String,
}

/// CURRENCY_EXCHANGE_RATE response
#[derive(Debug, Deserialize)]
struct ExchangeRateResponse {
    #[serde(rename = "Realtime Currency Exchange Rate")]
    realtime: Option<RealtimeRate>,
    #[serde(flatten)]
    status: ApiStatus,
}

#[derive(Debug, Deserialize)]
struct RealtimeRate {
    #[serde(rename = "5. Exchange Rate")]
    rate: Option<String>,
}

// ============================================================================
// AlphaVantageProvider implementation
// ============================================================================

impl AlphaVantageProvider {
    /// Create a new Alpha Vantage provider with the given API key.
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, BASE_URL.to_string())
    }

    /// Create a provider that talks to a different endpoint (proxy or stub).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key,
            base_url,
        }
    }

    /// Make a request to the Alpha Vantage API.
    async fn fetch(&self, params: &[(&str, &str)]) -> Result<String, MarketDataError> {
        let mut all_params: Vec<(&str, &str)> = params.to_vec();
        all_params.push(("apikey", &self.api_key));

        let url = reqwest::Url::parse_with_params(&self.base_url, &all_params)
            .map_err(|e| MarketDataError::provider(PROVIDER_ID, format!("Failed to build URL: {}", e)))?;

        debug!(
            "Alpha Vantage request: {}",
            url.as_str().replace(&self.api_key, "***")
        );

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                MarketDataError::Timeout {
                    provider: PROVIDER_ID.to_string(),
                }
            } else {
                MarketDataError::provider(PROVIDER_ID, e.to_string())
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if !status.is_success() {
            return Err(MarketDataError::provider(PROVIDER_ID, format!("HTTP {}", status)));
        }

        response
            .text()
            .await
            .map_err(|e| MarketDataError::provider(PROVIDER_ID, e.to_string()))
    }

    /// Check for API-level errors in the response.
    fn check_api_error(symbol: &str, status: &ApiStatus) -> Result<(), MarketDataError> {
        if let Some(ref msg) = status.error_message {
            // Unknown symbols come back as "Invalid API call"
            if msg.contains("Invalid API call") || msg.contains("not found") {
                return Err(MarketDataError::SymbolNotFound(symbol.to_string()));
            }
            return Err(MarketDataError::provider(PROVIDER_ID, msg.clone()));
        }

        for msg in [&status.note, &status.information].into_iter().flatten() {
            if msg.contains("call frequency") || msg.contains("rate limit") {
                return Err(MarketDataError::RateLimited {
                    provider: PROVIDER_ID.to_string(),
                });
            }
            warn!("Alpha Vantage message for {}: {}", symbol, msg);
        }

        Ok(())
    }

    /// Error for a payload without metadata.
    ///
    /// An informational message (bad key, premium endpoint) is a provider
    /// problem; a bare empty object means the symbol has no data.
    fn missing_metadata(symbol: &str, status: &ApiStatus) -> MarketDataError {
        match status.information.as_ref().or(status.note.as_ref()) {
            Some(msg) => MarketDataError::provider(PROVIDER_ID, msg.clone()),
            None => MarketDataError::SymbolNotFound(symbol.to_string()),
        }
    }

    fn parse_json<'a, T: Deserialize<'a>>(text: &'a str) -> Result<T, MarketDataError> {
        serde_json::from_str(text).map_err(|e| {
            MarketDataError::provider(PROVIDER_ID, format!("Failed to parse response: {}", e))
        })
    }

    /// Parse a decimal value from a string.
    fn parse_decimal(s: &str) -> Option<Decimal> {
        Decimal::from_str(s.trim()).ok()
    }

    /// Parse a "Last Refreshed" value in the series time zone into UTC.
    ///
    /// Accepts both `YYYY-MM-DD HH:MM:SS` and plain `YYYY-MM-DD`.
    fn parse_timestamp(value: &str, time_zone: Option<&str>) -> Option<DateTime<Utc>> {
        let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(value, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })?;

        match time_zone.and_then(|tz| Tz::from_str(tz).ok()) {
            Some(tz) => tz
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
            None => Utc.from_local_datetime(&naive).single(),
        }
    }

    /// Turn a TIME_SERIES_INTRADAY payload into the latest quote.
    fn parse_latest_quote(symbol: &str, text: &str) -> Result<Quote, MarketDataError> {
        let response: IntradayResponse = Self::parse_json(text)?;
        Self::check_api_error(symbol, &response.status)?;

        let meta = response
            .meta
            .ok_or_else(|| Self::missing_metadata(symbol, &response.status))?;

        let bar = response
            .time_series
            .as_ref()
            .and_then(|series| series.get(&meta.last_refreshed))
            .ok_or_else(|| {
                MarketDataError::provider(
                    PROVIDER_ID,
                    format!("No data point at {} for {}", meta.last_refreshed, symbol),
                )
            })?;

        let price = Self::parse_decimal(&bar.close).ok_or_else(|| {
            MarketDataError::provider(PROVIDER_ID, format!("Invalid close price: {}", bar.close))
        })?;

        let as_of = Self::parse_timestamp(&meta.last_refreshed, meta.time_zone.as_deref())
            .ok_or_else(|| {
                MarketDataError::provider(
                    PROVIDER_ID,
                    format!("Invalid timestamp: {}", meta.last_refreshed),
                )
            })?;

        Ok(Quote::new(symbol, price, as_of))
    }

    /// Turn a TIME_SERIES_DAILY payload into points ordered newest first.
    fn parse_daily_series(symbol: &str, text: &str) -> Result<Vec<PricePoint>, MarketDataError> {
        let response: DailyResponse = Self::parse_json(text)?;
        Self::check_api_error(symbol, &response.status)?;

        if response.meta.is_none() {
            return Err(Self::missing_metadata(symbol, &response.status));
        }

        let time_series = response.time_series.ok_or_else(|| {
            MarketDataError::provider(PROVIDER_ID, format!("No daily series for {}", symbol))
        })?;

        let mut points: Vec<PricePoint> = time_series
            .into_iter()
            .filter_map(|(date_str, bar)| {
                let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").ok()?;
                let close = Self::parse_decimal(&bar.close)?;
                Some(PricePoint::new(date, close))
            })
            .collect();

        // Newest first
        points.sort_by(|a, b| b.date.cmp(&a.date));

        debug!(
            "Alpha Vantage: fetched {} daily closes for {}",
            points.len(),
            symbol
        );

        Ok(points)
    }

    /// Turn a CURRENCY_EXCHANGE_RATE payload into an exchange rate.
    fn parse_exchange_rate(
        from: &str,
        to: &str,
        text: &str,
        fetched_at: DateTime<Utc>,
    ) -> Result<ExchangeRate, MarketDataError> {
        let pair = format!("{}/{}", from, to);
        let response: ExchangeRateResponse = Self::parse_json(text)?;
        Self::check_api_error(&pair, &response.status)?;

        let raw = response
            .realtime
            .and_then(|r| r.rate)
            .ok_or_else(|| MarketDataError::provider(PROVIDER_ID, format!("No exchange rate for {}", pair)))?;

        let rate = Self::parse_decimal(&raw)
            .filter(|r| r.is_sign_positive() && !r.is_zero())
            .ok_or_else(|| MarketDataError::provider(PROVIDER_ID, format!("Invalid exchange rate: {}", raw)))?;

        Ok(ExchangeRate::new(from, to, rate, fetched_at))
    }
}

// ============================================================================
// QuoteProvider trait implementation
// ============================================================================

#[async_trait]
impl QuoteProvider for AlphaVantageProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            requests_per_minute: 5,             // Free tier is very limited
            min_delay: Duration::from_secs(12), // ~5 requests per minute
        }
    }

    async fn latest_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        let params = [
            ("function", "TIME_SERIES_INTRADAY"),
            ("symbol", symbol),
            ("interval", INTRADAY_INTERVAL),
        ];
        let text = self.fetch(&params).await?;
        Self::parse_latest_quote(symbol, &text)
    }

    async fn daily_series(&self, symbol: &str) -> Result<Vec<PricePoint>, MarketDataError> {
        let params = [
            ("function", "TIME_SERIES_DAILY"),
            ("symbol", symbol),
            ("outputsize", "compact"), // 'full' is premium-only
        ];
        let text = self.fetch(&params).await?;
        Self::parse_daily_series(symbol, &text)
    }

    async fn exchange_rate(&self, from: &str, to: &str) -> Result<ExchangeRate, MarketDataError> {
        let params = [
            ("function", "CURRENCY_EXCHANGE_RATE"),
            ("from_currency", from),
            ("to_currency", to),
        ];
        let text = self.fetch(&params).await?;
        Self::parse_exchange_rate(from, to, &text, Utc::now())
    }
}
