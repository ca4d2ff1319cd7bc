//! Tickerfolio Market Data Crate
//!
//! This crate wraps the external quote provider and normalizes its responses
//! into provider-agnostic values for the Tickerfolio engine.
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |   QuoteClient    |  (timeout policy, series ordering)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |  QuoteProvider   |  (Alpha Vantage, test doubles, ...)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! | Quote / Series / |  (normalized, base currency)
//! |   ExchangeRate   |
//! +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`Quote`] - Latest normalized price for one symbol
//! - [`PricePoint`] - One `(date, close)` pair of a historical series
//! - [`HistoricalSeries`] - Oldest-first iterator over a provider series
//! - [`ExchangeRate`] - A single currency pair rate
//! - [`MarketDataError`] - Typed provider failures with retry classification
//!
//! The client performs no retries; callers decide from [`RetryClass`].

pub mod client;
pub mod errors;
pub mod models;
pub mod provider;

pub use client::QuoteClient;
pub use errors::{MarketDataError, RetryClass};
pub use models::{ExchangeRate, HistoricalSeries, PricePoint, Quote};
pub use provider::alpha_vantage::AlphaVantageProvider;
pub use provider::{QuoteProvider, RateLimit};
