//! Quote provider abstraction and implementations.
//!
//! This module contains:
//! - The `QuoteProvider` trait every provider implements
//! - Rate limiting configuration
//! - The Alpha Vantage provider
//!
//! Providers own the wire format. They turn provider-specific payloads into
//! normalized models or a typed [`MarketDataError`](crate::errors::MarketDataError),
//! and never retry.

mod rate_limit;
mod traits;

pub mod alpha_vantage;

pub use rate_limit::RateLimit;
pub use traits::QuoteProvider;
