//! Market data models
//!
//! This module contains the normalized values produced by the quote client:
//! - `quote` - Latest quote for one symbol (Quote)
//! - `series` - Historical close prices (PricePoint, HistoricalSeries)
//! - `exchange_rate` - Single currency pair rate (ExchangeRate)

mod exchange_rate;
mod quote;
mod series;

pub use exchange_rate::ExchangeRate;
pub use quote::Quote;
pub use series::{HistoricalSeries, PricePoint};
