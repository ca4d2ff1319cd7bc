//! FX (Foreign Exchange) module - display currency conversion.
//!
//! The engine tracks exactly one pair: base currency to display currency.

pub mod currency_converter;
mod fx_service;

pub use fx_service::ExchangeRateService;
pub use tickerfolio_market_data::ExchangeRate;
