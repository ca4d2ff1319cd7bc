//! Portfolios module - snapshot model, pure store operations, commands and
//! the owning service.

mod portfolios_commands;
mod portfolios_model;
mod portfolios_service;
pub mod portfolios_store;

#[cfg(test)]
mod portfolios_service_tests;

pub use portfolios_commands::PortfolioCommand;
pub use portfolios_model::{Holding, HoldingView, Portfolio, PortfolioView, Snapshot};
pub use portfolios_service::PortfolioService;
pub use portfolios_store::{normalize_symbol, validate_quantity};
