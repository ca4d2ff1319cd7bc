//! History module - per-holding price series and portfolio chart data.

pub mod chart_color;
mod history_model;
mod history_service;

pub use chart_color::symbol_color;
pub use history_model::{ChartCurrency, ChartLine, ChartRow, HoldingSeries, PortfolioChart};
pub use history_service::HistoryService;
