use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tickerfolio_market_data::PricePoint;

/// Currency chart values are expressed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartCurrency {
    #[default]
    Base,
    Display,
}

/// Daily closes of one holding, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingSeries {
    pub symbol: String,
    pub color: String,
    pub points: Vec<PricePoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartLine {
    pub symbol: String,
    pub color: String,
}

/// One date of the chart: symbol to close on that date.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRow {
    pub date: NaiveDate,
    pub values: BTreeMap<String, Decimal>,
}

/// Merged daily closes of a portfolio's holdings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioChart {
    pub portfolio_id: String,
    pub currency: String,
    pub lines: Vec<ChartLine>,
    /// Ascending by date.
    pub rows: Vec<ChartRow>,
    /// Symbols whose series could not be fetched.
    pub failed_symbols: Vec<String>,
}
