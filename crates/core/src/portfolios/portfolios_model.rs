//! Portfolio domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::fx::currency_converter;
use crate::fx::ExchangeRate;

/// One ticker position inside a portfolio.
///
/// `total_value` is never stored; it is derived from price and quantity on
/// every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub id: String,
    pub symbol: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub unit_price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub selected: bool,
}

impl Holding {
    pub fn total_value(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Named collection of holdings, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub holdings: Vec<Holding>,
    #[serde(default)]
    pub last_refreshed_at: Option<DateTime<Utc>>,
}

impl Portfolio {
    pub fn holding(&self, holding_id: &str) -> Option<&Holding> {
        self.holdings.iter().find(|h| h.id == holding_id)
    }

    /// Case-insensitive symbol lookup.
    pub fn holding_by_symbol(&self, symbol: &str) -> Option<&Holding> {
        self.holdings
            .iter()
            .find(|h| h.symbol.eq_ignore_ascii_case(symbol))
    }

    pub fn total_value(&self) -> Decimal {
        self.holdings.iter().map(Holding::total_value).sum()
    }
}

/// Complete state of all portfolios at one instant.
///
/// Serialized as a plain JSON array of portfolios; that array is the
/// durable snapshot format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    portfolios: Vec<Portfolio>,
}

impl Snapshot {
    pub fn new(portfolios: Vec<Portfolio>) -> Self {
        Self { portfolios }
    }

    pub fn portfolios(&self) -> &[Portfolio] {
        &self.portfolios
    }

    pub fn portfolio(&self, portfolio_id: &str) -> Option<&Portfolio> {
        self.portfolios.iter().find(|p| p.id == portfolio_id)
    }

    pub fn len(&self) -> usize {
        self.portfolios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.portfolios.is_empty()
    }
}

/// Holding as shown to the presentation layer, with derived totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingView {
    #[serde(flatten)]
    pub holding: Holding,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_value: Decimal,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub display_total_value: Option<Decimal>,
}

/// Portfolio as shown to the presentation layer.
///
/// `display_*` fields are present only when an exchange rate is cached.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioView {
    pub id: String,
    pub name: String,
    pub holdings: Vec<HoldingView>,
    pub last_refreshed_at: Option<DateTime<Utc>>,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_value: Decimal,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub display_total_value: Option<Decimal>,
    pub display_currency: Option<String>,
}

impl PortfolioView {
    pub fn new(portfolio: &Portfolio, rate: Option<&ExchangeRate>) -> Self {
        let display = |amount: Decimal| rate.map(|r| currency_converter::convert(amount, r.rate));

        let holdings = portfolio
            .holdings
            .iter()
            .map(|h| {
                let total_value = h.total_value();
                HoldingView {
                    holding: h.clone(),
                    total_value,
                    display_total_value: display(total_value),
                }
            })
            .collect();

        let total_value = portfolio.total_value();
        Self {
            id: portfolio.id.clone(),
            name: portfolio.name.clone(),
            holdings,
            last_refreshed_at: portfolio.last_refreshed_at,
            total_value,
            display_total_value: display(total_value),
            display_currency: rate.map(|r| r.to_currency.clone()),
        }
    }
}
