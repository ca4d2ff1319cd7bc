//! Command objects consumed by the portfolio service.

use chrono::{DateTime, Utc};
use tickerfolio_market_data::Quote;

use super::portfolios_model::Snapshot;
use super::portfolios_store as store;
use crate::errors::Result;
use crate::events::DomainEvent;

/// One user- or engine-initiated change to the snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum PortfolioCommand {
    AddPortfolio {
        name: String,
    },
    RemovePortfolio {
        portfolio_id: String,
    },
    AddHolding {
        portfolio_id: String,
        symbol: String,
        quantity: u32,
        quote: Quote,
    },
    RemoveSelectedHoldings {
        portfolio_id: String,
    },
    ToggleHoldingSelection {
        portfolio_id: String,
        holding_id: String,
    },
    ApplyQuote {
        portfolio_id: String,
        holding_id: String,
        quote: Quote,
    },
}

impl PortfolioCommand {
    /// Runs the command against `snapshot`, producing the next snapshot.
    pub fn apply(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> Result<Snapshot> {
        match self {
            Self::AddPortfolio { name } => store::add_portfolio(snapshot, name),
            Self::RemovePortfolio { portfolio_id } => {
                Ok(store::remove_portfolio(snapshot, portfolio_id))
            }
            Self::AddHolding {
                portfolio_id,
                symbol,
                quantity,
                quote,
            } => store::add_holding(snapshot, portfolio_id, symbol, *quantity, quote, now),
            Self::RemoveSelectedHoldings { portfolio_id } => {
                Ok(store::remove_selected_holdings(snapshot, portfolio_id))
            }
            Self::ToggleHoldingSelection {
                portfolio_id,
                holding_id,
            } => Ok(store::toggle_holding_selection(
                snapshot,
                portfolio_id,
                holding_id,
            )),
            Self::ApplyQuote {
                portfolio_id,
                holding_id,
                quote,
            } => store::apply_quote(snapshot, portfolio_id, holding_id, quote, now),
        }
    }

    /// Events describing what changed between `before` and `after`.
    ///
    /// Commands that turned out to be no-ops produce nothing.
    pub fn events(&self, before: &Snapshot, after: &Snapshot) -> Vec<DomainEvent> {
        if before == after {
            return Vec::new();
        }

        match self {
            Self::AddPortfolio { .. } => after
                .portfolios()
                .last()
                .map(|p| DomainEvent::portfolio_created(p.id.clone()))
                .into_iter()
                .collect(),
            Self::RemovePortfolio { portfolio_id } => {
                vec![DomainEvent::portfolio_deleted(portfolio_id.clone())]
            }
            Self::AddHolding { portfolio_id, .. }
            | Self::RemoveSelectedHoldings { portfolio_id }
            | Self::ToggleHoldingSelection { portfolio_id, .. }
            | Self::ApplyQuote { portfolio_id, .. } => {
                vec![DomainEvent::holdings_changed(
                    portfolio_id.clone(),
                    changed_symbols(before, after, portfolio_id),
                )]
            }
        }
    }
}

/// Symbols whose holding differs between the two snapshots, including
/// holdings that appeared or disappeared.
fn changed_symbols(before: &Snapshot, after: &Snapshot, portfolio_id: &str) -> Vec<String> {
    let old = before.portfolio(portfolio_id).map(|p| p.holdings.as_slice()).unwrap_or(&[]);
    let new = after.portfolio(portfolio_id).map(|p| p.holdings.as_slice()).unwrap_or(&[]);

    let mut symbols: Vec<String> = new
        .iter()
        .filter(|h| !old.contains(h))
        .chain(old.iter().filter(|h| !new.iter().any(|n| n.id == h.id)))
        .map(|h| h.symbol.clone())
        .collect();
    symbols.dedup();
    symbols
}
