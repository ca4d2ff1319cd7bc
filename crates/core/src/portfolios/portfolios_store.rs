//! Snapshot operations.
//!
//! Every function takes the current snapshot by reference and returns a new
//! one. Inputs are never mutated, and a failed check leaves nothing applied.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use tickerfolio_market_data::Quote;
use uuid::Uuid;

use super::portfolios_model::{Holding, Portfolio, Snapshot};
use crate::constants::{DISPLAY_DECIMAL_PRECISION, MAX_HOLDINGS_PER_PORTFOLIO, MAX_PORTFOLIOS};
use crate::errors::{Error, Result, ValidationError};

/// Trims and uppercases a ticker symbol, rejecting blanks.
pub fn normalize_symbol(symbol: &str) -> Result<String> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(Error::Validation(ValidationError::MissingField(
            "symbol".to_string(),
        )));
    }
    Ok(symbol.to_uppercase())
}

pub fn validate_quantity(quantity: u32) -> Result<()> {
    if quantity == 0 {
        return Err(Error::invalid_input("quantity must be a positive integer"));
    }
    Ok(())
}

/// Price rounded to two decimals, midpoint away from zero.
fn quote_price(quote: &Quote) -> Result<Decimal> {
    if quote.price.is_sign_negative() {
        return Err(Error::Provider(format!(
            "negative price {} for {}",
            quote.price, quote.symbol
        )));
    }
    Ok(quote
        .price
        .round_dp_with_strategy(DISPLAY_DECIMAL_PRECISION, RoundingStrategy::MidpointAwayFromZero))
}

fn find_portfolio<'a>(snapshot: &'a Snapshot, portfolio_id: &str) -> Result<&'a Portfolio> {
    snapshot
        .portfolio(portfolio_id)
        .ok_or_else(|| Error::NotFound(format!("portfolio {}", portfolio_id)))
}

/// Rebuilds the snapshot with `portfolio_id` replaced by `update(portfolio)`.
fn replace_portfolio<F>(snapshot: &Snapshot, portfolio_id: &str, update: F) -> Snapshot
where
    F: FnOnce(&Portfolio) -> Portfolio,
{
    let mut portfolios = snapshot.portfolios().to_vec();
    if let Some(slot) = portfolios.iter_mut().find(|p| p.id == portfolio_id) {
        let updated = update(slot);
        *slot = updated;
    }
    Snapshot::new(portfolios)
}

/// Checks whether `symbol` could be added to the portfolio right now.
///
/// Local only; the sync engine runs it before spending a network call.
pub fn check_can_add_holding(snapshot: &Snapshot, portfolio_id: &str, symbol: &str) -> Result<()> {
    let portfolio = find_portfolio(snapshot, portfolio_id)?;

    if portfolio.holding_by_symbol(symbol).is_some() {
        return Err(Error::DuplicateSymbol(symbol.to_uppercase()));
    }
    if portfolio.holdings.len() >= MAX_HOLDINGS_PER_PORTFOLIO {
        return Err(Error::CapacityExceeded {
            entity: "holdings",
            limit: MAX_HOLDINGS_PER_PORTFOLIO,
        });
    }
    Ok(())
}

pub fn add_portfolio(snapshot: &Snapshot, name: &str) -> Result<Snapshot> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation(ValidationError::MissingField(
            "name".to_string(),
        )));
    }
    if snapshot.len() >= MAX_PORTFOLIOS {
        return Err(Error::CapacityExceeded {
            entity: "portfolios",
            limit: MAX_PORTFOLIOS,
        });
    }

    let mut portfolios = snapshot.portfolios().to_vec();
    portfolios.push(Portfolio {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        holdings: Vec::new(),
        last_refreshed_at: None,
    });
    Ok(Snapshot::new(portfolios))
}

/// Removes the portfolio; an unknown id leaves the snapshot as is.
pub fn remove_portfolio(snapshot: &Snapshot, portfolio_id: &str) -> Snapshot {
    Snapshot::new(
        snapshot
            .portfolios()
            .iter()
            .filter(|p| p.id != portfolio_id)
            .cloned()
            .collect(),
    )
}

pub fn add_holding(
    snapshot: &Snapshot,
    portfolio_id: &str,
    symbol: &str,
    quantity: u32,
    quote: &Quote,
    now: DateTime<Utc>,
) -> Result<Snapshot> {
    let symbol = normalize_symbol(symbol)?;
    validate_quantity(quantity)?;
    check_can_add_holding(snapshot, portfolio_id, &symbol)?;
    let unit_price = quote_price(quote)?;

    Ok(replace_portfolio(snapshot, portfolio_id, |p| {
        let mut holdings = p.holdings.clone();
        holdings.push(Holding {
            id: Uuid::new_v4().to_string(),
            symbol,
            unit_price,
            quantity,
            selected: false,
        });
        Portfolio {
            holdings,
            last_refreshed_at: Some(now),
            ..p.clone()
        }
    }))
}

/// Drops every selected holding of the portfolio, keeping the others in order.
pub fn remove_selected_holdings(snapshot: &Snapshot, portfolio_id: &str) -> Snapshot {
    replace_portfolio(snapshot, portfolio_id, |p| Portfolio {
        holdings: p.holdings.iter().filter(|h| !h.selected).cloned().collect(),
        ..p.clone()
    })
}

/// Flips `selected` on one holding; unknown ids leave the snapshot as is.
pub fn toggle_holding_selection(snapshot: &Snapshot, portfolio_id: &str, holding_id: &str) -> Snapshot {
    replace_portfolio(snapshot, portfolio_id, |p| Portfolio {
        holdings: p
            .holdings
            .iter()
            .map(|h| Holding {
                selected: if h.id == holding_id { !h.selected } else { h.selected },
                ..h.clone()
            })
            .collect(),
        ..p.clone()
    })
}

/// Checks the invariants every snapshot must hold.
///
/// Snapshots built through this module always pass; the check exists for
/// payloads read back from storage.
pub fn validate_snapshot(snapshot: &Snapshot) -> Result<()> {
    if snapshot.len() > MAX_PORTFOLIOS {
        return Err(Error::CapacityExceeded {
            entity: "portfolios",
            limit: MAX_PORTFOLIOS,
        });
    }
    for portfolio in snapshot.portfolios() {
        if portfolio.name.trim().is_empty() {
            return Err(Error::invalid_input(format!(
                "portfolio {} has a blank name",
                portfolio.id
            )));
        }
        if portfolio.holdings.len() > MAX_HOLDINGS_PER_PORTFOLIO {
            return Err(Error::CapacityExceeded {
                entity: "holdings",
                limit: MAX_HOLDINGS_PER_PORTFOLIO,
            });
        }
        for (i, holding) in portfolio.holdings.iter().enumerate() {
            if normalize_symbol(&holding.symbol)? != holding.symbol {
                return Err(Error::invalid_input(format!(
                    "symbol '{}' is not normalized",
                    holding.symbol
                )));
            }
            if portfolio.holdings[..i].iter().any(|h| h.symbol == holding.symbol) {
                return Err(Error::DuplicateSymbol(holding.symbol.clone()));
            }
            validate_quantity(holding.quantity)?;
            if holding.unit_price.is_sign_negative()
                || holding.unit_price.round_dp(DISPLAY_DECIMAL_PRECISION) != holding.unit_price
            {
                return Err(Error::invalid_input(format!(
                    "invalid price {} for {}",
                    holding.unit_price, holding.symbol
                )));
            }
        }
    }
    Ok(())
}

/// Reprices one holding from a fresh quote.
///
/// The quote must be for the holding's own symbol.
pub fn apply_quote(
    snapshot: &Snapshot,
    portfolio_id: &str,
    holding_id: &str,
    quote: &Quote,
    now: DateTime<Utc>,
) -> Result<Snapshot> {
    let portfolio = find_portfolio(snapshot, portfolio_id)?;
    let holding = portfolio
        .holding(holding_id)
        .ok_or_else(|| Error::NotFound(format!("holding {}", holding_id)))?;
    if !holding.symbol.eq_ignore_ascii_case(quote.symbol.trim()) {
        return Err(Error::Provider(format!(
            "quote for {} cannot price holding {}",
            quote.symbol, holding.symbol
        )));
    }
    let unit_price = quote_price(quote)?;

    Ok(replace_portfolio(snapshot, portfolio_id, |p| Portfolio {
        holdings: p
            .holdings
            .iter()
            .map(|h| {
                if h.id == holding_id {
                    Holding {
                        unit_price,
                        ..h.clone()
                    }
                } else {
                    h.clone()
                }
            })
            .collect(),
        last_refreshed_at: Some(now),
        ..p.clone()
    }))
}
