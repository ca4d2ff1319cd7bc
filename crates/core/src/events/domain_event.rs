//! Domain event types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Domain events emitted by core services after committed changes.
///
/// These events represent facts about the engine state. Runtime adapters
/// translate them into notifications (SSE stream, toasts, re-renders).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// A portfolio was created.
    PortfolioCreated { portfolio_id: String },

    /// A portfolio was deleted.
    PortfolioDeleted { portfolio_id: String },

    /// Holdings of a portfolio were added, removed, repriced or (de)selected.
    HoldingsChanged {
        portfolio_id: String,
        symbols: Vec<String>,
    },

    /// A refresh of a portfolio started (busy flag set).
    RefreshStarted { portfolio_id: String },

    /// A refresh of a portfolio finished (busy flag cleared).
    RefreshCompleted {
        portfolio_id: String,
        refreshed: usize,
        failed: usize,
        skipped: usize,
    },

    /// Writing the durable mirror failed; the engine keeps running in memory.
    PersistenceFailed { message: String },

    /// A write succeeded after one or more failures.
    PersistenceRestored,

    /// A new exchange rate was cached.
    ExchangeRateUpdated {
        from_currency: String,
        to_currency: String,
        #[serde(with = "rust_decimal::serde::str")]
        rate: Decimal,
    },

    /// Refreshing the exchange rate failed; the previous rate (if any) stays.
    ExchangeRateFailed { message: String },
}

impl DomainEvent {
    pub fn portfolio_created(portfolio_id: impl Into<String>) -> Self {
        Self::PortfolioCreated {
            portfolio_id: portfolio_id.into(),
        }
    }

    pub fn portfolio_deleted(portfolio_id: impl Into<String>) -> Self {
        Self::PortfolioDeleted {
            portfolio_id: portfolio_id.into(),
        }
    }

    pub fn holdings_changed(portfolio_id: impl Into<String>, symbols: Vec<String>) -> Self {
        Self::HoldingsChanged {
            portfolio_id: portfolio_id.into(),
            symbols,
        }
    }

    pub fn refresh_started(portfolio_id: impl Into<String>) -> Self {
        Self::RefreshStarted {
            portfolio_id: portfolio_id.into(),
        }
    }

    pub fn refresh_completed(
        portfolio_id: impl Into<String>,
        refreshed: usize,
        failed: usize,
        skipped: usize,
    ) -> Self {
        Self::RefreshCompleted {
            portfolio_id: portfolio_id.into(),
            refreshed,
            failed,
            skipped,
        }
    }

    pub fn persistence_failed(message: impl Into<String>) -> Self {
        Self::PersistenceFailed {
            message: message.into(),
        }
    }

    pub fn exchange_rate_updated(from: &str, to: &str, rate: Decimal) -> Self {
        Self::ExchangeRateUpdated {
            from_currency: from.to_string(),
            to_currency: to.to_string(),
            rate,
        }
    }

    pub fn exchange_rate_failed(message: impl Into<String>) -> Self {
        Self::ExchangeRateFailed {
            message: message.into(),
        }
    }
}
