//! Error types and retry classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The error enum for all quote provider operations
//! - [`RetryClass`]: Classification the sync engine uses to decide on retries

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Errors that can occur while talking to a quote provider.
///
/// Each variant is classified into a [`RetryClass`] via the [`retry_class`](Self::retry_class)
/// method. This crate never retries on its own.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketDataError {
    /// The provider has no data for the requested symbol.
    /// This is a terminal error - retrying won't help.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The provider rate limited the request (HTTP 429 or an API note).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The request exceeded the caller-supplied timeout.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// Transport failure or a malformed/unexpected payload.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },
}

impl MarketDataError {
    /// Shorthand for a [`MarketDataError::ProviderError`].
    pub fn provider(provider: &str, message: impl Into<String>) -> Self {
        Self::ProviderError {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// Returns the retry classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use tickerfolio_market_data::errors::{MarketDataError, RetryClass};
    ///
    /// let error = MarketDataError::RateLimited { provider: "ALPHA_VANTAGE".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    ///
    /// let error = MarketDataError::SymbolNotFound("INVALID".to_string());
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::SymbolNotFound(_) | Self::ProviderError { .. } => RetryClass::Never,
            Self::RateLimited { .. } | Self::Timeout { .. } => RetryClass::WithBackoff,
        }
    }
}
