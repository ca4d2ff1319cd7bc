use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Normalized latest quote for one symbol.
///
/// Prices are always in the base currency; the provider's currency never
/// leaks past this type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Uppercase ticker symbol
    pub symbol: String,

    /// Latest close price as reported by the provider
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,

    /// Provider timestamp of the price
    pub as_of: DateTime<Utc>,
}

impl Quote {
    pub fn new(symbol: impl Into<String>, price: Decimal, as_of: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.into().to_uppercase(),
            price,
            as_of,
        }
    }
}
