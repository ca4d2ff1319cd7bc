use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Rate for one currency pair: `1 from_currency = rate to_currency`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    pub from_currency: String,
    pub to_currency: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub rate: Decimal,
    pub fetched_at: DateTime<Utc>,
}

impl ExchangeRate {
    pub fn new(from: &str, to: &str, rate: Decimal, fetched_at: DateTime<Utc>) -> Self {
        Self {
            from_currency: from.to_uppercase(),
            to_currency: to.to_uppercase(),
            rate,
            fetched_at,
        }
    }

    /// Returns true if this rate converts `from` into `to`.
    pub fn is_pair(&self, from: &str, to: &str) -> bool {
        self.from_currency.eq_ignore_ascii_case(from) && self.to_currency.eq_ignore_ascii_case(to)
    }
}
