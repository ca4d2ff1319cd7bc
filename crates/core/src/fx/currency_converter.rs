//! Pure amount conversion.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::DISPLAY_DECIMAL_PRECISION;

/// `amount * rate`, rounded to two decimals (midpoint away from zero).
pub fn convert(amount: Decimal, rate: Decimal) -> Decimal {
    (amount * rate)
        .round_dp_with_strategy(DISPLAY_DECIMAL_PRECISION, RoundingStrategy::MidpointAwayFromZero)
}
