//! Commission split calculation using rust_decimal for precision
//!
//! All splits are computed with `Decimal` internally, then converted to
//! `f64` for storage/serialization. The commission is rounded once, to
//! whole currency units; company revenue is the exact remainder, so the two
//! halves always sum to the fee.

use rust_decimal::prelude::*;

/// Rounding for monetary values at the storage boundary (2 decimal places)
const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Split a delivery fee into (agent commission, company revenue).
///
/// `commission = round(fee * percentage / 100)` to whole currency units,
/// half away from zero; `revenue = fee - commission` exactly.
pub fn commission_split(fee: Decimal, percentage: u32) -> (Decimal, Decimal) {
    let commission = (fee * Decimal::from(percentage) / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let revenue = fee - commission;
    (commission, revenue)
}
