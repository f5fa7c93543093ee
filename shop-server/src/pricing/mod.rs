//! Money calculation using rust_decimal
//!
//! Prices are stored as `f64`; every derived amount is computed as `Decimal`
//! and rounded half-up to 2 decimal places before it is stored or returned.

use rust_decimal::prelude::*;
use shared::models::AmountBreakdown;

const DECIMAL_PLACES: u32 = 2;

/// Tax rate applied to the merchandise subtotal (20%)
pub const TAX_RATE: Decimal = Decimal::from_parts(20, 0, 0, false, 2);

/// Flat shipping fee for the standard method
pub const BASE_SHIPPING: Decimal = Decimal::from_parts(10, 0, 0, false, 0);

/// Express shipping multiplier (x1.75)
pub const EXPRESS_MULTIPLIER: Decimal = Decimal::from_parts(175, 0, 0, false, 2);

/// Shipping method used when the client does not name one
pub const DEFAULT_SHIPPING_METHOD: &str = "standard";

/// Convert f64 to Decimal; non-finite input counts as zero
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

#[inline]
fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert Decimal back to f64, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round_money(value).to_f64().unwrap_or_else(|| {
        tracing::error!(value = %value, "Decimal out of f64 range, defaulting to zero");
        0.0
    })
}

/// Σ(unit price × quantity), rounded
pub fn line_subtotal<I>(lines: I) -> Decimal
where
    I: IntoIterator<Item = (f64, i64)>,
{
    let sum = lines
        .into_iter()
        .map(|(price, quantity)| to_decimal(price) * Decimal::from(quantity))
        .sum::<Decimal>();
    round_money(sum)
}

/// Shipping fee for a method; unknown or absent methods ship standard
pub fn shipping_fee(method: Option<&str>) -> Decimal {
    match method {
        Some("express") => round_money(BASE_SHIPPING * EXPRESS_MULTIPLIER),
        _ => BASE_SHIPPING,
    }
}

/// Subtotal, tax, shipping and total for a set of `(unit price, quantity)` lines
///
/// Each derived value is rounded before it feeds the next one.
pub fn calculate_breakdown<I>(lines: I, shipping_method: Option<&str>) -> AmountBreakdown
where
    I: IntoIterator<Item = (f64, i64)>,
{
    let subtotal = line_subtotal(lines);
    let tax = round_money(subtotal * TAX_RATE);
    let shipping = shipping_fee(shipping_method);
    let total = round_money(subtotal + tax + shipping);

    AmountBreakdown {
        subtotal: to_f64(subtotal),
        tax: to_f64(tax),
        shipping: to_f64(shipping),
        total: to_f64(total),
    }
}

#[cfg(test)]
mod tests;
