//! Rounding and ratio helpers for reported figures.
//!
//! Indicator math runs on `f64`. Only the figures that leave the crate are
//! rounded, and they are rounded through `Decimal` so that the half-to-even
//! rule applies to the exact binary value rather than to its nearest
//! decimal rendering.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Round a float to `dp` decimal places (half-to-even on the exact value).
///
/// Non-finite values and values outside the `Decimal` range are returned
/// unchanged.
pub fn round_dp(value: f64, dp: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }

    Decimal::from_f64_retain(value)
        .map(|d| d.round_dp_with_strategy(dp, RoundingStrategy::MidpointNearestEven))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

/// Safe division that returns `None` if the divisor is zero or the result
/// is not finite.
pub fn safe_div(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    let q = numerator / denominator;
    q.is_finite().then_some(q)
}

/// Fractional change from `then` to `now` (`now / then - 1`).
pub fn fractional_change(now: f64, then: f64) -> Option<f64> {
    safe_div(now, then).map(|r| r - 1.0)
}

/// Convert a fraction to percent.
pub fn to_percent(fraction: f64) -> f64 {
    fraction * 100.0
}
