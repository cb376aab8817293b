//! Shared numeric helpers.

pub mod decimal;

pub use decimal::{fractional_change, round_dp, safe_div, to_percent};
