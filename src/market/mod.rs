//! Market data access for the screener.
//!
//! ## Yahoo Finance
//! Daily OHLCV history and fundamentals over HTTP.
//!
//! ## In-memory
//! Pre-loaded series (optionally from a CSV directory) for offline scans
//! and tests.

mod memory;
mod traits;
mod types;
pub mod yahoo;

pub use memory::InMemoryProvider;
pub use traits::MarketDataProvider;
#[cfg(test)]
pub use traits::MockMarketDataProvider;
pub use types::{display_code, Bar, Fundamentals, HistoryPeriod};
pub use yahoo::YahooClient;
