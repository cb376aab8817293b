//! Provider trait for price history and fundamentals.
//!
//! The screener never sees provider errors. Implementations log their own
//! failures and hand back an empty series or `None`, which the scanner
//! treats as "skip this symbol" (series) or "no fundamentals" (long-term
//! stage 2).

use super::types::{Bar, Fundamentals, HistoryPeriod};
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

/// Source of daily bars and fundamentals for a symbol universe.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch daily bars for `symbol` covering `period`, oldest first.
    ///
    /// Returns an empty vector on any failure or when no data exists.
    async fn fetch_series(&self, symbol: &str, period: HistoryPeriod) -> Vec<Bar>;

    /// Fetch the fundamentals snapshot for `symbol`.
    ///
    /// Returns `None` on any failure.
    async fn fetch_fundamentals(&self, symbol: &str) -> Option<Fundamentals>;
}
