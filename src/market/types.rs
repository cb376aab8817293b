//! Market data types consumed by the screener.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One trading day's OHLCV bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Fundamentals snapshot for a single symbol.
///
/// Every field defaults to zero when the provider does not report it.
/// `dividend_yield` and `revenue_growth` are percentages. `debt_to_equity`
/// is passed through in whatever unit the provider uses (Yahoo reports it
/// as a percentage, e.g. `45.3` for 0.453x).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fundamentals {
    pub pe_ratio: f64,
    pub forward_pe: f64,
    pub eps_trailing: f64,
    pub eps_forward: f64,
    pub debt_to_equity: f64,
    pub free_cash_flow: f64,
    pub dividend_yield: f64,
    pub market_cap: f64,
    pub revenue_growth: f64,
}

/// Look-back window requested from a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryPeriod {
    ThreeMonths,
    SixMonths,
    OneYear,
    TwoYears,
}

impl HistoryPeriod {
    /// Range string understood by the Yahoo chart endpoint.
    pub fn as_range(&self) -> &'static str {
        match self {
            HistoryPeriod::ThreeMonths => "3mo",
            HistoryPeriod::SixMonths => "6mo",
            HistoryPeriod::OneYear => "1y",
            HistoryPeriod::TwoYears => "2y",
        }
    }

    pub fn months(&self) -> u32 {
        match self {
            HistoryPeriod::ThreeMonths => 3,
            HistoryPeriod::SixMonths => 6,
            HistoryPeriod::OneYear => 12,
            HistoryPeriod::TwoYears => 24,
        }
    }

    /// First calendar date covered by this period when it ends on `last`.
    pub fn start_from(&self, last: NaiveDate) -> NaiveDate {
        last.checked_sub_months(Months::new(self.months()))
            .unwrap_or(NaiveDate::MIN)
    }
}

impl fmt::Display for HistoryPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_range())
    }
}

impl FromStr for HistoryPeriod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "3mo" => Ok(HistoryPeriod::ThreeMonths),
            "6mo" => Ok(HistoryPeriod::SixMonths),
            "1y" | "12mo" => Ok(HistoryPeriod::OneYear),
            "2y" | "24mo" => Ok(HistoryPeriod::TwoYears),
            other => anyhow::bail!("Unsupported history period: {}", other),
        }
    }
}

/// Strip the venue suffix from a ticker for display (`THYAO.IS` -> `THYAO`).
pub fn display_code(symbol: &str, venue_suffix: &str) -> String {
    if venue_suffix.is_empty() {
        return symbol.to_string();
    }
    symbol
        .strip_suffix(venue_suffix)
        .unwrap_or(symbol)
        .to_string()
}
