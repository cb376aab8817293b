//! Error types for screening runs.

use thiserror::Error;

/// Why a single symbol produced no result.
///
/// Per-symbol evaluation returns `Result<_, SkipReason>`; the scanner counts
/// these and moves on to the next symbol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("no data returned by provider")]
    NoData,

    #[error("insufficient history: {bars} bars, need {required}")]
    InsufficientHistory { bars: usize, required: usize },

    #[error("no strategy matched")]
    NoStrategyMatch,

    #[error("long-term technical gate failed")]
    TechnicalGateFailed,

    #[error("provider did not answer within {secs}s")]
    FetchTimeout { secs: u64 },
}

impl SkipReason {
    /// Stable short label for skip counters in logs.
    pub fn label(&self) -> &'static str {
        match self {
            SkipReason::NoData => "no_data",
            SkipReason::InsufficientHistory { .. } => "insufficient_history",
            SkipReason::NoStrategyMatch => "no_strategy_match",
            SkipReason::TechnicalGateFailed => "technical_gate_failed",
            SkipReason::FetchTimeout { .. } => "fetch_timeout",
        }
    }
}

/// Failure of a whole scan.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("symbol universe is empty")]
    EmptyUniverse,
}
