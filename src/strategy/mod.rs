//! Screening strategies.
//!
//! Contains the core logic for:
//! - Swing classification of the latest bars (breakout, trend, volatility)
//! - Scoring and annotation of swing matches
//! - The two-stage long-term screen (technical, then fundamental)
//! - Scanning the universe and ranking the results

mod long_term;
mod report;
mod scanner;
mod scoring;
mod swing;
mod types;

pub use long_term::{fundamental_strength, long_term_momentum, MomentumReading};
pub use report::{swing_label, ScanReport, LONG_TERM_LABEL};
pub use scanner::{
    filter_by_strategy, rank_long_term, rank_swing, strategy_counts, swing_result_from_rows,
    top_n, Scanner,
};
pub use scoring::{annotate, raw_score, Annotation};
pub use swing::{matched_strategies, momentum_breakout, momentum_volatility, trend_continuation};
pub use types::{LongTermResult, RiskLevel, Strategy, SwingResult};
