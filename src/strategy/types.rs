//! Strategy identifiers and scan result records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named screening rule a symbol can match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Strategy {
    #[serde(rename = "Momentum Breakout")]
    MomentumBreakout,
    #[serde(rename = "Trend Continuation")]
    TrendContinuation,
    #[serde(rename = "Momentum Volatility")]
    MomentumVolatility,
    #[serde(rename = "LT Momentum")]
    LongTermMomentum,
    #[serde(rename = "Fundamental Strength")]
    FundamentalStrength,
}

impl Strategy {
    /// Swing strategies in evaluation order.
    pub const SWING: [Strategy; 3] = [
        Strategy::MomentumBreakout,
        Strategy::TrendContinuation,
        Strategy::MomentumVolatility,
    ];

    /// Display name, identical to the serialized form.
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::MomentumBreakout => "Momentum Breakout",
            Strategy::TrendContinuation => "Trend Continuation",
            Strategy::MomentumVolatility => "Momentum Volatility",
            Strategy::LongTermMomentum => "LT Momentum",
            Strategy::FundamentalStrength => "Fundamental Strength",
        }
    }

    /// Snake-case selector key (`momentum_breakout`, ...).
    pub fn key(&self) -> &'static str {
        match self {
            Strategy::MomentumBreakout => "momentum_breakout",
            Strategy::TrendContinuation => "trend_continuation",
            Strategy::MomentumVolatility => "momentum_volatility",
            Strategy::LongTermMomentum => "lt_momentum",
            Strategy::FundamentalStrength => "fundamental_strength",
        }
    }

    /// Resolve a swing selector key. Unknown keys (including "all") give
    /// `None`, which callers treat as "no filter".
    pub fn from_key(key: &str) -> Option<Strategy> {
        Strategy::SWING
            .into_iter()
            .find(|s| s.key().eq_ignore_ascii_case(key.trim()))
    }

    /// Raw-score weight of a swing strategy.
    pub fn weight(&self) -> i32 {
        match self {
            Strategy::MomentumBreakout => 10,
            Strategy::TrendContinuation => 8,
            Strategy::MomentumVolatility => 9,
            Strategy::LongTermMomentum | Strategy::FundamentalStrength => 0,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Risk tier attached to a swing result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::High => write!(f, "High"),
        }
    }
}

/// One symbol's swing scan result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwingResult {
    /// Ticker without venue suffix
    pub code: String,
    /// Last close, 2 dp
    pub price: f64,
    /// Volume vs. its 20-day average in percent, 1 dp
    #[serde(rename = "volumeChange")]
    pub volume_change: f64,
    /// RSI(14), 2 dp
    pub rsi: f64,
    /// Sum of matched strategy weights
    pub score: i32,
    /// Matched strategies in evaluation order; never empty
    pub strategies: Vec<Strategy>,
    pub estimated_holding_period_days: u32,
    pub risk_level: RiskLevel,
    pub reason: String,
    /// Ranking key
    pub priority_score: i32,
}

/// One symbol's long-term scan result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongTermResult {
    pub code: String,
    pub price: f64,
    /// 3-month return in percent, 1 dp
    pub return_3m: f64,
    /// 12-month return in percent, 1 dp
    pub return_1y: f64,
    pub pe_ratio: f64,
    pub debt_to_equity: f64,
    pub strategies: Vec<Strategy>,
    /// `10 + 0.5 * return_3m` (unrounded return)
    pub score: f64,
}
