//! Swing scoring and annotation.
//!
//! The raw score is the sum of matched strategy weights. Annotation then
//! picks a primary strategy (breakout, then trend, then volatility) to set
//! the holding period and rationale, applies a risk tier from volume and
//! RSI, and folds everything into an integer priority used for ranking.

use super::types::{RiskLevel, Strategy};

/// Volume change (percent) counted as strong confirmation for a breakout.
const STRONG_VOLUME_PCT: f64 = 20.0;
const RSI_HEALTHY_MIN: f64 = 50.0;
const RSI_HEALTHY_MAX: f64 = 70.0;

/// Sum of weights of the matched strategies.
pub fn raw_score(strategies: &[Strategy]) -> i32 {
    strategies.iter().map(Strategy::weight).sum()
}

/// Holding period, risk tier, rationale and priority for one swing match.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub holding_days: u32,
    pub risk: RiskLevel,
    pub reason: String,
    pub priority_score: i32,
}

/// Annotate a match from its rounded volume change (percent) and RSI.
pub fn annotate(strategies: &[Strategy], volume_change: f64, rsi: f64, score: i32) -> Annotation {
    let healthy_rsi = (RSI_HEALTHY_MIN..=RSI_HEALTHY_MAX).contains(&rsi);

    let (holding_days, rationale, mut priority): (u32, &str, f64) =
        if strategies.contains(&Strategy::MomentumBreakout) {
            if volume_change >= STRONG_VOLUME_PCT && healthy_rsi {
                (2, "Momentum Breakout + strong volume + healthy RSI", 50.0)
            } else if volume_change < STRONG_VOLUME_PCT {
                (1, "Momentum Breakout but low volume", 20.0)
            } else {
                (1, "Momentum Breakout", 10.0)
            }
        } else if strategies.contains(&Strategy::TrendContinuation) {
            if volume_change > 0.0 && rsi <= RSI_HEALTHY_MAX {
                (2, "Trend continues with positive volume", 30.0)
            } else if rsi > RSI_HEALTHY_MAX {
                (1, "Trend continues but RSI high", 10.0)
            } else {
                (1, "Trend continues", 10.0)
            }
        } else if strategies.contains(&Strategy::MomentumVolatility) {
            (1, "High volatility play", 15.0)
        } else {
            (1, "", 0.0)
        };
    let mut reason = rationale.to_string();

    let risk = if volume_change < 0.0 && rsi > RSI_HEALTHY_MAX {
        reason = format!("{reason} | Negative volume & high RSI");
        priority -= 20.0;
        RiskLevel::High
    } else if volume_change < 0.0 {
        reason = format!("{reason} | Negative volume");
        priority -= 10.0;
        RiskLevel::Medium
    } else if healthy_rsi {
        RiskLevel::Low
    } else {
        // RSI above the band reads Medium, as does anything else
        RiskLevel::Medium
    };

    priority += f64::from(score);

    Annotation {
        holding_days,
        risk,
        reason,
        priority_score: priority.trunc() as i32,
    }
}
