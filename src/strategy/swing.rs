//! Swing strategy classifiers.
//!
//! Each classifier inspects the latest enriched row (and, for the breakout,
//! the row before it). A missing indicator value means "no match".

use super::types::Strategy;
use crate::config::SwingConfig;
use crate::indicators::EnrichedRow;
use tracing::trace;

/// Close breaks the previous bar's high on at-least-average volume, with a
/// healthy RSI and price above the 20 EMA.
pub fn momentum_breakout(row: &EnrichedRow, prev: &EnrichedRow, config: &SwingConfig) -> bool {
    let (Some(volume_ma), Some(rsi), Some(ema_20)) = (row.volume_ma_20, row.rsi_14, row.ema_20)
    else {
        return false;
    };

    if row.close() <= prev.high() {
        return false;
    }

    if row.volume() < config.breakout_volume_multiple * volume_ma {
        trace!(volume = row.volume(), volume_ma, "Breakout volume below average");
        return false;
    }

    (config.rsi_min..=config.rsi_max).contains(&rsi) && row.close() > ema_20
}

/// Price above the 20 and 50 EMAs, MACD above its signal line and ADX
/// above the trend-strength floor.
pub fn trend_continuation(row: &EnrichedRow, config: &SwingConfig) -> bool {
    let (Some(ema_20), Some(ema_50), Some(adx)) = (row.ema_20, row.ema_50, row.adx_14) else {
        return false;
    };

    row.close() > ema_20 && row.close() > ema_50 && row.macd_bullish() && adx > config.adx_min
}

/// Stochastic %K over %D, ATR at least a minimum share of price, and price
/// in the upper part of the Bollinger band.
pub fn momentum_volatility(row: &EnrichedRow, config: &SwingConfig) -> bool {
    let (Some(k), Some(d), Some(atr), Some(bb_percent)) =
        (row.stoch_k, row.stoch_d, row.atr_14, row.bb_percent)
    else {
        return false;
    };

    let close = row.close();
    if close <= 0.0 {
        return false;
    }

    k > d && atr / close >= config.min_atr_pct && bb_percent >= config.min_bollinger_pct
}

/// Strategies matched by the last two rows, in evaluation order.
pub fn matched_strategies(
    row: &EnrichedRow,
    prev: &EnrichedRow,
    config: &SwingConfig,
) -> Vec<Strategy> {
    let mut matched = Vec::with_capacity(Strategy::SWING.len());
    if momentum_breakout(row, prev, config) {
        matched.push(Strategy::MomentumBreakout);
    }
    if trend_continuation(row, config) {
        matched.push(Strategy::TrendContinuation);
    }
    if momentum_volatility(row, config) {
        matched.push(Strategy::MomentumVolatility);
    }
    matched
}
