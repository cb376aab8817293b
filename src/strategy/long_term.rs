//! Long-term screen.
//!
//! Two stages. The technical gate runs on price history alone; only symbols
//! that pass it have their fundamentals fetched and checked.

use crate::config::LongTermConfig;
use crate::indicators::EnrichedRow;
use crate::market::Fundamentals;
use crate::utils::fractional_change;
use tracing::{debug, trace};

/// Bars back to the close used for the 3-month return.
pub const LOOKBACK_3M: usize = 63;
/// Bars back to the close used for the 6-month return.
pub const LOOKBACK_6M: usize = 126;
/// Bars back to the close used for the 12-month return.
pub const LOOKBACK_1Y: usize = 252;

/// Trailing returns (fractions) of a symbol that passed the technical gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MomentumReading {
    pub close: f64,
    pub return_3m: f64,
    pub return_6m: f64,
    pub return_1y: f64,
}

/// Close `n` bars back, counting the last row as 1 back.
fn close_back(rows: &[EnrichedRow], n: usize) -> Option<f64> {
    let idx = rows.len().checked_sub(n)?;
    rows.get(idx).map(EnrichedRow::close)
}

/// Stage 1: close above the 200 EMA, positive 3/6/12-month returns and a
/// bullish MACD. Returns the trailing returns on a match.
pub fn long_term_momentum(rows: &[EnrichedRow]) -> Option<MomentumReading> {
    let last = rows.last()?;
    let ema_200 = last.ema_200?;
    let close = last.close();

    if close <= ema_200 {
        trace!(close, ema_200, "Close not above 200 EMA");
        return None;
    }

    if rows.len() < LOOKBACK_1Y {
        return None;
    }

    let return_3m = fractional_change(close, close_back(rows, LOOKBACK_3M)?)?;
    let return_6m = fractional_change(close, close_back(rows, LOOKBACK_6M)?)?;
    let return_1y = fractional_change(close, close_back(rows, LOOKBACK_1Y)?)?;

    if return_3m <= 0.0 || return_6m <= 0.0 || return_1y <= 0.0 {
        trace!(return_3m, return_6m, return_1y, "Trailing returns not all positive");
        return None;
    }

    if !last.macd_bullish() {
        return None;
    }

    Some(MomentumReading {
        close,
        return_3m,
        return_6m,
        return_1y,
    })
}

/// Stage 2: moderate P/E and bounded leverage.
///
/// Missing fundamentals read as zero, so a symbol without a reported P/E
/// never passes.
pub fn fundamental_strength(fundamentals: &Fundamentals, config: &LongTermConfig) -> bool {
    let pe = fundamentals.pe_ratio;
    if !(pe > 0.0 && pe < config.max_pe) {
        return false;
    }

    if fundamentals.debt_to_equity > config.max_debt_to_equity {
        return false;
    }

    if fundamentals.revenue_growth <= 0.0 {
        if config.enforce_revenue_growth {
            return false;
        }
        // Often unreported by the provider; recorded only
        debug!(
            revenue_growth = fundamentals.revenue_growth,
            "Non-positive revenue growth not enforced"
        );
    }

    true
}
