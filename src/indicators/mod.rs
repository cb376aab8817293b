//! Indicator engine.
//!
//! Turns an OHLCV series into a row-aligned series of [`EnrichedRow`]s.
//! Two paths exist:
//! - [`enrich_swing`]: the full short-horizon set (EMA 10/20/50, MACD, RSI,
//!   stochastic, ATR, Bollinger, ADX, volume average, 10-bar high)
//! - [`enrich_long_term`]: EMA 50/200 and MACD over a multi-year window
//!
//! Both return an empty vector when the series is too short to warm up the
//! longest trailing window the callers rely on.

pub mod math;

use crate::market::Bar;
use tracing::trace;

/// Minimum bars for the swing path.
pub const MIN_SWING_BARS: usize = 60;
/// Minimum bars for the long-term path (200-bar EMA plus a 252-bar look-back).
pub const MIN_LONG_TERM_BARS: usize = 260;

pub const EMA_SHORT: usize = 10;
pub const EMA_MEDIUM: usize = 20;
pub const EMA_LONG: usize = 50;
pub const EMA_TREND: usize = 200;

pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;

pub const RSI_LENGTH: usize = 14;

pub const STOCH_K: usize = 14;
pub const STOCH_D: usize = 3;
pub const STOCH_SMOOTH_K: usize = 3;

pub const ATR_LENGTH: usize = 14;

pub const BOLLINGER_LENGTH: usize = 20;
pub const BOLLINGER_STD: f64 = 2.0;

pub const ADX_LENGTH: usize = 14;

pub const VOLUME_MA_LENGTH: usize = 20;
pub const HIGH_LOOKBACK: usize = 10;

/// A bar plus the indicators derived up to and including it.
///
/// Fields are `None` where the trailing window is not yet warm, and on the
/// long-term path for indicators that path does not compute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnrichedRow {
    pub bar: Bar,

    // Trend
    pub ema_10: Option<f64>,
    pub ema_20: Option<f64>,
    pub ema_50: Option<f64>,
    pub ema_200: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,

    // Momentum
    pub rsi_14: Option<f64>,
    pub stoch_k: Option<f64>,
    pub stoch_d: Option<f64>,

    // Volatility
    pub atr_14: Option<f64>,
    pub bb_lower: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_percent: Option<f64>,

    // Trend strength
    pub adx_14: Option<f64>,
    pub plus_di: Option<f64>,
    pub minus_di: Option<f64>,

    // Volume / range
    pub volume_ma_20: Option<f64>,
    pub high_10: Option<f64>,
}

impl EnrichedRow {
    /// A row with no indicators filled in.
    pub fn from_bar(bar: Bar) -> Self {
        Self {
            bar,
            ema_10: None,
            ema_20: None,
            ema_50: None,
            ema_200: None,
            macd: None,
            macd_signal: None,
            macd_histogram: None,
            rsi_14: None,
            stoch_k: None,
            stoch_d: None,
            atr_14: None,
            bb_lower: None,
            bb_middle: None,
            bb_upper: None,
            bb_percent: None,
            adx_14: None,
            plus_di: None,
            minus_di: None,
            volume_ma_20: None,
            high_10: None,
        }
    }

    pub fn close(&self) -> f64 {
        self.bar.close
    }

    pub fn high(&self) -> f64 {
        self.bar.high
    }

    pub fn volume(&self) -> f64 {
        self.bar.volume as f64
    }

    /// `true` when the MACD line is strictly above its signal line.
    pub fn macd_bullish(&self) -> bool {
        matches!((self.macd, self.macd_signal), (Some(m), Some(s)) if m > s)
    }
}

fn closes(series: &[Bar]) -> Vec<f64> {
    series.iter().map(|b| b.close).collect()
}

fn apply_macd(rows: &mut [EnrichedRow], closes: &[f64]) {
    let macd = math::macd(closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL);
    for (row, point) in rows.iter_mut().zip(macd) {
        if let Some(p) = point {
            row.macd = Some(p.macd);
            row.macd_signal = Some(p.signal);
            row.macd_histogram = Some(p.histogram);
        }
    }
}

/// Compute the swing indicator set.
///
/// Returns an empty vector when `series` has fewer than [`MIN_SWING_BARS`].
pub fn enrich_swing(series: &[Bar]) -> Vec<EnrichedRow> {
    if series.len() < MIN_SWING_BARS {
        trace!(bars = series.len(), required = MIN_SWING_BARS, "Series too short for swing indicators");
        return Vec::new();
    }

    let closes = closes(series);
    let volumes: Vec<f64> = series.iter().map(|b| b.volume as f64).collect();

    let ema_10 = math::ema(&closes, EMA_SHORT);
    let ema_20 = math::ema(&closes, EMA_MEDIUM);
    let ema_50 = math::ema(&closes, EMA_LONG);
    let rsi = math::rsi(&closes, RSI_LENGTH);
    let (stoch_k, stoch_d) = math::stochastic(series, STOCH_K, STOCH_D, STOCH_SMOOTH_K);
    let atr = math::atr(series, ATR_LENGTH);
    let bollinger = math::bollinger(&closes, BOLLINGER_LENGTH, BOLLINGER_STD);
    let adx = math::adx(series, ADX_LENGTH);
    let volume_ma = math::sma(&volumes, VOLUME_MA_LENGTH);
    let high_10 = math::rolling_max(&closes, HIGH_LOOKBACK);

    let mut rows: Vec<EnrichedRow> = series
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let mut row = EnrichedRow::from_bar(*bar);
            row.ema_10 = ema_10[i];
            row.ema_20 = ema_20[i];
            row.ema_50 = ema_50[i];
            row.rsi_14 = rsi[i];
            row.stoch_k = stoch_k[i];
            row.stoch_d = stoch_d[i];
            row.atr_14 = atr[i];
            if let Some(bb) = bollinger[i] {
                row.bb_lower = Some(bb.lower);
                row.bb_middle = Some(bb.middle);
                row.bb_upper = Some(bb.upper);
                row.bb_percent = bb.percent;
            }
            if let Some(a) = adx[i] {
                row.adx_14 = Some(a.adx);
                row.plus_di = Some(a.plus_di);
                row.minus_di = Some(a.minus_di);
            }
            row.volume_ma_20 = volume_ma[i];
            row.high_10 = high_10[i];
            row
        })
        .collect();

    apply_macd(&mut rows, &closes);
    rows
}

/// Compute the long-term indicator set (EMA 50/200 and MACD).
///
/// Returns an empty vector when `series` has fewer than [`MIN_LONG_TERM_BARS`].
pub fn enrich_long_term(series: &[Bar]) -> Vec<EnrichedRow> {
    if series.len() < MIN_LONG_TERM_BARS {
        trace!(bars = series.len(), required = MIN_LONG_TERM_BARS, "Series too short for long-term indicators");
        return Vec::new();
    }

    let closes = closes(series);
    let ema_50 = math::ema(&closes, EMA_LONG);
    let ema_200 = math::ema(&closes, EMA_TREND);

    let mut rows: Vec<EnrichedRow> = series
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let mut row = EnrichedRow::from_bar(*bar);
            row.ema_50 = ema_50[i];
            row.ema_200 = ema_200[i];
            row
        })
        .collect();

    apply_macd(&mut rows, &closes);
    rows
}
