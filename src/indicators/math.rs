//! Trailing-window indicator primitives.
//!
//! Every function returns one value per input row. Rows without enough
//! history to produce a value are `None`; no value at row `t` depends on
//! rows after `t`.

use crate::market::Bar;

/// MACD line, signal line and histogram (`macd - signal`) at one row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdPoint {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Bollinger bands at one row.
///
/// `percent` is 0 at the lower band and 1 at the upper band; it is `None`
/// when the bands collapse onto the mean.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerPoint {
    pub lower: f64,
    pub middle: f64,
    pub upper: f64,
    pub percent: Option<f64>,
}

/// Directional movement at one row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdxPoint {
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
}

/// Apply `f` over each full trailing window of `n` values.
///
/// A window containing a missing value yields `None`.
fn rolling<F>(values: &[Option<f64>], n: usize, f: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> f64,
{
    let mut out = vec![None; values.len()];
    if n == 0 {
        return out;
    }
    let mut window = Vec::with_capacity(n);

    for i in (n - 1)..values.len() {
        window.clear();
        window.extend(values[i + 1 - n..=i].iter().map_while(|v| *v));
        if window.len() == n {
            out[i] = Some(f(&window));
        }
    }
    out
}

fn lift(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().map(|v| Some(*v)).collect()
}

fn mean(window: &[f64]) -> f64 {
    window.iter().sum::<f64>() / window.len() as f64
}

/// Simple moving average.
pub fn sma(values: &[f64], n: usize) -> Vec<Option<f64>> {
    rolling(&lift(values), n, mean)
}

fn sma_opt(values: &[Option<f64>], n: usize) -> Vec<Option<f64>> {
    rolling(values, n, mean)
}

/// Rolling maximum over the trailing `n` values.
pub fn rolling_max(values: &[f64], n: usize) -> Vec<Option<f64>> {
    rolling(&lift(values), n, |w| w.iter().copied().fold(f64::MIN, f64::max))
}

/// Rolling population standard deviation.
pub fn rolling_std(values: &[f64], n: usize) -> Vec<Option<f64>> {
    rolling(&lift(values), n, |w| {
        let m = mean(w);
        (w.iter().map(|x| (x - m).powi(2)).sum::<f64>() / w.len() as f64).sqrt()
    })
}

/// Recursive average seeded with the simple mean of the first `n` values.
///
/// `value_t = alpha * x_t + (1 - alpha) * value_{t-1}`. Leading `None`s
/// are skipped; a `None` after the seed restarts the warm-up.
fn seeded_average(values: &[Option<f64>], n: usize, alpha: f64) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if n == 0 {
        return out;
    }

    let mut seed_sum = 0.0;
    let mut seed_count = 0usize;
    let mut prev: Option<f64> = None;

    for (i, value) in values.iter().enumerate() {
        let Some(x) = *value else {
            seed_sum = 0.0;
            seed_count = 0;
            prev = None;
            continue;
        };

        prev = match prev {
            Some(p) => Some(alpha * x + (1.0 - alpha) * p),
            None => {
                seed_sum += x;
                seed_count += 1;
                (seed_count == n).then(|| seed_sum / n as f64)
            }
        };
        out[i] = prev;
    }
    out
}

/// Exponential moving average (`alpha = 2 / (n + 1)`), SMA-seeded.
pub fn ema(values: &[f64], n: usize) -> Vec<Option<f64>> {
    ema_opt(&lift(values), n)
}

fn ema_opt(values: &[Option<f64>], n: usize) -> Vec<Option<f64>> {
    seeded_average(values, n, 2.0 / (n as f64 + 1.0))
}

/// Wilder's smoothing (`alpha = 1 / n`), SMA-seeded.
pub fn wilder(values: &[Option<f64>], n: usize) -> Vec<Option<f64>> {
    seeded_average(values, n, 1.0 / n as f64)
}

/// MACD with `fast`/`slow` EMAs of close and a `signal` EMA of the MACD line.
pub fn macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Vec<Option<MacdPoint>> {
    let fast_ema = ema(closes, fast);
    let slow_ema = ema(closes, slow);

    let line: Vec<Option<f64>> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();
    let signal_line = ema_opt(&line, signal);

    line.iter()
        .zip(&signal_line)
        .map(|(m, s)| {
            let (macd, signal) = ((*m)?, (*s)?);
            Some(MacdPoint {
                macd,
                signal,
                histogram: macd - signal,
            })
        })
        .collect()
}

/// Relative strength index with Wilder-smoothed gains and losses.
///
/// A window with no losses reads 100; a window with no movement at all
/// reads 50.
pub fn rsi(closes: &[f64], n: usize) -> Vec<Option<f64>> {
    let mut gains = vec![None; closes.len()];
    let mut losses = vec![None; closes.len()];
    for i in 1..closes.len() {
        let change = closes[i] - closes[i - 1];
        gains[i] = Some(change.max(0.0));
        losses[i] = Some((-change).max(0.0));
    }

    let avg_gain = wilder(&gains, n);
    let avg_loss = wilder(&losses, n);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(g, l)| {
            let (g, l) = ((*g)?, (*l)?);
            Some(if l == 0.0 {
                if g == 0.0 {
                    50.0
                } else {
                    100.0
                }
            } else {
                100.0 - 100.0 / (1.0 + g / l)
            })
        })
        .collect()
}

/// Slow stochastic oscillator.
///
/// Raw %K over `k` bars is smoothed over `smooth_k` bars to give %K, and
/// %D is the `d`-bar average of %K.
pub fn stochastic(
    bars: &[Bar],
    k: usize,
    d: usize,
    smooth_k: usize,
) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    let mut raw = vec![None; bars.len()];
    if k > 0 {
        for i in (k - 1)..bars.len() {
            let window = &bars[i + 1 - k..=i];
            let highest = window.iter().map(|b| b.high).fold(f64::MIN, f64::max);
            let lowest = window.iter().map(|b| b.low).fold(f64::MAX, f64::min);
            let range = highest - lowest;
            if range > 0.0 {
                raw[i] = Some(100.0 * (bars[i].close - lowest) / range);
            }
        }
    }

    let stoch_k = sma_opt(&raw, smooth_k);
    let stoch_d = sma_opt(&stoch_k, d);
    (stoch_k, stoch_d)
}

/// True range. The first row has no previous close and is `None`.
pub fn true_range(bars: &[Bar]) -> Vec<Option<f64>> {
    let mut out = vec![None; bars.len()];
    for i in 1..bars.len() {
        let prev_close = bars[i - 1].close;
        let bar = &bars[i];
        out[i] = Some(
            (bar.high - bar.low)
                .max((bar.high - prev_close).abs())
                .max((bar.low - prev_close).abs()),
        );
    }
    out
}

/// Average true range (Wilder-smoothed).
pub fn atr(bars: &[Bar], n: usize) -> Vec<Option<f64>> {
    wilder(&true_range(bars), n)
}

/// Bollinger bands: `n`-bar SMA of close +/- `num_std` population deviations.
pub fn bollinger(closes: &[f64], n: usize, num_std: f64) -> Vec<Option<BollingerPoint>> {
    let middle = sma(closes, n);
    let std = rolling_std(closes, n);

    closes
        .iter()
        .zip(middle.iter().zip(&std))
        .map(|(close, (m, s))| {
            let (middle, std) = ((*m)?, (*s)?);
            let lower = middle - num_std * std;
            let upper = middle + num_std * std;
            let width = upper - lower;
            let percent = (width > 0.0).then(|| (close - lower) / width);
            Some(BollingerPoint {
                lower,
                middle,
                upper,
                percent,
            })
        })
        .collect()
}

/// Average directional index with +DI / -DI.
///
/// The first ADX value appears at row `2n - 1`.
pub fn adx(bars: &[Bar], n: usize) -> Vec<Option<AdxPoint>> {
    let len = bars.len();
    let mut plus_dm = vec![None; len];
    let mut minus_dm = vec![None; len];
    for i in 1..len {
        let up = bars[i].high - bars[i - 1].high;
        let down = bars[i - 1].low - bars[i].low;
        plus_dm[i] = Some(if up > down && up > 0.0 { up } else { 0.0 });
        minus_dm[i] = Some(if down > up && down > 0.0 { down } else { 0.0 });
    }

    let smoothed_tr = wilder(&true_range(bars), n);
    let smoothed_plus = wilder(&plus_dm, n);
    let smoothed_minus = wilder(&minus_dm, n);

    let di: Vec<Option<(f64, f64)>> = (0..len)
        .map(|i| {
            let tr = smoothed_tr[i].filter(|tr| *tr > 0.0)?;
            Some((
                100.0 * smoothed_plus[i]? / tr,
                100.0 * smoothed_minus[i]? / tr,
            ))
        })
        .collect();

    let dx: Vec<Option<f64>> = di
        .iter()
        .map(|d| {
            let (plus, minus) = (*d)?;
            let sum = plus + minus;
            Some(if sum > 0.0 {
                100.0 * (plus - minus).abs() / sum
            } else {
                0.0
            })
        })
        .collect();

    let adx_line = wilder(&dx, n);

    adx_line
        .iter()
        .zip(&di)
        .map(|(a, d)| {
            let (plus_di, minus_di) = (*d)?;
            Some(AdxPoint {
                adx: (*a)?,
                plus_di,
                minus_di,
            })
        })
        .collect()
}
