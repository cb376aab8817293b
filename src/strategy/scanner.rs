//! Scanner for swing and long-term opportunities across the symbol universe.

use super::long_term::{fundamental_strength, long_term_momentum};
use super::scoring::{annotate, raw_score};
use super::swing::matched_strategies;
use super::types::{LongTermResult, Strategy, SwingResult};
use crate::config::{Config, SwingConfig};
use crate::error::{ScanError, SkipReason};
use crate::indicators::{
    enrich_long_term, enrich_swing, EnrichedRow, MIN_LONG_TERM_BARS, MIN_SWING_BARS,
};
use crate::market::{display_code, Bar, Fundamentals, HistoryPeriod, MarketDataProvider};
use crate::utils::{round_dp, safe_div, to_percent};
use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, trace, warn};

/// RSI assumed by the annotator when the last row carries none.
const NEUTRAL_RSI: f64 = 50.0;

/// Base of the long-term ranking score.
const LONG_TERM_BASE_SCORE: f64 = 10.0;
/// Weight of the 3-month return (percent) in the long-term score.
const LONG_TERM_RETURN_WEIGHT: f64 = 0.5;

/// Evaluates every configured symbol, one at a time, and ranks the matches.
pub struct Scanner {
    provider: Arc<dyn MarketDataProvider>,
    config: Config,
    swing_period: HistoryPeriod,
    long_term_period: HistoryPeriod,
}

impl Scanner {
    /// Create a scanner over `provider`. Fails if a configured history
    /// period does not parse.
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: Config) -> Result<Self> {
        let swing_period = config.provider.swing_period()?;
        let long_term_period = config.provider.long_term_period()?;
        Ok(Self {
            provider,
            config,
            swing_period,
            long_term_period,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.config.provider.fetch_timeout_secs)
    }

    async fn fetch_series(&self, symbol: &str, period: HistoryPeriod) -> Result<Vec<Bar>, SkipReason> {
        match tokio::time::timeout(self.fetch_timeout(), self.provider.fetch_series(symbol, period)).await {
            Ok(bars) => Ok(bars),
            Err(_) => {
                let secs = self.config.provider.fetch_timeout_secs;
                warn!(symbol, secs, "Series fetch timed out");
                Err(SkipReason::FetchTimeout { secs })
            }
        }
    }

    async fn fetch_fundamentals(&self, symbol: &str) -> Option<Fundamentals> {
        match tokio::time::timeout(self.fetch_timeout(), self.provider.fetch_fundamentals(symbol)).await {
            Ok(fundamentals) => fundamentals,
            Err(_) => {
                warn!(
                    symbol,
                    secs = self.config.provider.fetch_timeout_secs,
                    "Fundamentals fetch timed out, continuing without"
                );
                None
            }
        }
    }

    /// Evaluate one symbol for the swing scan.
    #[instrument(skip(self))]
    pub async fn evaluate_swing(&self, symbol: &str) -> Result<SwingResult, SkipReason> {
        let bars = self.fetch_series(symbol, self.swing_period).await?;
        if bars.is_empty() {
            return Err(SkipReason::NoData);
        }
        if bars.len() < MIN_SWING_BARS {
            return Err(SkipReason::InsufficientHistory {
                bars: bars.len(),
                required: MIN_SWING_BARS,
            });
        }

        let rows = enrich_swing(&bars);
        let code = display_code(symbol, &self.config.universe.venue_suffix);
        swing_result_from_rows(code, &rows, &self.config.swing)
    }

    /// Evaluate one symbol for the long-term scan.
    ///
    /// Fundamentals are fetched only after the technical gate passes.
    #[instrument(skip(self))]
    pub async fn evaluate_long_term(&self, symbol: &str) -> Result<LongTermResult, SkipReason> {
        let bars = self.fetch_series(symbol, self.long_term_period).await?;
        if bars.is_empty() {
            return Err(SkipReason::NoData);
        }
        if bars.len() < MIN_LONG_TERM_BARS {
            return Err(SkipReason::InsufficientHistory {
                bars: bars.len(),
                required: MIN_LONG_TERM_BARS,
            });
        }

        let rows = enrich_long_term(&bars);
        let reading = long_term_momentum(&rows).ok_or(SkipReason::TechnicalGateFailed)?;

        let fundamentals = self.fetch_fundamentals(symbol).await.unwrap_or_default();
        let mut strategies = vec![Strategy::LongTermMomentum];
        if fundamental_strength(&fundamentals, &self.config.long_term) {
            strategies.push(Strategy::FundamentalStrength);
        }

        let return_3m = to_percent(reading.return_3m);
        let return_1y = to_percent(reading.return_1y);

        trace!(symbol, return_3m, return_1y, pe = fundamentals.pe_ratio, "Long-term match");

        Ok(LongTermResult {
            code: display_code(symbol, &self.config.universe.venue_suffix),
            price: round_dp(reading.close, 2),
            return_3m: round_dp(return_3m, 1),
            return_1y: round_dp(return_1y, 1),
            pe_ratio: round_dp(fundamentals.pe_ratio, 2),
            debt_to_equity: round_dp(fundamentals.debt_to_equity, 2),
            strategies,
            score: LONG_TERM_BASE_SCORE + LONG_TERM_RETURN_WEIGHT * return_3m,
        })
    }

    /// Run the swing scan over the universe, ranked by priority score.
    #[instrument(skip(self))]
    pub async fn filter_stocks(&self) -> Result<Vec<SwingResult>, ScanError> {
        let symbols = self.universe()?;

        let mut results = Vec::new();
        let mut skipped: BTreeMap<&'static str, usize> = BTreeMap::new();

        for symbol in symbols {
            match self.evaluate_swing(symbol).await {
                Ok(result) => results.push(result),
                Err(reason) => {
                    debug!(%symbol, %reason, "Symbol skipped");
                    *skipped.entry(reason.label()).or_default() += 1;
                }
            }
        }

        rank_swing(&mut results);

        info!(
            scanned = symbols.len(),
            matched = results.len(),
            ?skipped,
            "Swing scan complete"
        );

        Ok(results)
    }

    /// Run the long-term scan over the universe, ranked by score.
    #[instrument(skip(self))]
    pub async fn scan_long_term(&self) -> Result<Vec<LongTermResult>, ScanError> {
        let symbols = self.universe()?;

        let mut results = Vec::new();
        let mut skipped: BTreeMap<&'static str, usize> = BTreeMap::new();

        for symbol in symbols {
            match self.evaluate_long_term(symbol).await {
                Ok(result) => results.push(result),
                Err(reason) => {
                    debug!(%symbol, %reason, "Symbol skipped");
                    *skipped.entry(reason.label()).or_default() += 1;
                }
            }
        }

        rank_long_term(&mut results);

        let fundamental = results
            .iter()
            .filter(|r| r.strategies.contains(&Strategy::FundamentalStrength))
            .count();
        info!(
            scanned = symbols.len(),
            matched = results.len(),
            fundamental,
            ?skipped,
            "Long-term scan complete"
        );

        Ok(results)
    }

    fn universe(&self) -> Result<&[String], ScanError> {
        let symbols = self.config.universe.symbols.as_slice();
        if symbols.is_empty() {
            return Err(ScanError::EmptyUniverse);
        }
        Ok(symbols)
    }
}

/// Build a swing result from an enriched series, using its last two rows.
pub fn swing_result_from_rows(
    code: String,
    rows: &[EnrichedRow],
    config: &SwingConfig,
) -> Result<SwingResult, SkipReason> {
    let [.., prev, last] = rows else {
        return Err(SkipReason::InsufficientHistory {
            bars: rows.len(),
            required: MIN_SWING_BARS,
        });
    };

    let strategies = matched_strategies(last, prev, config);
    if strategies.is_empty() {
        return Err(SkipReason::NoStrategyMatch);
    }

    let volume_change = last
        .volume_ma_20
        .and_then(|ma| safe_div(last.volume(), ma))
        .map(|ratio| round_dp(to_percent(ratio - 1.0), 1))
        .unwrap_or(0.0);
    let rsi = last.rsi_14.map(|r| round_dp(r, 2)).unwrap_or(NEUTRAL_RSI);
    let score = raw_score(&strategies);
    let annotation = annotate(&strategies, volume_change, rsi, score);

    Ok(SwingResult {
        code,
        price: round_dp(last.close(), 2),
        volume_change,
        rsi,
        score,
        strategies,
        estimated_holding_period_days: annotation.holding_days,
        risk_level: annotation.risk,
        reason: annotation.reason,
        priority_score: annotation.priority_score,
    })
}

/// Sort swing results by priority score, highest first. Ties keep
/// universe order.
pub fn rank_swing(results: &mut [SwingResult]) {
    results.sort_by(|a, b| b.priority_score.cmp(&a.priority_score));
}

/// Sort long-term results by score, highest first. Ties keep universe order.
pub fn rank_long_term(results: &mut [LongTermResult]) {
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
}

/// Keep results that matched `strategy`; `None` keeps everything.
pub fn filter_by_strategy(results: Vec<SwingResult>, strategy: Option<Strategy>) -> Vec<SwingResult> {
    match strategy {
        Some(strategy) => results
            .into_iter()
            .filter(|r| r.strategies.contains(&strategy))
            .collect(),
        None => results,
    }
}

/// First `n` entries of an already ranked list.
pub fn top_n<T>(mut results: Vec<T>, n: usize) -> Vec<T> {
    results.truncate(n);
    results
}

/// Number of results matching each swing strategy, in strategy order.
pub fn strategy_counts(results: &[SwingResult]) -> BTreeMap<Strategy, usize> {
    let mut counts = BTreeMap::new();
    for strategy in results.iter().flat_map(|r| r.strategies.iter()) {
        *counts.entry(*strategy).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::compounding_series;
    use crate::market::{InMemoryProvider, MockMarketDataProvider};
    use crate::strategy::swing::fixtures::{breakout_pair, row};
    use crate::strategy::types::RiskLevel;
    use async_trait::async_trait;
    use tokio_test::{assert_err, assert_ok};

    // =========================================================================
    // Test Helpers
    // =========================================================================

    fn config_for(symbols: &[&str]) -> Config {
        let mut config = Config::default();
        config.universe.symbols = symbols.iter().map(|s| s.to_string()).collect();
        config
    }

    fn scanner(provider: InMemoryProvider, symbols: &[&str]) -> (Scanner, Arc<InMemoryProvider>) {
        let provider = Arc::new(provider);
        let scanner = Scanner::new(provider.clone(), config_for(symbols)).unwrap();
        (scanner, provider)
    }

    fn fundamentals(pe_ratio: f64, debt_to_equity: f64) -> Fundamentals {
        Fundamentals {
            pe_ratio,
            debt_to_equity,
            revenue_growth: 5.0,
            ..Fundamentals::default()
        }
    }

    /// 70 rows whose last two form a clean breakout.
    fn breakout_rows() -> Vec<EnrichedRow> {
        let (last, prev) = breakout_pair();
        let mut rows: Vec<EnrichedRow> = (0..68).map(|_| row(95.0, 96.0, 1_000_000)).collect();
        rows.push(prev);
        rows.push(last);
        rows
    }

    fn swing_result(code: &str, priority_score: i32, strategies: Vec<Strategy>) -> SwingResult {
        SwingResult {
            code: code.to_string(),
            price: 10.0,
            volume_change: 0.0,
            rsi: 55.0,
            score: raw_score(&strategies),
            strategies,
            estimated_holding_period_days: 1,
            risk_level: RiskLevel::Low,
            reason: String::new(),
            priority_score,
        }
    }

    // =========================================================================
    // Swing Result Construction
    // =========================================================================

    #[test]
    fn test_breakout_scenario() {
        let result = swing_result_from_rows("XYZ".to_string(), &breakout_rows(), &SwingConfig::default()).unwrap();

        assert_eq!(result.strategies, vec![Strategy::MomentumBreakout]);
        assert_eq!(result.price, 110.0);
        assert_eq!(result.volume_change, 100.0);
        assert_eq!(result.rsi, 60.0);
        assert_eq!(result.score, 10);
        assert_eq!(result.estimated_holding_period_days, 2);
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert_eq!(result.reason, "Momentum Breakout + strong volume + healthy RSI");
        assert!(result.priority_score >= 50 + 10);
    }

    #[test]
    fn test_identical_rows_give_identical_results() {
        let config = SwingConfig::default();
        let a = swing_result_from_rows("A".to_string(), &breakout_rows(), &config).unwrap();
        let b = swing_result_from_rows("A".to_string(), &breakout_rows(), &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_no_match_is_skipped() {
        let mut rows = breakout_rows();
        rows.last_mut().unwrap().bar.close = 100.0; // not above previous high
        let err = swing_result_from_rows("A".to_string(), &rows, &SwingConfig::default()).unwrap_err();
        assert_eq!(err, SkipReason::NoStrategyMatch);
    }

    #[test]
    fn test_zero_volume_average_gives_zero_change() {
        let mut rows = breakout_rows();
        let last = rows.last_mut().unwrap();
        last.volume_ma_20 = Some(0.0);
        // Breakout still matches: volume >= 1.0 * 0
        let result = swing_result_from_rows("A".to_string(), &rows, &SwingConfig::default()).unwrap();
        assert_eq!(result.volume_change, 0.0);
        assert_eq!(result.reason, "Momentum Breakout but low volume");
    }

    #[test]
    fn test_single_row_is_insufficient() {
        let (last, _) = breakout_pair();
        assert!(matches!(
            swing_result_from_rows("A".to_string(), &[last], &SwingConfig::default()),
            Err(SkipReason::InsufficientHistory { bars: 1, .. })
        ));
    }

    // =========================================================================
    // Swing Scan
    // =========================================================================

    /// 69 bars see-sawing between 100 and 101 on flat volume, then a close
    /// at `last_close` on doubled volume.
    fn see_saw_then(last_close: f64) -> Vec<Bar> {
        let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bar = |i: u64, close: f64, volume: u64| {
            Bar::new(start + chrono::Days::new(i), close, close + 0.5, close - 0.5, close, volume)
        };
        let mut bars: Vec<Bar> = (0..69)
            .map(|i| bar(i, if i % 2 == 0 { 100.0 } else { 101.0 }, 1_000_000))
            .collect();
        bars.push(bar(69, last_close, 2_000_000));
        bars
    }

    #[tokio::test]
    async fn test_breakout_through_full_pipeline() {
        let provider = InMemoryProvider::new().with_series("XYZ.IS", see_saw_then(102.0));
        let (scanner, _) = scanner(provider, &["XYZ.IS"]);

        let result = assert_ok!(scanner.evaluate_swing("XYZ.IS").await);

        assert_eq!(result.code, "XYZ");
        assert_eq!(result.strategies[0], Strategy::MomentumBreakout);
        assert_eq!(result.price, 102.0);
        // 2M against a 20-bar average of 1.05M
        assert_eq!(result.volume_change, 90.5);
        assert!((50.0..=70.0).contains(&result.rsi));
        assert_eq!(result.estimated_holding_period_days, 2);
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert_eq!(result.reason, "Momentum Breakout + strong volume + healthy RSI");
        assert_eq!(result.priority_score, 50 + result.score);
    }

    #[tokio::test]
    async fn test_close_at_previous_high_is_not_a_breakout() {
        // Previous bar closed at 100 with a high of 100.5
        let provider = InMemoryProvider::new().with_series("XYZ.IS", see_saw_then(100.5));
        let (scanner, _) = scanner(provider, &["XYZ.IS"]);

        let outcome = scanner.evaluate_swing("XYZ.IS").await;
        assert!(outcome.map_or(true, |r| !r.strategies.contains(&Strategy::MomentumBreakout)));
    }

    #[tokio::test]
    async fn test_filter_stocks_skips_and_matches() {
        let provider = InMemoryProvider::new()
            .with_series("UP.IS", compounding_series(80, 0.01))
            .with_series("DOWN.IS", compounding_series(80, -0.01))
            .with_series("SHORT.IS", compounding_series(30, 0.01));
        let (scanner, provider) = scanner(provider, &["UP.IS", "DOWN.IS", "SHORT.IS", "MISSING.IS"]);

        let results = assert_ok!(scanner.filter_stocks().await);

        assert_eq!(results.len(), 1);
        let up = &results[0];
        assert_eq!(up.code, "UP");
        assert!(up.strategies.contains(&Strategy::TrendContinuation));
        assert!(!up.strategies.is_empty());
        assert_eq!(up.score, raw_score(&up.strategies));
        assert_eq!(provider.series_calls(), 4);
        assert_eq!(provider.fundamentals_calls(), 0);
    }

    #[tokio::test]
    async fn test_evaluate_swing_skip_reasons() {
        let provider = InMemoryProvider::new().with_series("SHORT.IS", compounding_series(30, 0.01));
        let (scanner, _) = scanner(provider, &["SHORT.IS"]);

        assert_eq!(scanner.evaluate_swing("NONE.IS").await, Err(SkipReason::NoData));
        assert_eq!(
            scanner.evaluate_swing("SHORT.IS").await,
            Err(SkipReason::InsufficientHistory {
                bars: 30,
                required: MIN_SWING_BARS
            })
        );
    }

    #[tokio::test]
    async fn test_filter_stocks_empty_series_from_mock() {
        let mut mock = MockMarketDataProvider::new();
        mock.expect_fetch_series()
            .times(2)
            .returning(|_, _| Vec::new());
        mock.expect_fetch_fundamentals().times(0);

        let scanner = Scanner::new(Arc::new(mock), config_for(&["A.IS", "B.IS"])).unwrap();
        let results = assert_ok!(scanner.filter_stocks().await);
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_empty_universe_fails_scan() {
        let (scanner, _) = scanner(InMemoryProvider::new(), &[]);
        assert_err!(scanner.filter_stocks().await);
        assert!(matches!(
            scanner.scan_long_term().await,
            Err(ScanError::EmptyUniverse)
        ));
    }

    #[test]
    fn test_rank_swing_is_non_increasing() {
        let mut results = vec![
            swing_result("A", 18, vec![Strategy::TrendContinuation]),
            swing_result("B", 60, vec![Strategy::MomentumBreakout]),
            swing_result("C", -2, vec![Strategy::TrendContinuation]),
            swing_result("D", 18, vec![Strategy::MomentumVolatility]),
        ];
        rank_swing(&mut results);

        assert!(results.windows(2).all(|w| w[0].priority_score >= w[1].priority_score));
        let codes: Vec<&str> = results.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["B", "A", "D", "C"]);
    }

    // =========================================================================
    // Long-Term Scan
    // =========================================================================

    #[tokio::test]
    async fn test_scan_long_term_two_stages() {
        let provider = InMemoryProvider::new()
            .with_series("PRICEY.IS", compounding_series(300, 0.003))
            .with_fundamentals("PRICEY.IS", fundamentals(40.0, 50.0))
            .with_series("GOOD.IS", compounding_series(300, 0.005))
            .with_fundamentals("GOOD.IS", fundamentals(12.0, 50.0))
            .with_series("DOWN.IS", compounding_series(300, -0.003))
            .with_fundamentals("DOWN.IS", fundamentals(8.0, 10.0))
            .with_series("YOUNG.IS", compounding_series(200, 0.005));
        let (scanner, provider) =
            scanner(provider, &["PRICEY.IS", "GOOD.IS", "DOWN.IS", "YOUNG.IS"]);

        let results = assert_ok!(scanner.scan_long_term().await);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].code, "GOOD");
        assert_eq!(
            results[0].strategies,
            vec![Strategy::LongTermMomentum, Strategy::FundamentalStrength]
        );
        assert_eq!(results[0].pe_ratio, 12.0);

        // P/E above the cap: still included on the technical gate alone
        assert_eq!(results[1].code, "PRICEY");
        assert_eq!(results[1].strategies, vec![Strategy::LongTermMomentum]);

        assert!(results[0].score >= results[1].score);

        // Only the two symbols past the technical gate were looked up
        assert_eq!(provider.fundamentals_calls(), 2);
    }

    #[tokio::test]
    async fn test_long_term_score_and_returns() {
        let provider = InMemoryProvider::new().with_series("UP.IS", compounding_series(300, 0.003));
        let (scanner, _) = scanner(provider, &["UP.IS"]);

        let result = scanner.evaluate_long_term("UP.IS").await.unwrap();

        let return_3m = (1.003f64.powi(62) - 1.0) * 100.0;
        assert!((result.score - (10.0 + 0.5 * return_3m)).abs() < 1e-9);
        assert_eq!(result.return_3m, round_dp(return_3m, 1));
        assert!(result.return_1y > result.return_3m);
        // No fundamentals on record: zeros, and no strength tag
        assert_eq!(result.pe_ratio, 0.0);
        assert_eq!(result.strategies, vec![Strategy::LongTermMomentum]);
    }

    #[tokio::test]
    async fn test_failed_gate_never_fetches_fundamentals() {
        let mut mock = MockMarketDataProvider::new();
        mock.expect_fetch_series()
            .returning(|_, _| compounding_series(300, -0.002));
        mock.expect_fetch_fundamentals().times(0);

        let scanner = Scanner::new(Arc::new(mock), config_for(&["A.IS", "B.IS"])).unwrap();

        assert_eq!(
            scanner.evaluate_long_term("A.IS").await,
            Err(SkipReason::TechnicalGateFailed)
        );
        let results = assert_ok!(scanner.scan_long_term().await);
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_long_term_requires_min_bars() {
        let mut mock = MockMarketDataProvider::new();
        mock.expect_fetch_series()
            .returning(|_, _| compounding_series(MIN_LONG_TERM_BARS - 1, 0.005));
        mock.expect_fetch_fundamentals().times(0);

        let scanner = Scanner::new(Arc::new(mock), config_for(&["A.IS"])).unwrap();
        assert!(matches!(
            scanner.evaluate_long_term("A.IS").await,
            Err(SkipReason::InsufficientHistory { bars: 259, required: 260 })
        ));
    }

    #[test]
    fn test_rank_long_term_is_non_increasing() {
        let make = |code: &str, score: f64| LongTermResult {
            code: code.to_string(),
            price: 1.0,
            return_3m: 0.0,
            return_1y: 0.0,
            pe_ratio: 0.0,
            debt_to_equity: 0.0,
            strategies: vec![Strategy::LongTermMomentum],
            score,
        };
        let mut results = vec![make("A", 12.5), make("B", 31.0), make("C", 10.2)];
        rank_long_term(&mut results);
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(results[0].code, "B");
    }

    // =========================================================================
    // Timeouts
    // =========================================================================

    struct SlowProvider {
        series: Vec<Bar>,
    }

    #[async_trait]
    impl MarketDataProvider for SlowProvider {
        async fn fetch_series(&self, symbol: &str, _period: HistoryPeriod) -> Vec<Bar> {
            if symbol.starts_with("SLOW") {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            self.series.clone()
        }

        async fn fetch_fundamentals(&self, _symbol: &str) -> Option<Fundamentals> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Some(fundamentals(12.0, 50.0))
        }
    }

    #[tokio::test]
    async fn test_slow_series_fetch_is_skipped() {
        let mut config = config_for(&["SLOW.IS", "FAST.IS"]);
        config.provider.fetch_timeout_secs = 1;
        let provider = SlowProvider {
            series: compounding_series(80, 0.01),
        };
        let scanner = Scanner::new(Arc::new(provider), config).unwrap();

        assert_eq!(
            scanner.evaluate_swing("SLOW.IS").await,
            Err(SkipReason::FetchTimeout { secs: 1 })
        );
        let results = assert_ok!(scanner.filter_stocks().await);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].code, "FAST");
    }

    #[tokio::test]
    async fn test_slow_fundamentals_fetch_counts_as_missing() {
        let mut config = config_for(&["FAST.IS"]);
        config.provider.fetch_timeout_secs = 1;
        let provider = SlowProvider {
            series: compounding_series(300, 0.003),
        };
        let scanner = Scanner::new(Arc::new(provider), config).unwrap();

        let result = scanner.evaluate_long_term("FAST.IS").await.unwrap();
        assert_eq!(result.strategies, vec![Strategy::LongTermMomentum]);
        assert_eq!(result.pe_ratio, 0.0);
    }

    // =========================================================================
    // Result Helpers
    // =========================================================================

    #[test]
    fn test_filter_by_strategy() {
        let results = vec![
            swing_result("A", 60, vec![Strategy::MomentumBreakout, Strategy::TrendContinuation]),
            swing_result("B", 38, vec![Strategy::TrendContinuation]),
            swing_result("C", 24, vec![Strategy::MomentumVolatility]),
        ];

        let trend = filter_by_strategy(results.clone(), Some(Strategy::TrendContinuation));
        assert_eq!(trend.iter().map(|r| r.code.as_str()).collect::<Vec<_>>(), vec!["A", "B"]);

        let all = filter_by_strategy(results.clone(), Strategy::from_key("all"));
        assert_eq!(all.len(), 3);

        let none = filter_by_strategy(
            vec![swing_result("B", 38, vec![Strategy::TrendContinuation])],
            Some(Strategy::MomentumBreakout),
        );
        assert!(none.is_empty());
    }

    #[test]
    fn test_top_n_and_counts() {
        let results = vec![
            swing_result("A", 60, vec![Strategy::MomentumBreakout, Strategy::TrendContinuation]),
            swing_result("B", 38, vec![Strategy::TrendContinuation]),
            swing_result("C", 24, vec![Strategy::MomentumVolatility]),
        ];

        let counts = strategy_counts(&results);
        assert_eq!(counts.get(&Strategy::TrendContinuation), Some(&2));
        assert_eq!(counts.get(&Strategy::MomentumBreakout), Some(&1));
        assert_eq!(counts.get(&Strategy::MomentumVolatility), Some(&1));
        assert_eq!(
            counts.keys().copied().collect::<Vec<_>>(),
            Strategy::SWING.to_vec()
        );

        assert_eq!(top_n(results.clone(), 2).len(), 2);
        assert_eq!(top_n(results, 10).len(), 3);
    }
}
