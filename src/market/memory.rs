//! In-memory market data provider.
//!
//! Serves pre-loaded bars and fundamentals. Used for offline scans from a
//! directory of CSV files and as a deterministic provider in tests.
//!
//! Expected directory layout:
//! ```text
//! data/
//!   THYAO.IS.csv         date,open,high,low,close,volume
//!   ASELS.IS.csv
//!   fundamentals.json    { "THYAO.IS": { "pe_ratio": 4.1, ... }, ... }
//! ```

use super::traits::MarketDataProvider;
use super::types::{Bar, Fundamentals, HistoryPeriod};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

const FUNDAMENTALS_FILE: &str = "fundamentals.json";

/// Provider backed by in-memory series and fundamentals.
#[derive(Debug, Default)]
pub struct InMemoryProvider {
    series: HashMap<String, Vec<Bar>>,
    fundamentals: HashMap<String, Fundamentals>,
    series_calls: AtomicUsize,
    fundamentals_calls: AtomicUsize,
}

impl InMemoryProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the bar history of a symbol. Bars are sorted by date.
    pub fn with_series(mut self, symbol: &str, mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.date);
        self.series.insert(symbol.to_string(), bars);
        self
    }

    /// Add (or replace) the fundamentals of a symbol.
    pub fn with_fundamentals(mut self, symbol: &str, fundamentals: Fundamentals) -> Self {
        self.fundamentals.insert(symbol.to_string(), fundamentals);
        self
    }

    /// Load every `<SYMBOL>.csv` in `dir`, plus `fundamentals.json` if present.
    pub fn from_csv_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read data directory: {}", dir.display()))?;

        let mut provider = Self::new();

        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("csv") {
                continue;
            }
            let Some(symbol) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read CSV file: {}", path.display()))?;
            let bars = parse_csv(&content)
                .with_context(|| format!("Failed to parse CSV file: {}", path.display()))?;

            debug!(symbol, bars = bars.len(), "Loaded series");
            provider = provider.with_series(symbol, bars);
        }

        let fundamentals_path = dir.join(FUNDAMENTALS_FILE);
        if fundamentals_path.exists() {
            let content = std::fs::read_to_string(&fundamentals_path).with_context(|| {
                format!("Failed to read {}", fundamentals_path.display())
            })?;
            provider.fundamentals = serde_json::from_str(&content).with_context(|| {
                format!("Failed to parse {}", fundamentals_path.display())
            })?;
        }

        info!(
            symbols = provider.series.len(),
            fundamentals = provider.fundamentals.len(),
            "Loaded offline market data from {}",
            dir.display()
        );

        Ok(provider)
    }

    /// Symbols with a loaded series, sorted.
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.series.keys().cloned().collect();
        symbols.sort();
        symbols
    }

    /// Number of `fetch_series` calls served so far.
    pub fn series_calls(&self) -> usize {
        self.series_calls.load(Ordering::Relaxed)
    }

    /// Number of `fetch_fundamentals` calls served so far.
    pub fn fundamentals_calls(&self) -> usize {
        self.fundamentals_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl MarketDataProvider for InMemoryProvider {
    async fn fetch_series(&self, symbol: &str, period: HistoryPeriod) -> Vec<Bar> {
        self.series_calls.fetch_add(1, Ordering::Relaxed);

        let Some(bars) = self.series.get(symbol) else {
            return Vec::new();
        };
        let Some(last) = bars.last() else {
            return Vec::new();
        };

        let start = period.start_from(last.date);
        bars.iter().filter(|b| b.date > start).copied().collect()
    }

    async fn fetch_fundamentals(&self, symbol: &str) -> Option<Fundamentals> {
        self.fundamentals_calls.fetch_add(1, Ordering::Relaxed);
        self.fundamentals.get(symbol).copied()
    }
}

/// Parse `date,open,high,low,close,volume` rows. A header line is optional.
fn parse_csv(content: &str) -> Result<Vec<Bar>> {
    let mut bars = Vec::new();

    for (line_num, line) in content.lines().enumerate() {
        if line_num == 0 && line.trim_start().to_ascii_lowercase().starts_with("date") {
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }

        let bar = parse_row(line)
            .with_context(|| format!("Failed to parse line {}: {}", line_num + 1, line))?;
        bars.push(bar);
    }

    bars.sort_by_key(|b| b.date);
    Ok(bars)
}

fn parse_row(line: &str) -> Result<Bar> {
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    if parts.len() < 6 {
        anyhow::bail!(
            "Expected 6 columns (date,open,high,low,close,volume), got {}",
            parts.len()
        );
    }

    // Accept both plain dates and RFC 3339 timestamps in the date column
    let date_str = parts[0].split('T').next().unwrap_or(parts[0]);
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .with_context(|| format!("Invalid date: {}", parts[0]))?;

    let field = |idx: usize, name: &str| -> Result<f64> {
        parts[idx]
            .parse::<f64>()
            .with_context(|| format!("Invalid {}: {}", name, parts[idx]))
    };

    let volume = field(5, "volume")?;
    anyhow::ensure!(volume >= 0.0, "Negative volume: {}", parts[5]);

    Ok(Bar::new(
        date,
        field(1, "open")?,
        field(2, "high")?,
        field(3, "low")?,
        field(4, "close")?,
        volume.round() as u64,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn bar(y: i32, m: u32, d: u32, close: f64) -> Bar {
        Bar::new(
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            close,
            close + 1.0,
            close - 1.0,
            close,
            1000,
        )
    }

    #[test]
    fn test_csv_parsing() {
        let csv = r#"date,open,high,low,close,volume
2024-01-03,10.5,11.2,10.1,11.0,1200
2024-01-02,10.0,11.0,9.8,10.6,1000
2024-01-04T00:00:00Z,11.0,11.5,10.6,11.3,1500.0
"#;
        let bars = parse_csv(csv).unwrap();

        assert_eq!(bars.len(), 3);
        // Sorted ascending regardless of file order
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[2].close, 11.3);
        assert_eq!(bars[2].volume, 1500);
    }

    #[test]
    fn test_csv_rejects_bad_rows() {
        assert!(parse_csv("2024-01-02,10,11,9,10").is_err());
        assert!(parse_csv("2024-13-02,10,11,9,10,100").is_err());
        assert!(parse_csv("2024-01-02,10,11,9,abc,100").is_err());
        assert!(parse_csv("2024-01-02,10,11,9,10,-5").is_err());
    }

    #[tokio::test]
    async fn test_fetch_series_trims_to_period() {
        let bars = vec![
            bar(2023, 12, 29, 9.0),
            bar(2024, 1, 31, 10.0),
            bar(2024, 2, 29, 11.0),
            bar(2024, 4, 30, 12.0),
        ];
        let provider = InMemoryProvider::new().with_series("ABC.IS", bars);

        let three_months = provider
            .fetch_series("ABC.IS", HistoryPeriod::ThreeMonths)
            .await;
        // Window is (2024-01-30, 2024-04-30]
        assert_eq!(three_months.len(), 3);
        assert_eq!(three_months[0].close, 10.0);

        let two_years = provider.fetch_series("ABC.IS", HistoryPeriod::TwoYears).await;
        assert_eq!(two_years.len(), 4);

        assert!(provider
            .fetch_series("MISSING.IS", HistoryPeriod::TwoYears)
            .await
            .is_empty());
        assert_eq!(provider.series_calls(), 3);
    }

    #[tokio::test]
    async fn test_fetch_fundamentals_counts_calls() {
        let provider = InMemoryProvider::new().with_fundamentals(
            "ABC.IS",
            Fundamentals {
                pe_ratio: 12.0,
                ..Default::default()
            },
        );

        assert_eq!(provider.fetch_fundamentals("ABC.IS").await.map(|f| f.pe_ratio), Some(12.0));
        assert!(provider.fetch_fundamentals("XYZ.IS").await.is_none());
        assert_eq!(provider.fundamentals_calls(), 2);
    }

    #[tokio::test]
    async fn test_from_csv_dir() {
        let dir = tempfile::tempdir().unwrap();

        let mut f = std::fs::File::create(dir.path().join("THYAO.IS.csv")).unwrap();
        writeln!(f, "date,open,high,low,close,volume").unwrap();
        writeln!(f, "2024-01-02,10.0,11.0,9.8,10.6,1000").unwrap();
        writeln!(f, "2024-01-03,10.5,11.2,10.1,11.0,1200").unwrap();

        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        std::fs::write(
            dir.path().join(FUNDAMENTALS_FILE),
            r#"{"THYAO.IS": {"pe_ratio": 4.1, "debt_to_equity": 80.0}}"#,
        )
        .unwrap();

        let provider = InMemoryProvider::from_csv_dir(dir.path()).unwrap();
        assert_eq!(provider.symbols(), vec!["THYAO.IS"]);

        let bars = provider
            .fetch_series("THYAO.IS", HistoryPeriod::ThreeMonths)
            .await;
        assert_eq!(bars.len(), 2);

        let f = provider.fetch_fundamentals("THYAO.IS").await.unwrap();
        assert_eq!(f.pe_ratio, 4.1);
        assert_eq!(f.revenue_growth, 0.0);
    }

    #[test]
    fn test_from_csv_dir_missing_directory() {
        assert!(InMemoryProvider::from_csv_dir("/nonexistent/market-data").is_err());
    }
}
