//! Configuration management for the stock screener.
//!
//! Loads settings from environment variables and config files.

use crate::market::HistoryPeriod;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Symbols to scan
    #[serde(default)]
    pub universe: UniverseConfig,
    /// Market data provider settings
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Swing strategy thresholds
    #[serde(default)]
    pub swing: SwingConfig,
    /// Long-term screen thresholds
    #[serde(default)]
    pub long_term: LongTermConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniverseConfig {
    /// Venue-qualified tickers, scanned in this order
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,
    /// Venue suffix stripped from tickers in results (e.g. ".IS")
    #[serde(default = "default_venue_suffix")]
    pub venue_suffix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Yahoo Finance query host
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Page fetched once to obtain the session cookie the crumb is bound to
    #[serde(default = "default_session_url")]
    pub session_url: String,
    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Upper bound on a single provider call made by the scanner, in seconds
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    /// History window for the swing scan ("3mo", "6mo", "1y", "2y")
    #[serde(default = "default_swing_period")]
    pub swing_period: String,
    /// History window for the long-term scan
    #[serde(default = "default_long_term_period")]
    pub long_term_period: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwingConfig {
    /// Breakout volume must be at least this multiple of the 20-day average
    #[serde(default = "default_breakout_volume_multiple")]
    pub breakout_volume_multiple: f64,
    /// Lower edge of the healthy RSI band (inclusive)
    #[serde(default = "default_rsi_min")]
    pub rsi_min: f64,
    /// Upper edge of the healthy RSI band (inclusive)
    #[serde(default = "default_rsi_max")]
    pub rsi_max: f64,
    /// ADX must be strictly above this for trend continuation
    #[serde(default = "default_adx_min")]
    pub adx_min: f64,
    /// Minimum ATR as a fraction of close (0.005 = 0.5%)
    #[serde(default = "default_min_atr_pct")]
    pub min_atr_pct: f64,
    /// Minimum Bollinger percent-of-band (0 = lower band, 1 = upper band)
    #[serde(default = "default_min_bollinger_pct")]
    pub min_bollinger_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LongTermConfig {
    /// P/E must be strictly between 0 and this value
    #[serde(default = "default_max_pe")]
    pub max_pe: f64,
    /// Maximum debt-to-equity, in the provider's reporting unit.
    ///
    /// Yahoo reports debt-to-equity as a percentage (45.3 means 0.453x), so
    /// the default of 150 reads as 1.5x. Other providers report a plain
    /// ratio; set this to 1.5 for those. The unit is not normalised here
    /// because the source itself is inconsistent about it.
    #[serde(default = "default_max_debt_to_equity")]
    pub max_debt_to_equity: f64,
    /// Require positive revenue growth for fundamental strength.
    ///
    /// Off by default: growth is checked and logged but does not gate,
    /// since the provider often leaves it unreported.
    #[serde(default)]
    pub enforce_revenue_growth: bool,
}

// Default value functions
fn default_symbols() -> Vec<String> {
    [
        "THYAO.IS", "ASELS.IS", "GARAN.IS", "AKBNK.IS", "EREGL.IS", "KCHOL.IS", "SAHOL.IS",
        "TUPRS.IS", "SISE.IS", "BIMAS.IS", "PETKM.IS", "TCELL.IS", "YKBNK.IS", "ISCTR.IS",
        "FROTO.IS", "TTKOM.IS", "ENKAI.IS", "KRDMD.IS", "VESTL.IS", "ARCLK.IS", "ALARK.IS",
        "DOAS.IS", "HEKTS.IS", "KOZAL.IS", "MGROS.IS", "ODAS.IS", "PGSUS.IS", "SASA.IS",
        "TOASO.IS", "TAVHL.IS",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_venue_suffix() -> String {
    ".IS".to_string()
}

fn default_base_url() -> String {
    crate::market::yahoo::YAHOO_BASE_URL.to_string()
}

fn default_session_url() -> String {
    crate::market::yahoo::YAHOO_SESSION_URL.to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_swing_period() -> String {
    "3mo".to_string()
}

fn default_long_term_period() -> String {
    "2y".to_string()
}

fn default_breakout_volume_multiple() -> f64 {
    1.0 // Volume at least equal to its 20-day average
}

fn default_rsi_min() -> f64 {
    50.0
}

fn default_rsi_max() -> f64 {
    70.0
}

fn default_adx_min() -> f64 {
    20.0
}

fn default_min_atr_pct() -> f64 {
    0.005 // 0.5% of close
}

fn default_min_bollinger_pct() -> f64 {
    0.60 // Upper 40% of the band
}

fn default_max_pe() -> f64 {
    35.0
}

fn default_max_debt_to_equity() -> f64 {
    150.0
}

impl Config {
    /// Load configuration from environment variables and config files.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::default()
                    .prefix("SCREENER")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("universe.symbols"),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !self.universe.symbols.is_empty(),
            "universe.symbols must not be empty"
        );

        anyhow::ensure!(
            self.provider.fetch_timeout_secs > 0 && self.provider.request_timeout_secs > 0,
            "provider timeouts must be positive"
        );

        self.provider.swing_period()?;
        self.provider.long_term_period()?;

        let swing = &self.swing;
        anyhow::ensure!(
            swing.rsi_min >= 0.0 && swing.rsi_min <= swing.rsi_max && swing.rsi_max <= 100.0,
            "rsi_min/rsi_max must satisfy 0 <= rsi_min <= rsi_max <= 100"
        );
        anyhow::ensure!(
            swing.breakout_volume_multiple > 0.0,
            "breakout_volume_multiple must be positive"
        );
        anyhow::ensure!(swing.adx_min >= 0.0, "adx_min must not be negative");
        anyhow::ensure!(swing.min_atr_pct >= 0.0, "min_atr_pct must not be negative");

        anyhow::ensure!(self.long_term.max_pe > 0.0, "max_pe must be positive");
        anyhow::ensure!(
            self.long_term.max_debt_to_equity > 0.0,
            "max_debt_to_equity must be positive"
        );

        Ok(())
    }
}

impl ProviderConfig {
    pub fn swing_period(&self) -> Result<HistoryPeriod> {
        self.swing_period
            .parse()
            .context("Invalid provider.swing_period")
    }

    pub fn long_term_period(&self) -> Result<HistoryPeriod> {
        self.long_term_period
            .parse()
            .context("Invalid provider.long_term_period")
    }
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            venue_suffix: default_venue_suffix(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            session_url: default_session_url(),
            request_timeout_secs: default_request_timeout(),
            fetch_timeout_secs: default_fetch_timeout(),
            swing_period: default_swing_period(),
            long_term_period: default_long_term_period(),
        }
    }
}

impl Default for SwingConfig {
    fn default() -> Self {
        Self {
            breakout_volume_multiple: default_breakout_volume_multiple(),
            rsi_min: default_rsi_min(),
            rsi_max: default_rsi_max(),
            adx_min: default_adx_min(),
            min_atr_pct: default_min_atr_pct(),
            min_bollinger_pct: default_min_bollinger_pct(),
        }
    }
}

impl Default for LongTermConfig {
    fn default() -> Self {
        Self {
            max_pe: default_max_pe(),
            max_debt_to_equity: default_max_debt_to_equity(),
            enforce_revenue_growth: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.universe.symbols.len(), 30);
        assert_eq!(config.provider.swing_period().unwrap(), HistoryPeriod::ThreeMonths);
        assert_eq!(config.provider.long_term_period().unwrap(), HistoryPeriod::TwoYears);
    }

    #[test]
    fn test_empty_universe_is_invalid() {
        let mut config = Config::default();
        config.universe.symbols.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_rsi_band_is_invalid() {
        let mut config = Config::default();
        config.swing.rsi_min = 75.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_period_is_invalid() {
        let mut config = Config::default();
        config.provider.long_term_period = "5y".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = serde_json::from_str(
            r#"{"long_term": {"max_debt_to_equity": 1.5}, "universe": {"symbols": ["AAPL"], "venue_suffix": ""}}"#,
        )
        .unwrap();

        assert_eq!(config.long_term.max_debt_to_equity, 1.5);
        assert_eq!(config.long_term.max_pe, 35.0);
        assert!(!config.long_term.enforce_revenue_growth);
        assert_eq!(config.swing.rsi_max, 70.0);
        assert_eq!(config.universe.symbols, vec!["AAPL"]);
        assert!(config.validate().is_ok());
    }
}
