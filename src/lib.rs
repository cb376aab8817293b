//! # Stock Screener
//!
//! Swing and long-term equity screening over a fixed symbol universe
//! (Borsa Istanbul by default).
//!
//! ## Architecture
//!
//! - `config`: Configuration management and validation
//! - `error`: Per-symbol skip reasons and scan-level errors
//! - `market`: Market data providers (Yahoo Finance, in-memory / CSV)
//! - `indicators`: Technical indicator engine over daily OHLCV series
//! - `strategy`: Swing classifiers, scoring, long-term screen and the scanner
//! - `utils`: Rounding and ratio helpers

pub mod config;
pub mod error;
pub mod indicators;
pub mod market;
pub mod strategy;
pub mod utils;

pub use config::Config;
pub use error::{ScanError, SkipReason};
