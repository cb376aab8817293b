//! Serialisable envelope for a finished scan.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Scan-type label of a long-term scan.
pub const LONG_TERM_LABEL: &str = "longterm";

/// Scan-type label of a swing scan, from the strategy key as requested.
///
/// Unrecognised keys are kept as given; characters that cannot appear in
/// a file name become `_`.
pub fn swing_label(strategy_key: &str) -> String {
    let key: String = strategy_key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("swing_{key}")
}

/// A result list stamped with its scan type and creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport<T> {
    pub timestamp: DateTime<Local>,
    #[serde(rename = "type")]
    pub scan_type: String,
    pub count: usize,
    pub data: Vec<T>,
}

impl<T: Serialize> ScanReport<T> {
    pub fn new(scan_type: impl Into<String>, data: Vec<T>) -> Self {
        Self::at(Local::now(), scan_type, data)
    }

    pub fn at(timestamp: DateTime<Local>, scan_type: impl Into<String>, data: Vec<T>) -> Self {
        Self {
            timestamp,
            scan_type: scan_type.into(),
            count: data.len(),
            data,
        }
    }

    /// `scan_YYYYMMDD_HHMMSS_<type>.json`
    pub fn file_name(&self) -> String {
        format!(
            "scan_{}_{}.json",
            self.timestamp.format("%Y%m%d_%H%M%S"),
            self.scan_type
        )
    }

    /// Write the report as pretty JSON. A directory path receives
    /// [`Self::file_name`] inside it. Returns the path written.
    pub fn write_to(&self, path: &Path) -> Result<std::path::PathBuf> {
        let target = if path.is_dir() {
            path.join(self.file_name())
        } else {
            path.to_path_buf()
        };

        let json = serde_json::to_string_pretty(self).context("Failed to serialize scan report")?;
        std::fs::write(&target, json)
            .with_context(|| format!("Failed to write scan report: {}", target.display()))?;

        info!(path = %target.display(), count = self.count, scan_type = %self.scan_type, "Scan report written");
        Ok(target)
    }
}
