//! Yahoo Finance REST client.
//!
//! Provides read-only access to:
//! - Daily OHLCV history (v8 chart endpoint)
//! - Valuation and balance-sheet figures (v10 quoteSummary endpoint)
//!
//! quoteSummary requires a crumb bound to a session cookie. The cookie is
//! picked up from [`YAHOO_SESSION_URL`], the crumb from `/v1/test/getcrumb`,
//! and both are reused until Yahoo rejects them.

use super::traits::MarketDataProvider;
use super::types::{Bar, Fundamentals, HistoryPeriod};
use crate::config::ProviderConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

/// Base URL for the public Yahoo query host.
pub const YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Page that sets the session cookie (answers 404, the cookie is what matters).
pub const YAHOO_SESSION_URL: &str = "https://fc.yahoo.com";

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

const SUMMARY_MODULES: &str = "summaryDetail,defaultKeyStatistics,financialData";

/// Yahoo Finance client for daily bars and fundamentals.
#[derive(Debug, Clone)]
pub struct YahooClient {
    client: Client,
    base_url: String,
    session_url: String,
    crumb: Arc<Mutex<Option<String>>>,
}

impl YahooClient {
    /// Create a new client from provider configuration.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Self::with_urls(
            &config.base_url,
            &config.session_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Create a new client with a custom base URL, also used for the
    /// session cookie.
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        Self::with_urls(base_url, base_url, timeout)
    }

    /// Create a new client with custom query and session hosts.
    pub fn with_urls(base_url: &str, session_url: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .cookie_store(true)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session_url: session_url.to_string(),
            crumb: Arc::new(Mutex::new(None)),
        })
    }

    /// Current crumb, running the session handshake if none is cached.
    async fn crumb(&self) -> Result<String> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_ref() {
            return Ok(crumb.clone());
        }

        // Status is ignored; only the Set-Cookie header is needed
        if let Err(e) = self.client.get(&self.session_url).send().await {
            debug!("Session cookie request failed: {}", e);
        }

        let response = self
            .client
            .get(format!("{}/v1/test/getcrumb", self.base_url))
            .send()
            .await
            .context("Failed to send crumb request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read crumb response")?;
        if !status.is_success() {
            anyhow::bail!("Yahoo crumb error {}: {}", status, body);
        }

        let crumb = body.trim().to_string();
        anyhow::ensure!(
            !crumb.is_empty() && !crumb.contains('{'),
            "Yahoo returned an invalid crumb: {}",
            crumb
        );

        debug!("Obtained Yahoo crumb");
        *cached = Some(crumb.clone());
        Ok(crumb)
    }

    async fn invalidate_crumb(&self) {
        *self.crumb.lock().await = None;
    }

    /// Get daily bars for a symbol, oldest first.
    ///
    /// Rows where any of open/high/low/close is missing are dropped; a
    /// missing volume counts as zero.
    #[instrument(skip(self), name = "yahoo_get_chart")]
    pub async fn get_chart(&self, symbol: &str, period: HistoryPeriod) -> Result<Vec<Bar>> {
        let url = format!(
            "{}/v8/finance/chart/{}",
            self.base_url,
            urlencoding::encode(symbol)
        );

        let response = self
            .client
            .get(&url)
            .query(&[("range", period.as_range()), ("interval", "1d")])
            .send()
            .await
            .context("Failed to send chart request")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Yahoo chart error {}: {}", status, body);
        }

        let data: ChartResponse = response
            .json()
            .await
            .context("Failed to parse chart response")?;

        if let Some(err) = data.chart.error {
            anyhow::bail!("Yahoo chart error: {}", err.description);
        }

        let Some(result) = data.chart.result.and_then(|r| r.into_iter().next()) else {
            return Ok(Vec::new());
        };

        let bars = result.into_bars();
        debug!(symbol, bars = bars.len(), "Fetched chart");
        Ok(bars)
    }

    /// Get the fundamentals snapshot for a symbol.
    #[instrument(skip(self), name = "yahoo_get_fundamentals")]
    pub async fn get_fundamentals(&self, symbol: &str) -> Result<Fundamentals> {
        let url = format!(
            "{}/v10/finance/quoteSummary/{}",
            self.base_url,
            urlencoding::encode(symbol)
        );

        let crumb = self.crumb().await?;

        let response = self
            .client
            .get(&url)
            .query(&[("modules", SUMMARY_MODULES), ("crumb", crumb.as_str())])
            .send()
            .await
            .context("Failed to send quoteSummary request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read quoteSummary response")?;

        if !status.is_success() {
            if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
                self.invalidate_crumb().await;
            }
            match finance_error(&body) {
                Some(err) => anyhow::bail!(
                    "Yahoo quoteSummary error {}: {} ({})",
                    status,
                    err.description,
                    err.code
                ),
                None => anyhow::bail!("Yahoo quoteSummary error {}: {}", status, body),
            }
        }

        if let Some(err) = finance_error(&body) {
            anyhow::bail!("Yahoo quoteSummary error: {} ({})", err.description, err.code);
        }

        let data: SummaryResponse =
            serde_json::from_str(&body).context("Failed to parse quoteSummary response")?;

        if let Some(err) = data.quote_summary.error {
            anyhow::bail!("Yahoo quoteSummary error: {}", err.description);
        }

        let result = data
            .quote_summary
            .result
            .and_then(|r| r.into_iter().next())
            .context("quoteSummary returned no result")?;

        Ok(result.into_fundamentals())
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    async fn fetch_series(&self, symbol: &str, period: HistoryPeriod) -> Vec<Bar> {
        match self.get_chart(symbol, period).await {
            Ok(bars) => {
                if bars.is_empty() {
                    warn!(symbol, "No data found");
                }
                bars
            }
            Err(e) => {
                warn!(symbol, "Error fetching data: {:#}", e);
                Vec::new()
            }
        }
    }

    async fn fetch_fundamentals(&self, symbol: &str) -> Option<Fundamentals> {
        match self.get_fundamentals(symbol).await {
            Ok(f) => Some(f),
            Err(e) => {
                warn!(symbol, "Error fetching fundamentals: {:#}", e);
                None
            }
        }
    }
}

// ==================== Response Types ====================

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

/// Auth and rate-limit failures come back as `{"finance": {"error": ...}}`
/// instead of the endpoint's own envelope.
#[derive(Debug, Deserialize)]
struct FinanceResponse {
    finance: FinanceBody,
}

#[derive(Debug, Deserialize)]
struct FinanceBody {
    error: Option<ApiError>,
}

fn finance_error(body: &str) -> Option<ApiError> {
    serde_json::from_str::<FinanceResponse>(body)
        .ok()
        .and_then(|r| r.finance.error)
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    /// Exchange offset from UTC in seconds
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

impl ChartResult {
    fn into_bars(self) -> Vec<Bar> {
        let Some(quote) = self.indicators.quote.into_iter().next() else {
            return Vec::new();
        };
        let offset = self.meta.gmtoffset;

        self.timestamp
            .iter()
            .enumerate()
            .filter_map(|(i, &ts)| {
                let date = DateTime::from_timestamp(ts.checked_add(offset)?, 0)?.date_naive();
                let open = quote.open.get(i).copied().flatten()?;
                let high = quote.high.get(i).copied().flatten()?;
                let low = quote.low.get(i).copied().flatten()?;
                let close = quote.close.get(i).copied().flatten()?;
                let volume = quote
                    .volume
                    .get(i)
                    .copied()
                    .flatten()
                    .filter(|v| v.is_finite() && *v > 0.0)
                    .map(|v| v.round() as u64)
                    .unwrap_or(0);
                Some(Bar::new(date, open, high, low, close, volume))
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: SummaryBody,
}

#[derive(Debug, Deserialize)]
struct SummaryBody {
    result: Option<Vec<SummaryResult>>,
    error: Option<ApiError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResult {
    #[serde(default)]
    summary_detail: SummaryDetail,
    #[serde(default)]
    default_key_statistics: KeyStatistics,
    #[serde(default)]
    financial_data: FinancialData,
}

/// Yahoo wraps numbers as `{"raw": 1.23, "fmt": "1.23"}`; empty objects
/// mean "not reported".
#[derive(Debug, Default, Clone, Copy, Deserialize)]
struct RawValue {
    raw: Option<f64>,
}

fn raw(v: Option<RawValue>) -> f64 {
    v.and_then(|v| v.raw).filter(|x| x.is_finite()).unwrap_or(0.0)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetail {
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<RawValue>,
    #[serde(rename = "forwardPE")]
    forward_pe: Option<RawValue>,
    dividend_yield: Option<RawValue>,
    market_cap: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyStatistics {
    trailing_eps: Option<RawValue>,
    forward_eps: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinancialData {
    debt_to_equity: Option<RawValue>,
    free_cashflow: Option<RawValue>,
    revenue_growth: Option<RawValue>,
}

impl SummaryResult {
    fn into_fundamentals(self) -> Fundamentals {
        let detail = self.summary_detail;
        let stats = self.default_key_statistics;
        let financial = self.financial_data;

        Fundamentals {
            pe_ratio: raw(detail.trailing_pe),
            forward_pe: raw(detail.forward_pe),
            eps_trailing: raw(stats.trailing_eps),
            eps_forward: raw(stats.forward_eps),
            debt_to_equity: raw(financial.debt_to_equity),
            free_cash_flow: raw(financial.free_cashflow),
            dividend_yield: raw(detail.dividend_yield) * 100.0,
            market_cap: raw(detail.market_cap),
            revenue_growth: raw(financial.revenue_growth) * 100.0,
        }
    }
}
