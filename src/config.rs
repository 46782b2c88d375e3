//! Job configuration loaded from YAML
//!
//! ```yaml
//! global:
//!   api_key_env: POLYGON_API_KEY
//!   pool_size: 1
//!   max_retries: 5
//!   page_delay_secs: 15
//!   holidays: [2024-01-01]
//! grouped_daily:
//!   output_dir: ./polygon/md/grouped_daily
//! aggregates:
//!   output_dir: ./polygon/md/aggregates
//!   tickers: [AAPL, MSFT]
//!   timespan: minute
//! ```

use crate::auth::EnvCredential;
use crate::calendar::WeekdayCalendar;
use crate::endpoint::{AggregatesParams, GroupedDailyParams, TickersParams};
use crate::error::{Error, Result, ResultExt};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::pagination::PaginationConfig;
use crate::types::{SortOrder, Timespan};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Top-Level Job Config
// ============================================================================

/// Complete job file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobConfig {
    /// Settings shared by every job
    #[serde(default)]
    pub global: GlobalConfig,

    /// Grouped daily job
    #[serde(default)]
    pub grouped_daily: Option<GroupedDailyJob>,

    /// Per-ticker aggregates job
    #[serde(default)]
    pub aggregates: Option<AggregatesJob>,

    /// Ticker list filters, used when `aggregates.tickers` is empty
    #[serde(default)]
    pub tickers: Option<TickersJob>,
}

impl JobConfig {
    /// Parse a job file from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a job file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&yaml)
    }

    /// Check values serde cannot check
    pub fn validate(&self) -> Result<()> {
        self.global.validate()?;
        if let Some(job) = &self.grouped_daily {
            check_range("grouped_daily", job.start_date, job.end_date)?;
        }
        if let Some(job) = &self.aggregates {
            check_range("aggregates", job.start_date, job.end_date)?;
            if job.multiplier == 0 {
                return Err(Error::invalid_value("aggregates.multiplier", "must be at least 1"));
            }
            if job.tickers.iter().any(|t| t.trim().is_empty()) {
                return Err(Error::invalid_value("aggregates.tickers", "contains an empty ticker"));
            }
        }
        Ok(())
    }
}

fn check_range(job: &str, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<()> {
    match (start, end) {
        (Some(s), Some(e)) if s > e => Err(Error::invalid_value(
            format!("{job}.start_date"),
            format!("{s} is after end_date {e}"),
        )),
        _ => Ok(()),
    }
}

// ============================================================================
// Global
// ============================================================================

/// Settings shared by every job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Concurrent connections (and concurrent dates in a job)
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Seconds between pages of one call
    #[serde(default = "default_page_delay_secs")]
    pub page_delay_secs: u64,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Client-side request budget
    #[serde(default)]
    pub requests_per_minute: Option<u32>,

    /// Non-trading weekdays
    #[serde(default)]
    pub holidays: Vec<NaiveDate>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            pool_size: default_pool_size(),
            max_retries: default_max_retries(),
            page_delay_secs: default_page_delay_secs(),
            timeout_secs: default_timeout_secs(),
            requests_per_minute: None,
            holidays: Vec::new(),
        }
    }
}

fn default_api_key_env() -> String {
    EnvCredential::DEFAULT_VAR.to_string()
}

fn default_pool_size() -> usize {
    1
}

fn default_max_retries() -> u32 {
    5
}

fn default_page_delay_secs() -> u64 {
    15
}

fn default_timeout_secs() -> u64 {
    30
}

impl GlobalConfig {
    fn validate(&self) -> Result<()> {
        if self.pool_size == 0 {
            return Err(Error::invalid_value("global.pool_size", "must be at least 1"));
        }
        if self.requests_per_minute == Some(0) {
            return Err(Error::invalid_value(
                "global.requests_per_minute",
                "must be at least 1",
            ));
        }
        if self.api_key_env.trim().is_empty() {
            return Err(Error::missing_field("global.api_key_env"));
        }
        Ok(())
    }

    /// Transport settings
    pub fn http_config(&self) -> HttpClientConfig {
        let builder = HttpClientConfig::builder()
            .pool_size(self.pool_size)
            .max_retries(self.max_retries)
            .timeout(Duration::from_secs(self.timeout_secs));
        match self.requests_per_minute {
            Some(n) => builder.rate_limit(RateLimiterConfig::per_minute(n)).build(),
            None => builder.build(),
        }
    }

    /// Pagination settings
    pub fn pagination_config(&self) -> PaginationConfig {
        PaginationConfig::new().with_page_delay(Duration::from_secs(self.page_delay_secs))
    }

    /// Calendar of weekdays minus the configured holidays
    pub fn calendar(&self) -> WeekdayCalendar {
        WeekdayCalendar::with_holidays(self.holidays.iter().copied())
    }

    /// Where the API key comes from
    pub fn credentials(&self) -> EnvCredential {
        EnvCredential::new(self.api_key_env.clone())
    }
}

// ============================================================================
// Jobs
// ============================================================================

/// Grouped daily job: one file per session date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupedDailyJob {
    /// Directory of `{date}.parquet` files
    #[serde(default = "default_grouped_dir")]
    pub output_dir: PathBuf,

    /// First date (historical mode)
    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    /// Last date (historical mode), default today
    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    #[serde(default = "default_true")]
    pub adjusted: bool,

    #[serde(default)]
    pub include_otc: bool,

    #[serde(default = "default_locale")]
    pub locale: String,

    #[serde(default = "default_market_type")]
    pub market_type: String,
}

impl GroupedDailyJob {
    /// Request parameters for one date
    pub fn params(&self, date: NaiveDate) -> GroupedDailyParams {
        GroupedDailyParams::new(date)
            .locale(&self.locale)
            .market_type(&self.market_type)
            .adjusted(self.adjusted)
            .include_otc(self.include_otc)
    }
}

/// Aggregates job: one file per ticker and session date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatesJob {
    /// Root of `{timespan}/{ticker}/{date}.parquet` files
    #[serde(default = "default_aggregates_dir")]
    pub output_dir: PathBuf,

    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    /// Tickers to fetch; empty means resolve through the ticker list
    #[serde(default)]
    pub tickers: Vec<String>,

    #[serde(default = "default_multiplier")]
    pub multiplier: u32,

    #[serde(default)]
    pub timespan: Timespan,

    #[serde(default = "default_true")]
    pub adjusted: bool,

    #[serde(default)]
    pub sort: SortOrder,

    #[serde(default = "default_aggregates_limit")]
    pub limit: u32,
}

impl AggregatesJob {
    /// Request parameters for one ticker on one date
    pub fn params(&self, ticker: &str, date: NaiveDate) -> AggregatesParams {
        AggregatesParams::new(ticker, self.multiplier, self.timespan, date, date)
            .adjusted(self.adjusted)
            .sort(self.sort)
            .limit(self.limit)
    }
}

/// Ticker list filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickersJob {
    #[serde(default)]
    pub market: Option<String>,

    #[serde(rename = "type", default)]
    pub ticker_type: Option<String>,

    #[serde(default)]
    pub exchange: Option<String>,

    #[serde(default)]
    pub active: Option<bool>,

    #[serde(default)]
    pub limit: Option<u32>,
}

impl TickersJob {
    /// Request parameters for the list as of `date`
    pub fn params(&self, date: NaiveDate) -> TickersParams {
        TickersParams {
            market: self.market.clone(),
            ticker_type: self.ticker_type.clone(),
            exchange: self.exchange.clone(),
            active: self.active,
            limit: self.limit,
            date: Some(date),
            ..TickersParams::default()
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_locale() -> String {
    "us".to_string()
}

fn default_market_type() -> String {
    "stocks".to_string()
}

fn default_multiplier() -> u32 {
    1
}

fn default_aggregates_limit() -> u32 {
    crate::endpoint::MAX_AGGREGATES_LIMIT
}

fn default_grouped_dir() -> PathBuf {
    PathBuf::from("./polygon/md/grouped_daily")
}

fn default_aggregates_dir() -> PathBuf {
    PathBuf::from("./polygon/md/aggregates")
}
