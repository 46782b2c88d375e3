//! Request parameters, one struct per endpoint
//!
//! Each struct carries path parameters as required fields and query
//! parameters as options. `validate()` runs before any request is sent.

use crate::error::{Error, Result};
use crate::types::{SortOrder, Timespan};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Largest `limit` the aggregates endpoint accepts
pub const MAX_AGGREGATES_LIMIT: u32 = 50_000;

/// Largest `limit` the ticker list endpoint accepts
pub const MAX_TICKERS_LIMIT: u32 = 1_000;

/// Ordered query parameters; unset options are skipped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    /// Create an empty query
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `key=value` when `value` is set
    #[must_use]
    pub fn opt(mut self, key: &str, value: Option<impl ToString>) -> Self {
        if let Some(v) = value {
            self.pairs.push((key.to_string(), v.to_string()));
        }
        self
    }

    /// Append `key=value`
    #[must_use]
    pub fn set(self, key: &str, value: impl ToString) -> Self {
        self.opt(key, Some(value))
    }

    /// The pairs, in insertion order
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// True when nothing was set
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

fn require_ticker(ticker: &str) -> Result<()> {
    if ticker.trim().is_empty() {
        Err(Error::invalid_value("ticker", "must not be empty"))
    } else {
        Ok(())
    }
}

fn require_limit(limit: Option<u32>, max: u32) -> Result<()> {
    match limit {
        Some(0) => Err(Error::invalid_value("limit", "must be at least 1")),
        Some(n) if n > max => Err(Error::invalid_value(
            "limit",
            format!("{n} exceeds the maximum of {max}"),
        )),
        _ => Ok(()),
    }
}

// ============================================================================
// Market Data
// ============================================================================

/// Parameters of the grouped daily endpoint (all tickers, one date)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedDailyParams {
    pub date: NaiveDate,
    pub locale: String,
    pub market_type: String,
    pub adjusted: Option<bool>,
    pub include_otc: Option<bool>,
}

impl GroupedDailyParams {
    /// US stocks on `date`
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            locale: "us".to_string(),
            market_type: "stocks".to_string(),
            adjusted: None,
            include_otc: None,
        }
    }

    /// Set the locale path segment
    #[must_use]
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Set the market type path segment
    #[must_use]
    pub fn market_type(mut self, market_type: impl Into<String>) -> Self {
        self.market_type = market_type.into();
        self
    }

    /// Request split-adjusted prices
    #[must_use]
    pub fn adjusted(mut self, adjusted: bool) -> Self {
        self.adjusted = Some(adjusted);
        self
    }

    /// Include OTC securities
    #[must_use]
    pub fn include_otc(mut self, include: bool) -> Self {
        self.include_otc = Some(include);
        self
    }

    /// Check path segments are present
    pub fn validate(&self) -> Result<()> {
        if self.locale.trim().is_empty() {
            return Err(Error::invalid_value("locale", "must not be empty"));
        }
        if self.market_type.trim().is_empty() {
            return Err(Error::invalid_value("market_type", "must not be empty"));
        }
        Ok(())
    }

    /// Query string parameters
    pub fn query(&self) -> Query {
        Query::new()
            .opt("adjusted", self.adjusted)
            .opt("include_otc", self.include_otc)
    }
}

/// Parameters of the ticker-range aggregates endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatesParams {
    pub ticker: String,
    pub multiplier: u32,
    pub timespan: Timespan,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub adjusted: Option<bool>,
    pub sort: Option<SortOrder>,
    pub limit: Option<u32>,
}

impl AggregatesParams {
    /// `multiplier` x `timespan` bars of `ticker` between `from` and `to` inclusive
    pub fn new(
        ticker: impl Into<String>,
        multiplier: u32,
        timespan: Timespan,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            multiplier,
            timespan,
            from,
            to,
            adjusted: None,
            sort: None,
            limit: None,
        }
    }

    /// Request split-adjusted prices
    #[must_use]
    pub fn adjusted(mut self, adjusted: bool) -> Self {
        self.adjusted = Some(adjusted);
        self
    }

    /// Sort bars by timestamp
    #[must_use]
    pub fn sort(mut self, sort: SortOrder) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Base aggregates per page
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Check ticker, multiplier, range, and limit
    pub fn validate(&self) -> Result<()> {
        require_ticker(&self.ticker)?;
        if self.multiplier == 0 {
            return Err(Error::invalid_value("multiplier", "must be at least 1"));
        }
        if self.from > self.to {
            return Err(Error::invalid_value(
                "from",
                format!("{} is after {}", self.from, self.to),
            ));
        }
        require_limit(self.limit, MAX_AGGREGATES_LIMIT)
    }

    /// Query string parameters
    pub fn query(&self) -> Query {
        Query::new()
            .opt("adjusted", self.adjusted)
            .opt("sort", self.sort)
            .opt("limit", self.limit)
    }
}

/// Parameters of the daily open/close endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyOpenCloseParams {
    pub ticker: String,
    pub date: NaiveDate,
    pub adjusted: Option<bool>,
}

impl DailyOpenCloseParams {
    /// Summary of `ticker` on `date`
    pub fn new(ticker: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            ticker: ticker.into(),
            date,
            adjusted: None,
        }
    }

    /// Request split-adjusted prices
    #[must_use]
    pub fn adjusted(mut self, adjusted: bool) -> Self {
        self.adjusted = Some(adjusted);
        self
    }

    /// Check the ticker
    pub fn validate(&self) -> Result<()> {
        require_ticker(&self.ticker)
    }

    /// Query string parameters
    pub fn query(&self) -> Query {
        Query::new().opt("adjusted", self.adjusted)
    }
}

// ============================================================================
// Reference Data
// ============================================================================

/// Filters of the ticker list endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickersParams {
    pub ticker: Option<String>,
    pub ticker_type: Option<String>,
    pub market: Option<String>,
    pub exchange: Option<String>,
    pub cusip: Option<String>,
    pub cik: Option<String>,
    pub date: Option<NaiveDate>,
    pub search: Option<String>,
    pub active: Option<bool>,
    pub order: Option<SortOrder>,
    pub sort: Option<String>,
    pub limit: Option<u32>,
}

impl TickersParams {
    /// No filters
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact ticker
    #[must_use]
    pub fn ticker(mut self, ticker: impl Into<String>) -> Self {
        self.ticker = Some(ticker.into());
        self
    }

    /// Security type code (see the ticker types endpoint)
    #[must_use]
    pub fn ticker_type(mut self, code: impl Into<String>) -> Self {
        self.ticker_type = Some(code.into());
        self
    }

    /// Market (stocks, crypto, fx, otc, indices)
    #[must_use]
    pub fn market(mut self, market: impl Into<String>) -> Self {
        self.market = Some(market.into());
        self
    }

    /// Primary exchange MIC
    #[must_use]
    pub fn exchange(mut self, exchange: impl Into<String>) -> Self {
        self.exchange = Some(exchange.into());
        self
    }

    /// Tickers as of `date`
    #[must_use]
    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Free-text search on ticker or name
    #[must_use]
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Only active (or only delisted) tickers
    #[must_use]
    pub fn active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    /// Sort direction
    #[must_use]
    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = Some(order);
        self
    }

    /// Sort field
    #[must_use]
    pub fn sort(mut self, field: impl Into<String>) -> Self {
        self.sort = Some(field.into());
        self
    }

    /// Results per page
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Check the page limit
    pub fn validate(&self) -> Result<()> {
        require_limit(self.limit, MAX_TICKERS_LIMIT)
    }

    /// Query string parameters
    pub fn query(&self) -> Query {
        Query::new()
            .opt("ticker", self.ticker.as_deref())
            .opt("type", self.ticker_type.as_deref())
            .opt("market", self.market.as_deref())
            .opt("exchange", self.exchange.as_deref())
            .opt("cusip", self.cusip.as_deref())
            .opt("cik", self.cik.as_deref())
            .opt("date", self.date)
            .opt("search", self.search.as_deref())
            .opt("active", self.active)
            .opt("order", self.order)
            .opt("sort", self.sort.as_deref())
            .opt("limit", self.limit)
    }
}

/// Filters of the ticker types endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickerTypesParams {
    pub asset_class: Option<String>,
    pub locale: Option<String>,
}

impl TickerTypesParams {
    /// No filters
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to an asset class
    #[must_use]
    pub fn asset_class(mut self, asset_class: impl Into<String>) -> Self {
        self.asset_class = Some(asset_class.into());
        self
    }

    /// Restrict to a locale
    #[must_use]
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Query string parameters
    pub fn query(&self) -> Query {
        Query::new()
            .opt("asset_class", self.asset_class.as_deref())
            .opt("locale", self.locale.as_deref())
    }
}

/// Parameters of the ticker details endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerDetailsParams {
    pub ticker: String,
    pub date: Option<NaiveDate>,
}

impl TickerDetailsParams {
    /// Details of `ticker` as of today
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            date: None,
        }
    }

    /// Details as of `date`
    #[must_use]
    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Check the ticker
    pub fn validate(&self) -> Result<()> {
        require_ticker(&self.ticker)
    }

    /// Query string parameters
    pub fn query(&self) -> Query {
        Query::new().opt("date", self.date)
    }
}

/// Any path under the API base, passed through untyped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawParams {
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub limit: Option<u32>,
}

impl RawParams {
    /// GET `path` (absolute, starting with `/`)
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Add a query parameter
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Page limit, sent as `limit` and checked against each page's count
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Check the path shape and limit
    pub fn validate(&self) -> Result<()> {
        if !self.path.starts_with('/') {
            return Err(Error::invalid_value("path", "must start with '/'"));
        }
        if self.query.contains_key("limit") {
            return Err(Error::invalid_value("query", "use limit() to set 'limit'"));
        }
        require_limit(self.limit, u32::MAX)
    }

    /// Query string parameters
    pub fn query(&self) -> Query {
        self.query
            .iter()
            .fold(Query::new(), |q, (k, v)| q.set(k, v))
            .opt("limit", self.limit)
    }
}
