//! Endpoint descriptor implementations

use super::params::{
    AggregatesParams, DailyOpenCloseParams, GroupedDailyParams, Query, RawParams,
    TickerDetailsParams, TickerTypesParams, TickersParams,
};
use super::template::{PathTemplate, PathVars};
use super::{build_url, Endpoint};
use crate::decode::{BareArrayDecoder, PageDecoder, PageEnvelope};
use crate::error::{Error, Result};
use crate::records::{self, parse_rows};
use crate::types::{JsonObject, JsonValue};
use url::Url;

// ============================================================================
// Market Data
// ============================================================================

/// Daily bars of every ticker of a market on one date
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupedDaily;

impl GroupedDaily {
    pub const PATH: PathTemplate =
        PathTemplate::new("/v2/aggs/grouped/locale/{locale}/market/{market_type}/{date}");
}

impl Endpoint for GroupedDaily {
    type Params = GroupedDailyParams;
    type Record = records::GroupedDailyBar;

    fn name(&self) -> &'static str {
        "grouped_daily"
    }

    fn render_url(&self, base: &Url, params: &Self::Params) -> Result<Url> {
        params.validate()?;
        let vars = PathVars::new()
            .with("locale", &params.locale)
            .with("market_type", &params.market_type)
            .with("date", params.date);
        build_url(base, &Self::PATH, &vars, &params.query())
    }
}

/// Bars of one ticker over a date range
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregates;

impl Aggregates {
    pub const PATH: PathTemplate =
        PathTemplate::new("/v2/aggs/ticker/{ticker}/range/{multiplier}/{timespan}/{from}/{to}");
}

impl Endpoint for Aggregates {
    type Params = AggregatesParams;
    type Record = records::AggregateBar;

    fn name(&self) -> &'static str {
        "aggregates"
    }

    fn render_url(&self, base: &Url, params: &Self::Params) -> Result<Url> {
        params.validate()?;
        let vars = PathVars::new()
            .with("ticker", &params.ticker)
            .with("multiplier", params.multiplier)
            .with("timespan", params.timespan)
            .with("from", params.from)
            .with("to", params.to);
        build_url(base, &Self::PATH, &vars, &params.query())
    }

    fn expected_limit(&self, params: &Self::Params) -> Option<u32> {
        params.limit
    }
}

/// Open, close, and extended-hours prices of one ticker on one date
///
/// The record is the response body itself rather than a `results` entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct DailyOpenClose;

impl DailyOpenClose {
    pub const PATH: PathTemplate = PathTemplate::new("/v1/open-close/{ticker}/{date}");
}

impl Endpoint for DailyOpenClose {
    type Params = DailyOpenCloseParams;
    type Record = records::DailyOpenClose;

    fn name(&self) -> &'static str {
        "daily_open_close"
    }

    fn render_url(&self, base: &Url, params: &Self::Params) -> Result<Url> {
        params.validate()?;
        let vars = PathVars::new()
            .with("ticker", &params.ticker)
            .with("date", params.date);
        build_url(base, &Self::PATH, &vars, &params.query())
    }

    fn parse_page(&self, page: &PageEnvelope) -> Result<Vec<Self::Record>> {
        if page.extra.is_empty() {
            return Ok(Vec::new());
        }
        parse_rows(&[JsonValue::Object(page.extra.clone())])
    }
}

// ============================================================================
// Reference Data
// ============================================================================

/// Ticker list, filtered
#[derive(Debug, Clone, Copy, Default)]
pub struct Tickers;

impl Tickers {
    pub const PATH: PathTemplate = PathTemplate::new("/v3/reference/tickers");
}

impl Endpoint for Tickers {
    type Params = TickersParams;
    type Record = records::TickerInfo;

    fn name(&self) -> &'static str {
        "tickers"
    }

    fn render_url(&self, base: &Url, params: &Self::Params) -> Result<Url> {
        params.validate()?;
        build_url(base, &Self::PATH, &PathVars::new(), &params.query())
    }

    fn expected_limit(&self, params: &Self::Params) -> Option<u32> {
        params.limit
    }
}

/// Full details of one ticker
#[derive(Debug, Clone, Copy, Default)]
pub struct TickerDetails;

impl TickerDetails {
    pub const PATH: PathTemplate = PathTemplate::new("/v3/reference/tickers/{ticker}");
}

impl Endpoint for TickerDetails {
    type Params = TickerDetailsParams;
    type Record = records::TickerDetails;

    fn name(&self) -> &'static str {
        "ticker_details"
    }

    fn render_url(&self, base: &Url, params: &Self::Params) -> Result<Url> {
        params.validate()?;
        let vars = PathVars::new().with("ticker", &params.ticker);
        build_url(base, &Self::PATH, &vars, &params.query())
    }
}

/// Security type codes
#[derive(Debug, Clone, Copy, Default)]
pub struct TickerTypes;

impl TickerTypes {
    pub const PATH: PathTemplate = PathTemplate::new("/v3/reference/tickers/types");
}

impl Endpoint for TickerTypes {
    type Params = TickerTypesParams;
    type Record = records::TickerType;

    fn name(&self) -> &'static str {
        "ticker_types"
    }

    fn render_url(&self, base: &Url, params: &Self::Params) -> Result<Url> {
        build_url(base, &Self::PATH, &PathVars::new(), &params.query())
    }
}

/// Upcoming exchange holidays and early closes
///
/// Answers with a bare JSON array instead of an envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarketHolidays;

impl MarketHolidays {
    pub const PATH: PathTemplate = PathTemplate::new("/v1/marketstatus/upcoming");
}

impl Endpoint for MarketHolidays {
    type Params = ();
    type Record = records::MarketHoliday;

    fn name(&self) -> &'static str {
        "market_holidays"
    }

    fn render_url(&self, base: &Url, _params: &Self::Params) -> Result<Url> {
        build_url(base, &Self::PATH, &PathVars::new(), &Query::new())
    }

    fn decode_page(&self, body: &[u8]) -> Result<PageEnvelope> {
        BareArrayDecoder::new().decode(body)
    }
}

// ============================================================================
// Generic
// ============================================================================

/// Any path, rows kept as JSON objects
#[derive(Debug, Clone, Copy, Default)]
pub struct Raw;

impl Endpoint for Raw {
    type Params = RawParams;
    type Record = JsonObject;

    fn name(&self) -> &'static str {
        "raw"
    }

    fn render_url(&self, base: &Url, params: &Self::Params) -> Result<Url> {
        params.validate()?;
        let mut url = base.join(&params.path)?;
        url.set_query(None);
        let query = params.query();
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.pairs());
        }
        if url.origin() != base.origin() {
            return Err(Error::invalid_value("path", "must stay on the API host"));
        }
        Ok(url)
    }

    fn expected_limit(&self, params: &Self::Params) -> Option<u32> {
        params.limit
    }
}
