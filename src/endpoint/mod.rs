//! Endpoint descriptors
//!
//! An endpoint knows how to turn its typed parameters into a request URL and
//! how to turn one decoded page into typed records. The paginator drives any
//! endpoint the same way.
//!
//! # Overview
//!
//! | Descriptor        | Path                                                          | Record            |
//! |-------------------|---------------------------------------------------------------|-------------------|
//! | [`GroupedDaily`]  | `/v2/aggs/grouped/locale/{locale}/market/{market_type}/{date}` | `GroupedDailyBar` |
//! | [`Aggregates`]    | `/v2/aggs/ticker/{ticker}/range/{multiplier}/{timespan}/{from}/{to}` | `AggregateBar` |
//! | [`DailyOpenClose`]| `/v1/open-close/{ticker}/{date}`                               | `DailyOpenClose`  |
//! | [`Tickers`]       | `/v3/reference/tickers`                                        | `TickerInfo`      |
//! | [`TickerDetails`] | `/v3/reference/tickers/{ticker}`                               | `TickerDetails`   |
//! | [`TickerTypes`]   | `/v3/reference/tickers/types`                                  | `TickerType`      |
//! | [`MarketHolidays`]| `/v1/marketstatus/upcoming`                                    | `MarketHoliday`   |
//! | [`Raw`]           | any                                                            | JSON object       |

mod descriptors;
mod params;
mod template;

pub use descriptors::{
    Aggregates, DailyOpenClose, GroupedDaily, MarketHolidays, Raw, TickerDetails, TickerTypes,
    Tickers,
};
pub use params::{
    AggregatesParams, DailyOpenCloseParams, GroupedDailyParams, Query, RawParams,
    TickerDetailsParams, TickerTypesParams, TickersParams, MAX_AGGREGATES_LIMIT,
    MAX_TICKERS_LIMIT,
};
pub use template::{PathTemplate, PathVars};

use crate::decode::{EnvelopeDecoder, PageDecoder, PageEnvelope};
use crate::error::Result;
use crate::records::{parse_rows, Record};
use url::Url;

/// Per-endpoint request and response strategy
pub trait Endpoint: Send + Sync {
    /// Typed request parameters
    type Params: Send + Sync;
    /// Typed row of the result
    type Record: Record;

    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Validate `params` and build the first page's URL under `base`
    ///
    /// Path parameters go into the path only, never into the query string.
    fn render_url(&self, base: &Url, params: &Self::Params) -> Result<Url>;

    /// Page size the caller asked for, checked against every non-final page
    fn expected_limit(&self, _params: &Self::Params) -> Option<u32> {
        None
    }

    /// Decode a response body
    fn decode_page(&self, body: &[u8]) -> Result<PageEnvelope> {
        EnvelopeDecoder::new().decode(body)
    }

    /// Map one page's results to records, preserving order
    fn parse_page(&self, page: &PageEnvelope) -> Result<Vec<Self::Record>> {
        parse_rows(&page.results)
    }
}

/// Render `template` with `vars` under `base` and append `query`
pub fn build_url(base: &Url, template: &PathTemplate, vars: &PathVars, query: &Query) -> Result<Url> {
    let mut url = template.render(base, vars)?;
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query.pairs());
    }
    Ok(url)
}
