//! Market data records (bars and daily summaries)

use super::types::Record;
use crate::output::{date_field, timestamp_ms_field};
use arrow::datatypes::{DataType, Field, Schema};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

fn price(name: &str) -> Field {
    Field::new(name, DataType::Float64, true)
}

fn bar_fields() -> Vec<Field> {
    vec![
        price("v"),
        price("vw"),
        price("o"),
        price("c"),
        price("h"),
        price("l"),
        timestamp_ms_field("t"),
        Field::new("n", DataType::Int64, true),
        Field::new("otc", DataType::Boolean, true),
    ]
}

/// One aggregate bar of a single ticker
///
/// Field names follow the wire format: volume `v`, volume-weighted average
/// price `vw`, open/close/high/low, window start `t`, trade count `n`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateBar {
    pub v: f64,
    #[serde(default)]
    pub vw: Option<f64>,
    pub o: f64,
    pub c: f64,
    pub h: f64,
    pub l: f64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub t: DateTime<Utc>,
    #[serde(default)]
    pub n: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otc: Option<bool>,
}

impl Record for AggregateBar {
    fn schema() -> Option<Schema> {
        Some(Schema::new(bar_fields()))
    }
}

/// One daily bar of the whole market, tagged with its ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedDailyBar {
    #[serde(rename = "T")]
    pub ticker: String,
    #[serde(flatten)]
    pub bar: AggregateBar,
}

impl Record for GroupedDailyBar {
    fn schema() -> Option<Schema> {
        let mut fields = vec![Field::new("T", DataType::Utf8, true)];
        fields.extend(bar_fields());
        Some(Schema::new(fields))
    }
}

/// Open, close, and extended-hours prices of one ticker on one date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyOpenClose {
    pub from: NaiveDate,
    pub symbol: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    #[serde(rename = "afterHours", default)]
    pub after_hours: Option<f64>,
    #[serde(rename = "preMarket", default)]
    pub pre_market: Option<f64>,
}

impl Record for DailyOpenClose {
    fn schema() -> Option<Schema> {
        Some(Schema::new(vec![
            date_field("from"),
            Field::new("symbol", DataType::Utf8, true),
            price("open"),
            price("high"),
            price("low"),
            price("close"),
            price("volume"),
            price("afterHours"),
            price("preMarket"),
        ]))
    }
}
