//! Tests for records module

use super::*;
use crate::error::Error;
use crate::types::JsonObject;
use arrow::array::{Date32Array, Float64Array, StringArray, TimestampMillisecondArray};
use arrow::datatypes::DataType;
use chrono::{NaiveDate, TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;

fn bar_json(t: i64, c: f64) -> serde_json::Value {
    json!({"v": 70790813.0, "vw": 186.1, "o": 187.15, "c": c, "h": 188.44, "l": 183.885, "t": t, "n": 1008871})
}

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn test_parse_aggregate_bars() {
    let rows = vec![bar_json(1_704_171_600_000, 185.64), bar_json(1_704_258_000_000, 184.25)];
    let bars: Vec<AggregateBar> = parse_rows(&rows).unwrap();

    assert_eq!(bars.len(), 2);
    assert_eq!(bars[0].c, 185.64);
    assert_eq!(bars[0].n, Some(1_008_871));
    assert_eq!(
        bars[0].t,
        Utc.with_ymd_and_hms(2024, 1, 2, 5, 0, 0).unwrap()
    );
    assert_eq!(bars[1].c, 184.25);
}

#[test]
fn test_parse_bar_with_integer_volume_and_missing_vw() {
    let rows = vec![json!({"v": 100, "o": 1, "c": 2, "h": 3, "l": 0.5, "t": 0})];
    let bars: Vec<AggregateBar> = parse_rows(&rows).unwrap();
    assert_eq!(bars[0].v, 100.0);
    assert_eq!(bars[0].vw, None);
    assert_eq!(bars[0].n, None);
}

#[test]
fn test_parse_rows_reports_index() {
    let rows = vec![bar_json(0, 1.0), json!({"v": "oops"})];
    let err = parse_rows::<AggregateBar>(&rows).unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
    assert!(err.to_string().contains("result 1"));
}

#[test]
fn test_parse_grouped_daily_bar() {
    let mut row = bar_json(1_704_229_200_000, 12.5);
    row["T"] = json!("KIMpL");
    let bars: Vec<GroupedDailyBar> = parse_rows(&[row]).unwrap();

    assert_eq!(bars[0].ticker, "KIMpL");
    assert_eq!(bars[0].bar.c, 12.5);
}

#[test]
fn test_parse_daily_open_close() {
    let row = json!({
        "from": "2024-10-02", "symbol": "AAPL", "open": 225.89, "high": 227.37,
        "low": 223.02, "close": 226.78, "volume": 31929459, "afterHours": 226.9715,
        "preMarket": 225.6
    });
    let records: Vec<DailyOpenClose> = parse_rows(&[row]).unwrap();

    assert_eq!(records[0].from, NaiveDate::from_ymd_opt(2024, 10, 2).unwrap());
    assert_eq!(records[0].after_hours, Some(226.9715));
    assert_eq!(records[0].volume, 31_929_459.0);
}

#[test]
fn test_parse_ticker_info() {
    let row = json!({
        "ticker": "AAPL", "name": "Apple Inc.", "market": "stocks", "locale": "us",
        "primary_exchange": "XNAS", "type": "CS", "active": true, "currency_name": "usd",
        "cik": "0000320193", "composite_figi": "BBG000B9XRY4",
        "share_class_figi": "BBG001S5N8V8", "last_updated_utc": "2024-10-04T00:00:00Z"
    });
    let tickers: Vec<TickerInfo> = parse_rows(&[row]).unwrap();

    assert_eq!(tickers[0].kind.as_deref(), Some("CS"));
    assert!(tickers[0].active);
    assert_eq!(
        tickers[0].last_updated_utc,
        Some(Utc.with_ymd_and_hms(2024, 10, 4, 0, 0, 0).unwrap())
    );
}

#[test]
fn test_parse_market_holidays() {
    let rows = vec![
        json!({"date": "2024-11-28", "exchange": "NYSE", "name": "Thanksgiving", "status": "closed"}),
        json!({
            "close": "2024-11-29T18:00:00.000Z", "date": "2024-11-29", "exchange": "NYSE",
            "name": "Thanksgiving", "open": "2024-11-29T14:30:00.000Z", "status": "early-close"
        }),
    ];
    let holidays: Vec<MarketHoliday> = parse_rows(&rows).unwrap();

    assert_eq!(holidays[0].open, None);
    assert_eq!(
        holidays[1].close,
        Some(Utc.with_ymd_and_hms(2024, 11, 29, 18, 0, 0).unwrap())
    );
}

// ============================================================================
// Flattening
// ============================================================================

#[test]
fn test_flatten_row_nested() {
    let row = flatten_row(json!({
        "ticker": "AAPL",
        "address": {"city": "Cupertino", "geo": {"lat": 37.3}},
        "tags": ["tech"]
    }));

    assert_eq!(row.get("ticker"), Some(&json!("AAPL")));
    assert_eq!(row.get("address_city"), Some(&json!("Cupertino")));
    assert_eq!(row.get("address_geo_lat"), Some(&json!(37.3)));
    assert_eq!(row.get("tags"), Some(&json!(["tech"])));
    assert!(!row.contains_key("address"));
}

#[test]
fn test_flatten_row_scalar() {
    let row = flatten_row(json!(5));
    assert_eq!(row.get("value"), Some(&json!(5)));
}

#[test]
fn test_ticker_details_row() {
    let details: Vec<TickerDetails> = parse_rows(&[json!({
        "ticker": "AAPL",
        "name": "Apple Inc.",
        "active": true,
        "market_cap": 3.5e12,
        "address": {"address1": "ONE APPLE PARK WAY", "city": "CUPERTINO", "state": "CA", "postal_code": "95014"},
        "branding": {"logo_url": "https://x/logo.svg", "icon_url": "https://x/icon.png"},
        "list_date": "1980-12-12",
        "total_employees": 161000
    })])
    .unwrap();

    let row = details[0].to_row().unwrap();
    assert_eq!(row.get("address_city"), Some(&json!("CUPERTINO")));
    assert_eq!(row.get("branding_icon_url"), Some(&json!("https://x/icon.png")));
    assert_eq!(row.get("list_date"), Some(&json!("1980-12-12")));
    assert_eq!(row.get("type"), Some(&json!(null)));
}

#[test]
fn test_ticker_details_schema_matches_row() {
    let details: Vec<TickerDetails> = parse_rows(&[json!({"ticker": "MSFT"})]).unwrap();
    let row = details[0].to_row().unwrap();
    let schema = TickerDetails::schema().unwrap();

    let mut row_keys: Vec<&String> = row.keys().collect();
    let mut schema_keys: Vec<&String> = schema.fields().iter().map(|f| f.name()).collect();
    row_keys.sort();
    schema_keys.sort();
    assert_eq!(row_keys, schema_keys);
}

// ============================================================================
// ResultTable
// ============================================================================

#[test]
fn test_result_table_keeps_page_order() {
    let mut table: ResultTable<JsonObject> = ResultTable::new();
    table.push_page(parse_rows(&[json!({"i": 1}), json!({"i": 2})]).unwrap());
    table.push_page(parse_rows(&[json!({"i": 3})]).unwrap());

    assert_eq!(table.len(), 3);
    assert_eq!(table.pages(), 2);
    let order: Vec<i64> = table.iter().map(|r| r["i"].as_i64().unwrap()).collect();
    assert_eq!(order, vec![1, 2, 3]);
}

#[test]
fn test_empty_table_batch_uses_declared_schema() {
    let table: ResultTable<AggregateBar> = ResultTable::new();
    let batch = table.to_record_batch().unwrap();

    assert_eq!(batch.num_rows(), 0);
    assert_eq!(batch.num_columns(), AggregateBar::schema().unwrap().fields().len());
}

#[test]
fn test_aggregate_batch_types() {
    let mut table = ResultTable::new();
    table.push_page(
        parse_rows::<AggregateBar>(&[bar_json(1_704_171_600_000, 185.64)]).unwrap(),
    );

    let batch = table.to_record_batch().unwrap();
    let t = batch
        .column_by_name("t")
        .unwrap()
        .as_any()
        .downcast_ref::<TimestampMillisecondArray>()
        .unwrap();
    assert_eq!(t.value(0), 1_704_171_600_000);

    let c = batch
        .column_by_name("c")
        .unwrap()
        .as_any()
        .downcast_ref::<Float64Array>()
        .unwrap();
    assert_eq!(c.value(0), 185.64);
}

#[test]
fn test_daily_open_close_batch_date() {
    let mut table = ResultTable::new();
    table.push_page(
        parse_rows::<DailyOpenClose>(&[json!({
            "from": "2024-01-02", "symbol": "AAPL", "open": 1.0, "high": 1.0,
            "low": 1.0, "close": 1.0, "volume": 1.0
        })])
        .unwrap(),
    );

    let batch = table.to_record_batch().unwrap();
    let from = batch
        .column_by_name("from")
        .unwrap()
        .as_any()
        .downcast_ref::<Date32Array>()
        .unwrap();
    assert_eq!(from.value(0), 19_724);
}

#[test]
fn test_ticker_batch_timestamp_column() {
    let mut table = ResultTable::new();
    table.push_page(
        parse_rows::<TickerInfo>(&[json!({
            "ticker": "A", "active": true, "last_updated_utc": "2024-01-02T00:00:00Z"
        })])
        .unwrap(),
    );

    let batch = table.to_record_batch().unwrap();
    assert!(matches!(
        batch.column_by_name("last_updated_utc").unwrap().data_type(),
        DataType::Timestamp(_, Some(_))
    ));
    let ticker = batch
        .column_by_name("ticker")
        .unwrap()
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(ticker.value(0), "A");
}

#[test]
fn test_generic_rows_infer_schema() {
    let mut table: ResultTable<JsonObject> = ResultTable::new();
    table.push_page(parse_rows(&[json!({"code": "CS", "nested": {"x": 1}})]).unwrap());

    let batch = table.to_record_batch().unwrap();
    assert!(batch.column_by_name("nested_x").is_some());
    assert!(JsonObject::schema().is_none());
}
