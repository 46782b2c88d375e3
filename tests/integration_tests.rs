//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: typed params → HTTP requests → records → Parquet

use arrow::datatypes::{DataType, TimeUnit};
use chrono::NaiveDate;
use mdfetch::auth::Credential;
use mdfetch::calendar::WeekdayCalendar;
use mdfetch::config::JobConfig;
use mdfetch::endpoint::{
    Aggregates, AggregatesParams, MarketHolidays, Raw, RawParams, Tickers, TickersParams,
};
use mdfetch::http::{HttpClient, HttpClientConfig};
use mdfetch::jobs::{JobKind, JobRunner, RunMode};
use mdfetch::output::write_batch_to_parquet;
use mdfetch::pagination::PaginationConfig;
use mdfetch::{Error, MarketDataClient, Timespan};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::json;
use std::fs::File;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-key";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn client(server: &MockServer) -> MarketDataClient {
    let config = HttpClientConfig::builder()
        .max_retries(2)
        .backoff(Duration::from_millis(1), Duration::from_millis(4))
        .build();
    let http = HttpClient::with_auth(config, Credential::new(API_KEY).unwrap()).unwrap();
    MarketDataClient::new(Arc::new(http), Url::parse(&server.uri()).unwrap())
        .with_pagination(PaginationConfig::new().with_page_delay(Duration::ZERO))
}

fn daily_bars() -> Vec<serde_json::Value> {
    // Midnight New York, 2024-01-01 through 2024-01-05
    [1704085200000_i64, 1704171600000, 1704258000000, 1704344400000, 1704430800000]
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let px = 185.0 + i as f64;
            json!({"v": 5.0e7, "vw": px, "o": px, "c": px + 0.5, "h": px + 1.0, "l": px - 1.0, "t": t, "n": 600000})
        })
        .collect()
}

// ============================================================================
// Pagination
// ============================================================================

#[tokio::test]
async fn test_two_page_ticker_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/reference/tickers"))
        .and(query_param("cursor", "YWN0aXZl"))
        .and(query_param("apiKey", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK", "request_id": "p2", "count": 1,
            "results": [{"ticker": "AAA", "active": true}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v3/reference/tickers"))
        .and(query_param("limit", "2"))
        .and(query_param("apiKey", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK", "request_id": "p1", "count": 2,
            "next_url": format!("{}/v3/reference/tickers?cursor=YWN0aXZl", server.uri()),
            "results": [{"ticker": "A", "active": true}, {"ticker": "AA", "active": true}]
        })))
        .mount(&server)
        .await;

    let table = client(&server)
        .fetch(&Tickers, &TickersParams::new().limit(2))
        .await
        .unwrap();

    let tickers: Vec<_> = table.iter().map(|t| t.ticker.as_str()).collect();
    assert_eq!(tickers, vec!["A", "AA", "AAA"]);
    assert_eq!(table.pages(), 2);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_page_size_mismatch_aborts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/reference/tickers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK", "count": 1,
            "next_url": format!("{}/v3/reference/tickers?cursor=x", server.uri()),
            "results": [{"ticker": "A"}]
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .fetch(&Tickers, &TickersParams::new().limit(2))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::PageSizeMismatch { page: 1, count: Some(1), limit: 2 }
    ));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_next_url_on_other_host_is_not_followed() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/reference/tickers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK", "count": 1,
            "next_url": format!("{}/steal", other.uri()),
            "results": [{"ticker": "A"}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "OK"})))
        .mount(&other)
        .await;

    let err = client(&server)
        .fetch(&Tickers, &TickersParams::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Decode { .. }));
    assert!(other.received_requests().await.unwrap().is_empty());
}

// ============================================================================
// Aggregates
// ============================================================================

#[tokio::test]
async fn test_daily_aggregates_single_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/aggs/ticker/AAPL/range/1/day/2024-01-01/2024-01-05"))
        .and(query_param("limit", "50000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ticker": "AAPL", "status": "OK", "request_id": "r", "adjusted": true,
            "queryCount": 5, "resultsCount": 5, "results": daily_bars()
        })))
        .mount(&server)
        .await;

    let params = AggregatesParams::new("AAPL", 1, Timespan::Day, date(2024, 1, 1), date(2024, 1, 5))
        .limit(50_000);
    let table = client(&server).fetch(&Aggregates, &params).await.unwrap();

    assert_eq!(table.len(), 5);
    let from = date(2024, 1, 1).and_hms_opt(0, 0, 0).unwrap().and_utc();
    let to = date(2024, 1, 6).and_hms_opt(0, 0, 0).unwrap().and_utc();
    assert!(table.iter().all(|bar| bar.t >= from && bar.t < to));
    assert!(table.records().windows(2).all(|w| w[0].t < w[1].t));
}

#[tokio::test]
async fn test_aggregates_to_parquet() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/aggs/ticker/AAPL/range/1/day/2024-01-01/2024-01-05"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK", "resultsCount": 5, "results": daily_bars()
        })))
        .mount(&server)
        .await;

    let params = AggregatesParams::new("AAPL", 1, Timespan::Day, date(2024, 1, 1), date(2024, 1, 5));
    let table = client(&server).fetch(&Aggregates, &params).await.unwrap();

    let dir = tempdir().unwrap();
    let file = dir.path().join("day/AAPL/2024-01-05.parquet");
    let rows = write_batch_to_parquet(&file, &table.to_record_batch().unwrap(), None).unwrap();
    assert_eq!(rows, 5);

    let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&file).unwrap())
        .unwrap()
        .build()
        .unwrap();
    let batches: Vec<_> = reader.map(|b| b.unwrap()).collect();
    let schema = batches[0].schema();
    assert_eq!(
        schema.field_with_name("t").unwrap().data_type(),
        &DataType::Timestamp(TimeUnit::Millisecond, Some("UTC".into()))
    );
    assert_eq!(batches.iter().map(|b| b.num_rows()).sum::<usize>(), 5);
}

// ============================================================================
// Error Handling
// ============================================================================

#[tokio::test]
async fn test_upstream_error_with_http_200() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ERROR", "request_id": "6a7e466b", "error": "Unknown API Key"
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .fetch(&Raw, &RawParams::new("/v3/reference/exchanges"))
        .await
        .unwrap_err();

    match err {
        Error::Upstream { status, request_id } => {
            assert_eq!(status, "ERROR");
            assert_eq!(request_id, "6a7e466b");
        }
        other => panic!("Expected Upstream, got {other:?}"),
    }
}

#[tokio::test]
async fn test_transient_status_retried_then_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/marketstatus/upcoming"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/marketstatus/upcoming"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"exchange": "NYSE", "name": "Juneteenth", "date": "2024-06-19", "status": "closed"}
        ])))
        .mount(&server)
        .await;

    let table = client(&server).fetch(&MarketHolidays, &()).await.unwrap();

    assert_eq!(table.len(), 1);
    assert_eq!(table.records()[0].date, date(2024, 6, 19));
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_retries_exhausted() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = client(&server)
        .fetch(&MarketHolidays, &())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::TransientHttp { status: 429, attempts: 3 }));
    assert!(!err.to_string().contains(API_KEY));
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let err = client(&server)
        .fetch(&Raw, &RawParams::new("/v3/nothing"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 404, .. }));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

// ============================================================================
// Job Runner
// ============================================================================

#[tokio::test]
async fn test_grouped_daily_job_end_to_end() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/aggs/grouped/locale/us/market/stocks/2024-01-02"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK", "queryCount": 2, "resultsCount": 2, "adjusted": true,
            "results": [
                {"T": "AAPL", "v": 8.2e7, "vw": 186.1, "o": 187.15, "c": 185.64, "h": 188.44, "l": 183.885, "t": 1704229200000_i64, "n": 1008871},
                {"T": "MSFT", "v": 2.5e7, "vw": 370.9, "o": 373.86, "c": 370.87, "h": 375.9, "l": 366.77, "t": 1704229200000_i64, "n": 307713}
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/aggs/grouped/locale/us/market/stocks/2024-01-03"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK", "resultsCount": 0
        })))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let yaml = format!(
        "global:\n  holidays: [2024-01-01]\ngrouped_daily:\n  output_dir: \"{}\"\n  start_date: 2024-01-01\n  end_date: 2024-01-03\n",
        dir.path().display()
    );
    let config = JobConfig::from_yaml(&yaml).unwrap();

    let summary = JobRunner::new(client(&server), WeekdayCalendar::with_holidays([date(2024, 1, 1)]))
        .run(&config, JobKind::GroupedDaily, RunMode::Historical)
        .await
        .unwrap();

    assert_eq!(summary.written, 1);
    assert_eq!(summary.empty, 1);
    assert_eq!(summary.rows, 2);
    assert!(dir.path().join("2024-01-02.parquet").exists());
    assert!(!dir.path().join("2024-01-03.parquet").exists());
}
