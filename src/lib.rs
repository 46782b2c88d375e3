// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # mdfetch
//!
//! Paginated Polygon.io REST client: one call in, every page out, typed.
//!
//! ## Features
//!
//! - **Typed Endpoints**: grouped daily, aggregates, daily open/close, tickers,
//!   ticker details, ticker types, market holidays, plus a raw passthrough
//! - **Next-URL Pagination**: continuation links followed to the end, with a
//!   page-size check and a fixed delay between pages
//! - **Retrying Transport**: pooled connections, exponential backoff on
//!   transient statuses, optional client-side rate limit
//! - **Arrow/Parquet Output**: declared schemas with UTC millisecond timestamps
//! - **Batch Jobs**: YAML-configured grouped daily and aggregates downloads
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mdfetch::auth::EnvCredential;
//! use mdfetch::endpoint::{Aggregates, AggregatesParams};
//! use mdfetch::http::HttpClientConfig;
//! use mdfetch::{MarketDataClient, Result, Timespan};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = MarketDataClient::connect(&EnvCredential::default(), HttpClientConfig::default())?;
//!
//!     let params = AggregatesParams::new("AAPL", 1, Timespan::Day, from, to).limit(50_000);
//!     let bars = client.fetch(&Aggregates, &params).await?;
//!
//!     for bar in &bars {
//!         println!("{} {}", bar.t, bar.c);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │        MarketDataClient::fetch(endpoint, params)             │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//! ┌───────────┬─────────────────┴──┬──────────────┬──────────────┐
//! │ Endpoint  │    Paginator       │   Decode     │   Records    │
//! ├───────────┼────────────────────┼──────────────┼──────────────┤
//! │ Params    │ next_url           │ Envelope     │ Typed rows   │
//! │ Template  │ Limit check        │ Bare array   │ Arrow schema │
//! │ Validate  │ Page delay         │ Status check │ Flattening   │
//! └───────────┴─────────┬──────────┴──────────────┴──────────────┘
//!                       │
//! ┌─────────────────────┴────────────────────────────────────────┐
//! │ Transport: apiKey, pool, retry/backoff, rate limit           │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// API key lookup and request signing
pub mod auth;

/// HTTP transport with retry and rate limiting
pub mod http;

/// Page envelope decoding
pub mod decode;

/// Typed result records
pub mod records;

/// Arrow/Parquet output
pub mod output;

/// Endpoint descriptors and request parameters
pub mod endpoint;

/// Next-URL pagination
pub mod pagination;

/// Client entry point
pub mod client;

/// Trading session dates
pub mod calendar;

/// YAML job configuration
pub mod config;

/// Batch job runner
pub mod jobs;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::MarketDataClient;
pub use error::{Error, Result};
pub use records::{Record, ResultTable};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
