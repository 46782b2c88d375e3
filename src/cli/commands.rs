//! CLI commands and argument parsing

use crate::jobs::{JobKind, RunMode};
use crate::types::{SortOrder, Timespan};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Polygon.io market data fetcher
#[derive(Parser, Debug)]
#[command(name = "mdfetch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Environment variable holding the API key
    #[arg(long, global = true)]
    pub api_key_env: Option<String>,

    /// API root (defaults to the production host)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Seconds between pages of one call
    #[arg(long, global = true)]
    pub page_delay: Option<u64>,

    /// Concurrent connections
    #[arg(long, global = true)]
    pub pool_size: Option<usize>,

    /// Retries after the first attempt
    #[arg(long, global = true)]
    pub max_retries: Option<u32>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch one endpoint across all of its pages
    Fetch {
        /// Write a Parquet file instead of printing rows
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Give up after this many seconds
        #[arg(long)]
        deadline: Option<u64>,

        #[command(subcommand)]
        endpoint: EndpointCommand,
    },

    /// Run a batch job from a YAML job file
    Run {
        /// Job file
        #[arg(short, long)]
        config: PathBuf,

        /// Job to run
        #[arg(short, long)]
        job: JobKind,

        /// Date range selection
        #[arg(short, long, default_value = "latest")]
        mode: RunMode,

        /// Refetch dates whose file already exists
        #[arg(long)]
        overwrite: bool,
    },
}

/// Endpoints reachable from `fetch`
#[derive(Subcommand, Debug)]
pub enum EndpointCommand {
    /// Daily bars of every ticker on one date
    GroupedDaily {
        date: NaiveDate,

        #[arg(long, default_value = "us")]
        locale: String,

        #[arg(long, default_value = "stocks")]
        market_type: String,

        #[arg(long)]
        adjusted: Option<bool>,

        #[arg(long)]
        include_otc: Option<bool>,
    },

    /// Bars of one ticker over a date range
    Aggregates {
        ticker: String,
        multiplier: u32,
        timespan: Timespan,
        from: NaiveDate,
        to: NaiveDate,

        #[arg(long)]
        adjusted: Option<bool>,

        #[arg(long)]
        sort: Option<SortOrder>,

        #[arg(long)]
        limit: Option<u32>,
    },

    /// Open, close, and extended-hours prices of one ticker on one date
    OpenClose {
        ticker: String,
        date: NaiveDate,

        #[arg(long)]
        adjusted: Option<bool>,
    },

    /// Ticker list
    Tickers {
        #[arg(long)]
        ticker: Option<String>,

        #[arg(long = "type")]
        ticker_type: Option<String>,

        #[arg(long)]
        market: Option<String>,

        #[arg(long)]
        exchange: Option<String>,

        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        search: Option<String>,

        #[arg(long)]
        active: Option<bool>,

        #[arg(long)]
        limit: Option<u32>,
    },

    /// Details of one ticker
    TickerDetails {
        ticker: String,

        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Security type codes
    TickerTypes {
        #[arg(long)]
        asset_class: Option<String>,

        #[arg(long)]
        locale: Option<String>,
    },

    /// Upcoming market holidays
    Holidays,

    /// Any path under the API root
    Raw {
        /// Path starting with '/'
        path: String,

        /// Query parameter as key=value (repeatable)
        #[arg(short, long = "param")]
        params: Vec<String>,

        #[arg(long)]
        limit: Option<u32>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one row per line)
    Json,
    /// Human-readable output
    Pretty,
}
