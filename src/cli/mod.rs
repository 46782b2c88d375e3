//! CLI module
//!
//! Command-line interface over the client and the job runner.
//!
//! # Commands
//!
//! - `fetch <endpoint>` - One logical call, printed as JSON lines or written to Parquet
//! - `run` - A batch job from a YAML job file

mod commands;
mod runner;

pub use commands::{Cli, Commands, EndpointCommand, OutputFormat};
pub use runner::Runner;
