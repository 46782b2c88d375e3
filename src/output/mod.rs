//! Output module
//!
//! Columnar projection of result tables and Parquet file writing.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Inferring Arrow schemas from flat JSON rows
//! - Converting rows to Arrow RecordBatches against a declared or inferred schema
//! - Writing Parquet files

mod schema;
mod writer;

pub use schema::{date_field, infer_schema, json_to_arrow, timestamp_ms_field, UTC};
pub use writer::{write_batch_to_parquet, ParquetWriter, ParquetWriterConfig};
