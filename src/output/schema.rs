//! Arrow schema inference and row to Arrow conversion
//!
//! Rows are flat JSON objects. A record type may declare its schema (with
//! timestamp and date columns); otherwise the schema is inferred from the
//! values, in first-seen column order.

use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use arrow::array::{
    ArrayRef, BooleanArray, Date32Array, Float64Array, Int64Array, ListArray, NullArray,
    StringArray, StructArray, TimestampMillisecondArray,
};
use arrow::buffer::OffsetBuffer;
use arrow::datatypes::{DataType, Field, Fields, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Datelike, NaiveDate};
use std::sync::Arc;

/// Timezone attached to every timestamp column
pub const UTC: &str = "UTC";

/// Days from 0001-01-01 (CE) to 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Nullable `Timestamp(Millisecond, "UTC")` field
pub fn timestamp_ms_field(name: &str) -> Field {
    Field::new(
        name,
        DataType::Timestamp(TimeUnit::Millisecond, Some(UTC.into())),
        true,
    )
}

/// Nullable `Date32` field
pub fn date_field(name: &str) -> Field {
    Field::new(name, DataType::Date32, true)
}

/// Infer an Arrow schema from a set of rows
///
/// Every field is nullable. Columns appear in the order they are first seen.
pub fn infer_schema(rows: &[JsonObject]) -> Schema {
    let mut columns: Vec<(String, DataType)> = Vec::new();

    for row in rows {
        for (key, value) in row {
            let seen = infer_type(value);
            match columns.iter_mut().find(|(name, _)| name == key) {
                Some((_, existing)) => *existing = merge_types(existing, &seen),
                None => columns.push((key.clone(), seen)),
            }
        }
    }

    Schema::new(
        columns
            .into_iter()
            .map(|(name, dtype)| Field::new(name, dtype, true))
            .collect::<Vec<_>>(),
    )
}

/// Convert rows to an Arrow RecordBatch
///
/// Uses the provided schema or infers one from the data. Columns the schema
/// names but a row lacks become nulls; row keys the schema lacks are dropped.
pub fn json_to_arrow(rows: &[JsonObject], schema: Option<&Schema>) -> Result<RecordBatch> {
    let schema = match schema {
        Some(s) => s.clone(),
        None => infer_schema(rows),
    };
    let schema = Arc::new(schema);

    if rows.is_empty() {
        return Ok(RecordBatch::new_empty(schema));
    }

    let columns = schema
        .fields()
        .iter()
        .map(|field| {
            let values: Vec<Option<&JsonValue>> =
                rows.iter().map(|row| row.get(field.name())).collect();
            build_array(&values, field.data_type())
                .map_err(|e| Error::output(format!("column '{}': {e}", field.name())))
        })
        .collect::<Result<Vec<ArrayRef>>>()?;

    RecordBatch::try_new(schema, columns)
        .map_err(|e| Error::output(format!("Failed to create RecordBatch: {e}")))
}

fn infer_type(value: &JsonValue) -> DataType {
    match value {
        JsonValue::Null => DataType::Null,
        JsonValue::Bool(_) => DataType::Boolean,
        JsonValue::Number(n) if n.is_i64() => DataType::Int64,
        JsonValue::Number(_) => DataType::Float64,
        JsonValue::String(_) => DataType::Utf8,
        JsonValue::Array(items) => {
            let item = items
                .iter()
                .find(|v| !v.is_null())
                .map_or(DataType::Null, infer_type);
            DataType::List(Arc::new(Field::new("item", item, true)))
        }
        JsonValue::Object(obj) => DataType::Struct(Fields::from(
            obj.iter()
                .map(|(k, v)| Field::new(k, infer_type(v), true))
                .collect::<Vec<_>>(),
        )),
    }
}

fn merge_types(a: &DataType, b: &DataType) -> DataType {
    match (a, b) {
        (a, b) if a == b => a.clone(),
        (DataType::Null, other) | (other, DataType::Null) => other.clone(),
        (DataType::Int64, DataType::Float64) | (DataType::Float64, DataType::Int64) => {
            DataType::Float64
        }
        (DataType::List(a), DataType::List(b)) => {
            let item = merge_types(a.data_type(), b.data_type());
            DataType::List(Arc::new(Field::new("item", item, true)))
        }
        _ => DataType::Utf8,
    }
}

fn as_epoch_millis(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n.as_i64(),
        JsonValue::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.timestamp_millis()),
        _ => None,
    }
}

fn as_epoch_days(value: &JsonValue) -> Option<i32> {
    let text = value.as_str()?;
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
    Some(date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
}

fn build_array(values: &[Option<&JsonValue>], data_type: &DataType) -> Result<ArrayRef> {
    let array: ArrayRef = match data_type {
        DataType::Null => Arc::new(NullArray::new(values.len())),

        DataType::Boolean => Arc::new(
            values
                .iter()
                .map(|v| v.and_then(JsonValue::as_bool))
                .collect::<BooleanArray>(),
        ),

        DataType::Int64 => Arc::new(
            values
                .iter()
                .map(|v| v.and_then(JsonValue::as_i64))
                .collect::<Int64Array>(),
        ),

        DataType::Float64 => Arc::new(
            values
                .iter()
                .map(|v| v.and_then(JsonValue::as_f64))
                .collect::<Float64Array>(),
        ),

        DataType::Timestamp(TimeUnit::Millisecond, tz) => {
            let millis: TimestampMillisecondArray = values
                .iter()
                .map(|v| v.and_then(as_epoch_millis))
                .collect();
            Arc::new(millis.with_timezone_opt(tz.clone()))
        }

        DataType::Date32 => Arc::new(
            values
                .iter()
                .map(|v| v.and_then(as_epoch_days))
                .collect::<Date32Array>(),
        ),

        DataType::List(item) => build_list_array(values, item)?,

        DataType::Struct(fields) => build_struct_array(values, fields)?,

        // Utf8 and anything unsupported
        _ => Arc::new(
            values
                .iter()
                .map(|v| {
                    v.filter(|v| !v.is_null()).map(|v| match v {
                        JsonValue::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                })
                .collect::<StringArray>(),
        ),
    };
    Ok(array)
}

fn build_list_array(values: &[Option<&JsonValue>], item: &Arc<Field>) -> Result<ArrayRef> {
    let mut flat: Vec<Option<&JsonValue>> = Vec::new();
    let mut offsets: Vec<i32> = Vec::with_capacity(values.len() + 1);
    offsets.push(0);

    for value in values {
        if let Some(JsonValue::Array(items)) = value {
            flat.extend(items.iter().map(Some));
        }
        let end = i32::try_from(flat.len())
            .map_err(|_| Error::output("List column too large for i32 offsets"))?;
        offsets.push(end);
    }

    let child = build_array(&flat, item.data_type())?;
    Ok(Arc::new(ListArray::new(
        Arc::clone(item),
        OffsetBuffer::new(offsets.into()),
        child,
        None,
    )))
}

fn build_struct_array(values: &[Option<&JsonValue>], fields: &Fields) -> Result<ArrayRef> {
    let children = fields
        .iter()
        .map(|field| {
            let child: Vec<Option<&JsonValue>> = values
                .iter()
                .map(|v| v.and_then(|v| v.get(field.name())))
                .collect();
            build_array(&child, field.data_type())
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Arc::new(StructArray::new(fields.clone(), children, None)))
}
