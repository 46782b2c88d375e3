//! Record trait and result table

use crate::error::{Error, Result};
use crate::output::json_to_arrow;
use crate::types::{JsonObject, JsonValue};
use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// One row of an endpoint's result
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Declared columnar schema; `None` means infer from the rows
    fn schema() -> Option<Schema> {
        None
    }

    /// Flat row projection of this record
    fn to_row(&self) -> Result<JsonObject> {
        let value = serde_json::to_value(self)
            .map_err(|e| Error::output(format!("Failed to serialize record: {e}")))?;
        Ok(flatten_row(value))
    }
}

/// Rows of a generic endpoint pass through untouched
impl Record for JsonObject {}

/// Flatten nested objects into `parent_child` keys
///
/// Arrays are kept as values. A non-object value becomes `{"value": v}`.
pub fn flatten_row(value: JsonValue) -> JsonObject {
    let mut row = JsonObject::new();
    match value {
        JsonValue::Object(obj) => flatten_into(&mut row, None, obj),
        other => {
            row.insert("value".to_string(), other);
        }
    }
    row
}

fn flatten_into(row: &mut JsonObject, prefix: Option<&str>, obj: JsonObject) {
    for (key, value) in obj {
        let name = match prefix {
            Some(p) => format!("{p}_{key}"),
            None => key,
        };
        match value {
            JsonValue::Object(nested) => flatten_into(row, Some(&name), nested),
            other => {
                row.insert(name, other);
            }
        }
    }
}

/// Deserialize raw result rows into records, in order
pub fn parse_rows<R: DeserializeOwned>(rows: &[JsonValue]) -> Result<Vec<R>> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            R::deserialize(row).map_err(|e| Error::decode(format!("result {i}: {e}")))
        })
        .collect()
}

/// Records of one logical call across all pages, in arrival order
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable<R> {
    records: Vec<R>,
    pages: usize,
}

impl<R> Default for ResultTable<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            pages: 0,
        }
    }
}

impl<R> ResultTable<R> {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one page worth of records
    pub fn push_page(&mut self, records: Vec<R>) {
        self.records.extend(records);
        self.pages += 1;
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no page produced a record
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of pages fetched
    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Records in arrival order
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Iterate records in arrival order
    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.records.iter()
    }

    /// Take the records
    pub fn into_records(self) -> Vec<R> {
        self.records
    }
}

impl<R: Record> ResultTable<R> {
    /// Flat rows, one per record
    pub fn to_rows(&self) -> Result<Vec<JsonObject>> {
        self.records.iter().map(Record::to_row).collect()
    }

    /// Columnar projection using the record's declared schema when it has one
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let rows = self.to_rows()?;
        json_to_arrow(&rows, R::schema().as_ref())
    }
}

impl<R> IntoIterator for ResultTable<R> {
    type Item = R;
    type IntoIter = std::vec::IntoIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a, R> IntoIterator for &'a ResultTable<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
