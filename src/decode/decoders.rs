//! Decoder implementations

use super::types::{PageDecoder, PageEnvelope};
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use serde::Deserialize;

fn parse_json<T: for<'de> Deserialize<'de>>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| Error::decode(format!("Failed to parse JSON: {e}")))
}

// ============================================================================
// Standard Envelope
// ============================================================================

#[derive(Deserialize)]
struct WireEnvelope {
    status: Option<String>,
    #[serde(default)]
    request_id: Option<String>,
    #[serde(default)]
    count: Option<u64>,
    #[serde(default, rename = "resultsCount")]
    results_count: Option<u64>,
    #[serde(default)]
    next_url: Option<String>,
    #[serde(default)]
    results: Option<JsonValue>,
    #[serde(flatten)]
    extra: JsonObject,
}

/// Decoder for `{status, request_id, count, next_url, results}` bodies
///
/// `count` falls back to `resultsCount` (the aggregate endpoints use that
/// name). A `results` object is treated as a one-element sequence; a missing
/// or null `results` as an empty one.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeDecoder;

impl EnvelopeDecoder {
    /// Create a new envelope decoder
    pub fn new() -> Self {
        Self
    }
}

impl PageDecoder for EnvelopeDecoder {
    fn decode(&self, body: &[u8]) -> Result<PageEnvelope> {
        let value: JsonValue = parse_json(body)?;
        if !value.is_object() {
            return Err(Error::decode("Expected a JSON object at the top level"));
        }
        let wire: WireEnvelope = serde_json::from_value(value)
            .map_err(|e| Error::decode(format!("Malformed envelope: {e}")))?;

        let status = wire
            .status
            .ok_or_else(|| Error::decode("Envelope has no 'status' field"))?;

        let results = match wire.results {
            None | Some(JsonValue::Null) => Vec::new(),
            Some(JsonValue::Array(rows)) => rows,
            Some(obj @ JsonValue::Object(_)) => vec![obj],
            Some(other) => {
                return Err(Error::decode(format!(
                    "'results' must be an array or object, got {other}"
                )))
            }
        };

        Ok(PageEnvelope {
            status,
            request_id: wire.request_id.unwrap_or_default(),
            count: wire.count.or(wire.results_count),
            next_url: wire.next_url.filter(|u| !u.trim().is_empty()),
            results,
            extra: wire.extra,
        })
    }
}

// ============================================================================
// Bare Array
// ============================================================================

/// Decoder for endpoints that answer with a plain JSON array
///
/// The produced envelope has status `OK`, no continuation, and `count` equal
/// to the number of rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct BareArrayDecoder;

impl BareArrayDecoder {
    /// Create a new bare array decoder
    pub fn new() -> Self {
        Self
    }
}

impl PageDecoder for BareArrayDecoder {
    fn decode(&self, body: &[u8]) -> Result<PageEnvelope> {
        match parse_json::<JsonValue>(body)? {
            JsonValue::Array(rows) => Ok(PageEnvelope::ok(rows)),
            // Errors still come back as an envelope
            JsonValue::Object(_) => EnvelopeDecoder.decode(body),
            other => Err(Error::decode(format!("Expected a JSON array, got {other}"))),
        }
    }
}
