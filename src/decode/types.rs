//! Decoder types and traits

use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};

/// Envelope status that marks a usable page
pub const STATUS_OK: &str = "OK";

/// One decoded page of a paginated response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageEnvelope {
    /// Upstream status string; anything other than `OK` is terminal
    pub status: String,
    /// Server-assigned request identifier (empty when absent)
    pub request_id: String,
    /// Number of results the server says this page holds
    pub count: Option<u64>,
    /// Absolute URL of the next page
    pub next_url: Option<String>,
    /// Raw result rows
    pub results: Vec<JsonValue>,
    /// Every other top-level field of the body
    pub extra: JsonObject,
}

impl PageEnvelope {
    /// Envelope carrying `results` and nothing else, as if the server said OK
    pub fn ok(results: Vec<JsonValue>) -> Self {
        Self {
            status: STATUS_OK.to_string(),
            count: Some(results.len() as u64),
            results,
            ..Default::default()
        }
    }

    /// True when the status is exactly `OK`
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    /// Fail with [`Error::Upstream`] unless the status is `OK`
    pub fn ensure_ok(&self) -> Result<()> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(Error::Upstream {
                status: self.status.clone(),
                request_id: self.request_id.clone(),
            })
        }
    }

    /// True when the server offered another page
    pub fn has_next(&self) -> bool {
        self.next_url.is_some()
    }
}

/// Trait for decoding response bodies into page envelopes
pub trait PageDecoder: Send + Sync {
    /// Decode one response body
    fn decode(&self, body: &[u8]) -> Result<PageEnvelope>;
}
