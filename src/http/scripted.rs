//! In-memory transport that replays canned responses

use super::client::{RawResponse, Transport};
use crate::error::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

/// Replays queued responses in order and records every requested URL
#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    responses: Mutex<VecDeque<RawResponse>>,
    requests: Mutex<Vec<Url>>,
    latency: Duration,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Delay every response by `latency`
    pub(crate) fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Queue a 200 response with a JSON body
    pub(crate) fn ok(self, body: serde_json::Value) -> Self {
        self.respond(200, body.to_string(), 1)
    }

    /// Queue an arbitrary response
    pub(crate) fn respond(self, status: u16, body: impl Into<String>, attempts: u32) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(RawResponse {
                status,
                body: Bytes::from(body.into()),
                attempts,
            });
        self
    }

    /// URLs requested so far
    pub(crate) fn requests(&self) -> Vec<Url> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, url: &Url) -> Result<RawResponse> {
        self.requests.lock().unwrap().push(url.clone());
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::Other(format!("no scripted response for {url}")))
    }
}
