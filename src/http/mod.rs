//! HTTP transport module
//!
//! Provides the pooled HTTP client with retry, backoff, and rate limiting.
//!
//! # Features
//!
//! - **Automatic Retries**: statuses 413, 429, 499, 500, 502, 503, 504 are
//!   retried with exponential backoff (100ms, doubling)
//! - **Bounded Pool**: a fixed number of concurrent in-flight requests
//! - **Rate Limiting**: optional token bucket using governor
//! - **Authentication**: the API key is attached to every URL

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RawResponse, Transport};
pub use rate_limit::{RateLimiter, RateLimiterConfig};

#[cfg(test)]
mod scripted;
#[cfg(test)]
pub(crate) use scripted::ScriptedTransport;
