//! HTTP transport with retry and connection pooling
//!
//! Provides the process-wide HTTP client that handles:
//! - Automatic retries for the transient status set with exponential backoff
//! - A bounded number of in-flight requests (the connection pool size)
//! - Optional client-side rate limiting
//! - Attaching the API key to every URL

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::auth::{redact_url, Authenticator, Credential};
use crate::error::{is_transient_status, Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, warn};
use url::Url;

/// Final response of one logical request, after any retries
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code of the last attempt
    pub status: u16,
    /// Response body of the last attempt
    pub body: Bytes,
    /// Number of attempts made (1 = no retry)
    pub attempts: u32,
}

impl RawResponse {
    /// True for HTTP 200
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Body as lossy UTF-8, for error messages
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Anything that can issue a GET and hand back status + body
///
/// Implementations retry transient failures themselves; the caller only sees
/// the final response.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a GET request to `url`
    async fn send(&self, url: &Url) -> Result<RawResponse>;
}

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout
    pub timeout: Duration,
    /// Maximum number of retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry; doubles on every further retry
    pub initial_backoff: Duration,
    /// Upper bound for a single backoff delay
    pub max_backoff: Duration,
    /// Maximum concurrent in-flight requests
    pub pool_size: usize,
    /// Rate limiter configuration
    pub rate_limit: Option<RateLimiterConfig>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 5,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(10),
            pool_size: 1,
            rate_limit: None,
            user_agent: format!("mdfetch/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set max retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set backoff bounds
    pub fn backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.config.initial_backoff = initial;
        self.config.max_backoff = max;
        self
    }

    /// Set the number of concurrent connections
    pub fn pool_size(mut self, size: usize) -> Self {
        self.config.pool_size = size.max(1);
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Disable rate limiting
    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Pooled HTTP client with retry and rate limiting
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    authenticator: Option<Authenticator>,
    rate_limiter: Option<RateLimiter>,
    permits: Arc<Semaphore>,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let pool_size = config.pool_size.max(1);
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .pool_max_idle_per_host(pool_size)
            .build()?;

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            authenticator: None,
            rate_limiter,
            permits: Arc::new(Semaphore::new(pool_size)),
        })
    }

    /// Create a client that signs every request with `credential`
    pub fn with_auth(config: HttpClientConfig, credential: Credential) -> Result<Self> {
        let mut client = Self::with_config(config)?;
        client.authenticator = Some(Authenticator::new(credential));
        Ok(client)
    }

    /// Get the client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// Number of free connection slots right now
    pub fn available_connections(&self) -> usize {
        self.permits.available_permits()
    }

    /// Calculate backoff delay before retry number `attempt + 1`
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        let delay = self.config.initial_backoff.saturating_mul(factor);
        std::cmp::min(delay, self.config.max_backoff)
    }

    /// One network round trip while holding a pool slot
    async fn attempt(&self, url: &Url) -> Result<std::result::Result<(u16, Bytes), reqwest::Error>> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| Error::Other("connection pool closed".to_string()))?;

        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => return Ok(Err(e)),
        };
        let status = response.status().as_u16();
        Ok(response.bytes().await.map(|body| (status, body)))
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn send(&self, url: &Url) -> Result<RawResponse> {
        let target = match &self.authenticator {
            Some(auth) => auth.apply(url),
            None => url.clone(),
        };
        let shown = redact_url(&target);
        let max_retries = self.config.max_retries;
        let mut attempt = 0;

        loop {
            if let Some(ref limiter) = self.rate_limiter {
                limiter.wait().await;
            }

            match self.attempt(&target).await? {
                Ok((status, body)) => {
                    if is_transient_status(status) && attempt < max_retries {
                        let delay = self.calculate_backoff(attempt);
                        warn!(
                            "GET {shown} returned {status}, attempt {}/{}, retrying in {:?}",
                            attempt + 1,
                            max_retries + 1,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }

                    debug!("GET {shown} -> {status} ({} bytes)", body.len());
                    return Ok(RawResponse {
                        status,
                        body,
                        attempts: attempt + 1,
                    });
                }
                Err(e) => {
                    let e = e.without_url();
                    if (e.is_timeout() || e.is_connect()) && attempt < max_retries {
                        let delay = self.calculate_backoff(attempt);
                        warn!(
                            "GET {shown} failed ({e}), attempt {}/{}, retrying in {:?}",
                            attempt + 1,
                            max_retries + 1,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }

                    if e.is_timeout() {
                        return Err(Error::Timeout {
                            timeout_ms: self.config.timeout.as_millis() as u64,
                        });
                    }
                    return Err(Error::Http(e));
                }
            }
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("has_authenticator", &self.authenticator.is_some())
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}
