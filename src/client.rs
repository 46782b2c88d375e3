//! Market data client
//!
//! The entry point of the crate: `fetch(endpoint, params)` renders the
//! endpoint's URL, walks every page, and returns the typed table.
//!
//! ```rust,ignore
//! use mdfetch::client::MarketDataClient;
//! use mdfetch::endpoint::{Aggregates, AggregatesParams};
//!
//! let client = MarketDataClient::connect(&EnvCredential::default(), HttpClientConfig::default())?;
//! let params = AggregatesParams::new("AAPL", 1, Timespan::Day, from, to).limit(50_000);
//! let bars = client.fetch(&Aggregates, &params).await?;
//! ```

use crate::auth::CredentialSource;
use crate::endpoint::Endpoint;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, Transport};
use crate::pagination::{PaginationConfig, Paginator};
use crate::records::ResultTable;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Production API host
pub const DEFAULT_BASE_URL: &str = "https://api.polygon.io";

/// Fetches endpoints through one shared transport
#[derive(Debug, Clone)]
pub struct MarketDataClient {
    base_url: Url,
    paginator: Paginator,
}

impl MarketDataClient {
    /// Create a client over `transport` rooted at `base_url`
    pub fn new(transport: Arc<dyn Transport>, base_url: Url) -> Self {
        Self {
            base_url,
            paginator: Paginator::new(transport),
        }
    }

    /// Create a client rooted at the production host
    pub fn with_default_base(transport: Arc<dyn Transport>) -> Result<Self> {
        Ok(Self::new(transport, Url::parse(DEFAULT_BASE_URL)?))
    }

    /// Build the pooled HTTP transport with the key from `credentials`
    pub fn connect(credentials: &dyn CredentialSource, http: HttpClientConfig) -> Result<Self> {
        let transport = HttpClient::with_auth(http, credentials.credential()?)?;
        Self::with_default_base(Arc::new(transport))
    }

    /// Point the client at another host (mock servers, proxies)
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.base_url = Url::parse(base_url)?;
        Ok(self)
    }

    /// Set pagination configuration
    #[must_use]
    pub fn with_pagination(mut self, config: PaginationConfig) -> Self {
        self.paginator = self.paginator.with_config(config);
        self
    }

    /// The API root every endpoint path is appended to
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The pagination settings in effect
    pub fn pagination(&self) -> &PaginationConfig {
        self.paginator.config()
    }

    /// Fetch every page of `endpoint` for `params`
    ///
    /// Parameters are validated before any request goes out.
    pub async fn fetch<E: Endpoint>(
        &self,
        endpoint: &E,
        params: &E::Params,
    ) -> Result<ResultTable<E::Record>> {
        let url = endpoint.render_url(&self.base_url, params)?;
        debug!("{}: starting at {}", endpoint.name(), url);
        self.paginator
            .fetch_all(url, endpoint, endpoint.expected_limit(params))
            .await
    }

    /// Like [`fetch`](Self::fetch), but give up after `deadline`
    ///
    /// On expiry the in-flight request and any pending page delay are
    /// dropped and pages already received are discarded.
    pub async fn fetch_with_deadline<E: Endpoint>(
        &self,
        endpoint: &E,
        params: &E::Params,
        deadline: Duration,
    ) -> Result<ResultTable<E::Record>> {
        match tokio::time::timeout(deadline, self.fetch(endpoint, params)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("{}: cancelled after {:?}", endpoint.name(), deadline);
                Err(Error::Cancelled {
                    after_ms: deadline.as_millis() as u64,
                })
            }
        }
    }
}
