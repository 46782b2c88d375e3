//! Next-URL paginator

use super::types::{NextPage, PaginationConfig, PaginationState};
use crate::auth::redact_url;
use crate::decode::PageEnvelope;
use crate::endpoint::Endpoint;
use crate::error::{is_transient_status, Error, Result};
use crate::http::Transport;
use crate::records::ResultTable;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use url::Url;

/// Drives one logical call across all of its pages
#[derive(Clone)]
pub struct Paginator {
    transport: Arc<dyn Transport>,
    config: PaginationConfig,
}

impl Paginator {
    /// Create a paginator over a shared transport
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            config: PaginationConfig::default(),
        }
    }

    /// Set pagination configuration
    #[must_use]
    pub fn with_config(mut self, config: PaginationConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the pagination configuration
    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    /// Fetch every page starting at `initial_url`
    ///
    /// Records come back in page order, and within a page in server order.
    /// Any failure aborts the call; no partial table is returned.
    pub async fn fetch_all<E: Endpoint>(
        &self,
        initial_url: Url,
        endpoint: &E,
        expected_limit: Option<u32>,
    ) -> Result<ResultTable<E::Record>> {
        let start = Instant::now();
        let mut state = PaginationState::new();
        let mut table = ResultTable::new();
        let mut url = initial_url;

        loop {
            let page = self.fetch_page(&url, endpoint).await?;
            page.ensure_ok()?;

            let records = endpoint.parse_page(&page)?;
            let count = records.len();
            table.push_page(records);

            debug!(
                "{}: page {} -> {count} records (reported {:?})",
                endpoint.name(),
                state.pages + 1,
                page.count
            );

            match state.advance(&page, count, &url, expected_limit)? {
                NextPage::Done => break,
                NextPage::Continue(next) => {
                    if !self.config.page_delay.is_zero() {
                        debug!(
                            "{}: waiting {:?} before {}",
                            endpoint.name(),
                            self.config.page_delay,
                            redact_url(&next)
                        );
                        tokio::time::sleep(self.config.page_delay).await;
                    }
                    url = next;
                }
            }
        }

        info!(
            "{}: {} records in {} pages ({:?})",
            endpoint.name(),
            state.total_fetched,
            state.pages,
            start.elapsed()
        );
        Ok(table)
    }

    /// Send one request and decode the body
    async fn fetch_page<E: Endpoint>(&self, url: &Url, endpoint: &E) -> Result<PageEnvelope> {
        let response = self.transport.send(url).await?;

        if !response.is_ok() {
            return Err(if is_transient_status(response.status) {
                Error::TransientHttp {
                    status: response.status,
                    attempts: response.attempts,
                }
            } else {
                Error::http_status(response.status, response.text())
            });
        }

        endpoint.decode_page(&response.body)
    }
}

impl std::fmt::Debug for Paginator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paginator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
