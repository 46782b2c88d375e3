//! Pagination types

use crate::decode::PageEnvelope;
use crate::error::{Error, Result};
use std::time::Duration;
use url::Url;

/// Pause between two consecutive page requests of one call
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_secs(15);

/// Result of the next page computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// Another page lives at this URL
    Continue(Url),
    /// No more pages
    Done,
}

/// Configuration for pagination behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationConfig {
    /// Delay before each request after the first
    pub page_delay: Duration,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_delay: DEFAULT_PAGE_DELAY,
        }
    }
}

impl PaginationConfig {
    /// Create a config with the default delay
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the inter-page delay
    #[must_use]
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }
}

/// Tracks pagination state during one call
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    /// Pages received so far
    pub pages: usize,
    /// Records parsed so far
    pub total_fetched: u64,
    /// Is pagination complete?
    pub done: bool,
}

impl PaginationState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one received page and decide where to go next
    ///
    /// `current` resolves relative continuation links. When the page offers a
    /// continuation and `expected_limit` is set, the page's `count` must equal
    /// it exactly; the final page is never checked.
    pub fn advance(
        &mut self,
        page: &PageEnvelope,
        records: usize,
        current: &Url,
        expected_limit: Option<u32>,
    ) -> Result<NextPage> {
        self.pages += 1;
        self.total_fetched += records as u64;

        let Some(next) = page.next_url.as_deref() else {
            self.done = true;
            return Ok(NextPage::Done);
        };

        if let Some(limit) = expected_limit {
            if page.count != Some(u64::from(limit)) {
                self.done = true;
                return Err(Error::PageSizeMismatch {
                    page: self.pages,
                    count: page.count,
                    limit,
                });
            }
        }

        let url = current
            .join(next)
            .map_err(|e| Error::decode(format!("Invalid next_url '{next}': {e}")))?;

        // Continuation links must stay on the current host
        if url.origin() != current.origin() {
            self.done = true;
            return Err(Error::decode(format!(
                "next_url points to another host: {}",
                url.origin().ascii_serialization()
            )));
        }
        Ok(NextPage::Continue(url))
    }
}
