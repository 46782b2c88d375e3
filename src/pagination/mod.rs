//! Pagination module
//!
//! Follows server-issued `next_url` links until the last page.
//!
//! # Overview
//!
//! [`Paginator::fetch_all`] issues the first URL through a [`Transport`],
//! decodes and parses each page with the endpoint, and keeps following the
//! continuation link. Every non-final page must report exactly the requested
//! page size. A fixed delay separates consecutive requests.
//!
//! [`Transport`]: crate::http::Transport

mod paginator;
mod types;

pub use paginator::Paginator;
pub use types::{NextPage, PaginationConfig, PaginationState, DEFAULT_PAGE_DELAY};
