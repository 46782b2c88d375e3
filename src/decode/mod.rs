//! Response decoder module
//!
//! Turns a raw response body into a [`PageEnvelope`].
//!
//! # Overview
//!
//! Most endpoints answer with the standard envelope
//! (`status`, `request_id`, `count`, `next_url`, `results`). A few answer with
//! a bare JSON array; [`BareArrayDecoder`] wraps those into an envelope so the
//! paginator sees one shape regardless of endpoint.

mod decoders;
mod types;

pub use decoders::{BareArrayDecoder, EnvelopeDecoder};
pub use types::{PageDecoder, PageEnvelope, STATUS_OK};
