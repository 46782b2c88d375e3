//! Authentication module
//!
//! The upstream API takes its key as the `apiKey` query parameter on every
//! request, including server-issued continuation links.
//!
//! - `CredentialSource` resolves the key (environment variable or literal)
//! - `Authenticator` attaches it to outgoing URLs and strips it from log output

mod authenticator;
mod types;

pub use authenticator::{redact_url, Authenticator, API_KEY_PARAM};
pub use types::{Credential, CredentialSource, EnvCredential, StaticCredential};
