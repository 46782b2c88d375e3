//! Authenticator implementation
//!
//! Applies the API key to request URLs.

use super::types::Credential;
use url::Url;

/// Query parameter carrying the API key
pub const API_KEY_PARAM: &str = "apiKey";

/// Attaches the credential to outgoing URLs
#[derive(Debug, Clone)]
pub struct Authenticator {
    credential: Credential,
}

impl Authenticator {
    /// Create an authenticator for the given credential
    pub fn new(credential: Credential) -> Self {
        Self { credential }
    }

    /// Return `url` with exactly one `apiKey` parameter set to our key.
    ///
    /// Continuation links may already carry a key (or none), so any existing
    /// value is replaced rather than duplicated.
    pub fn apply(&self, url: &Url) -> Url {
        let mut authorized = strip_param(url, API_KEY_PARAM);
        authorized
            .query_pairs_mut()
            .append_pair(API_KEY_PARAM, self.credential.expose());
        authorized
    }
}

/// Render a URL for logs with the API key removed
pub fn redact_url(url: &Url) -> String {
    strip_param(url, API_KEY_PARAM).to_string()
}

fn strip_param(url: &Url, name: &str) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != name)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut out = url.clone();
    if kept.is_empty() {
        out.set_query(None);
    } else {
        out.query_pairs_mut().clear().extend_pairs(kept);
    }
    out
}
