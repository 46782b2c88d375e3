//! Credential types
//!
//! A `Credential` is the resolved API key. Sources are pluggable so the
//! orchestration layer can decide where keys live.

use crate::error::{Error, Result};
use crate::types::OptionStringExt;
use std::fmt;

/// Resolved API key
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a key, rejecting blank values
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            return Err(Error::credential("API key is empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The raw key
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&"***").finish()
    }
}

/// Something that can produce an API key
pub trait CredentialSource: Send + Sync {
    /// Resolve the credential
    fn credential(&self) -> Result<Credential>;
}

/// Reads the key from an environment variable
#[derive(Debug, Clone)]
pub struct EnvCredential {
    var: String,
}

impl EnvCredential {
    /// Default variable name
    pub const DEFAULT_VAR: &'static str = "POLYGON_API_KEY";

    /// Create a source for the given variable
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    /// Variable name this source reads
    pub fn var(&self) -> &str {
        &self.var
    }
}

impl Default for EnvCredential {
    fn default() -> Self {
        Self::new(Self::DEFAULT_VAR)
    }
}

impl CredentialSource for EnvCredential {
    fn credential(&self) -> Result<Credential> {
        let value = std::env::var(&self.var)
            .ok()
            .none_if_empty()
            .ok_or_else(|| {
                Error::credential(format!("environment variable {} is not set", self.var))
            })?;
        Credential::new(value)
    }
}

/// A key supplied directly (tests, CLI flags)
#[derive(Debug, Clone)]
pub struct StaticCredential(Credential);

impl StaticCredential {
    /// Create from a literal key
    pub fn new(key: impl Into<String>) -> Result<Self> {
        Credential::new(key).map(Self)
    }
}

impl CredentialSource for StaticCredential {
    fn credential(&self) -> Result<Credential> {
        Ok(self.0.clone())
    }
}
