//! URL path templates
//!
//! Handles `{name}` placeholders in endpoint paths such as
//! `/v1/open-close/{ticker}/{date}`. Substituted values are percent-encoded
//! as single path segments, so a value can never add or remove segments.

use crate::error::{Error, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use url::Url;

/// Regex for matching path placeholders: {name}
static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_][a-z0-9_]*)\}").expect("placeholder regex is valid"));

/// Values for the placeholders of one path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathVars {
    values: BTreeMap<&'static str, String>,
}

impl PathVars {
    /// Create an empty set of values
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value
    #[must_use]
    pub fn with(mut self, name: &'static str, value: impl ToString) -> Self {
        self.values.insert(name, value.to_string());
        self
    }

    /// Look up a value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// Path of an endpoint with `{name}` placeholders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathTemplate(&'static str);

impl PathTemplate {
    /// Wrap a template string
    pub const fn new(template: &'static str) -> Self {
        Self(template)
    }

    /// The raw template
    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Placeholder names in order of appearance
    pub fn variables(&self) -> Vec<&'static str> {
        PLACEHOLDER_REGEX
            .captures_iter(self.0)
            .filter_map(|cap| cap.get(1))
            .map(|m| m.as_str())
            .collect()
    }

    /// Render into unencoded path segments
    ///
    /// Fails with [`Error::UndefinedVariable`] naming every placeholder
    /// without a value.
    pub fn segments(&self, vars: &PathVars) -> Result<Vec<String>> {
        let mut missing = Vec::new();

        let segments = self
            .0
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|segment| {
                PLACEHOLDER_REGEX
                    .replace_all(segment, |cap: &regex::Captures<'_>| {
                        let name = cap.get(1).map_or("", |m| m.as_str());
                        match vars.get(name) {
                            Some(value) => value.to_string(),
                            None => {
                                missing.push(name.to_string());
                                String::new()
                            }
                        }
                    })
                    .into_owned()
            })
            .collect();

        if missing.is_empty() {
            Ok(segments)
        } else {
            Err(Error::undefined_var(missing.join(", ")))
        }
    }

    /// Render onto `base`, keeping any path prefix the base already has
    pub fn render(&self, base: &Url, vars: &PathVars) -> Result<Url> {
        let segments = self.segments(vars)?;
        let mut url = base.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|()| Error::config(format!("Base URL cannot carry a path: {base}")))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPEN_CLOSE: PathTemplate = PathTemplate::new("/v1/open-close/{ticker}/{date}");

    fn base() -> Url {
        Url::parse("https://api.polygon.io").unwrap()
    }

    #[test]
    fn test_variables() {
        let t = PathTemplate::new(
            "/v2/aggs/ticker/{ticker}/range/{multiplier}/{timespan}/{from}/{to}",
        );
        assert_eq!(
            t.variables(),
            vec!["ticker", "multiplier", "timespan", "from", "to"]
        );
    }

    #[test]
    fn test_render_simple() {
        let vars = PathVars::new().with("ticker", "AAPL").with("date", "2024-01-02");
        let url = OPEN_CLOSE.render(&base(), &vars).unwrap();
        assert_eq!(url.as_str(), "https://api.polygon.io/v1/open-close/AAPL/2024-01-02");
    }

    #[test]
    fn test_render_keeps_base_prefix() {
        let base = Url::parse("http://127.0.0.1:8080/proxy/").unwrap();
        let vars = PathVars::new().with("ticker", "AAPL").with("date", "2024-01-02");
        let url = OPEN_CLOSE.render(&base, &vars).unwrap();
        assert_eq!(url.path(), "/proxy/v1/open-close/AAPL/2024-01-02");
    }

    #[test]
    fn test_values_are_encoded_as_one_segment() {
        let vars = PathVars::new().with("ticker", "BRK/A").with("date", "2024-01-02");
        let url = OPEN_CLOSE.render(&base(), &vars).unwrap();
        assert_eq!(url.path(), "/v1/open-close/BRK%2FA/2024-01-02");
    }

    #[test]
    fn test_undefined_variables_listed() {
        let err = OPEN_CLOSE.segments(&PathVars::new()).unwrap_err();
        match err {
            Error::UndefinedVariable { variable } => assert_eq!(variable, "ticker, date"),
            other => panic!("Expected UndefinedVariable, got {other:?}"),
        }
    }

    #[test]
    fn test_no_placeholders() {
        let t = PathTemplate::new("/v3/reference/tickers/types");
        assert!(t.variables().is_empty());
        assert_eq!(
            t.segments(&PathVars::new()).unwrap(),
            vec!["v3", "reference", "tickers", "types"]
        );
    }

    #[test]
    fn test_base_query_dropped() {
        let base = Url::parse("https://api.polygon.io/?apiKey=x").unwrap();
        let url = PathTemplate::new("/v1/marketstatus/upcoming")
            .render(&base, &PathVars::new())
            .unwrap();
        assert_eq!(url.query(), None);
    }
}
