//! The fetch collaborator seam.
//!
//! Extraction and pagination only ever see a [`Fetcher`]: give it a
//! [`RequestSpec`] and a [`Throttle`], get a response body back. The
//! reqwest-backed implementation lives in [`crate::client`]; tests drive the
//! same code with scripted in-memory fetchers.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::ScraperError;

/// Characters left alone by `application/x-www-form-urlencoded`.
const FORM_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'*');

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Request parameters and where they travel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Params {
    /// Appended to the URL.
    Query(Vec<(String, String)>),
    /// Sent as a form body.
    Form(Vec<(String, String)>),
}

impl Params {
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        match self {
            Self::Query(pairs) | Self::Form(pairs) => pairs,
        }
    }
}

/// Everything a fetcher needs to issue one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub method: Method,
    pub url: String,
    pub params: Params,
    /// When `false`, parameter values are joined verbatim. The search
    /// continuation endpoint rejects an escaped `pagTok`.
    pub encode: bool,
}

impl RequestSpec {
    /// A GET to `url`, which may already carry its own query string.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            params: Params::Query(Vec::new()),
            encode: true,
        }
    }

    /// A form POST to `url`.
    #[must_use]
    pub fn post_form(url: impl Into<String>, fields: Vec<(String, String)>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            params: Params::Form(fields),
            encode: true,
        }
    }

    /// Disables percent-encoding of parameter values.
    #[must_use]
    pub fn unencoded(mut self) -> Self {
        self.encode = false;
        self
    }

    /// Value of the first parameter called `name`.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .pairs()
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Parameters serialized as `k=v&k=v`, honouring [`Self::encode`].
    #[must_use]
    pub fn encoded_params(&self) -> String {
        let encode = |s: &str| -> String {
            if self.encode {
                utf8_percent_encode(s, FORM_VALUE).to_string()
            } else {
                s.to_owned()
            }
        };
        self.params
            .pairs()
            .iter()
            .map(|(key, value)| format!("{}={}", encode(key), encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// The URL to hit: for query params, `url` plus the encoded query.
    #[must_use]
    pub fn target_url(&self) -> String {
        match &self.params {
            Params::Query(pairs) if !pairs.is_empty() => {
                let separator = if self.url.contains('?') { '&' } else { '?' };
                format!("{}{separator}{}", self.url, self.encoded_params())
            }
            _ => self.url.clone(),
        }
    }

    /// The form body, if this request carries one.
    #[must_use]
    pub fn form_body(&self) -> Option<String> {
        match self.params {
            Params::Form(_) => Some(self.encoded_params()),
            Params::Query(_) => None,
        }
    }
}

/// Minimum spacing between requests that share this handle.
///
/// Clones share one gate, so a throttle handed to several calls spaces all
/// of them. A zero gap never waits.
#[derive(Debug, Clone)]
pub struct Throttle {
    last_request: Arc<tokio::sync::Mutex<Option<Instant>>>,
    min_gap: Duration,
}

impl Throttle {
    #[must_use]
    pub fn new(min_gap: Duration) -> Self {
        Self {
            last_request: Arc::new(tokio::sync::Mutex::new(None)),
            min_gap,
        }
    }

    #[must_use]
    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    #[must_use]
    pub fn min_gap(&self) -> Duration {
        self.min_gap
    }

    /// Waits until at least `min_gap` has passed since the previous slot was
    /// handed out, then claims the next one.
    pub async fn acquire(&self) {
        if self.min_gap.is_zero() {
            return;
        }
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_gap {
                tokio::time::sleep(self.min_gap.saturating_sub(elapsed)).await;
            }
        }
        *last = Some(Instant::now());
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Issues one request and returns the response body.
///
/// Implementations own transport concerns (status mapping, timeouts, and
/// waiting on the throttle). Callers never retry.
pub trait Fetcher {
    fn fetch(
        &self,
        request: &RequestSpec,
        throttle: &Throttle,
    ) -> impl Future<Output = Result<String, ScraperError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn get_appends_encoded_query() {
        let mut request = RequestSpec::get("https://play.google.com/store/apps/details");
        request.params = Params::Query(pairs(&[("id", "com.example"), ("hl", "pt BR")]));
        assert_eq!(
            request.target_url(),
            "https://play.google.com/store/apps/details?id=com.example&hl=pt%20BR"
        );
        assert!(request.form_body().is_none());
    }

    #[test]
    fn get_with_existing_query_uses_ampersand() {
        let mut request = RequestSpec::get("https://x.test/search?c=apps");
        request.params = Params::Query(pairs(&[("q", "a&b")]));
        assert_eq!(request.target_url(), "https://x.test/search?c=apps&q=a%26b");
    }

    #[test]
    fn get_without_params_keeps_url() {
        let request = RequestSpec::get("https://x.test/a?b=c");
        assert_eq!(request.target_url(), "https://x.test/a?b=c");
    }

    #[test]
    fn form_body_is_encoded_by_default() {
        let request = RequestSpec::post_form("https://x.test", pairs(&[("pagTok", "GAE=:S:x")]));
        assert_eq!(request.form_body().as_deref(), Some("pagTok=GAE%3D%3AS%3Ax"));
        assert_eq!(request.target_url(), "https://x.test");
    }

    #[test]
    fn unencoded_form_body_is_verbatim() {
        let request = RequestSpec::post_form(
            "https://x.test",
            pairs(&[("start", "-49"), ("pagTok", "GAE=:S:x")]),
        )
        .unencoded();
        assert!(!request.encode);
        assert_eq!(
            request.form_body().as_deref(),
            Some("start=-49&pagTok=GAE=:S:x")
        );
    }

    #[test]
    fn param_looks_up_first_value() {
        let request = RequestSpec::post_form("https://x.test", pairs(&[("num", "48"), ("num", "0")]));
        assert_eq!(request.param("num"), Some("48"));
        assert_eq!(request.param("missing"), None);
    }

    #[tokio::test]
    async fn disabled_throttle_never_waits() {
        let throttle = Throttle::disabled();
        let started = Instant::now();
        for _ in 0..5 {
            throttle.acquire().await;
        }
        assert!(started.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn throttle_spaces_consecutive_acquires() {
        let throttle = Throttle::from_millis(40);
        let shared = throttle.clone();
        let started = Instant::now();
        throttle.acquire().await;
        shared.acquire().await;
        throttle.acquire().await;
        assert!(started.elapsed() >= Duration::from_millis(80));
        assert_eq!(shared.min_gap(), Duration::from_millis(40));
    }
}
