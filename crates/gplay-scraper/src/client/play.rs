use std::time::Duration;

use gplay_core::AppConfig;
use reqwest::header::{CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, StatusCode};

use crate::error::ScraperError;
use crate::fetch::{Fetcher, Method, RequestSpec, Throttle};
use crate::rate_limit::retry_with_backoff;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded;charset=UTF-8";

/// Seconds assumed when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// HTTP fetcher for Play Store pages.
///
/// Maps 429, 404 and any other non-2xx status to typed errors. Redirects
/// are followed. Transient failures are retried only when `max_retries` is
/// non-zero.
#[derive(Debug, Clone)]
pub struct PlayClient {
    client: Client,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl PlayClient {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be built.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_secs,
        })
    }

    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        Self::new(
            config.request_timeout_secs,
            &config.user_agent,
            config.max_retries,
            config.retry_backoff_base_secs,
        )
    }

    async fn send(&self, request: &RequestSpec) -> Result<String, ScraperError> {
        let url = request.target_url();
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };
        if let Some(body) = request.form_body() {
            builder = builder
                .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                .body(body);
        }

        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Err(ScraperError::RateLimited {
                domain: host_of(&url),
                retry_after_secs,
            });
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ScraperError::NotFound { url });
        }
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        tracing::debug!(%url, bytes = body.len(), "fetched page");
        Ok(body)
    }
}

impl Fetcher for PlayClient {
    async fn fetch(
        &self,
        request: &RequestSpec,
        throttle: &Throttle,
    ) -> Result<String, ScraperError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || async move {
            throttle.acquire().await;
            self.send(request).await
        })
        .await
    }
}

/// Hostname of `url` for error messages, or the whole string if it does
/// not parse.
fn host_of(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| url.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_of_extracts_hostname() {
        assert_eq!(
            host_of("https://play.google.com/store/apps/details?id=x"),
            "play.google.com"
        );
        assert_eq!(host_of("http://127.0.0.1:4321/store/search"), "127.0.0.1");
    }

    #[test]
    fn host_of_unparseable_falls_back_to_input() {
        assert_eq!(host_of("not a url"), "not a url");
    }

    #[test]
    fn builds_from_config() {
        let config = AppConfig {
            env: gplay_core::Environment::Test,
            log_level: "debug".to_owned(),
            base_url: "https://play.google.com".to_owned(),
            default_lang: "en".to_owned(),
            default_country: "us".to_owned(),
            request_timeout_secs: 5,
            user_agent: "gplay-test/0.1".to_owned(),
            throttle_interval_ms: 0,
            max_retries: 2,
            retry_backoff_base_secs: 1,
        };
        let client = PlayClient::from_config(&config).unwrap();
        assert_eq!(client.max_retries, 2);
        assert_eq!(client.backoff_base_secs, 1);
    }
}
