use gplay_core::{AppConfig, AppDetails, Review, SearchResult};

use crate::details::extract_app_details;
use crate::error::ScraperError;
use crate::fetch::{Fetcher, Params, RequestSpec, Throttle};
use crate::normalize::Locale;
use crate::reviews::{extract_reviews, extract_reviews_payload, Sort};
use crate::search::{SearchOptions, Searcher};

use super::PlayClient;

/// Options for [`AppClient::app`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppOptions {
    pub app_id: String,
    pub lang: String,
    pub country: String,
}

impl AppOptions {
    #[must_use]
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            lang: "en".to_owned(),
            country: "us".to_owned(),
        }
    }
}

/// Options for [`AppClient::reviews`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewsOptions {
    pub app_id: String,
    /// Zero-based page of the review listing.
    pub page: u32,
    pub sort: Sort,
    pub lang: String,
}

impl ReviewsOptions {
    #[must_use]
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            page: 0,
            sort: Sort::default(),
            lang: "en".to_owned(),
        }
    }
}

fn require_app_id(app_id: &str) -> Result<(), ScraperError> {
    if app_id.trim().is_empty() {
        return Err(ScraperError::validation("app_id", "appId missing"));
    }
    Ok(())
}

fn pairs<const N: usize>(items: [(&str, String); N]) -> Vec<(String, String)> {
    items
        .into_iter()
        .map(|(key, value)| (key.to_owned(), value))
        .collect()
}

/// Entry point for app details, reviews and search.
///
/// Generic over the [`Fetcher`] so tests can substitute a scripted one.
pub struct AppClient<F = PlayClient> {
    fetcher: F,
    throttle: Throttle,
    base_url: String,
}

impl AppClient<PlayClient> {
    /// Builds a client from runtime configuration: HTTP settings, base URL
    /// and throttle interval.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        let fetcher = PlayClient::from_config(config)?;
        Ok(Self::new(fetcher, &config.base_url)
            .with_throttle(Throttle::from_millis(config.throttle_interval_ms)))
    }
}

impl<F: Fetcher> AppClient<F> {
    #[must_use]
    pub fn new(fetcher: F, base_url: &str) -> Self {
        Self {
            fetcher,
            throttle: Throttle::disabled(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    #[must_use]
    pub fn with_throttle(mut self, throttle: Throttle) -> Self {
        self.throttle = throttle;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches and extracts the details page of one app.
    ///
    /// # Errors
    ///
    /// [`ScraperError::Validation`] for a blank app id, otherwise any fetch
    /// or extraction error.
    pub async fn app(&self, options: &AppOptions) -> Result<AppDetails, ScraperError> {
        require_app_id(&options.app_id)?;

        let mut request = RequestSpec::get(format!("{}/store/apps/details", self.base_url));
        request.params = Params::Query(pairs([
            ("id", options.app_id.clone()),
            ("hl", options.lang.clone()),
            ("gl", options.country.clone()),
        ]));
        let url = request.target_url();

        let html = self.fetcher.fetch(&request, &self.throttle).await?;
        extract_app_details(&html, &options.app_id, &url)
    }

    /// Fetches one page of reviews.
    ///
    /// # Errors
    ///
    /// [`ScraperError::Validation`] for a blank app id, otherwise any fetch
    /// or extraction error.
    pub async fn reviews(&self, options: &ReviewsOptions) -> Result<Vec<Review>, ScraperError> {
        require_app_id(&options.app_id)?;

        let request = RequestSpec::post_form(
            format!("{}/store/getreviews", self.base_url),
            pairs([
                ("pageNum", options.page.to_string()),
                ("id", options.app_id.clone()),
                ("reviewSortOrder", options.sort.code().to_string()),
                ("hl", options.lang.clone()),
                ("reviewType", "0".to_owned()),
                ("xhr", "1".to_owned()),
            ]),
        );

        let body = self.fetcher.fetch(&request, &self.throttle).await?;
        let html = extract_reviews_payload(&body)?;
        extract_reviews(&html, Locale::from_lang(&options.lang))
    }

    /// Runs a search crawl. See [`Searcher::search`].
    ///
    /// # Errors
    ///
    /// See [`Searcher::search`].
    pub async fn search(
        &self,
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>, ScraperError> {
        Searcher::new(&self.fetcher, &self.throttle, &self.base_url)
            .search(options)
            .await
    }
}
