//! Search results: request building, page extraction and the crawl driver.
//!
//! Result pages embed their data in the `ds:3` block. Each result is a
//! positional array; [`SEARCH_MAPPINGS`] names the fields.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use gplay_core::SearchResult;
use percent_encoding::percent_decode_str;
use regex::Regex;
use serde_json::Value;

use crate::embedded::extract_embedded_document;
use crate::error::ScraperError;
use crate::fetch::{Fetcher, Params, RequestSpec, Throttle};
use crate::pagination::{
    follow_up_form, Crawl, ResultsPage, SearchState, Transition, DEFAULT_RESULTS,
    MAX_RESULTS,
};
use crate::project::{project_all, resolve_path, FieldSpec, Record};
use crate::reviews::PLAY_STORE_ORIGIN;

const RESULTS_KEY: &str = "ds:3";
const ITEMS_PATH: &[usize] = &[0, 1, 0, 0, 0];
const TOKEN_PATH: &[usize] = &[0, 1, 0, 0, 7, 1];
const PRICE_PATH: &[usize] = &[7, 0, 3, 2, 1, 0, 2];

static CLUSTER_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"href="(/store/apps/collection/search_collection_more_results_cluster\?[^"]*)""#,
    )
    .expect("valid cluster link regex")
});

pub static SEARCH_MAPPINGS: [(&str, FieldSpec); 11] = [
    ("title", FieldSpec::Path(&[2])),
    ("appId", FieldSpec::Path(&[12, 0])),
    (
        "url",
        FieldSpec::Transformed {
            path: &[9, 4, 2],
            transform: absolute_play_url,
        },
    ),
    ("icon", FieldSpec::Path(&[1, 1, 0, 3, 2])),
    ("developer", FieldSpec::Path(&[4, 0, 0, 0])),
    (
        "developerId",
        FieldSpec::Transformed {
            path: &[4, 0, 0, 1, 4, 2],
            transform: developer_id,
        },
    ),
    (
        "priceText",
        FieldSpec::Transformed {
            path: PRICE_PATH,
            transform: price_text,
        },
    ),
    (
        "free",
        FieldSpec::Transformed {
            path: PRICE_PATH,
            transform: free,
        },
    ),
    ("summary", FieldSpec::Path(&[4, 1, 1, 1, 1])),
    ("scoreText", FieldSpec::Path(&[6, 0, 2, 1, 0])),
    ("score", FieldSpec::Path(&[6, 0, 2, 1, 1])),
];

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn join_play_url(path: &str) -> Option<reqwest::Url> {
    reqwest::Url::parse(PLAY_STORE_ORIGIN).ok()?.join(path).ok()
}

fn absolute_play_url(path: Option<&Value>) -> Value {
    present(path)
        .and_then(Value::as_str)
        .and_then(join_play_url)
        .map_or(Value::Null, |url| Value::String(url.into()))
}

/// `/store/apps/developer?id=Inkwell+Labs` → `Inkwell Labs`.
fn developer_id(link: Option<&Value>) -> Value {
    present(link)
        .and_then(Value::as_str)
        .and_then(join_play_url)
        .and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "id")
                .map(|(_, id)| id.into_owned())
        })
        .map_or(Value::Null, Value::String)
}

fn price_text(price: Option<&Value>) -> Value {
    match present(price) {
        None => Value::String("FREE".to_owned()),
        Some(Value::String(text)) => Value::String(text.clone()),
        Some(other) => Value::String(other.to_string()),
    }
}

fn free(price: Option<&Value>) -> Value {
    Value::Bool(present(price).is_none())
}

/// Typed view of a record projected with [`SEARCH_MAPPINGS`].
#[must_use]
pub fn to_search_result(record: &Record) -> SearchResult {
    let owned = |name: &str| record.str(name).map(str::to_owned);
    SearchResult {
        title: owned("title"),
        app_id: owned("appId"),
        url: owned("url"),
        icon: owned("icon"),
        developer: owned("developer"),
        developer_id: owned("developerId"),
        price_text: owned("priceText").unwrap_or_else(|| "FREE".to_owned()),
        free: record.bool("free").unwrap_or(true),
        summary: owned("summary"),
        score_text: owned("scoreText"),
        score: record.f64("score"),
    }
}

/// Decodes the results and continuation token of one results page.
///
/// # Errors
///
/// Fails when the page has no `ds:3` block, the block is not valid JSON, or
/// the items path does not hold an array. An empty array is a page with
/// zero results.
pub fn extract_results_page(body: &str) -> Result<ResultsPage, ScraperError> {
    let doc = extract_embedded_document(body, RESULTS_KEY)?;

    let items = resolve_path(&doc, ITEMS_PATH)
        .and_then(Value::as_array)
        .ok_or_else(|| {
            ScraperError::parse("search results", "no items at ds:3[0][1][0][0][0]")
        })?;
    let results = project_all(items, &SEARCH_MAPPINGS)
        .iter()
        .map(to_search_result)
        .collect();
    let token = resolve_path(&doc, TOKEN_PATH)
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .map(str::to_owned);

    Ok(ResultsPage { results, token })
}

/// Price filter understood by the search page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PriceFilter {
    #[default]
    All,
    Free,
    Paid,
}

impl PriceFilter {
    /// Value sent as the `price` query parameter.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::All => 0,
            Self::Free => 1,
            Self::Paid => 2,
        }
    }
}

impl fmt::Display for PriceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::All => "all",
            Self::Free => "free",
            Self::Paid => "paid",
        };
        f.write_str(name)
    }
}

impl FromStr for PriceFilter {
    type Err = ScraperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "free" => Ok(Self::Free),
            "paid" => Ok(Self::Paid),
            other => Err(ScraperError::validation(
                "price",
                format!("unknown price filter '{other}'"),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    pub term: String,
    /// Results wanted, 1 to 250.
    pub num: usize,
    pub lang: String,
    pub country: String,
    pub price: PriceFilter,
}

impl SearchOptions {
    #[must_use]
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            num: DEFAULT_RESULTS,
            lang: "en".to_owned(),
            country: "us".to_owned(),
            price: PriceFilter::All,
        }
    }

    /// # Errors
    ///
    /// [`ScraperError::Validation`] for a blank term or a `num` outside
    /// 1 to 250.
    pub fn validate(&self) -> Result<(), ScraperError> {
        if self.term.trim().is_empty() {
            return Err(ScraperError::validation("term", "search term missing"));
        }
        if self.num == 0 || self.num > MAX_RESULTS {
            return Err(ScraperError::validation(
                "num",
                format!("must be between 1 and {MAX_RESULTS}, got {}", self.num),
            ));
        }
        Ok(())
    }
}

/// `GET /store/search?c=apps&q=…&hl=…&gl=…&price=…`
#[must_use]
pub fn initial_request(base_url: &str, options: &SearchOptions) -> RequestSpec {
    let mut request = RequestSpec::get(format!("{base_url}/store/search"));
    request.params = Params::Query(vec![
        ("c".to_owned(), "apps".to_owned()),
        ("q".to_owned(), options.term.clone()),
        ("hl".to_owned(), options.lang.clone()),
        ("gl".to_owned(), options.country.clone()),
        ("price".to_owned(), options.price.code().to_string()),
    ]);
    request
}

/// Follow-up page request. The form goes out unencoded.
#[must_use]
pub fn follow_up_request(
    base_url: &str,
    crawl: &Crawl,
    token: &str,
    options: &SearchOptions,
) -> RequestSpec {
    RequestSpec::post_form(
        format!("{base_url}/store/apps/collection/search_results_cluster_apps"),
        follow_up_form(crawl, token, &options.lang, &options.country),
    )
    .unencoded()
}

/// A cluster landing page links to the full result list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterLink {
    pub url: String,
    /// `clp` query value of the link, percent-decoded. `+` is kept as is.
    pub clp: Option<String>,
}

/// Finds the "more results" link on a cluster landing page.
#[must_use]
pub fn find_cluster_link(base_url: &str, body: &str) -> Option<ClusterLink> {
    let href = CLUSTER_LINK_RE
        .captures(body)?
        .get(1)?
        .as_str()
        .replace("&amp;", "&");
    let clp = href
        .split_once('?')
        .and_then(|(_, query)| query.split('&').find_map(|pair| pair.strip_prefix("clp=")))
        .map(|raw| percent_decode_str(raw).decode_utf8_lossy().into_owned());
    let url = format!("{base_url}{href}");
    Some(ClusterLink { url, clp })
}

/// Drives a search crawl through a [`Fetcher`].
pub struct Searcher<'a, F> {
    fetcher: &'a F,
    throttle: &'a Throttle,
    base_url: &'a str,
}

impl<'a, F: Fetcher> Searcher<'a, F> {
    #[must_use]
    pub fn new(fetcher: &'a F, throttle: &'a Throttle, base_url: &'a str) -> Self {
        Self {
            fetcher,
            throttle,
            base_url,
        }
    }

    /// Collects up to `options.num` results, following continuation tokens.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::Validation`] before any request for bad options.
    /// - Any fetch or extraction error from any page. Results gathered from
    ///   earlier pages are discarded.
    /// - [`ScraperError::PaginationLimit`] after
    ///   [`MAX_PAGES`](crate::pagination::MAX_PAGES) pages.
    pub async fn search(
        &self,
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>, ScraperError> {
        options.validate()?;
        self.run(Crawl::new(options.num), options).await
    }

    async fn run(
        &self,
        mut crawl: Crawl,
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>, ScraperError> {
        let mut state = SearchState::Start;
        loop {
            state = match state {
                SearchState::Done => {
                    tracing::debug!(
                        term = %options.term,
                        pages = crawl.pages(),
                        accumulated = crawl.accumulated(),
                        target = crawl.target(),
                        "search finished"
                    );
                    return Ok(crawl.finish());
                }
                SearchState::Failed(err) => return Err(err),
                other => match other.step(&mut crawl) {
                    Transition::To(next) => next,
                    Transition::FetchInitial => {
                        match self.fetch_initial(&mut crawl, options).await {
                            Ok(body) => SearchState::Extract { body },
                            Err(err) => SearchState::Failed(err),
                        }
                    }
                    Transition::FetchNext { token } => {
                        tracing::debug!(
                            page = crawl.pages() + 1,
                            accumulated = crawl.accumulated(),
                            "fetching next results page"
                        );
                        let request = follow_up_request(self.base_url, &crawl, &token, options);
                        match self.fetcher.fetch(&request, self.throttle).await {
                            Ok(body) => SearchState::Extract { body },
                            Err(err) => SearchState::Failed(err),
                        }
                    }
                },
            };
        }
    }

    /// Initial search page, skipping past a cluster landing page if one is
    /// served. Only one hop is followed.
    async fn fetch_initial(
        &self,
        crawl: &mut Crawl,
        options: &SearchOptions,
    ) -> Result<String, ScraperError> {
        let request = initial_request(self.base_url, options);
        let body = self.fetcher.fetch(&request, self.throttle).await?;

        let Some(cluster) = find_cluster_link(self.base_url, &body) else {
            return Ok(body);
        };
        tracing::debug!(url = %cluster.url, "following cluster landing page");
        crawl.set_clp(cluster.clp);
        self.fetcher
            .fetch(&RequestSpec::get(cluster.url), self.throttle)
            .await
    }
}

#[cfg(test)]
#[path = "search_test.rs"]
mod tests;
