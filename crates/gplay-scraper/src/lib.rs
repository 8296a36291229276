//! Extraction and pagination engine for Google Play Store pages.
//!
//! - [`normalize`]: free-text values (install ranges, versions, ratings).
//! - [`project`]: positional JSON data to flat records.
//! - [`details`] / [`reviews`]: HTML pages to typed records.
//! - [`search`] / [`pagination`]: the multi-page search crawl.
//! - [`fetch`] / [`client`]: the network seam and its reqwest implementation.

pub mod client;
pub mod details;
mod dom;
pub mod embedded;
pub mod error;
pub mod fetch;
pub mod normalize;
pub mod pagination;
pub mod project;
mod rate_limit;
pub mod reviews;
pub mod search;

pub use client::{AppClient, AppOptions, PlayClient, ReviewsOptions};
pub use details::extract_app_details;
pub use embedded::{extract_embedded_document, extract_embedded_documents};
pub use error::ScraperError;
pub use fetch::{Fetcher, Method, Params, RequestSpec, Throttle};
pub use normalize::Locale;
pub use pagination::{Crawl, SearchState, Transition, MAX_PAGES, MAX_RESULTS};
pub use project::{project, project_all, resolve_path, FieldSpec, FieldTable, Record};
pub use reviews::{extract_reviews, extract_reviews_payload, Sort};
pub use search::{extract_results_page, PriceFilter, SearchOptions, Searcher, SEARCH_MAPPINGS};
