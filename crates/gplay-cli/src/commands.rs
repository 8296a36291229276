//! Command handlers. Each builds an `AppClient` from config, runs one call
//! and prints the result as pretty JSON on stdout.

use anyhow::Context;
use gplay_core::AppConfig;
use gplay_scraper::{AppClient, AppOptions, PriceFilter, ReviewsOptions, SearchOptions, Sort};
use serde::Serialize;

pub(crate) struct SearchRequest {
    pub term: String,
    pub num: usize,
    pub price: PriceFilter,
    pub lang: Option<String>,
    pub country: Option<String>,
}

fn client(config: &AppConfig) -> anyhow::Result<AppClient> {
    AppClient::from_config(config).context("failed to build Play Store client")
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) async fn run_app(
    config: &AppConfig,
    app_id: String,
    lang: Option<String>,
    country: Option<String>,
) -> anyhow::Result<()> {
    let options = AppOptions {
        app_id,
        lang: lang.unwrap_or_else(|| config.default_lang.clone()),
        country: country.unwrap_or_else(|| config.default_country.clone()),
    };
    tracing::info!(app_id = %options.app_id, "fetching app details");

    let details = client(config)?
        .app(&options)
        .await
        .with_context(|| format!("failed to fetch details for {}", options.app_id))?;
    print_json(&details)
}

pub(crate) async fn run_reviews(
    config: &AppConfig,
    app_id: String,
    sort: Sort,
    page: u32,
    lang: Option<String>,
) -> anyhow::Result<()> {
    let options = ReviewsOptions {
        app_id,
        page,
        sort,
        lang: lang.unwrap_or_else(|| config.default_lang.clone()),
    };
    tracing::info!(app_id = %options.app_id, page, %sort, "fetching reviews");

    let reviews = client(config)?
        .reviews(&options)
        .await
        .with_context(|| format!("failed to fetch reviews for {}", options.app_id))?;
    print_json(&reviews)
}

pub(crate) async fn run_search(config: &AppConfig, request: SearchRequest) -> anyhow::Result<()> {
    let options = SearchOptions {
        term: request.term,
        num: request.num,
        lang: request
            .lang
            .unwrap_or_else(|| config.default_lang.clone()),
        country: request
            .country
            .unwrap_or_else(|| config.default_country.clone()),
        price: request.price,
    };
    tracing::info!(term = %options.term, num = options.num, price = %options.price, "searching");

    let results = client(config)?
        .search(&options)
        .await
        .with_context(|| format!("search for '{}' failed", options.term))?;
    tracing::info!(count = results.len(), "search complete");
    print_json(&results)
}
