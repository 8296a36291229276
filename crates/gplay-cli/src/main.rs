mod commands;

use clap::{Parser, Subcommand};
use gplay_scraper::{PriceFilter, Sort};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "gplay-cli")]
#[command(about = "Fetch app details, reviews and search results from the Google Play Store")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the details of one app as JSON.
    App {
        /// Application id, e.g. `com.google.android.apps.maps`.
        app_id: String,
        #[arg(long)]
        lang: Option<String>,
        #[arg(long)]
        country: Option<String>,
    },
    /// Print one page of an app's reviews as JSON.
    Reviews {
        app_id: String,
        /// newest, rating or helpfulness.
        #[arg(long, default_value_t = Sort::Newest)]
        sort: Sort,
        /// Zero-based page number.
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long)]
        lang: Option<String>,
    },
    /// Search for apps and print the results as JSON.
    Search {
        term: String,
        /// Number of results, 1 to 250.
        #[arg(long, default_value_t = 20)]
        num: usize,
        /// all, free or paid.
        #[arg(long, default_value_t = PriceFilter::All)]
        price: PriceFilter,
        #[arg(long)]
        lang: Option<String>,
        #[arg(long)]
        country: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = gplay_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::App {
            app_id,
            lang,
            country,
        } => commands::run_app(&config, app_id, lang, country).await,
        Commands::Reviews {
            app_id,
            sort,
            page,
            lang,
        } => commands::run_reviews(&config, app_id, sort, page, lang).await,
        Commands::Search {
            term,
            num,
            price,
            lang,
            country,
        } => {
            let request = commands::SearchRequest {
                term,
                num,
                price,
                lang,
                country,
            };
            commands::run_search(&config, request).await
        }
    }
}

#[cfg(test)]
mod tests;
