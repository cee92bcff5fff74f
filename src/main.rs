//! # LoopNews
//!
//! Categorized headlines, free-text search and local bookmarks over a news
//! API, with a small proxy that keeps the API key off reader machines.
//!
//! ## Features
//!
//! - `serve`: credential-injecting proxy (`GET /news?category|query&page`)
//! - `headlines` / `search`: one-shot fetches through the proxy
//! - `browse`: interactive reader with debounced search, highlight tags,
//!   infinite-scroll paging and bookmark toggling
//! - `bookmarks`: list, toggle, check and export saved articles
//!
//! ## Usage
//!
//! ```sh
//! NEWS_API_KEY=... loopnews serve &
//! loopnews browse technology
//! ```
//!
//! ## Architecture
//!
//! 1. **Proxy**: validates the selection, calls the news API with the key,
//!    collapses failures into a generic 500
//! 2. **Session**: one event loop owning the feed fetcher; every request is
//!    tagged with a selection token so stale responses are dropped
//! 3. **Bookmarks**: an ordered set mirrored in full to a durable slot on
//!    every toggle

use clap::Parser;
use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod bookmarks;
mod browse;
mod categories;
mod cli;
mod config;
mod error;
mod feed;
mod models;
mod outputs;
mod proxy;
mod session;
mod storage;
mod utils;

use api::{FeedSource, NewsApiClient, ProxyClient};
use bookmarks::BookmarkStore;
use cli::{BookmarkAction, Cli, Command};
use config::Settings;
use models::{BookmarkRecord, FeedRequest};
use outputs::{cards, json};
use session::Session;
use storage::{FileStore, MemoryStore};
use utils::ensure_writable_dir;

#[actix_web::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args.command, "Parsed CLI arguments");

    let settings = Settings::resolve(&args)?;

    let code = match args.command {
        Command::Serve { api_key } => {
            serve(&settings, api_key).await?;
            ExitCode::SUCCESS
        }
        Command::Headlines { category, page } => {
            let request = FeedRequest::category(category.as_str(), page);
            print_once(&settings, request).await?;
            ExitCode::SUCCESS
        }
        Command::Search { query, page } => {
            let request = FeedRequest::query(query.join(" "), page);
            print_once(&settings, request).await?;
            ExitCode::SUCCESS
        }
        Command::Browse { category, private } => {
            let source: Arc<dyn FeedSource> =
                Arc::new(ProxyClient::new(&settings.proxy_url, settings.request_timeout)?);
            let mut session = Session::new(source, category);
            if private {
                let mut bookmarks = BookmarkStore::load(MemoryStore::new());
                browse::run(&mut session, &mut bookmarks).await?;
            } else {
                let mut bookmarks = BookmarkStore::load(FileStore::new(&settings.data_dir));
                browse::run(&mut session, &mut bookmarks).await?;
            }
            ExitCode::SUCCESS
        }
        Command::Bookmarks { action } => manage_bookmarks(&settings, action).await?,
    };

    let elapsed = start_time.elapsed();
    info!(?elapsed, "Execution complete");
    Ok(code)
}

#[instrument(level = "info", skip_all, fields(listen_address = %settings.listen_address))]
async fn serve(settings: &Settings, api_key: Option<String>) -> Result<(), Box<dyn Error>> {
    let Some(api_key) = api_key else {
        error!("No news API key; set NEWS_API_KEY or pass --api-key");
        return Err("missing news API key".into());
    };
    let upstream: Arc<dyn FeedSource> = Arc::new(NewsApiClient::new(
        &settings.upstream_url,
        api_key,
        settings.request_timeout,
    )?);
    proxy::run_server(settings.listen_address, upstream).await?;
    Ok(())
}

/// Fetch one page through the proxy and print it as cards.
async fn print_once(settings: &Settings, request: FeedRequest) -> Result<(), Box<dyn Error>> {
    let client = ProxyClient::new(&settings.proxy_url, settings.request_timeout)?;
    let bookmarks = BookmarkStore::load(FileStore::new(&settings.data_dir));

    let page = client.fetch(&request).await.inspect_err(|e| {
        error!(error = %e, "Could not load news");
    })?;
    println!(
        "Showing {} of {} articles (page {})\n",
        page.articles.len(),
        page.total_results,
        request.page
    );
    print!("{}", cards::render_feed(&page.articles, &bookmarks));
    Ok(())
}

async fn manage_bookmarks(
    settings: &Settings,
    action: BookmarkAction,
) -> Result<ExitCode, Box<dyn Error>> {
    let mut store = BookmarkStore::load(FileStore::new(&settings.data_dir));

    match action {
        BookmarkAction::List => {
            if store.is_empty() {
                println!("You haven't bookmarked any articles yet.");
            } else {
                let articles: Vec<_> = store.bookmarks().iter().map(|b| b.as_article()).collect();
                print!("{}", cards::render_feed(&articles, &store));
            }
        }
        BookmarkAction::Toggle {
            url,
            title,
            description,
            image,
            source,
        } => {
            let record = BookmarkRecord::from_parts(&url, title, description, image, source)?;
            let url = record.url.clone();
            store.toggle(record);
            let state = if store.is_bookmarked(&url) { "Saved" } else { "Removed" };
            println!("{state}: {url}");
        }
        BookmarkAction::Check { url } => {
            if store.is_bookmarked(&url) {
                println!("saved");
            } else {
                println!("not saved");
                return Ok(ExitCode::FAILURE);
            }
        }
        BookmarkAction::Export { json_output_dir } => {
            if let Err(e) = ensure_writable_dir(&json_output_dir).await {
                error!(
                    path = %json_output_dir,
                    error = %e,
                    "JSON output directory is not writable (fix perms or choose a different path)"
                );
                return Err(e);
            }
            let path = json::write_bookmarks(store.bookmarks(), &json_output_dir).await?;
            println!("Exported {} bookmarks to {}", store.len(), path.display());
        }
    }
    Ok(ExitCode::SUCCESS)
}
