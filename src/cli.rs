//! Command-line interface definitions for LoopNews.
//!
//! Global options can be given as flags or environment variables and override
//! values from the optional YAML config file.

use crate::categories::Category;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Command-line arguments for LoopNews.
///
/// # Examples
///
/// ```sh
/// # Run the proxy (the only process that ever sees the API key)
/// NEWS_API_KEY=... loopnews serve
///
/// # Read through it
/// loopnews headlines technology
/// loopnews search "formula 1"
/// loopnews browse sports
/// loopnews bookmarks list
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Directory holding the durable bookmark slot
    #[arg(long, env = "LOOPNEWS_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Full URL of the news proxy endpoint
    #[arg(long, env = "LOOPNEWS_PROXY_URL", global = true)]
    pub proxy_url: Option<String>,

    /// Address the proxy listens on
    #[arg(long, env = "LOOPNEWS_LISTEN", global = true)]
    pub listen: Option<SocketAddr>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the news proxy in front of the news API
    Serve {
        /// News API key, injected into upstream requests
        #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },

    /// Print top headlines for a category
    Headlines {
        #[arg(value_enum, default_value_t = Category::General)]
        category: Category,

        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },

    /// Search all articles
    Search {
        /// Search terms
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },

    /// Interactive reader with search, highlights, paging and bookmarks
    Browse {
        #[arg(value_enum, default_value_t = Category::General)]
        category: Category,

        /// Keep bookmarks in memory only; nothing is read from or written to disk
        #[arg(long)]
        private: bool,
    },

    /// Manage saved articles
    Bookmarks {
        #[command(subcommand)]
        action: BookmarkAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum BookmarkAction {
    /// List saved articles
    List,

    /// Save an article, or remove it if already saved
    Toggle {
        #[arg(long)]
        url: String,

        #[arg(long, default_value = "")]
        title: String,

        #[arg(long)]
        description: Option<String>,

        /// Image URL
        #[arg(long)]
        image: Option<String>,

        /// Publisher name
        #[arg(long)]
        source: Option<String>,
    },

    /// Exit successfully only if the URL is saved
    Check { url: String },

    /// Write all bookmarks to `<dir>/bookmarks.json`
    Export {
        /// Output directory for the JSON file
        #[arg(short, long)]
        json_output_dir: String,
    },
}
