//! Feed source clients.
//!
//! Everything that can answer a [`FeedRequest`] implements [`FeedSource`]:
//! - [`NewsApiClient`]: talks to the news API directly and holds the API key.
//!   Only the proxy server uses it.
//! - [`ProxyClient`]: talks to the proxy, which injects the key server-side.
//!   This is what the reader uses.
//!
//! Both collapse every failure (unreachable host, non-success status,
//! undecodable body) into [`NewsError::Upstream`]. Nothing is retried.

use crate::error::{NewsError, Result};
use crate::models::{FeedKind, FeedPage, FeedRequest, RawFeedPage};
use crate::utils::truncate_for_log;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};
use url::Url;

/// Page size used for free-text searches.
pub const QUERY_PAGE_SIZE: u32 = 20;
/// Page size used for category headlines.
pub const CATEGORY_PAGE_SIZE: u32 = 12;

pub const DEFAULT_UPSTREAM_URL: &str = "https://newsapi.org/v2";

/// Something that can answer a feed request.
///
/// Implementors must be shareable across tasks; the reader session and the
/// proxy both hold one behind an `Arc<dyn FeedSource>`.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch one page of articles for `request`.
    async fn fetch(&self, request: &FeedRequest) -> Result<FeedPage>;

    /// Fetch one page with each article left as the JSON the source sent.
    ///
    /// The default re-encodes [`FeedSource::fetch`]; sources that see the
    /// upstream body override it so nothing is lost on the way through.
    async fn fetch_raw(&self, request: &FeedRequest) -> Result<RawFeedPage> {
        let page = self.fetch(request).await?;
        let articles = page
            .articles
            .into_iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(RawFeedPage {
            articles,
            total_results: page.total_results,
        })
    }
}

/// Direct client for the news API.
pub struct NewsApiClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl fmt::Debug for NewsApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"*****")
            .finish()
    }
}

impl NewsApiClient {
    /// Create a client for the API rooted at `base_url`
    /// (e.g. `https://newsapi.org/v2`).
    ///
    /// # Errors
    ///
    /// [`NewsError::Config`] if `base_url` does not parse or `api_key` is
    /// empty, [`NewsError::Upstream`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(NewsError::Config("news API key is empty".to_string()));
        }
        Ok(Self {
            http: http_client(timeout)?,
            base_url: parse_base(base_url)?,
            api_key,
        })
    }

    /// The upstream URL for `request`, including the API key.
    pub fn request_url(&self, request: &FeedRequest) -> Url {
        let (endpoint, page_size) = match request.kind {
            FeedKind::Query(_) => ("everything", QUERY_PAGE_SIZE),
            FeedKind::Category(_) => ("top-headlines", CATEGORY_PAGE_SIZE),
        };
        let mut url = self.base_url.clone();
        // parse_base rejected cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(endpoint);
        }
        {
            let mut query = url.query_pairs_mut();
            match &request.kind {
                FeedKind::Query(q) => query.append_pair("q", q),
                FeedKind::Category(c) => query.append_pair("category", c),
            };
            query
                .append_pair("pageSize", &page_size.to_string())
                .append_pair("page", &request.page.to_string())
                .append_pair("apiKey", &self.api_key);
        }
        url
    }
}

#[async_trait]
impl FeedSource for NewsApiClient {
    #[instrument(level = "info", skip_all, fields(kind = ?request.kind, page = request.page))]
    async fn fetch(&self, request: &FeedRequest) -> Result<FeedPage> {
        get_feed_page(&self.http, self.request_url(request)).await
    }

    #[instrument(level = "info", skip_all, fields(kind = ?request.kind, page = request.page))]
    async fn fetch_raw(&self, request: &FeedRequest) -> Result<RawFeedPage> {
        get_feed_page(&self.http, self.request_url(request)).await
    }
}

/// Client for the credential-injecting proxy.
#[derive(Debug)]
pub struct ProxyClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl ProxyClient {
    /// `endpoint` is the full proxy URL, e.g. `http://127.0.0.1:8888/news`.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: http_client(timeout)?,
            endpoint: parse_base(endpoint)?,
        })
    }

    pub fn request_url(&self, request: &FeedRequest) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            match &request.kind {
                FeedKind::Query(q) => query.append_pair("query", q),
                FeedKind::Category(c) => query.append_pair("category", c),
            };
            query.append_pair("page", &request.page.to_string());
        }
        url
    }
}

#[async_trait]
impl FeedSource for ProxyClient {
    #[instrument(level = "info", skip_all, fields(kind = ?request.kind, page = request.page))]
    async fn fetch(&self, request: &FeedRequest) -> Result<FeedPage> {
        get_feed_page(&self.http, self.request_url(request)).await
    }
}

fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(NewsError::from)
}

fn parse_base(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| NewsError::Config(format!("invalid URL {raw:?}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(NewsError::Config(format!("URL {raw:?} cannot carry a path")));
    }
    Ok(url)
}

/// GET `url` and decode a [`FeedPage`]; every failure becomes `Upstream`.
async fn get_feed_page<A: DeserializeOwned>(
    http: &reqwest::Client,
    url: Url,
) -> Result<FeedPage<A>> {
    let t0 = Instant::now();
    let response = http.get(url).send().await?;
    let status = response.status();
    let body = response.text().await?;
    let dt = t0.elapsed();

    if !status.is_success() {
        warn!(
            %status,
            elapsed_ms = dt.as_millis() as u64,
            body_preview = %truncate_for_log(&body, 200),
            "Feed request failed"
        );
        return Err(NewsError::Upstream(format!("status {status}")));
    }

    let page: FeedPage<A> = serde_json::from_str(&body).map_err(|e| {
        warn!(error = %e, body_preview = %truncate_for_log(&body, 200), "Feed body did not decode");
        NewsError::Upstream(format!("undecodable feed body: {e}"))
    })?;
    debug!(
        elapsed_ms = dt.as_millis() as u64,
        count = page.articles.len(),
        total = page.total_results,
        "Fetched feed page"
    );
    Ok(page)
}
