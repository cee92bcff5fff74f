//! The news proxy server.
//!
//! Sits between readers and the news API so the API key never leaves the
//! server. It accepts `category | query | page`, forwards to the upstream
//! [`FeedSource`] and answers with `{ articles, totalResults }`, the articles
//! passed through exactly as the upstream sent them. Errors are
//! translated, never forwarded: a missing selection is a 400, anything that
//! goes wrong upstream is a generic 500.

use crate::api::FeedSource;
use crate::error::NewsError;
use crate::models::FeedRequest;
use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::middleware::Logger;
use actix_web::web::{self, Data};
use actix_web::{App, HttpResponse, HttpServer, ResponseError};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

/// Route served for feed requests.
pub const NEWS_PATH: &str = "/news";
/// Serverless-function path older web clients still call.
pub const LEGACY_NEWS_PATH: &str = "/.netlify/functions/news";

pub struct ProxyState {
    upstream: Arc<dyn FeedSource>,
}

impl ProxyState {
    pub fn new(upstream: Arc<dyn FeedSource>) -> Self {
        Self { upstream }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewsParams {
    category: Option<String>,
    query: Option<String>,
    page: Option<String>,
}

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Failed to fetch news")]
    Upstream,
}

impl From<NewsError> for ProxyError {
    fn from(value: NewsError) -> Self {
        match value {
            NewsError::Validation(msg) => Self::BadRequest(msg),
            other => {
                error!(error = %other, "News function error");
                Self::Upstream
            }
        }
    }
}

impl ResponseError for ProxyError {
    fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ProxyError::Upstream => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(json!({ "error": self.to_string() }))
    }
}

pub async fn get_news(
    state: Data<ProxyState>,
    params: web::Query<NewsParams>,
) -> Result<HttpResponse, ProxyError> {
    let params = params.into_inner();
    let request = FeedRequest::from_params(
        params.category.as_deref(),
        params.query.as_deref(),
        params.page.as_deref(),
    )?;
    debug!(?request, "Forwarding feed request");

    let page = state.upstream.fetch_raw(&request).await?;
    Ok(HttpResponse::Ok().json(page))
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// Register the proxy routes on an app or scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route(NEWS_PATH, web::get().to(get_news))
        .route(LEGACY_NEWS_PATH, web::get().to(get_news))
        .route("/health", web::get().to(health));
}

/// Serve the proxy on `listen_address` until shut down.
pub async fn run_server(
    listen_address: SocketAddr,
    upstream: Arc<dyn FeedSource>,
) -> std::io::Result<()> {
    let state = Data::new(ProxyState::new(upstream));

    info!(%listen_address, "Starting news proxy");
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind(listen_address)?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::models::{Article, FeedKind, FeedPage, RawFeedPage};
    use actix_web::test;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers categories with one article and fails every query.
    #[derive(Default)]
    struct StubUpstream {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FeedSource for StubUpstream {
        async fn fetch(&self, request: &FeedRequest) -> Result<FeedPage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &request.kind {
                FeedKind::Category(c) => Ok(FeedPage {
                    articles: vec![Article {
                        url: Some(format!("https://example.com/{c}/{}", request.page)),
                        title: Some("Headline".to_string()),
                        ..Default::default()
                    }],
                    total_results: 1,
                }),
                FeedKind::Query(_) => Err(NewsError::Upstream("status 426".to_string())),
            }
        }
    }

    /// Hands back articles with fields the reader never models.
    struct RawUpstream;

    #[async_trait]
    impl FeedSource for RawUpstream {
        async fn fetch(&self, _request: &FeedRequest) -> Result<FeedPage> {
            Err(NewsError::Upstream("decoded path not used".to_string()))
        }

        async fn fetch_raw(&self, _request: &FeedRequest) -> Result<RawFeedPage> {
            Ok(RawFeedPage {
                articles: vec![json!({
                    "source": { "id": null, "name": "Wire" },
                    "url": "https://example.com/raw",
                    "content": "Body… [+200 chars]"
                })],
                total_results: 1,
            })
        }
    }

    fn state(upstream: Arc<dyn FeedSource>) -> Data<ProxyState> {
        Data::new(ProxyState::new(upstream))
    }

    #[actix_web::test]
    async fn test_category_passthrough() {
        let upstream = Arc::new(StubUpstream::default());
        let app = test::init_service(
            App::new().app_data(state(upstream.clone())).configure(configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/news?category=technology&page=2")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["totalResults"], 1);
        assert_eq!(body["articles"][0]["url"], "https://example.com/technology/2");
        assert_eq!(upstream.calls.load(Ordering::SeqCst), 1);
    }

    #[actix_web::test]
    async fn test_articles_are_forwarded_verbatim() {
        let app = test::init_service(
            App::new().app_data(state(Arc::new(RawUpstream))).configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/news?query=ai").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            body,
            json!({
                "articles": [{
                    "source": { "id": null, "name": "Wire" },
                    "url": "https://example.com/raw",
                    "content": "Body… [+200 chars]"
                }],
                "totalResults": 1
            })
        );
    }

    #[actix_web::test]
    async fn test_legacy_path() {
        let upstream = Arc::new(StubUpstream::default());
        let app = test::init_service(
            App::new().app_data(state(upstream.clone())).configure(configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/.netlify/functions/news?category=sports")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_missing_selection_is_rejected_without_upstream_call() {
        let upstream = Arc::new(StubUpstream::default());
        let app = test::init_service(
            App::new().app_data(state(upstream.clone())).configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/news?page=3").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Category or query is required.");
        assert_eq!(upstream.calls.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn test_upstream_failure_is_generic_500() {
        let upstream = Arc::new(StubUpstream::default());
        let app = test::init_service(
            App::new().app_data(state(upstream.clone())).configure(configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/news?query=bitcoin&category=business")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "Failed to fetch news" }));
    }

    #[actix_web::test]
    async fn test_health() {
        let upstream = Arc::new(StubUpstream::default());
        let app = test::init_service(
            App::new().app_data(state(upstream)).configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }
}
