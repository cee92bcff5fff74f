//! The article feed fetcher state machine.
//!
//! Each fetch goes `Idle -> Loading -> {Success, Failure}`. [`FeedFetcher::begin`]
//! hands out a [`Ticket`] carrying a fresh [`SelectionToken`]; only the
//! response for the most recent ticket is applied, so a slow response for an
//! abandoned selection can never overwrite newer state. Nothing here does
//! I/O: the reader session runs the request and feeds the outcome back
//! through [`FeedFetcher::complete`].

use crate::error::NewsError;
use crate::models::{Article, FeedPage, FeedRequest};
use tracing::{debug, info, warn};

/// Distance from the document end, in pixels, that counts as "near the bottom".
pub const SCROLL_THRESHOLD_PX: f64 = 100.0;

/// Identifies the selection a request was issued for. Strictly increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SelectionToken(u64);

/// An outstanding request together with the selection it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub token: SelectionToken,
    pub request: FeedRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Idle,
    Loading,
    Success,
    Failure,
}

/// What [`FeedFetcher::complete`] did with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The list was replaced.
    Replaced,
    /// The page was appended to the list.
    Appended,
    /// The request failed; the list was left as it was.
    Failed,
    /// The response belonged to a superseded selection and was dropped.
    Stale,
}

#[derive(Debug)]
pub struct FeedFetcher {
    articles: Vec<Article>,
    total_results: u64,
    status: FetchStatus,
    current: Option<Ticket>,
    last_token: u64,
}

impl Default for FeedFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedFetcher {
    pub fn new() -> Self {
        Self {
            articles: Vec::new(),
            total_results: 0,
            status: FetchStatus::Idle,
            current: None,
            last_token: 0,
        }
    }

    /// Start a fetch for `request`, superseding whatever was in flight.
    pub fn begin(&mut self, request: FeedRequest) -> Ticket {
        let ticket = Ticket {
            token: self.next_token(),
            request,
        };
        debug!(token = ticket.token.0, request = ?ticket.request, "Fetch started");
        self.status = FetchStatus::Loading;
        self.current = Some(ticket.clone());
        ticket
    }

    /// Apply the response for `ticket`.
    ///
    /// Category pages after the first are appended; everything else replaces
    /// the list. A failure leaves the list untouched and ends the loading
    /// state. Responses for any ticket but the latest are discarded.
    pub fn complete(&mut self, ticket: &Ticket, result: Result<FeedPage, NewsError>) -> Outcome {
        if self.current.as_ref().map(|t| t.token) != Some(ticket.token) {
            debug!(token = ticket.token.0, "Discarding stale response");
            return Outcome::Stale;
        }
        self.current = None;

        match result {
            Ok(page) => {
                self.status = FetchStatus::Success;
                self.total_results = page.total_results;
                let count = page.articles.len();
                let outcome = if ticket.request.appends() {
                    self.articles.extend(page.articles);
                    Outcome::Appended
                } else {
                    self.articles = page.articles;
                    Outcome::Replaced
                };
                info!(
                    token = ticket.token.0,
                    page = ticket.request.page,
                    count,
                    shown = self.articles.len(),
                    ?outcome,
                    "Feed updated"
                );
                outcome
            }
            Err(e) => {
                self.status = FetchStatus::Failure;
                warn!(token = ticket.token.0, error = %e, "Feed fetch failed; keeping current list");
                Outcome::Failed
            }
        }
    }

    /// Empty the list and drop interest in any outstanding request.
    pub fn clear(&mut self) {
        self.next_token();
        self.current = None;
        self.articles.clear();
        self.total_results = 0;
        self.status = FetchStatus::Idle;
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn total_results(&self) -> u64 {
        self.total_results
    }

    pub fn status(&self) -> FetchStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == FetchStatus::Loading
    }

    fn next_token(&mut self) -> SelectionToken {
        self.last_token += 1;
        SelectionToken(self.last_token)
    }
}

/// Where the viewport sits in the rendered document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollPosition {
    pub scroll_top: f64,
    pub viewport_height: f64,
    pub document_height: f64,
}

impl ScrollPosition {
    /// A position with the viewport resting on the last pixel.
    pub fn at_bottom(document_height: f64) -> Self {
        Self {
            scroll_top: document_height,
            viewport_height: 0.0,
            document_height,
        }
    }

    pub fn near_bottom(&self) -> bool {
        self.scroll_top + self.viewport_height >= self.document_height - SCROLL_THRESHOLD_PX
    }
}
