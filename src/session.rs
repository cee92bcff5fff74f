//! The reader session: one event loop driving the feed fetcher.
//!
//! The session owns a [`FeedFetcher`], the search debounce timer and the
//! current browsing mode. User actions are plain method calls; fetch results
//! and timer firings come back as [`Event`]s on a single channel and are
//! applied one at a time by [`Session::handle`], so state only ever changes
//! on the session's own task.
//!
//! Modes:
//! - **Category**: headlines for a category, with infinite-scroll pages
//! - **Highlight**: a tag shortcut run as a query; pagination suspended
//! - **Search**: debounced free-text query; pagination suspended

use crate::api::FeedSource;
use crate::categories::Category;
use crate::error::NewsError;
use crate::feed::{FeedFetcher, FetchStatus, Outcome, ScrollPosition, Ticket};
use crate::models::{Article, FeedKind, FeedPage, FeedRequest};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

/// Input quiescence required before a search is issued.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// `page` is the last page of the category that actually arrived; 0 until
    /// page 1 lands.
    Category { page: u32 },
    Highlight { tag: String },
    Search { query: String },
}

/// Something that finished while the session was waiting.
#[derive(Debug)]
pub enum Event {
    Fetched {
        ticket: Ticket,
        result: Result<FeedPage, NewsError>,
    },
    DebounceElapsed {
        generation: u64,
        query: String,
    },
}

/// What handling an event changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    Feed(Outcome),
    SearchStarted(String),
    Ignored,
}

/// A cancellable single-shot timer.
///
/// Arming cancels the previous timer. Each arming gets a generation number;
/// a firing that raced a cancellation carries an old generation and is
/// rejected by [`Debouncer::accept`].
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    generation: u64,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            pending: None,
        }
    }

    pub fn arm(&mut self, query: String, events: &UnboundedSender<Event>) {
        self.cancel();
        let generation = self.generation;
        let delay = self.delay;
        let events = events.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(Event::DebounceElapsed { generation, query });
        }));
    }

    pub fn cancel(&mut self) {
        self.generation += 1;
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Claim a firing. `true` only for the timer armed last and not cancelled.
    fn accept(&mut self, generation: u64) -> bool {
        if self.pending.is_some() && generation == self.generation {
            self.pending = None;
            true
        } else {
            false
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

pub struct Session {
    source: Arc<dyn FeedSource>,
    fetcher: FeedFetcher,
    category: Category,
    mode: Mode,
    debouncer: Debouncer,
    events_tx: UnboundedSender<Event>,
    events_rx: UnboundedReceiver<Event>,
}

impl Session {
    /// A session showing `category`. Nothing is fetched until the first
    /// action, usually [`Session::select_category`].
    pub fn new(source: Arc<dyn FeedSource>, category: Category) -> Self {
        Self::with_debounce(source, category, SEARCH_DEBOUNCE)
    }

    pub fn with_debounce(source: Arc<dyn FeedSource>, category: Category, delay: Duration) -> Self {
        let (events_tx, events_rx) = unbounded_channel();
        Self {
            source,
            fetcher: FeedFetcher::new(),
            category,
            mode: Mode::Category { page: 0 },
            debouncer: Debouncer::new(delay),
            events_tx,
            events_rx,
        }
    }

    /// Show page 1 of `category`, leaving any highlight or search.
    #[instrument(level = "info", skip(self))]
    pub fn select_category(&mut self, category: Category) {
        self.debouncer.cancel();
        self.category = category;
        self.mode = Mode::Category { page: 0 };
        self.dispatch(FeedRequest::category(category.as_str(), 1));
    }

    /// Run `tag` as a query and hold pagination until the highlight is cleared.
    #[instrument(level = "info", skip(self))]
    pub fn select_highlight(&mut self, tag: &str) {
        self.debouncer.cancel();
        self.mode = Mode::Highlight {
            tag: tag.to_string(),
        };
        self.dispatch(FeedRequest::query(tag, 1));
    }

    /// Leave highlight mode and reload the current category from page 1.
    pub fn clear_highlight(&mut self) {
        if matches!(self.mode, Mode::Highlight { .. }) {
            info!("Clearing highlight");
            self.select_category(self.category);
        }
    }

    /// Feed one edit of the search box.
    ///
    /// An empty value clears the list right away and issues nothing. Any
    /// other value (re)arms the debounce timer; the mode and the shown list
    /// stay as they are until the search runs, once input has been quiet for
    /// the debounce delay.
    pub fn search_input(&mut self, text: &str) {
        let query = text.trim();
        if query.is_empty() {
            debug!("Search input cleared");
            self.debouncer.cancel();
            self.fetcher.clear();
            self.mode = Mode::Search {
                query: String::new(),
            };
        } else {
            self.debouncer.arm(query.to_string(), &self.events_tx);
        }
    }

    /// Issue a search for `query` immediately.
    #[instrument(level = "info", skip(self))]
    pub fn search_now(&mut self, query: &str) {
        self.debouncer.cancel();
        self.mode = Mode::Search {
            query: query.to_string(),
        };
        self.dispatch(FeedRequest::query(query, 1));
    }

    /// Request the next category page when the viewport nears the end.
    ///
    /// Returns whether a request was issued. Never fires outside category
    /// mode or while a fetch is already loading. If page 1 of the category
    /// never arrived, page 1 is asked for again and replaces the list.
    pub fn on_scroll(&mut self, position: ScrollPosition) -> bool {
        if !position.near_bottom() || self.fetcher.is_loading() {
            return false;
        }
        let Mode::Category { page } = self.mode else {
            return false;
        };
        let next = page + 1;
        debug!(page = next, "Loading next page");
        self.dispatch(FeedRequest::category(self.category.as_str(), next));
        true
    }

    /// Same trigger as a scroll that reached the bottom of the list.
    pub fn load_more(&mut self) -> bool {
        self.on_scroll(ScrollPosition::at_bottom(0.0))
    }

    /// Wait for the next fetch result or timer firing.
    pub async fn next_event(&mut self) -> Option<Event> {
        self.events_rx.recv().await
    }

    /// Apply one event to the session state.
    pub fn handle(&mut self, event: Event) -> Update {
        match event {
            Event::Fetched { ticket, result } => {
                let outcome = self.fetcher.complete(&ticket, result);
                if matches!(outcome, Outcome::Replaced | Outcome::Appended) {
                    if let (Mode::Category { page }, FeedKind::Category(_)) =
                        (&mut self.mode, &ticket.request.kind)
                    {
                        *page = ticket.request.page;
                    }
                }
                Update::Feed(outcome)
            }
            Event::DebounceElapsed { generation, query } => {
                if self.debouncer.accept(generation) {
                    self.search_now(&query);
                    Update::SearchStarted(query)
                } else {
                    Update::Ignored
                }
            }
        }
    }

    /// Nothing is loading and no search is waiting on the timer.
    pub fn is_idle(&self) -> bool {
        !self.fetcher.is_loading() && !self.debouncer.is_armed()
    }

    /// Process events until the session is idle.
    pub async fn settle(&mut self) {
        while !self.is_idle() {
            match self.next_event().await {
                Some(event) => {
                    self.handle(event);
                }
                None => break,
            }
        }
    }

    pub fn articles(&self) -> &[Article] {
        self.fetcher.articles()
    }

    pub fn status(&self) -> FetchStatus {
        self.fetcher.status()
    }

    pub fn total_results(&self) -> u64 {
        self.fetcher.total_results()
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    fn dispatch(&mut self, request: FeedRequest) {
        let ticket = self.fetcher.begin(request);
        let source = Arc::clone(&self.source);
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let result = source.fetch(&ticket.request).await;
            let _ = events.send(Event::Fetched { ticket, result });
        });
    }
}
