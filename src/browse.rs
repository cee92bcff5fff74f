//! Line-driven interactive reader.
//!
//! Each input line is one user action. Plain `/text` lines are search box
//! edits and go through the session's debounce; everything else acts at once.
//! Fetch results are drawn as they are applied.

use crate::bookmarks::BookmarkStore;
use crate::categories::Category;
use crate::feed::{FetchStatus, Outcome};
use crate::outputs::cards::{render_feed, render_highlights};
use crate::session::{Mode, Session, Update};
use crate::storage::KeyValueStore;
use std::error::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

pub const HELP: &str = "\
Commands:
  /<text>        search (runs after you stop typing); '/' alone clears
  :c <category>  switch category (general, business, entertainment, health,
                 science, sports, technology)
  :t <tag>       show a highlight tag; ':t' alone returns to the category
  :more          load the next page (category view only)
  :b <n>         save or unsave card n
  :saved         list saved articles
  :h             this help
  :q             quit
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderCommand {
    Search(String),
    Category(Category),
    Highlight(String),
    ClearHighlight,
    More,
    Bookmark(usize),
    ShowBookmarks,
    Help,
    Quit,
    Invalid(String),
}

impl ReaderCommand {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return None;
        }
        if let Some(text) = line.strip_prefix('/') {
            return Some(Self::Search(text.to_string()));
        }

        let mut parts = line.trim().splitn(2, char::is_whitespace);
        let head = parts.next().unwrap_or_default();
        let rest = parts.next().map(str::trim).unwrap_or_default();

        let command = match head {
            ":q" | ":quit" => Self::Quit,
            ":h" | ":help" => Self::Help,
            ":more" | ":m" => Self::More,
            ":saved" => Self::ShowBookmarks,
            ":t" if rest.is_empty() => Self::ClearHighlight,
            ":t" => Self::Highlight(rest.to_string()),
            ":c" => match rest.parse::<Category>() {
                Ok(category) => Self::Category(category),
                Err(e) => Self::Invalid(e),
            },
            ":b" => match rest.parse::<usize>() {
                Ok(n) if n > 0 => Self::Bookmark(n),
                _ => Self::Invalid(format!("expected a card number, got {rest:?}")),
            },
            other => Self::Invalid(format!("unknown command {other:?} (try :h)")),
        };
        Some(command)
    }
}

/// Run the reader until `:q` or end of input.
pub async fn run<S: KeyValueStore>(
    session: &mut Session,
    bookmarks: &mut BookmarkStore<S>,
) -> Result<(), Box<dyn Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{HELP}");
    session.select_category(session.category());
    println!("Loading {}...", session.category());

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("Input closed");
                    break;
                };
                let Some(command) = ReaderCommand::parse(&line) else {
                    continue;
                };
                if !apply(command, session, bookmarks) {
                    break;
                }
            }
            Some(event) = session.next_event() => {
                match session.handle(event) {
                    Update::Feed(Outcome::Replaced | Outcome::Appended) => draw(session, bookmarks),
                    Update::Feed(Outcome::Failed) => {
                        println!("Could not load news right now; showing what was already loaded.");
                    }
                    Update::SearchStarted(query) => println!("Searching for {query:?}..."),
                    Update::Feed(Outcome::Stale) | Update::Ignored => {}
                }
            }
        }
    }

    info!("Reader closed");
    Ok(())
}

/// Apply one command. Returns `false` to quit.
fn apply<S: KeyValueStore>(
    command: ReaderCommand,
    session: &mut Session,
    bookmarks: &mut BookmarkStore<S>,
) -> bool {
    match command {
        ReaderCommand::Quit => return false,
        ReaderCommand::Help => println!("{HELP}"),
        ReaderCommand::Invalid(reason) => println!("{reason}"),
        ReaderCommand::Search(text) => {
            session.search_input(&text);
            if text.trim().is_empty() {
                draw(session, bookmarks);
            }
        }
        ReaderCommand::Category(category) => {
            session.select_category(category);
            println!("Loading {category}...");
        }
        ReaderCommand::Highlight(tag) => {
            let tag = session
                .category()
                .find_tag(&tag)
                .map(str::to_string)
                .unwrap_or(tag);
            println!("Loading {tag}...");
            session.select_highlight(&tag);
        }
        ReaderCommand::ClearHighlight => {
            if matches!(session.mode(), Mode::Highlight { .. }) {
                session.clear_highlight();
                println!("Loading {}...", session.category());
            }
        }
        ReaderCommand::More => {
            if session.load_more() {
                println!("Loading more...");
            } else if session.status() == FetchStatus::Loading {
                println!("Still loading.");
            } else {
                println!("Paging is only available in the category view.");
            }
        }
        ReaderCommand::Bookmark(n) => match session.articles().get(n - 1) {
            Some(article) => match article.to_bookmark() {
                Some(record) => {
                    let url = record.url.clone();
                    bookmarks.toggle(record);
                    let state = if bookmarks.is_bookmarked(&url) { "Saved" } else { "Removed" };
                    println!("{state}: {url}");
                }
                None => println!("Card {n} has no link to save."),
            },
            None => {
                warn!(n, shown = session.articles().len(), "Bookmark index out of range");
                println!("There is no card {n}.");
            }
        },
        ReaderCommand::ShowBookmarks => {
            let saved: Vec<_> = bookmarks.bookmarks().iter().map(|b| b.as_article()).collect();
            println!("Saved articles ({}):\n", saved.len());
            print!("{}", render_feed(&saved, bookmarks));
        }
    }
    true
}

fn draw<S: KeyValueStore>(session: &Session, bookmarks: &BookmarkStore<S>) {
    let active = match session.mode() {
        Mode::Highlight { tag } => Some(tag.as_str()),
        _ => None,
    };
    println!();
    match session.mode() {
        Mode::Search { query } if query.is_empty() => println!("Search cleared."),
        Mode::Search { query } => println!("Results for {query:?}"),
        _ => print!("{}", render_highlights(session.category(), active)),
    }
    println!(
        "Showing {} of {} articles\n",
        session.articles().len(),
        session.total_results()
    );
    print!("{}", render_feed(session.articles(), bookmarks));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search() {
        assert_eq!(
            ReaderCommand::parse("/formula 1"),
            Some(ReaderCommand::Search("formula 1".into()))
        );
        assert_eq!(ReaderCommand::parse("/"), Some(ReaderCommand::Search(String::new())));
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            ReaderCommand::parse(":c Sports"),
            Some(ReaderCommand::Category(Category::Sports))
        );
        assert_eq!(
            ReaderCommand::parse(":t Mental Health"),
            Some(ReaderCommand::Highlight("Mental Health".into()))
        );
        assert_eq!(ReaderCommand::parse(":t"), Some(ReaderCommand::ClearHighlight));
        assert_eq!(ReaderCommand::parse(":b 3"), Some(ReaderCommand::Bookmark(3)));
        assert_eq!(ReaderCommand::parse(":more"), Some(ReaderCommand::More));
        assert_eq!(ReaderCommand::parse(":q\n"), Some(ReaderCommand::Quit));
        assert_eq!(ReaderCommand::parse("   "), None);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(ReaderCommand::parse(":b 0"), Some(ReaderCommand::Invalid(_))));
        assert!(matches!(ReaderCommand::parse(":c weather"), Some(ReaderCommand::Invalid(_))));
        assert!(matches!(ReaderCommand::parse("hello"), Some(ReaderCommand::Invalid(_))));
    }
}
