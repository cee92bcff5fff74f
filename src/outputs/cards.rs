//! Plain-text article cards.
//!
//! Every field an article may lack has a placeholder, and long titles and
//! descriptions are shortened the same way for fetched and saved articles.
//! Each card asks the bookmark store for its own saved state.

use crate::bookmarks::BookmarkStore;
use crate::categories::Category;
use crate::models::Article;
use crate::storage::KeyValueStore;
use crate::utils::{truncate_display, upcase};
use chrono::{DateTime, Local};
use std::fmt::Write;

pub const TITLE_MAX_CHARS: usize = 60;
pub const DESCRIPTION_MAX_CHARS: usize = 100;

pub const UNTITLED: &str = "Untitled Article";
pub const NO_DESCRIPTION: &str = "No description available.";
pub const UNKNOWN: &str = "Unknown";
pub const UNKNOWN_DATE: &str = "Unknown date";
pub const NO_LINK: &str = "#";

/// Card title: placeholder when missing, shortened when long.
pub fn display_title(article: &Article) -> String {
    match non_blank(article.title.as_deref()) {
        Some(t) => truncate_display(t, TITLE_MAX_CHARS),
        None => UNTITLED.to_string(),
    }
}

pub fn display_description(article: &Article) -> String {
    match non_blank(article.description.as_deref()) {
        Some(d) => truncate_display(d, DESCRIPTION_MAX_CHARS),
        None => NO_DESCRIPTION.to_string(),
    }
}

/// Publication date in local time, `YYYY-MM-DD`.
pub fn display_date(published_at: Option<&str>) -> String {
    published_at
        .and_then(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| UNKNOWN_DATE.to_string())
}

/// Render one card. `index` is the 1-based position used by the reader's
/// bookmark command.
pub fn render_card(index: usize, article: &Article, bookmarked: bool) -> String {
    let marker = if bookmarked { "[*]" } else { "[ ]" };
    let mut out = String::new();
    let _ = writeln!(out, "{index:>3}. {marker} {}", display_title(article));
    let _ = writeln!(out, "     {}", display_description(article));
    let _ = writeln!(
        out,
        "     By {} | {} | Source: {}",
        non_blank(article.author.as_deref()).unwrap_or(UNKNOWN),
        display_date(article.published_at.as_deref()),
        non_blank(article.source.name.as_deref()).unwrap_or(UNKNOWN),
    );
    let _ = writeln!(
        out,
        "     {}",
        non_blank(article.url.as_deref()).unwrap_or(NO_LINK)
    );
    out
}

/// Render a list of cards, each marked with its bookmark state.
pub fn render_feed<S: KeyValueStore>(articles: &[Article], bookmarks: &BookmarkStore<S>) -> String {
    if articles.is_empty() {
        return "No articles to show.\n".to_string();
    }
    articles
        .iter()
        .enumerate()
        .map(|(i, article)| {
            let saved = article
                .url
                .as_deref()
                .is_some_and(|url| bookmarks.is_bookmarked(url));
            render_card(i + 1, article, saved)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `Highlights in <Category>` and its tags, the active one bracketed.
pub fn render_highlights(category: Category, active: Option<&str>) -> String {
    let tags = category
        .highlight_tags()
        .iter()
        .map(|tag| {
            if Some(*tag) == active {
                format!("[{tag}]")
            } else {
                tag.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    format!("Highlights in {}\n  {tags}\n", upcase(category.as_str()))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArticleSource;
    use crate::storage::MemoryStore;

    #[test]
    fn test_placeholders() {
        let card = render_card(1, &Article::default(), false);
        assert!(card.contains(UNTITLED));
        assert!(card.contains(NO_DESCRIPTION));
        assert!(card.contains("By Unknown"));
        assert!(card.contains(UNKNOWN_DATE));
        assert!(card.contains("Source: Unknown"));
        assert!(card.contains("[ ]"));
        assert!(card.trim_end().ends_with(NO_LINK));
    }

    #[test]
    fn test_truncation() {
        let article = Article {
            title: Some("t".repeat(61)),
            description: Some("d".repeat(100)),
            ..Default::default()
        };
        assert_eq!(display_title(&article), format!("{}...", "t".repeat(60)));
        assert_eq!(display_description(&article), "d".repeat(100));
    }

    #[test]
    fn test_display_date() {
        assert_eq!(display_date(Some("2025-05-06T12:00:00Z")), "2025-05-06");
        assert_eq!(display_date(Some("yesterday")), UNKNOWN_DATE);
        assert_eq!(display_date(None), UNKNOWN_DATE);
    }

    #[test]
    fn test_feed_marks_bookmarked_cards() {
        let saved = Article {
            url: Some("https://example.com/saved".to_string()),
            title: Some("Saved".to_string()),
            source: ArticleSource {
                id: None,
                name: Some("Wire".to_string()),
            },
            ..Default::default()
        };
        let other = Article {
            url: Some("https://example.com/other".to_string()),
            title: Some("Other".to_string()),
            ..Default::default()
        };

        let mut store = BookmarkStore::load(MemoryStore::new());
        store.toggle(saved.to_bookmark().unwrap());

        let rendered = render_feed(&[saved, other], &store);
        assert!(rendered.contains("  1. [*] Saved"));
        assert!(rendered.contains("  2. [ ] Other"));
        assert!(rendered.contains("Source: Wire"));
    }

    #[test]
    fn test_empty_feed() {
        let store = BookmarkStore::load(MemoryStore::new());
        assert_eq!(render_feed(&[], &store), "No articles to show.\n");
    }

    #[test]
    fn test_highlights_header() {
        let rendered = render_highlights(Category::Technology, Some("AI"));
        assert!(rendered.starts_with("Highlights in Technology\n"));
        assert!(rendered.contains("[AI]"));
        assert!(rendered.contains("Gadgets"));
    }
}
