//! Data models for feed articles and saved bookmarks.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Article`]: A read-only article summary as returned by the news API
//! - [`BookmarkRecord`]: The narrowed projection of an article that gets saved
//! - [`FeedPage`]: One page of feed results
//! - [`FeedRequest`]: A validated category or query request
//!
//! Field names follow the upstream JSON (camelCase) via `serde(rename_all)`.

use crate::error::NewsError;
use serde::{Deserialize, Serialize};

/// Where an article was published.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArticleSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A news article as returned by the feed source.
///
/// `url` is the identity of an article; everything else is optional display
/// data that the card renderer replaces with placeholders when missing.
/// Upstream frequently sends explicit `null`s, so every field defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url_to_image: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: ArticleSource,
}

impl Article {
    /// Project this article into the record stored by the bookmark set.
    ///
    /// Returns `None` when the article has no `url`, since such an article
    /// has no identity to bookmark.
    pub fn to_bookmark(&self) -> Option<BookmarkRecord> {
        let url = self.url.as_ref().filter(|u| !u.is_empty())?;
        Some(BookmarkRecord {
            title: self.title.clone().unwrap_or_default(),
            url: url.clone(),
            url_to_image: self.url_to_image.clone(),
            description: self.description.clone(),
            source: BookmarkSource {
                name: self.source.name.clone(),
            },
        })
    }
}

/// The `source` of a saved bookmark. Only the name is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct BookmarkSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A saved article.
///
/// At most one record per `url` lives in the bookmark set. Records are never
/// updated in place; toggling off and on again recreates them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkRecord {
    #[serde(default)]
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_to_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: BookmarkSource,
}

impl BookmarkRecord {
    /// Build a record from hand-entered fields.
    ///
    /// # Errors
    ///
    /// [`NewsError::Validation`] when `url` is blank; a record without a url
    /// has no identity in the bookmark set.
    pub fn from_parts(
        url: &str,
        title: String,
        description: Option<String>,
        url_to_image: Option<String>,
        source: Option<String>,
    ) -> Result<Self, NewsError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(NewsError::Validation("A bookmark needs a url.".to_string()));
        }
        Ok(Self {
            title,
            url: url.to_string(),
            url_to_image,
            description,
            source: BookmarkSource { name: source },
        }
        .normalized())
    }

    /// Normalize into the stored projection: drop empty optionals so that a
    /// record built by hand serializes the same as one built from an
    /// [`Article`].
    pub fn normalized(self) -> Self {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Self {
            title: self.title,
            url: self.url,
            url_to_image: non_empty(self.url_to_image),
            description: non_empty(self.description),
            source: BookmarkSource {
                name: non_empty(self.source.name),
            },
        }
    }

    /// View a bookmark as an article so saved items render through the same
    /// card path as fetched ones.
    pub fn as_article(&self) -> Article {
        Article {
            url: Some(self.url.clone()),
            title: Some(self.title.clone()).filter(|t| !t.is_empty()),
            description: self.description.clone(),
            url_to_image: self.url_to_image.clone(),
            author: None,
            published_at: None,
            source: ArticleSource {
                id: None,
                name: self.source.name.clone(),
            },
        }
    }
}

/// One page of results from the feed source.
///
/// The proxy forwards articles untouched as [`RawFeedPage`]; readers decode
/// them into [`Article`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "A: Deserialize<'de>"))]
pub struct FeedPage<A = Article> {
    #[serde(default, deserialize_with = "null_as_default")]
    pub articles: Vec<A>,
    #[serde(default)]
    pub total_results: u64,
}

/// A page whose articles are kept exactly as the upstream sent them.
pub type RawFeedPage = FeedPage<serde_json::Value>;

/// What a feed request is parameterized by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedKind {
    /// Top headlines for a fixed topic label.
    Category(String),
    /// Free-text search (typed input or a highlight tag).
    Query(String),
}

/// A validated feed request. `page` starts at 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRequest {
    pub kind: FeedKind,
    pub page: u32,
}

impl FeedRequest {
    pub fn category(category: impl Into<String>, page: u32) -> Self {
        Self {
            kind: FeedKind::Category(category.into()),
            page: page.max(1),
        }
    }

    pub fn query(query: impl Into<String>, page: u32) -> Self {
        Self {
            kind: FeedKind::Query(query.into()),
            page: page.max(1),
        }
    }

    /// Build a request from raw `category` / `query` / `page` parameters.
    ///
    /// `query` wins when both are supplied. A missing, unparsable or zero
    /// page means page 1.
    ///
    /// # Errors
    ///
    /// [`NewsError::Validation`] when neither a category nor a query is given.
    pub fn from_params(
        category: Option<&str>,
        query: Option<&str>,
        page: Option<&str>,
    ) -> Result<Self, NewsError> {
        let page = page
            .and_then(|p| p.trim().parse::<u32>().ok())
            .unwrap_or(1)
            .max(1);
        if let Some(q) = present(query) {
            Ok(Self::query(q, page))
        } else if let Some(c) = present(category) {
            Ok(Self::category(c, page))
        } else {
            Err(NewsError::Validation(
                "Category or query is required.".to_string(),
            ))
        }
    }

    /// Whether this request continues a category listing.
    pub fn appends(&self) -> bool {
        matches!(self.kind, FeedKind::Category(_)) && self.page > 1
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_deserialization_with_nulls() {
        let json = r#"{
            "source": { "id": null, "name": "The Verge" },
            "author": null,
            "title": "A headline",
            "description": null,
            "url": "https://example.com/a",
            "urlToImage": null,
            "publishedAt": "2025-05-06T14:30:00Z",
            "content": "First paragraph… [+1200 chars]"
        }"#;

        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.url.as_deref(), Some("https://example.com/a"));
        assert_eq!(article.source.name.as_deref(), Some("The Verge"));
        assert_eq!(article.author, None);
        assert_eq!(article.published_at.as_deref(), Some("2025-05-06T14:30:00Z"));
    }

    #[test]
    fn test_article_null_source() {
        let json = r#"{ "url": "https://example.com/a", "source": null }"#;
        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.source, ArticleSource::default());
    }

    #[test]
    fn test_to_bookmark_drops_extra_fields() {
        let article = Article {
            url: Some("https://example.com/a".to_string()),
            title: Some("Title".to_string()),
            description: Some("Desc".to_string()),
            url_to_image: Some("https://example.com/a.png".to_string()),
            author: Some("Jane".to_string()),
            published_at: Some("2025-05-06T14:30:00Z".to_string()),
            source: ArticleSource {
                id: Some("verge".to_string()),
                name: Some("The Verge".to_string()),
            },
        };

        let record = article.to_bookmark().unwrap();
        assert_eq!(record.url, "https://example.com/a");
        assert_eq!(record.title, "Title");
        assert_eq!(record.source.name.as_deref(), Some("The Verge"));

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"urlToImage\""));
        assert!(!json.contains("author"));
        assert!(!json.contains("publishedAt"));
    }

    #[test]
    fn test_to_bookmark_requires_url() {
        let article = Article {
            title: Some("No link".to_string()),
            ..Default::default()
        };
        assert!(article.to_bookmark().is_none());
    }

    #[test]
    fn test_bookmark_normalized_strips_empty_optionals() {
        let record = BookmarkRecord {
            title: "T".to_string(),
            url: "u".to_string(),
            url_to_image: Some("".to_string()),
            description: Some("  ".to_string()),
            source: BookmarkSource {
                name: Some("".to_string()),
            },
        }
        .normalized();

        assert_eq!(record.url_to_image, None);
        assert_eq!(record.description, None);
        assert_eq!(record.source.name, None);
    }

    #[test]
    fn test_bookmark_from_parts_requires_url() {
        let err = BookmarkRecord::from_parts("  ", "T".into(), None, None, None).unwrap_err();
        assert!(matches!(err, NewsError::Validation(_)));

        let record = BookmarkRecord::from_parts(
            " https://example.com/a ",
            "T".into(),
            Some(String::new()),
            None,
            Some("Wire".into()),
        )
        .unwrap();
        assert_eq!(record.url, "https://example.com/a");
        assert_eq!(record.description, None);
        assert_eq!(record.source.name.as_deref(), Some("Wire"));
    }

    #[test]
    fn test_raw_page_keeps_unmodeled_fields() {
        let json = r#"{ "articles": [{ "url": "u", "source": { "id": null, "name": "W" }, "extra": 1 }], "totalResults": 1 }"#;
        let page: RawFeedPage = serde_json::from_str(json).unwrap();
        let out = serde_json::to_value(&page).unwrap();
        assert_eq!(out["articles"][0]["extra"], 1);
        assert_eq!(
            out["articles"][0]["source"].get("id"),
            Some(&serde_json::Value::Null)
        );
        assert!(out["articles"][0].get("author").is_none());
        assert_eq!(out["totalResults"], 1);
    }

    #[test]
    fn test_feed_page_deserialization() {
        let json = r#"{ "articles": [{ "url": "https://example.com/a" }], "totalResults": 34 }"#;
        let page: FeedPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.articles.len(), 1);
        assert_eq!(page.total_results, 34);
    }

    #[test]
    fn test_feed_request_prefers_query() {
        let req = FeedRequest::from_params(Some("sports"), Some("nba"), Some("2")).unwrap();
        assert_eq!(req.kind, FeedKind::Query("nba".to_string()));
        assert_eq!(req.page, 2);
    }

    #[test]
    fn test_feed_request_category_default_page() {
        let req = FeedRequest::from_params(Some("technology"), None, None).unwrap();
        assert_eq!(req, FeedRequest::category("technology", 1));

        let req = FeedRequest::from_params(Some("technology"), None, Some("zero")).unwrap();
        assert_eq!(req.page, 1);

        let req = FeedRequest::from_params(Some("technology"), None, Some("0")).unwrap();
        assert_eq!(req.page, 1);
    }

    #[test]
    fn test_feed_request_requires_category_or_query() {
        let err = FeedRequest::from_params(None, Some("  "), Some("3")).unwrap_err();
        assert!(matches!(err, NewsError::Validation(_)));
    }

    #[test]
    fn test_feed_request_appends() {
        assert!(!FeedRequest::category("sports", 1).appends());
        assert!(FeedRequest::category("sports", 2).appends());
        assert!(!FeedRequest::query("nba", 2).appends());
    }
}
