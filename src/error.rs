//! Error taxonomy shared by the feed, bookmark and proxy layers.
//!
//! None of these are fatal to a running reader session:
//! - [`NewsError::Validation`] rejects a request before any network call
//! - [`NewsError::Upstream`] keeps the previously displayed list
//! - [`NewsError::Decode`] and [`NewsError::Storage`] degrade to "no bookmarks"

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NewsError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("feed source failed: {0}")]
    Upstream(String),

    #[error("stored data could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for NewsError {
    fn from(value: reqwest::Error) -> Self {
        // The feed contract has no structured error taxonomy past this point.
        Self::Upstream(value.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NewsError>;
