//! JSON export of the bookmark set.
//!
//! Writes the same array that lives in the durable slot, pretty-printed, to
//! `{json_output_dir}/bookmarks.json`.

use crate::models::BookmarkRecord;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

pub const EXPORT_FILENAME: &str = "bookmarks.json";

/// Write `bookmarks` to `{json_output_dir}/bookmarks.json`, creating the
/// directory if needed. Returns the written path.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir, count = bookmarks.len()))]
pub async fn write_bookmarks(
    bookmarks: &[BookmarkRecord],
    json_output_dir: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(bookmarks)?;

    if let Err(e) = fs::create_dir_all(json_output_dir).await {
        error!(error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let path = PathBuf::from(json_output_dir).join(EXPORT_FILENAME);
    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote bookmarks JSON");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookmarkSource;

    #[tokio::test]
    async fn test_write_bookmarks() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("export");
        let records = vec![BookmarkRecord {
            title: "A".to_string(),
            url: "https://example.com/a".to_string(),
            url_to_image: None,
            description: None,
            source: BookmarkSource {
                name: Some("Wire".to_string()),
            },
        }];

        let path = write_bookmarks(&records, out.to_str().unwrap()).await.unwrap();
        assert_eq!(path, out.join(EXPORT_FILENAME));

        let raw = std::fs::read_to_string(path).unwrap();
        let back: Vec<BookmarkRecord> = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, records);
    }
}
