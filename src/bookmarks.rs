//! The bookmark store.
//!
//! Owns the authoritative, insertion-ordered set of saved articles and keeps
//! the durable copy in the `"bookmarks"` slot in step with it. Every
//! [`BookmarkStore::toggle`] rewrites the whole slot before returning, so a
//! reload right after a toggle sees the new set.
//!
//! The store is an ordinary value: construct it once per session and pass it
//! by reference to whatever renders or toggles bookmarks.

use crate::error::Result;
use crate::models::BookmarkRecord;
use crate::storage::KeyValueStore;
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

/// Slot key holding the JSON array of [`BookmarkRecord`]s.
pub const BOOKMARKS_KEY: &str = "bookmarks";

#[derive(Debug)]
pub struct BookmarkStore<S> {
    slot: S,
    records: Vec<BookmarkRecord>,
    /// `url`s of `records`, for constant-time membership checks per card.
    urls: HashSet<String>,
}

impl<S: KeyValueStore> BookmarkStore<S> {
    /// Rehydrate the set from `slot`.
    ///
    /// A missing key, an unreadable slot or undecodable contents all yield an
    /// empty set; startup is never blocked on bookmarks. Duplicate `url`s in
    /// stored data keep their first occurrence.
    #[instrument(level = "info", skip_all)]
    pub fn load(slot: S) -> Self {
        let records = match Self::read_records(&slot) {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "Could not restore bookmarks; starting empty");
                Vec::new()
            }
        };

        let mut store = Self {
            slot,
            records: Vec::with_capacity(records.len()),
            urls: HashSet::with_capacity(records.len()),
        };
        for record in records {
            if store.urls.insert(record.url.clone()) {
                store.records.push(record);
            }
        }
        info!(count = store.records.len(), "Loaded bookmarks");
        store
    }

    /// Remove the record with `record.url` if present, otherwise append
    /// `record`. The full set is then written back to the slot.
    ///
    /// This is the only mutation. A failed write is logged and otherwise
    /// ignored; the in-memory set stays correct for the rest of the session.
    #[instrument(level = "info", skip_all, fields(url = %record.url))]
    pub fn toggle(&mut self, record: BookmarkRecord) -> &[BookmarkRecord] {
        if self.urls.remove(&record.url) {
            self.records.retain(|r| r.url != record.url);
            info!("Removed bookmark");
        } else {
            self.urls.insert(record.url.clone());
            self.records.push(record.normalized());
            info!("Added bookmark");
        }
        self.persist();
        &self.records
    }

    /// Whether a record with exactly this `url` is saved.
    pub fn is_bookmarked(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    /// Saved records in insertion order.
    pub fn bookmarks(&self) -> &[BookmarkRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn read_records(slot: &S) -> Result<Vec<BookmarkRecord>> {
        match slot.get_item(BOOKMARKS_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn persist(&mut self) {
        let json = match serde_json::to_string(&self.records) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Could not serialize bookmarks");
                return;
            }
        };
        match self.slot.set_item(BOOKMARKS_KEY, &json) {
            Ok(()) => debug!(count = self.records.len(), "Persisted bookmarks"),
            Err(e) => warn!(error = %e, "Could not persist bookmarks; keeping in-memory set"),
        }
    }
}
