//! Watchlist persistence
//!
//! The watchlist is a JSON array of saved movie summaries stored under
//! [`WATCHLIST_KEY`]. Entries are unique by external identifier and kept in
//! insertion order; sorting is applied when reading.

use crate::metadata_retrieval::{Lookup, MovieDetail};
use crate::storage::{KeyValueStore, StorageError, load_collection, save_collection};
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Storage key of the watchlist collection
pub const WATCHLIST_KEY: &str = "cinefind_watchlist";

/// A saved movie.
///
/// Field names on disk follow the primary provider's record (`imdbID`,
/// `Title`, `Poster`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    #[serde(rename = "imdbID")]
    pub external_id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Poster", default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
}

impl From<MovieDetail> for WatchlistEntry {
    fn from(detail: MovieDetail) -> Self {
        Self {
            external_id: detail.external_id,
            title: detail.title,
            poster_url: detail.poster_url,
        }
    }
}

/// Order in which entries are listed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// As saved
    #[default]
    Added,
    /// Alphabetical by title, ignoring case
    Title,
}

/// What a [`Watchlist::toggle`] call did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggled {
    /// The movie was saved
    Added(WatchlistEntry),
    /// The movie was already saved and has been removed
    Removed,
    /// The movie was not saved because its details could not be fetched
    DetailUnavailable,
}

/// Repository over the persisted watchlist.
#[derive(Debug)]
pub struct Watchlist<S> {
    store: S,
}

impl<S: KeyValueStore> Watchlist<S> {
    /// Creates a watchlist backed by `store`
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All entries in insertion order
    ///
    /// Missing or malformed persisted content yields an empty list.
    pub fn list(&self) -> Vec<WatchlistEntry> {
        load_collection(&self.store, WATCHLIST_KEY)
    }

    /// All entries in the requested order
    pub fn list_sorted(&self, order: SortOrder) -> Vec<WatchlistEntry> {
        let mut entries = self.list();
        if order == SortOrder::Title {
            entries.sort_by_cached_key(|e| e.title.to_lowercase());
        }
        entries
    }

    /// Returns true if the movie is saved
    pub fn contains(&self, external_id: &str) -> bool {
        self.list().iter().any(|e| e.external_id == external_id)
    }

    /// Removes the movie if saved, otherwise fetches its details and saves it.
    ///
    /// The fetch happens before anything is written, so a failed fetch leaves
    /// the watchlist untouched and a successful one appends in a single write.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated list cannot be persisted.
    pub async fn toggle<F, Fut>(
        &mut self,
        external_id: &str,
        fetch_detail: F,
    ) -> Result<Toggled, StorageError>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Lookup<MovieDetail>>,
    {
        if self.contains(external_id) {
            self.remove(external_id)?;
            return Ok(Toggled::Removed);
        }

        let detail = match fetch_detail(external_id.to_string()).await {
            Lookup::Found(detail) => detail,
            Lookup::NotFound | Lookup::Unavailable => {
                tracing::info!(external_id, "Not saving movie without details");
                return Ok(Toggled::DetailUnavailable);
            }
        };

        let entry = WatchlistEntry {
            external_id: external_id.to_string(),
            ..WatchlistEntry::from(detail)
        };

        let mut entries = self.list();
        if !entries.iter().any(|e| e.external_id == entry.external_id) {
            entries.push(entry.clone());
            save_collection(&self.store, WATCHLIST_KEY, &entries)?;
        }

        Ok(Toggled::Added(entry))
    }

    /// Removes the movie; removing a movie that is not saved is a no-op
    ///
    /// Returns whether an entry was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated list cannot be persisted.
    pub fn remove(&mut self, external_id: &str) -> Result<bool, StorageError> {
        let mut entries = self.list();
        let before = entries.len();
        entries.retain(|e| e.external_id != external_id);

        if entries.len() == before {
            return Ok(false);
        }

        save_collection(&self.store, WATCHLIST_KEY, &entries)?;
        Ok(true)
    }

    /// Removes every entry
    ///
    /// # Errors
    ///
    /// Returns an error if the stored list cannot be removed.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.store.remove(WATCHLIST_KEY)
    }
}
