use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::{
    error::AppResult,
    models::{watchlist_key, MediaKind, WatchlistEntry},
};

/// Trait for the watchlist collaborator
///
/// The engine only ever reads the watchlist: the pipeline excludes items
/// that already carry a status, and the profile store reacts to transition
/// events reported from outside. Entries are keyed `<kind>:<id>`.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait WatchlistSource: Send + Sync {
    /// Snapshot of every entry currently on the user's watchlist
    async fn entries(&self) -> AppResult<HashMap<String, WatchlistEntry>>;
}

/// In-memory watchlist mirror
///
/// Holds the session-local copy of the user's watchlist the way the browser
/// keeps a local cache of the synced store.
#[derive(Default)]
pub struct InMemoryWatchlist {
    entries: RwLock<HashMap<String, WatchlistEntry>>,
}

impl InMemoryWatchlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for one item
    pub async fn upsert(&self, kind: MediaKind, id: u64, entry: WatchlistEntry) {
        self.entries
            .write()
            .await
            .insert(watchlist_key(kind, id), entry);
    }

    /// Drop the entry for one item, if present
    pub async fn remove(&self, kind: MediaKind, id: u64) {
        self.entries.write().await.remove(&watchlist_key(kind, id));
    }
}

#[async_trait::async_trait]
impl WatchlistSource for InMemoryWatchlist {
    async fn entries(&self) -> AppResult<HashMap<String, WatchlistEntry>> {
        Ok(self.entries.read().await.clone())
    }
}
