//! Count Cache.
//!
//! A four-field integer snapshot written after each successful aggregation
//! pass and shown as a loading-time placeholder before live data resolves.
//! Best-effort only: never consulted for mutation eligibility, and
//! persistence failures are silently ignored.

use serde::{Deserialize, Serialize};

use crate::store::LocalStore;

use super::models::LiveCounts;

const SNAPSHOT_KEY: &str = "counts.snapshot";

/// Placeholder shown when neither live data nor a valid snapshot exists.
pub const COUNT_PLACEHOLDER: &str = "–";

/// Persisted aggregate counts. All four fields are required; a stored
/// value missing any of them is structurally invalid and discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountSnapshot {
    pub authors: u64,
    pub books: u64,
    pub upcoming: u64,
    pub search: u64,
}

impl From<LiveCounts> for CountSnapshot {
    fn from(live: LiveCounts) -> Self {
        Self {
            authors: live.authors as u64,
            books: live.books as u64,
            upcoming: live.upcoming as u64,
            search: live.search as u64,
        }
    }
}

/// Load the last structurally-valid snapshot, if any. A malformed stored
/// value reads back as absent.
pub async fn load_snapshot(store: &LocalStore) -> Option<CountSnapshot> {
    match store.read_json(SNAPSHOT_KEY).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            log::debug!("Failed to read count snapshot: {e}");
            None
        }
    }
}

/// Overwrite the persisted snapshot. Failures are debug-logged and ignored.
pub async fn save_snapshot(store: &LocalStore, snapshot: CountSnapshot) {
    if let Err(e) = store.write_json(SNAPSHOT_KEY, &snapshot).await {
        log::debug!("Failed to persist count snapshot: {e}");
    }
}

/// Placeholder strings `[authors, books, upcoming, search]` for a
/// loading-time render: snapshot numbers when available, "–" otherwise.
pub fn placeholders(snapshot: Option<&CountSnapshot>) -> [String; 4] {
    match snapshot {
        Some(s) => [
            s.authors.to_string(),
            s.books.to_string(),
            s.upcoming.to_string(),
            s.search.to_string(),
        ],
        None => std::array::from_fn(|_| COUNT_PLACEHOLDER.to_string()),
    }
}
