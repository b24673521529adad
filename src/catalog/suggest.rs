//! Inline Search/Suggest Controller.
//!
//! Debounces free-text input before issuing a backend call, and guards
//! staleness with a monotonically increasing per-controller sequence
//! number: results from a superseded invocation are discarded even if they
//! arrive after a newer call. One controller instance belongs to one input
//! box.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::client::{CatalogBackend, CatalogHit, EntityKind, SearchHit, SearchQuery};

use super::error::CatalogResult;
use super::selection::catalog_hit_key;

/// Debounce interval between input edits and the backend call.
pub const SEARCH_DEBOUNCE_MS: u64 = 160;

/// Which aggregated view the suggest results are scoped against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    /// Matches shown unscoped.
    Authors,
    /// Matches filtered to keys present in the aggregated book set.
    Books,
    /// Matches filtered to keys present in the aggregated upcoming set.
    Upcoming,
}

pub struct SuggestController {
    seq: AtomicU64,
    debounce: Duration,
}

impl Default for SuggestController {
    fn default() -> Self {
        Self::new()
    }
}

impl SuggestController {
    pub fn new() -> Self {
        Self {
            seq: AtomicU64::new(0),
            debounce: Duration::from_millis(SEARCH_DEBOUNCE_MS),
        }
    }

    #[cfg(test)]
    fn with_debounce(debounce: Duration) -> Self {
        Self {
            seq: AtomicU64::new(0),
            debounce,
        }
    }

    /// Whether an invocation sequence number is still the latest.
    fn is_live(&self, seq: u64) -> bool {
        self.seq.load(Ordering::SeqCst) == seq
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Debounced search over the monitored catalog.
    ///
    /// Returns `Ok(None)` when this invocation was superseded by a newer
    /// one — the caller must ignore it entirely. `known_keys` is the
    /// selection-key set of the aggregated local view for key-scoped
    /// contexts.
    pub async fn query<B: CatalogBackend>(
        &self,
        backend: &B,
        input: &str,
        scope: SearchScope,
        known_keys: &HashSet<String>,
        limit: usize,
    ) -> CatalogResult<Option<Vec<CatalogHit>>> {
        let seq = self.next_seq();
        tokio::time::sleep(self.debounce).await;
        if !self.is_live(seq) {
            return Ok(None);
        }

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(Some(Vec::new()));
        }

        let result = backend.search_catalog(trimmed, limit).await;
        if !self.is_live(seq) {
            // Superseded while in flight; discard even a failure.
            return Ok(None);
        }
        let hits = result?;

        let scoped = match scope {
            SearchScope::Authors => hits,
            SearchScope::Books | SearchScope::Upcoming => hits
                .into_iter()
                .filter(|hit| known_keys.contains(&catalog_hit_key(hit)))
                .collect(),
        };
        Ok(Some(scoped))
    }

    /// Debounced provider-wide discovery search (used when monitoring a new
    /// author or book). Same staleness rules as [`Self::query`].
    pub async fn discover<B: CatalogBackend>(
        &self,
        backend: &B,
        input: &str,
        kind: EntityKind,
        limit: usize,
    ) -> CatalogResult<Option<Vec<SearchHit>>> {
        let seq = self.next_seq();
        tokio::time::sleep(self.debounce).await;
        if !self.is_live(seq) {
            return Ok(None);
        }

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(Some(Vec::new()));
        }

        let query = SearchQuery::new(trimmed, limit).with_content_type(kind.as_str());
        let result = backend.search(&query).await;
        if !self.is_live(seq) {
            return Ok(None);
        }
        Ok(Some(result?))
    }
}
