//! View-state synchronization.
//!
//! `CatalogState` exclusively owns all derived view state: the partitioned
//! entity collections, the aggregated row set, both selections, the latest
//! catalog-search hits and the current warning banner. Reloads are split
//! into begin/fetch/commit so the fetch holds no borrow of the state, and
//! every reload is tagged with the generation active at its start: a
//! mutation committed meanwhile bumps the generation and the stale reload
//! result is discarded on commit.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::client::{CatalogBackend, CatalogHit, ClientError, EntityRecord};
use crate::store::prefs::Tab;

use super::aggregate::{aggregate_books, backfill_author_photos, AggregateOutcome};
use super::entities::EntityStore;
use super::models::{LiveCounts, Row};
use super::organize::{filter_rows, split_upcoming};
use super::selection::{author_key, book_key, SelectionState};

/// Tag tying one reload to the generation it started under.
#[derive(Debug, Clone, Copy)]
pub struct ReloadTicket {
    generation: u64,
}

/// Everything one reload pass fetched, before it is committed.
pub struct FetchedCatalog {
    entities: Result<Vec<EntityRecord>, ClientError>,
    books: Option<AggregateOutcome>,
}

/// Central synchronized view state.
#[derive(Default)]
pub struct CatalogState {
    pub entities: EntityStore,
    /// Aggregated rows; fully replaced by each committed reload.
    pub rows: Vec<Row>,
    /// Selection over book rows.
    pub selection: SelectionState,
    /// Selection over the author view.
    pub author_selection: SelectionState,
    /// Most recent monitored-catalog search hits.
    pub search_hits: Vec<CatalogHit>,
    /// Non-fatal warning from the last partial operation.
    pub warning: Option<String>,
    generation: u64,
}

impl CatalogState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Record that a mutation committed; any reload begun earlier is stale.
    pub(crate) fn bump_generation(&mut self) {
        self.generation += 1;
    }

    /// Start a reload under the current generation.
    pub fn begin_reload(&self) -> ReloadTicket {
        ReloadTicket {
            generation: self.generation,
        }
    }

    /// Fetch the full catalog: the monitored-entity collection, then one
    /// book fetch per source entity. Holds no borrow of the state.
    pub async fn fetch<B: CatalogBackend>(backend: &B) -> FetchedCatalog {
        match backend.list_entities().await {
            Ok(entities) => {
                let books = aggregate_books(backend, &entities).await;
                FetchedCatalog {
                    entities: Ok(entities),
                    books: Some(books),
                }
            }
            Err(e) => FetchedCatalog {
                entities: Err(e),
                books: None,
            },
        }
    }

    /// Apply a fetched catalog. Returns `false` (discarding the fetch) when
    /// the ticket's generation was superseded by a committed mutation.
    pub fn commit_reload(&mut self, ticket: ReloadTicket, fetched: FetchedCatalog) -> bool {
        if ticket.generation != self.generation {
            log::debug!(
                "Discarding stale reload (generation {} < {})",
                ticket.generation,
                self.generation
            );
            return false;
        }

        match fetched.entities {
            Ok(entities) => {
                self.entities.apply(entities);
                let outcome = fetched.books.unwrap_or_default();
                self.warning = outcome.warning();
                self.rows = outcome.rows;
                backfill_author_photos(&mut self.entities.authors, &self.rows);
            }
            Err(e) => {
                log::warn!("Catalog reload failed: {e}");
                self.entities.clear_with_error(format!(
                    "Failed to load monitored entities: {e}"
                ));
                self.rows.clear();
                self.warning = None;
            }
        }
        self.prune_selections();
        true
    }

    /// Convenience for linear callers: begin, fetch and commit in one step.
    pub async fn reload<B: CatalogBackend>(&mut self, backend: &B) -> bool {
        let ticket = self.begin_reload();
        let fetched = Self::fetch(backend).await;
        self.commit_reload(ticket, fetched)
    }

    /// Drop selection entries whose key vanished from the collections.
    pub(crate) fn prune_selections(&mut self) {
        let book_keys: HashSet<String> = self.rows.iter().map(book_key).collect();
        self.selection.prune(&book_keys);

        let author_keys: HashSet<String> = self
            .entities
            .authors
            .iter()
            .map(|a| author_key(a.id))
            .collect();
        self.author_selection.prune(&author_keys);
    }

    /// Replace the retained search hits (feeds the search count).
    pub fn set_search_hits(&mut self, hits: Vec<CatalogHit>) {
        self.search_hits = hits;
    }

    /// Live aggregate counts for the given local date.
    pub fn counts(&self, today: NaiveDate) -> LiveCounts {
        let (regular, upcoming) = split_upcoming(&self.rows, today);
        LiveCounts {
            authors: self.entities.authors.len(),
            books: regular.len(),
            upcoming: upcoming.len(),
            search: self.search_hits.len(),
        }
    }

    /// Rows visible for a tab and query. Free-text filtering is suppressed
    /// entirely while the authors tab is active.
    pub fn filtered_rows(&self, tab: Tab, query: &str) -> Vec<Row> {
        match tab {
            Tab::Authors => self.rows.clone(),
            Tab::Books | Tab::Upcoming => filter_rows(&self.rows, query),
        }
    }

    /// Selection keys of the aggregated set a search scope matches against.
    pub fn known_keys(&self, tab: Tab, today: NaiveDate) -> HashSet<String> {
        match tab {
            Tab::Authors => HashSet::new(),
            Tab::Books => {
                let (regular, _) = split_upcoming(&self.rows, today);
                regular.iter().map(book_key).collect()
            }
            Tab::Upcoming => {
                let (_, upcoming) = split_upcoming(&self.rows, today);
                upcoming.iter().map(book_key).collect()
            }
        }
    }
}
