//! Catalog engine.
//!
//! State synchronization for the monitored-media catalog:
//! - `entities` loads and partitions the monitored-entity collection
//! - `aggregate` fans out per-entity book fetches and flattens the rows
//! - `selection` derives stable composite keys and tracks selections
//! - `organize` groups, sorts and filters the aggregated rows
//! - `sync` owns the generation-tagged view state and reload cycle
//! - `mutations` runs selection-driven bulk mutations over that state
//! - `counts` persists the loading-time count snapshot
//! - `suggest` debounces inline search with staleness guards
//! - `details` sequence-guards per-entity detail loads

pub mod aggregate;
pub mod counts;
pub mod details;
pub mod entities;
pub mod error;
pub mod models;
pub mod mutations;
pub mod organize;
pub mod selection;
pub mod suggest;
pub mod sync;

pub use aggregate::{aggregate_books, AggregateOutcome};
pub use counts::{load_snapshot, placeholders, save_snapshot, CountSnapshot, COUNT_PLACEHOLDER};
pub use details::{DetailState, DetailTicket};
pub use entities::EntityStore;
pub use error::{CatalogError, CatalogResult};
pub use models::{Group, LiveCounts, MonitoredAuthor, Row, UNKNOWN_AUTHOR};
pub use mutations::MutationSummary;
pub use organize::{AuthorSortMode, BookSortMode, GroupMode};
pub use selection::{book_key, SelectionState};
pub use suggest::{SearchScope, SuggestController, SEARCH_DEBOUNCE_MS};
pub use sync::{CatalogState, ReloadTicket};
