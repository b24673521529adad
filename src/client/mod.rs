//! Backend client for the monitoring server.
//!
//! The engine talks to the backend exclusively through the
//! [`CatalogBackend`] trait so every consumer can be exercised against a
//! mock in tests. `HttpBackend` is the production implementation.
//!
//! # Modules
//!
//! - `error` - Error types for backend operations
//! - `models` - Wire records (serde)
//! - `http` - reqwest-based implementation

pub mod error;
pub mod http;
pub mod models;

pub use error::{ClientError, ClientResult};
pub use http::HttpBackend;
pub use models::{
    BookRecord, CatalogHit, CreateEntityRequest, DeleteOutcome, EntityKind, EntityRecord,
    FileRecord, MonitorFlagUpdate, Preferences, SearchHit, SearchQuery,
};

use async_trait::async_trait;

/// Abstract contract with the monitoring server.
///
/// Every operation is terminal on failure — no retry logic lives behind
/// this trait; callers surface or downgrade errors per their own rules.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogBackend: Send + Sync {
    /// List all monitored entities.
    async fn list_entities(&self) -> ClientResult<Vec<EntityRecord>>;

    /// Create (monitor) a new entity; the backend assigns the id.
    async fn create_entity(&self, req: &CreateEntityRequest) -> ClientResult<EntityRecord>;

    /// List the nested book rows supplied by one entity.
    async fn list_books(&self, entity_id: i64) -> ClientResult<Vec<BookRecord>>;

    /// List files for one entity (detail display only).
    async fn list_files(&self, entity_id: i64) -> ClientResult<Vec<FileRecord>>;

    /// Apply a batch of monitor-flag updates scoped to one entity.
    async fn update_monitor_flags(
        &self,
        entity_id: i64,
        batch: &[MonitorFlagUpdate],
    ) -> ClientResult<()>;

    /// Delete monitored entities; ids settle independently.
    async fn delete_entities(&self, ids: &[i64]) -> ClientResult<DeleteOutcome>;

    /// Free-text discovery search across providers.
    async fn search(&self, query: &SearchQuery) -> ClientResult<Vec<SearchHit>>;

    /// Free-text search over the monitored catalog.
    async fn search_catalog(&self, query: &str, limit: usize) -> ClientResult<Vec<CatalogHit>>;

    /// Fetch user preferences.
    async fn get_preferences(&self) -> ClientResult<Preferences>;

    /// Patch user preferences; the backend merges, it does not replace.
    async fn update_preferences(&self, patch: &Preferences) -> ClientResult<Preferences>;
}
