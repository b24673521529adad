//! Domain types derived from the wire records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::BookRecord;

/// Display name used when no author can be resolved for a row.
pub const UNKNOWN_AUTHOR: &str = "Unknown author";

/// Derived author view of an author-kind monitored entity.
///
/// Entities whose name is empty after whitespace normalization never reach
/// this view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoredAuthor {
    pub id: i64,
    pub name: String,
    pub photo_url: Option<String>,
    pub books_count: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub bio: Option<String>,
}

/// One book attributed to its owning source entity, with a resolved
/// display author. Rows from failed per-entity fetches are simply absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Row {
    pub owner_entity_id: i64,
    pub author_name: String,
    #[serde(flatten)]
    pub book: BookRecord,
}

/// A render-time bucket of rows. Ephemeral: recomputed per call, never
/// persisted.
#[derive(Debug, Clone)]
pub struct Group {
    pub key: String,
    pub title: String,
    pub rows: Vec<Row>,
}

/// Aggregate counts derived from live state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LiveCounts {
    pub authors: usize,
    pub books: usize,
    pub upcoming: usize,
    pub search: usize,
}
