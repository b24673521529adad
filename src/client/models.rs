//! Wire records exchanged with the monitoring server.
//!
//! All types decode defensively: optional fields default to `None`, the
//! opaque `settings` blob stays a `serde_json::Value`, and monitor flags
//! accept both booleans and the legacy 0/1 integer encoding.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ============================================================================
// Entity Records
// ============================================================================

/// Kind of a monitored entity.
///
/// Modeled as an explicit tagged variant so every consumption site matches
/// exhaustively; a new kind cannot silently fall through unhandled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Supplies its whole catalog of nested book rows.
    Author,
    /// A singleton tracked release; supplies exactly one row.
    Book,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Author => "author",
            Self::Book => "book",
        }
    }
}

/// A monitored entity as stored by the backend.
///
/// Identity fields are immutable after creation; only `settings` may be
/// patched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: i64,
    pub kind: EntityKind,
    pub name: String,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub provider_id: Option<String>,
    #[serde(default)]
    pub cached_source_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    /// Opaque key-value blob (folder paths, monitor-mode flags, cached
    /// display fields). Never trusted structurally.
    #[serde(default)]
    pub settings: Value,
}

impl EntityRecord {
    /// Read a string-valued settings key, treating empty strings as absent.
    pub fn setting_str(&self, key: &str) -> Option<&str> {
        self.settings
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Read an integer-valued settings key.
    pub fn setting_i64(&self, key: &str) -> Option<i64> {
        self.settings.get(key).and_then(Value::as_i64)
    }
}

/// Request body for creating (monitoring) a new entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEntityRequest {
    pub kind: EntityKind,
    pub name: String,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub provider_id: Option<String>,
    #[serde(default)]
    pub settings: Value,
}

impl CreateEntityRequest {
    /// The target folder chosen for this entity, if any.
    pub fn folder(&self) -> Option<&str> {
        self.settings
            .get("folder")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Whether a format toggle is enabled. Absent toggles count as enabled;
    /// only an explicit `false` disables a format.
    pub fn format_enabled(&self, key: &str) -> bool {
        self.settings.get(key).and_then(Value::as_bool).unwrap_or(true)
    }
}

// ============================================================================
// Book Records
// ============================================================================

/// A raw book row as returned by the per-entity book listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookRecord {
    pub title: String,
    /// Raw author string as the provider supplies it (may list several
    /// contributors separated by commas or ampersands).
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub series: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub provider_book_id: Option<String>,
    #[serde(default)]
    pub publish_year: Option<i32>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub ratings_count: Option<i64>,
    #[serde(default)]
    pub readers_count: Option<i64>,
    #[serde(default, deserialize_with = "de_monitor_flag")]
    pub monitor_ebook: Option<bool>,
    #[serde(default, deserialize_with = "de_monitor_flag")]
    pub monitor_audiobook: Option<bool>,
}

/// Tri-state monitor flag: boolean, legacy 0/1 integer, or absent.
fn de_monitor_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::Bool(b)) => Some(b),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => Some(i != 0),
            None => {
                log::debug!("Ignoring non-integer monitor flag: {n}");
                None
            }
        },
        Some(other) => {
            log::debug!("Ignoring unexpected monitor flag shape: {other}");
            None
        }
    })
}

/// A file row for an entity, consumed only for detail display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    #[serde(default)]
    pub size_bytes: Option<u64>,
    #[serde(default)]
    pub kind: Option<String>,
}

// ============================================================================
// Mutation Records
// ============================================================================

/// One monitor-flag update inside a batched call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorFlagUpdate {
    pub provider: String,
    pub provider_book_id: String,
    pub monitor_ebook: bool,
    pub monitor_audiobook: bool,
}

/// Outcome of a batched delete: every id lands in exactly one set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteOutcome {
    #[serde(default)]
    pub successful_ids: Vec<i64>,
    #[serde(default)]
    pub failed_ids: Vec<i64>,
}

// ============================================================================
// Search Records
// ============================================================================

/// Free-text discovery search request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    pub limit: usize,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub filters: Option<Value>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub content_type: Option<String>,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>, limit: usize) -> Self {
        Self {
            query: query.into(),
            limit,
            ..Default::default()
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// One discovery search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub kind: EntityKind,
    pub name: String,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub provider_id: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
}

/// One monitored-catalog search result, with availability flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogHit {
    pub owner_entity_id: i64,
    #[serde(flatten)]
    pub book: BookRecord,
    #[serde(default)]
    pub available_ebook: bool,
    #[serde(default)]
    pub available_audiobook: bool,
}

// ============================================================================
// Preferences
// ============================================================================

/// User preferences stored server-side. Updates are merged, not replaced,
/// so unrelated keys survive a partial patch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub folder_roots: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}
