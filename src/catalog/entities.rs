//! Entity Store — loads and partitions the monitored-entity collection.
//!
//! One fetch yields two views: the author view (author-kind entities with a
//! usable display name) and the source-entity list (every entity, either
//! kind, treated as a supplier of nested book rows). A load failure clears
//! both collections so the caller shows an empty state instead of stale or
//! ghost data; there is no automatic retry.

use chrono::{DateTime, Utc};

use crate::client::{CatalogBackend, EntityKind, EntityRecord};

use super::models::MonitoredAuthor;

/// Collapse internal whitespace runs to single spaces and trim the ends.
pub fn normalize_name(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Derive the author view of an author-kind entity.
///
/// Returns `None` when the normalized name is empty; such entities are
/// excluded from the author view (but remain source entities).
pub fn author_view(entity: &EntityRecord) -> Option<MonitoredAuthor> {
    let name = normalize_name(&entity.name);
    if name.is_empty() {
        return None;
    }
    Some(MonitoredAuthor {
        id: entity.id,
        name,
        photo_url: entity.setting_str("photo_url").map(str::to_string),
        books_count: entity.setting_i64("books_count"),
        created_at: parse_created_at(entity.created_at.as_deref()),
        bio: entity.setting_str("bio").map(str::to_string),
    })
}

fn parse_created_at(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// The loaded monitored-entity collection, partitioned into its two views.
#[derive(Default)]
pub struct EntityStore {
    /// Author view: author-kind entities with a non-empty normalized name.
    pub authors: Vec<MonitoredAuthor>,
    /// Source list: every monitored entity, supplier of nested book rows.
    pub sources: Vec<EntityRecord>,
    /// One dismissable message from the last failed load.
    pub error: Option<String>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch and partition all monitored entities.
    ///
    /// Returns `true` on success. On failure both collections are cleared
    /// and one error message is surfaced.
    pub async fn load<B: CatalogBackend>(&mut self, backend: &B) -> bool {
        match backend.list_entities().await {
            Ok(entities) => {
                self.apply(entities);
                true
            }
            Err(e) => {
                log::warn!("Failed to load monitored entities: {e}");
                self.clear_with_error(format!("Failed to load monitored entities: {e}"));
                false
            }
        }
    }

    /// Clear both views, leaving one dismissable error message.
    pub fn clear_with_error(&mut self, message: String) {
        self.authors.clear();
        self.sources.clear();
        self.error = Some(message);
    }

    /// Replace both views from a freshly fetched collection.
    pub fn apply(&mut self, entities: Vec<EntityRecord>) {
        self.error = None;
        self.authors.clear();
        self.sources.clear();
        for entity in entities {
            match entity.kind {
                EntityKind::Author => {
                    if let Some(author) = author_view(&entity) {
                        self.authors.push(author);
                    }
                    self.sources.push(entity);
                }
                EntityKind::Book => {
                    self.sources.push(entity);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockCatalogBackend;
    use serde_json::json;

    fn entity(id: i64, kind: EntityKind, name: &str) -> EntityRecord {
        serde_json::from_value(json!({
            "id": id,
            "kind": kind.as_str(),
            "name": name,
            "created_at": "2024-03-01T12:00:00Z",
            "settings": {"photo_url": "http://img/a.jpg", "books_count": 4}
        }))
        .unwrap()
    }

    #[test]
    fn test_normalize_name_collapses_whitespace() {
        assert_eq!(normalize_name("  Ursula   K.\tLe Guin  "), "Ursula K. Le Guin");
        assert_eq!(normalize_name("   \t "), "");
    }

    #[test]
    fn test_author_view_excludes_blank_names() {
        let e = entity(1, EntityKind::Author, "  \t ");
        assert!(author_view(&e).is_none());
    }

    #[test]
    fn test_author_view_reads_settings() {
        let e = entity(1, EntityKind::Author, "Frank  Herbert");
        let author = author_view(&e).unwrap();
        assert_eq!(author.name, "Frank Herbert");
        assert_eq!(author.photo_url.as_deref(), Some("http://img/a.jpg"));
        assert_eq!(author.books_count, Some(4));
        assert!(author.created_at.is_some());
    }

    #[tokio::test]
    async fn test_load_partitions_kinds() {
        let mut backend = MockCatalogBackend::new();
        backend.expect_list_entities().returning(|| {
            Ok(vec![
                serde_json::from_value(json!({"id": 1, "kind": "author", "name": "A"})).unwrap(),
                serde_json::from_value(json!({"id": 2, "kind": "book", "name": "Solo"})).unwrap(),
                serde_json::from_value(json!({"id": 3, "kind": "author", "name": "  "})).unwrap(),
            ])
        });

        let mut store = EntityStore::new();
        assert!(store.load(&backend).await);
        // Blank-named author is excluded from the author view only.
        assert_eq!(store.authors.len(), 1);
        assert_eq!(store.sources.len(), 3);
        assert!(store.error.is_none());
    }

    #[tokio::test]
    async fn test_load_failure_clears_collections() {
        let mut backend = MockCatalogBackend::new();
        backend
            .expect_list_entities()
            .returning(|| Err(crate::client::ClientError::api(500, "down")));

        let mut store = EntityStore::new();
        store.authors.push(MonitoredAuthor {
            id: 9,
            name: "Stale".into(),
            photo_url: None,
            books_count: None,
            created_at: None,
            bio: None,
        });
        assert!(!store.load(&backend).await);
        assert!(store.authors.is_empty());
        assert!(store.sources.is_empty());
        assert!(store.error.is_some());
    }
}
