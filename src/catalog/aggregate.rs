//! Per-Entity Book Aggregator.
//!
//! Fans out one fetch per source entity, merges nested book rows into a
//! single row collection, and tolerates per-entity failure: successful
//! entities contribute rows, failed ones contribute none, and a non-fatal
//! warning accompanies any partial result. Re-aggregation fully replaces
//! the row collection; there is no incremental merge with prior state.

use std::cmp::Ordering;

use futures::future::join_all;

use crate::client::{BookRecord, CatalogBackend, EntityKind, EntityRecord};

use super::entities::normalize_name;
use super::models::{MonitoredAuthor, Row, UNKNOWN_AUTHOR};

/// Result of one aggregation pass. Always usable: partial failure never
/// discards sibling successes.
#[derive(Debug, Default)]
pub struct AggregateOutcome {
    pub rows: Vec<Row>,
    /// Ids of source entities whose fetch failed.
    pub failed_entities: Vec<i64>,
}

impl AggregateOutcome {
    /// Whether at least one entity fetch failed.
    pub fn is_partial(&self) -> bool {
        !self.failed_entities.is_empty()
    }

    /// Non-fatal warning for a partial result, if any.
    pub fn warning(&self) -> Option<String> {
        if self.is_partial() {
            Some(format!(
                "Books for {} monitored item(s) could not be loaded",
                self.failed_entities.len()
            ))
        } else {
            None
        }
    }
}

/// Issue N independent, order-independent fetches concurrently and merge
/// their results. Every branch settles on its own; no failure cancels or
/// blocks siblings.
pub async fn aggregate_books<B: CatalogBackend>(
    backend: &B,
    sources: &[EntityRecord],
) -> AggregateOutcome {
    let fetches = sources
        .iter()
        .map(|entity| async move { (entity, backend.list_books(entity.id).await) });
    let settled = join_all(fetches).await;

    let mut outcome = AggregateOutcome::default();
    for (entity, result) in settled {
        match result {
            Ok(books) => {
                outcome.rows.extend(books.into_iter().map(|book| {
                    let author_name = resolve_author_name(entity, &book);
                    Row {
                        owner_entity_id: entity.id,
                        author_name,
                        book,
                    }
                }));
            }
            Err(e) => {
                log::warn!("Failed to load books for entity {}: {e}", entity.id);
                outcome.failed_entities.push(entity.id);
            }
        }
    }
    outcome
}

/// Resolve the display author for one row.
///
/// Book-kind entities resolve with priority: primary author parsed from the
/// raw author string, then the author name cached in settings, then the
/// entity's own name, then "Unknown author". Author-kind entities supply
/// their own name directly.
fn resolve_author_name(entity: &EntityRecord, book: &BookRecord) -> String {
    match entity.kind {
        EntityKind::Author => {
            let name = normalize_name(&entity.name);
            if name.is_empty() {
                UNKNOWN_AUTHOR.to_string()
            } else {
                name
            }
        }
        EntityKind::Book => book
            .author
            .as_deref()
            .and_then(primary_author)
            .or_else(|| entity.setting_str("author_name").map(str::to_string))
            .or_else(|| {
                let name = normalize_name(&entity.name);
                (!name.is_empty()).then_some(name)
            })
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
    }
}

/// First contributor from a raw author string ("A, B & C" -> "A").
pub fn primary_author(raw: &str) -> Option<String> {
    raw.split(&[',', ';', '&'][..])
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(normalize_name)
}

// ── Photo backfill ──────────────────────────────────────────────────────────

/// One-shot post-load batch pass: assign each author lacking a photo the
/// best cover found among their own rows. Authors that already carry a
/// photo are never overwritten.
pub fn backfill_author_photos(authors: &mut [MonitoredAuthor], rows: &[Row]) {
    for author in authors.iter_mut() {
        if author.photo_url.is_some() {
            continue;
        }
        let best = rows
            .iter()
            .filter(|r| r.owner_entity_id == author.id && r.book.cover_url.is_some())
            .max_by(|a, b| cover_rank(a, b));
        if let Some(row) = best {
            author.photo_url = row.book.cover_url.clone();
        }
    }
}

/// Ranking for cover candidates: highest reader count, then highest ratings
/// count, then highest numeric rating, then lexicographically-earliest
/// title (case-insensitive).
fn cover_rank(a: &Row, b: &Row) -> Ordering {
    let readers = |r: &Row| r.book.readers_count.unwrap_or(-1);
    let ratings = |r: &Row| r.book.ratings_count.unwrap_or(-1);
    let rating = |r: &Row| r.book.rating.unwrap_or(-1.0);

    readers(a)
        .cmp(&readers(b))
        .then_with(|| ratings(a).cmp(&ratings(b)))
        .then_with(|| rating(a).partial_cmp(&rating(b)).unwrap_or(Ordering::Equal))
        // Earlier title ranks higher, so compare reversed.
        .then_with(|| {
            b.book
                .title
                .to_lowercase()
                .cmp(&a.book.title.to_lowercase())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientError, MockCatalogBackend};
    use serde_json::json;

    fn source(id: i64, kind: &str, name: &str, settings: serde_json::Value) -> EntityRecord {
        serde_json::from_value(json!({
            "id": id, "kind": kind, "name": name, "settings": settings
        }))
        .unwrap()
    }

    fn book(title: &str) -> BookRecord {
        serde_json::from_value(json!({ "title": title })).unwrap()
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_sibling_rows() {
        let sources = vec![
            source(1, "author", "A", json!({})),
            source(2, "author", "B", json!({})),
            source(3, "author", "C", json!({})),
        ];
        let mut backend = MockCatalogBackend::new();
        backend.expect_list_books().returning(|id| match id {
            2 => Err(ClientError::api(500, "down")),
            _ => Ok(vec![
                serde_json::from_value(json!({"title": format!("Book {id}")})).unwrap(),
            ]),
        });

        let outcome = aggregate_books(&backend, &sources).await;
        assert!(outcome.is_partial());
        assert_eq!(outcome.failed_entities, vec![2]);
        let titles: Vec<&str> = outcome.rows.iter().map(|r| r.book.title.as_str()).collect();
        assert_eq!(titles, vec!["Book 1", "Book 3"]);
        assert!(outcome.warning().unwrap().contains("1 monitored item"));
    }

    #[tokio::test]
    async fn test_full_success_has_no_warning() {
        let sources = vec![source(1, "author", "A", json!({}))];
        let mut backend = MockCatalogBackend::new();
        backend
            .expect_list_books()
            .returning(|_| Ok(vec![serde_json::from_value(json!({"title": "T"})).unwrap()]));

        let outcome = aggregate_books(&backend, &sources).await;
        assert!(!outcome.is_partial());
        assert!(outcome.warning().is_none());
    }

    #[test]
    fn test_author_kind_rows_use_entity_name() {
        let entity = source(1, "author", "  Frank   Herbert ", json!({}));
        let name = resolve_author_name(&entity, &book("Dune"));
        assert_eq!(name, "Frank Herbert");
    }

    #[test]
    fn test_book_kind_author_resolution_priority() {
        // Raw author string wins, reduced to the primary contributor.
        let entity = source(2, "book", "Entity Name", json!({"author_name": "Cached"}));
        let b: BookRecord =
            serde_json::from_value(json!({"title": "T", "author": "Anne Smith, Bob Jones & Carol"}))
                .unwrap();
        assert_eq!(resolve_author_name(&entity, &b), "Anne Smith");

        // No raw author: settings cache next.
        assert_eq!(resolve_author_name(&entity, &book("T")), "Cached");

        // Then the entity's own name.
        let entity = source(2, "book", "Entity Name", json!({}));
        assert_eq!(resolve_author_name(&entity, &book("T")), "Entity Name");

        // Finally the unknown-author fallback.
        let entity = source(2, "book", "   ", json!({}));
        assert_eq!(resolve_author_name(&entity, &book("T")), UNKNOWN_AUTHOR);
    }

    fn row_with_cover(
        owner: i64,
        title: &str,
        cover: &str,
        readers: Option<i64>,
        ratings: Option<i64>,
        rating: Option<f64>,
    ) -> Row {
        Row {
            owner_entity_id: owner,
            author_name: "A".into(),
            book: serde_json::from_value(json!({
                "title": title,
                "cover_url": cover,
                "readers_count": readers,
                "ratings_count": ratings,
                "rating": rating
            }))
            .unwrap(),
        }
    }

    #[test]
    fn test_backfill_picks_highest_ranked_cover() {
        let mut authors = vec![MonitoredAuthor {
            id: 1,
            name: "A".into(),
            photo_url: None,
            books_count: None,
            created_at: None,
            bio: None,
        }];
        let rows = vec![
            row_with_cover(1, "Beta", "http://img/beta.jpg", Some(10), Some(5), Some(4.0)),
            row_with_cover(1, "Alpha", "http://img/alpha.jpg", Some(10), Some(5), Some(4.0)),
            row_with_cover(1, "Gamma", "http://img/gamma.jpg", Some(2), Some(99), Some(5.0)),
        ];
        backfill_author_photos(&mut authors, &rows);
        // Readers tie between Alpha/Beta beats Gamma's low readers; the tie
        // resolves to the lexicographically-earliest title.
        assert_eq!(authors[0].photo_url.as_deref(), Some("http://img/alpha.jpg"));
    }

    #[test]
    fn test_backfill_never_overwrites_existing_photo() {
        let mut authors = vec![MonitoredAuthor {
            id: 1,
            name: "A".into(),
            photo_url: Some("http://img/keep.jpg".into()),
            books_count: None,
            created_at: None,
            bio: None,
        }];
        let rows = vec![row_with_cover(1, "T", "http://img/new.jpg", Some(100), None, None)];
        backfill_author_photos(&mut authors, &rows);
        assert_eq!(authors[0].photo_url.as_deref(), Some("http://img/keep.jpg"));
    }
}
