//! Selection Key Resolver.
//!
//! Keys are pure functions of row/entity content — never stored separately —
//! so a selection computed before a refresh still matches identical items
//! after refresh. On any collection change the selection is pruned: entries
//! whose key vanished are dropped, and counts derive only from remaining
//! true-valued entries.

use std::collections::{HashMap, HashSet};

use crate::client::CatalogHit;

use super::aggregate::primary_author;
use super::models::{Row, UNKNOWN_AUTHOR};

/// Stable composite key for a book row.
///
/// With provider metadata: `ownerId:provider:providerBookId` (lower-cased).
/// Without: `ownerId::title|author` (lower-cased).
pub fn book_key(row: &Row) -> String {
    compose_book_key(
        row.owner_entity_id,
        row.book.provider.as_deref(),
        row.book.provider_book_id.as_deref(),
        &row.book.title,
        &row.author_name,
    )
}

/// Key for a monitored-catalog search hit, comparable with [`book_key`].
pub fn catalog_hit_key(hit: &CatalogHit) -> String {
    let author = hit
        .book
        .author
        .as_deref()
        .and_then(primary_author)
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
    compose_book_key(
        hit.owner_entity_id,
        hit.book.provider.as_deref(),
        hit.book.provider_book_id.as_deref(),
        &hit.book.title,
        &author,
    )
}

fn compose_book_key(
    owner_id: i64,
    provider: Option<&str>,
    provider_book_id: Option<&str>,
    title: &str,
    author: &str,
) -> String {
    match (provider.map(str::trim), provider_book_id.map(str::trim)) {
        (Some(p), Some(id)) if !p.is_empty() && !id.is_empty() => {
            format!("{owner_id}:{}:{}", p.to_lowercase(), id.to_lowercase())
        }
        _ => format!(
            "{owner_id}::{}|{}",
            title.trim().to_lowercase(),
            author.trim().to_lowercase()
        ),
    }
}

/// Stable key for a monitored author: the entity id as a string.
pub fn author_key(id: i64) -> String {
    id.to_string()
}

/// Keyed selection map for one view.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    entries: HashMap<String, bool>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, selected: bool) {
        self.entries.insert(key.into(), selected);
    }

    pub fn toggle(&mut self, key: &str) {
        let entry = self.entries.entry(key.to_string()).or_insert(false);
        *entry = !*entry;
    }

    pub fn is_selected(&self, key: &str) -> bool {
        self.entries.get(key).copied().unwrap_or(false)
    }

    /// Keys currently selected (true-valued entries only).
    pub fn selected_keys(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, &v)| v)
            .map(|(k, _)| k.clone())
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.entries.values().filter(|&&v| v).count()
    }

    /// Drop entries whose key is no longer present in the collection.
    pub fn prune(&mut self, valid_keys: &HashSet<String>) {
        self.entries.retain(|key, _| valid_keys.contains(key));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(owner: i64, title: &str, author: &str, provider: Option<&str>, pid: Option<&str>) -> Row {
        Row {
            owner_entity_id: owner,
            author_name: author.to_string(),
            book: serde_json::from_value(json!({
                "title": title,
                "provider": provider,
                "provider_book_id": pid
            }))
            .unwrap(),
        }
    }

    #[test]
    fn test_book_key_with_provider_metadata() {
        let r = row(7, "Dune", "Frank Herbert", Some("GR"), Some("AbC1"));
        assert_eq!(book_key(&r), "7:gr:abc1");
    }

    #[test]
    fn test_book_key_fallback_without_provider() {
        let r = row(7, " Dune ", "Frank Herbert", None, Some("123"));
        assert_eq!(book_key(&r), "7::dune|frank herbert");

        // Blank provider strings take the fallback path too.
        let r = row(7, "Dune", "Frank Herbert", Some("  "), Some("123"));
        assert_eq!(book_key(&r), "7::dune|frank herbert");
    }

    #[test]
    fn test_book_key_stable_across_identical_content() {
        let a = row(7, "Dune", "Frank Herbert", Some("gr"), Some("1"));
        let b = row(7, "Dune", "Frank Herbert", Some("gr"), Some("1"));
        assert_eq!(book_key(&a), book_key(&b));
    }

    #[test]
    fn test_catalog_hit_key_matches_row_key() {
        let hit: CatalogHit = serde_json::from_value(json!({
            "owner_entity_id": 7,
            "title": "Dune",
            "provider": "gr",
            "provider_book_id": "1"
        }))
        .unwrap();
        let r = row(7, "Dune", "Frank Herbert", Some("gr"), Some("1"));
        assert_eq!(catalog_hit_key(&hit), book_key(&r));
    }

    #[test]
    fn test_selection_prune_and_counts() {
        let mut sel = SelectionState::new();
        sel.set("a", true);
        sel.set("b", true);
        sel.set("c", false);
        assert_eq!(sel.selected_count(), 2);

        let valid: HashSet<String> = ["a".to_string(), "c".to_string()].into();
        sel.prune(&valid);
        assert_eq!(sel.selected_count(), 1);
        assert!(sel.is_selected("a"));
        assert!(!sel.is_selected("b"));

        let mut keys = sel.selected_keys();
        keys.sort();
        assert_eq!(keys, vec!["a".to_string()]);
    }

    #[test]
    fn test_toggle() {
        let mut sel = SelectionState::new();
        sel.toggle("k");
        assert!(sel.is_selected("k"));
        sel.toggle("k");
        assert!(!sel.is_selected("k"));
    }
}
