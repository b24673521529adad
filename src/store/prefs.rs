//! Typed display-preference scalars.
//!
//! Each scalar lives under its own settings key. Loads tolerate absent or
//! malformed storage and fall back to defaults without raising; saves are
//! best-effort and never surface failures to the caller.

use std::str::FromStr;

use crate::catalog::organize::{AuthorSortMode, BookSortMode, GroupMode};

use super::LocalStore;

// ── Storage keys ────────────────────────────────────────────────────────────

const KEY_VIEW_MODE: &str = "display.view_mode";
const KEY_BOOK_SORT: &str = "display.book_sort";
const KEY_AUTHOR_SORT: &str = "display.author_sort";
const KEY_GROUP_MODE: &str = "display.group_mode";
const KEY_ACTIVE_TAB: &str = "display.active_tab";
const KEY_SEARCH_QUERY: &str = "display.search_query";
const KEY_SEARCH_EXPANDED: &str = "display.search_expanded";

// ── View-only scalars ───────────────────────────────────────────────────────

/// How rows are laid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Table,
    Grid,
}

impl ViewMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Grid => "grid",
        }
    }
}

impl FromStr for ViewMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "table" => Ok(Self::Table),
            "grid" => Ok(Self::Grid),
            _ => Err(()),
        }
    }
}

/// Active catalog tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Authors,
    Books,
    Upcoming,
}

impl Tab {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Authors => "authors",
            Self::Books => "books",
            Self::Upcoming => "upcoming",
        }
    }
}

impl FromStr for Tab {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "authors" => Ok(Self::Authors),
            "books" => Ok(Self::Books),
            "upcoming" => Ok(Self::Upcoming),
            _ => Err(()),
        }
    }
}

// ── Preference record ───────────────────────────────────────────────────────

/// Persisted display preferences. Never authoritative; never consulted for
/// mutation decisions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayPrefs {
    pub view_mode: ViewMode,
    pub book_sort: BookSortMode,
    pub author_sort: AuthorSortMode,
    pub group_mode: GroupMode,
    pub active_tab: Tab,
    pub search_query: String,
    pub search_expanded: bool,
}

impl DisplayPrefs {
    /// Load preferences, substituting defaults for anything absent or
    /// unparseable.
    pub async fn load(store: &LocalStore) -> Self {
        let defaults = Self::default();
        Self {
            view_mode: parse_or(store, KEY_VIEW_MODE, defaults.view_mode).await,
            book_sort: parse_or(store, KEY_BOOK_SORT, defaults.book_sort).await,
            author_sort: parse_or(store, KEY_AUTHOR_SORT, defaults.author_sort).await,
            group_mode: parse_or(store, KEY_GROUP_MODE, defaults.group_mode).await,
            active_tab: parse_or(store, KEY_ACTIVE_TAB, defaults.active_tab).await,
            search_query: read_or(store, KEY_SEARCH_QUERY)
                .await
                .unwrap_or(defaults.search_query),
            search_expanded: read_or(store, KEY_SEARCH_EXPANDED)
                .await
                .map(|v| v == "true")
                .unwrap_or(defaults.search_expanded),
        }
    }

    /// Persist preferences. Failures are debug-logged and otherwise ignored.
    pub async fn save(&self, store: &LocalStore) {
        let pairs: [(&str, String); 7] = [
            (KEY_VIEW_MODE, self.view_mode.as_str().to_string()),
            (KEY_BOOK_SORT, self.book_sort.as_str().to_string()),
            (KEY_AUTHOR_SORT, self.author_sort.as_str().to_string()),
            (KEY_GROUP_MODE, self.group_mode.as_str().to_string()),
            (KEY_ACTIVE_TAB, self.active_tab.as_str().to_string()),
            (KEY_SEARCH_QUERY, self.search_query.clone()),
            (KEY_SEARCH_EXPANDED, self.search_expanded.to_string()),
        ];
        for (key, value) in pairs {
            if let Err(e) = store.write(key, &value).await {
                log::debug!("Failed to persist {key}: {e}");
            }
        }
    }
}

async fn read_or(store: &LocalStore, key: &str) -> Option<String> {
    match store.read(key).await {
        Ok(value) => value,
        Err(e) => {
            log::debug!("Failed to read {key}: {e}");
            None
        }
    }
}

async fn parse_or<T: FromStr + Copy>(store: &LocalStore, key: &str, default: T) -> T {
    read_or(store, key)
        .await
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
