//! Grouping/Sorting/Filtering Engine.
//!
//! Buckets rows into regular vs. upcoming, filters by free text, groups
//! (none/author/year) and sorts (alphabetical/date/year/count). Groups are
//! ephemeral: recomputed per call, never persisted.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate};

use crate::client::BookRecord;

use super::models::{Group, MonitoredAuthor, Row, UNKNOWN_AUTHOR};

// ── Modes ───────────────────────────────────────────────────────────────────

/// Sort order for book rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BookSortMode {
    #[default]
    Alphabetical,
    Year,
}

impl BookSortMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Alphabetical => "alphabetical",
            Self::Year => "year",
        }
    }
}

impl FromStr for BookSortMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alphabetical" => Ok(Self::Alphabetical),
            "year" => Ok(Self::Year),
            _ => Err(()),
        }
    }
}

/// Sort order for the author view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthorSortMode {
    #[default]
    DateAdded,
    BooksCount,
    Alphabetical,
}

impl AuthorSortMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DateAdded => "date_added",
            Self::BooksCount => "books_count",
            Self::Alphabetical => "alphabetical",
        }
    }
}

impl FromStr for AuthorSortMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date_added" => Ok(Self::DateAdded),
            "books_count" => Ok(Self::BooksCount),
            "alphabetical" => Ok(Self::Alphabetical),
            _ => Err(()),
        }
    }
}

/// Grouping mode for book rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GroupMode {
    #[default]
    None,
    Author,
    Year,
}

impl GroupMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Author => "author",
            Self::Year => "year",
        }
    }
}

impl FromStr for GroupMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "author" => Ok(Self::Author),
            "year" => Ok(Self::Year),
            _ => Err(()),
        }
    }
}

// ── Upcoming bucketing ──────────────────────────────────────────────────────

/// Parse a release date in `YYYY-MM-DD` or RFC 3339 form. Anything else is
/// treated as "no usable release date".
pub fn parse_release_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive())
}

/// A book is upcoming if its release date is at or after today's local
/// midnight, or — absent a usable release date — its publish year is
/// strictly greater than the current year.
pub fn is_upcoming(book: &BookRecord, today: NaiveDate) -> bool {
    if let Some(date) = book.release_date.as_deref().and_then(parse_release_date) {
        return date >= today;
    }
    book.publish_year.map_or(false, |year| year > today.year())
}

/// Partition rows into (regular, upcoming).
pub fn split_upcoming(rows: &[Row], today: NaiveDate) -> (Vec<Row>, Vec<Row>) {
    rows.iter()
        .cloned()
        .partition(|row| !is_upcoming(&row.book, today))
}

// ── Filtering ───────────────────────────────────────────────────────────────

/// Case-insensitive substring match across title, resolved author name,
/// series, provider, provider-book-id and stringified publish year. An
/// empty query matches everything.
pub fn row_matches(row: &Row, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    let book = &row.book;
    let mut haystacks: Vec<String> = vec![
        book.title.to_lowercase(),
        row.author_name.to_lowercase(),
    ];
    if let Some(series) = &book.series {
        haystacks.push(series.to_lowercase());
    }
    if let Some(provider) = &book.provider {
        haystacks.push(provider.to_lowercase());
    }
    if let Some(pid) = &book.provider_book_id {
        haystacks.push(pid.to_lowercase());
    }
    if let Some(year) = book.publish_year {
        haystacks.push(year.to_string());
    }
    haystacks.iter().any(|h| h.contains(&needle))
}

pub fn filter_rows(rows: &[Row], query: &str) -> Vec<Row> {
    rows.iter()
        .filter(|row| row_matches(row, query))
        .cloned()
        .collect()
}

// ── Sorting ─────────────────────────────────────────────────────────────────

/// Sort book rows in place.
///
/// "year" orders ascending by publish year with yearless rows pushed to the
/// end; "alphabetical" skips the year key. Both apply title ascending
/// (case-insensitive) as secondary key, then author name as tertiary key.
pub fn sort_books(rows: &mut [Row], mode: BookSortMode) {
    rows.sort_by(|a, b| {
        let year_order = match mode {
            BookSortMode::Year => match (a.book.publish_year, b.book.publish_year) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            BookSortMode::Alphabetical => Ordering::Equal,
        };
        year_order
            .then_with(|| {
                a.book
                    .title
                    .to_lowercase()
                    .cmp(&b.book.title.to_lowercase())
            })
            .then_with(|| a.author_name.to_lowercase().cmp(&b.author_name.to_lowercase()))
    });
}

/// Sort the author view in place.
pub fn sort_authors(authors: &mut [MonitoredAuthor], mode: AuthorSortMode) {
    authors.sort_by(|a, b| match mode {
        AuthorSortMode::DateAdded => match (a.created_at, b.created_at) {
            // Descending by creation timestamp; entities without a usable
            // timestamp sort after those with one; ties by descending id.
            (Some(x), Some(y)) => y.cmp(&x).then_with(|| b.id.cmp(&a.id)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => b.id.cmp(&a.id),
        },
        AuthorSortMode::BooksCount => {
            let count = |author: &MonitoredAuthor| author.books_count.unwrap_or(-1);
            count(b)
                .cmp(&count(a))
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        }
        AuthorSortMode::Alphabetical => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
    });
}

// ── Grouping ────────────────────────────────────────────────────────────────

const UNKNOWN_YEAR_KEY: &str = "unknown";
const UNKNOWN_YEAR_TITLE: &str = "Unknown year";

/// Bucket rows per the grouping mode. The union of rows across all produced
/// groups equals the input set exactly; row order within a group follows
/// input order.
pub fn group_rows(rows: &[Row], mode: GroupMode, fallback_label: &str) -> Vec<Group> {
    match mode {
        GroupMode::None => vec![Group {
            key: "all".to_string(),
            title: fallback_label.to_string(),
            rows: rows.to_vec(),
        }],
        GroupMode::Author => group_by_author(rows),
        GroupMode::Year => group_by_year(rows),
    }
}

fn group_by_author(rows: &[Row]) -> Vec<Group> {
    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, Group> = HashMap::new();

    for row in rows {
        let trimmed = row.author_name.trim();
        let title = if trimmed.is_empty() { UNKNOWN_AUTHOR } else { trimmed };
        let key = title.to_lowercase();
        let group = buckets.entry(key.clone()).or_insert_with(|| {
            order.push(key.clone());
            Group {
                key: key.clone(),
                // Titled by the first original spelling seen.
                title: title.to_string(),
                rows: Vec::new(),
            }
        });
        group.rows.push(row.clone());
    }

    let mut groups: Vec<Group> = order
        .into_iter()
        .filter_map(|key| buckets.remove(&key))
        .collect();
    groups.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
    groups
}

fn group_by_year(rows: &[Row]) -> Vec<Group> {
    let mut buckets: HashMap<Option<i32>, Vec<Row>> = HashMap::new();
    for row in rows {
        buckets.entry(row.book.publish_year).or_default().push(row.clone());
    }

    let mut years: Vec<Option<i32>> = buckets.keys().copied().collect();
    // Descending year, with the unknown bucket below any numeric year.
    years.sort_by(|a, b| match (a, b) {
        (Some(x), Some(y)) => y.cmp(x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    years
        .into_iter()
        .map(|year| {
            let rows = buckets.remove(&year).unwrap_or_default();
            match year {
                Some(y) => Group {
                    key: y.to_string(),
                    title: y.to_string(),
                    rows,
                },
                None => Group {
                    key: UNKNOWN_YEAR_KEY.to_string(),
                    title: UNKNOWN_YEAR_TITLE.to_string(),
                    rows,
                },
            }
        })
        .collect()
}
