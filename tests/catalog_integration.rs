//! End-to-end pass over a mocked monitoring server: reload, counts,
//! snapshot persistence and a selection-driven bulk mutation, all through
//! the real HTTP backend.

use std::time::Duration;

use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shelfwatch::catalog::{self, book_key, CatalogState, COUNT_PLACEHOLDER};
use shelfwatch::client::HttpBackend;
use shelfwatch::store::LocalStore;

async fn mount_catalog(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v1/entity"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 1,
                "kind": "author",
                "name": "Ursula K. Le Guin",
                "created_at": "2024-01-10T08:00:00Z",
                "settings": {"books_count": 2}
            },
            {
                "id": 2,
                "kind": "book",
                "name": "Hyperion",
                "settings": {"author_name": "Dan Simmons"}
            }
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/entity/1/books"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "title": "The Dispossessed",
                "provider": "gr",
                "provider_book_id": "13651",
                "publish_year": 1974,
                "cover_url": "http://img/dispossessed.jpg",
                "readers_count": 120000
            },
            {
                "title": "Always Coming Home",
                "provider": "gr",
                "provider_book_id": "59921",
                "release_date": "2027-03-01"
            }
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/entity/2/books"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "title": "Hyperion",
                "author": "Dan Simmons",
                "provider": "gr",
                "provider_book_id": "77566",
                "publish_year": 1989,
                "monitor_ebook": 1
            }
        ])))
        .mount(server)
        .await;
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 30).unwrap()
}

#[tokio::test]
async fn full_reload_counts_and_snapshot_cycle() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::open(dir.path()).await.unwrap();

    // Cold start: no snapshot yet, placeholders are dashes.
    assert!(catalog::load_snapshot(&store).await.is_none());
    assert_eq!(
        catalog::placeholders(None),
        [COUNT_PLACEHOLDER, COUNT_PLACEHOLDER, COUNT_PLACEHOLDER, COUNT_PLACEHOLDER]
    );

    let backend = HttpBackend::new(&server.uri(), "", Duration::from_secs(5)).unwrap();
    let mut state = CatalogState::new();
    assert!(state.reload(&backend).await);
    assert!(state.warning.is_none());

    // One author entity in the author view; both entities supply rows.
    assert_eq!(state.entities.authors.len(), 1);
    assert_eq!(state.entities.sources.len(), 2);
    assert_eq!(state.rows.len(), 3);

    // The book-kind entity resolved its display author from the raw string.
    let hyperion = state
        .rows
        .iter()
        .find(|r| r.book.title == "Hyperion")
        .unwrap();
    assert_eq!(hyperion.author_name, "Dan Simmons");
    assert_eq!(hyperion.book.monitor_ebook, Some(true));

    // Photo backfill picked Le Guin's highest-ranked cover.
    assert_eq!(
        state.entities.authors[0].photo_url.as_deref(),
        Some("http://img/dispossessed.jpg")
    );

    let counts = state.counts(today());
    assert_eq!(counts.authors, 1);
    assert_eq!(counts.books, 2);
    assert_eq!(counts.upcoming, 1);
    assert_eq!(counts.search, 0);

    catalog::save_snapshot(&store, counts.into()).await;
    let snapshot = catalog::load_snapshot(&store).await.unwrap();
    assert_eq!(catalog::placeholders(Some(&snapshot)), ["1", "2", "1", "0"]);
}

#[tokio::test]
async fn unmonitor_selected_issues_batched_update() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/entity/1/monitor"))
        .and(body_partial_json(json!({
            "updates": [{
                "provider": "gr",
                "provider_book_id": "13651",
                "monitor_ebook": false,
                "monitor_audiobook": false
            }]
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpBackend::new(&server.uri(), "", Duration::from_secs(5)).unwrap();
    let mut state = CatalogState::new();
    assert!(state.reload(&backend).await);

    let target = state
        .rows
        .iter()
        .find(|r| r.book.title == "The Dispossessed")
        .map(book_key)
        .unwrap();
    state.selection.set(target.clone(), true);
    let generation = state.generation();

    let summary = state.unmonitor_selected(&backend).await.unwrap();
    assert_eq!(summary.attempted, 1);
    assert_eq!(summary.failed, 0);
    assert!(summary.warning.is_none());

    assert!(state.rows.iter().all(|r| book_key(r) != target));
    assert_eq!(state.rows.len(), 2);
    assert_eq!(state.selection.selected_count(), 0);
    // The committed mutation supersedes any reload begun before it.
    assert!(state.generation() > generation);
}
