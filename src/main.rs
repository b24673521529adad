//! One-shot catalog status dump.
//!
//! Connects to the configured monitoring server, runs one full reload and
//! prints the live counts, mirroring what a frontend would render. Cached
//! placeholders are shown first so the output is useful even while the
//! server is slow or down.

use chrono::Local;

use shelfwatch::catalog::{self, CatalogState};
use shelfwatch::client::HttpBackend;
use shelfwatch::config::AppConfig;
use shelfwatch::logging;
use shelfwatch::store::{DisplayPrefs, LocalStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _log_guard = logging::init();
    log::info!("{} {} starting", shelfwatch::NAME, shelfwatch::VERSION);

    let config = AppConfig::load();
    let store = LocalStore::open(&config.data_dir()).await?;
    let prefs = DisplayPrefs::load(&store).await;

    let snapshot = catalog::load_snapshot(&store).await;
    let [authors, books, upcoming, search] = catalog::placeholders(snapshot.as_ref());
    println!("cached:  {authors} authors, {books} books, {upcoming} upcoming, {search} search");

    let backend = HttpBackend::from_config(&config.server)?;
    let mut state = CatalogState::new();
    state.reload(&backend).await;

    if let Some(error) = &state.entities.error {
        eprintln!("error:   {error}");
        return Ok(());
    }
    if let Some(warning) = &state.warning {
        eprintln!("warning: {warning}");
    }

    let today = Local::now().date_naive();
    let counts = state.counts(today);
    println!(
        "live:    {} authors, {} books, {} upcoming, {} search",
        counts.authors, counts.books, counts.upcoming, counts.search
    );

    catalog::save_snapshot(&store, counts.into()).await;
    prefs.save(&store).await;
    Ok(())
}
