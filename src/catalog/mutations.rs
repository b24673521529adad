//! Bulk Mutation Coordinator.
//!
//! Selection-driven mutations over the synchronized state: batch
//! unmonitoring of book rows, confirmed deletion of monitored authors, and
//! monitoring a new entity. Fan-out calls are all-settled; a partial
//! failure downgrades to a warning instead of aborting the batch. Every
//! committed mutation bumps the state generation so an in-flight reload
//! cannot clobber it.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use futures::future::join_all;

use crate::client::{
    CatalogBackend, CreateEntityRequest, EntityKind, EntityRecord, MonitorFlagUpdate,
};

use super::entities::author_view;
use super::error::{CatalogError, CatalogResult};
use super::selection::book_key;
use super::sync::CatalogState;

/// Outcome of one batched mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationSummary {
    /// Backend requests issued.
    pub attempted: usize,
    /// Requests that failed outright or reported per-item failures.
    pub failed: usize,
    /// User-facing warning when the batch was partial.
    pub warning: Option<String>,
}

impl CatalogState {
    /// Unmonitor every selected book row.
    ///
    /// Updates are batched per owning entity and issued concurrently.
    /// Every originally-selected row leaves the local row set regardless of
    /// its own batch's outcome; rows whose requests failed reappear on the
    /// next reload.
    pub async fn unmonitor_selected<B: CatalogBackend>(
        &mut self,
        backend: &B,
    ) -> CatalogResult<MutationSummary> {
        let selected: HashSet<String> = self.selection.selected_keys().into_iter().collect();
        if selected.is_empty() {
            return Ok(MutationSummary::default());
        }

        let mut batches: HashMap<i64, Vec<MonitorFlagUpdate>> = HashMap::new();
        for row in self.rows.iter().filter(|r| selected.contains(&book_key(r))) {
            // Rows without provider identity cannot be addressed by the
            // backend; they are still removed locally below.
            let (Some(provider), Some(book_id)) = (
                row.book.provider.as_deref().map(str::trim).filter(|s| !s.is_empty()),
                row.book
                    .provider_book_id
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty()),
            ) else {
                continue;
            };
            batches
                .entry(row.owner_entity_id)
                .or_default()
                .push(MonitorFlagUpdate {
                    provider: provider.to_string(),
                    provider_book_id: book_id.to_string(),
                    monitor_ebook: false,
                    monitor_audiobook: false,
                });
        }

        let attempted = batches.len();
        let calls = batches.iter().map(|(owner, batch)| async move {
            (*owner, backend.update_monitor_flags(*owner, batch).await)
        });
        let mut failed = 0usize;
        for (owner, result) in join_all(calls).await {
            if let Err(e) = result {
                log::warn!("Unmonitor batch for entity {owner} failed: {e}");
                failed += 1;
            }
        }

        self.rows.retain(|r| !selected.contains(&book_key(r)));
        self.bump_generation();
        self.prune_selections();

        let warning = (failed > 0).then(|| {
            format!("{failed} unmonitor batch(es) failed; affected books will reappear on reload")
        });
        self.warning = warning.clone();
        Ok(MutationSummary {
            attempted,
            failed,
            warning,
        })
    }

    /// Delete every selected monitored author.
    ///
    /// Requires an explicit confirmation flag; without it nothing is issued
    /// and the caller receives the pending count to confirm. Deletes are
    /// issued one per author so a single failure cannot sink the batch.
    /// Authors whose delete failed stay in the collections and stay
    /// selected.
    pub async fn delete_selected_authors<B: CatalogBackend>(
        &mut self,
        backend: &B,
        confirmed: bool,
    ) -> CatalogResult<MutationSummary> {
        let mut ids: Vec<i64> = self
            .author_selection
            .selected_keys()
            .iter()
            .filter_map(|key| key.parse().ok())
            .collect();
        ids.sort_unstable();
        if ids.is_empty() {
            return Ok(MutationSummary::default());
        }
        if !confirmed {
            return Err(CatalogError::ConfirmationRequired(ids.len()));
        }

        let calls = ids.iter().map(|id| async move {
            (*id, backend.delete_entities(std::slice::from_ref(id)).await)
        });
        let mut succeeded: HashSet<i64> = HashSet::new();
        let mut failed = 0usize;
        for (id, result) in join_all(calls).await {
            match result {
                Ok(outcome) if outcome.successful_ids.contains(&id) => {
                    succeeded.insert(id);
                }
                Ok(_) => {
                    log::warn!("Delete for author {id} was rejected by the backend");
                    failed += 1;
                }
                Err(e) => {
                    log::warn!("Delete for author {id} failed: {e}");
                    failed += 1;
                }
            }
        }

        self.entities.authors.retain(|a| !succeeded.contains(&a.id));
        self.entities.sources.retain(|e| !succeeded.contains(&e.id));
        self.rows.retain(|r| !succeeded.contains(&r.owner_entity_id));
        self.bump_generation();
        self.prune_selections();

        let warning = (failed > 0).then(|| {
            format!("{failed} author(s) could not be deleted and remain selected")
        });
        self.warning = warning.clone();
        Ok(MutationSummary {
            attempted: ids.len(),
            failed,
            warning,
        })
    }

    /// Monitor a new author or book.
    ///
    /// Validates the request locally (a target folder is mandatory; a book
    /// must keep at least one format monitored), creates the entity, splices
    /// it to the front of the collections and learns the folder's parent as
    /// a reusable root. Root learning is best-effort.
    pub async fn monitor_new<B: CatalogBackend>(
        &mut self,
        backend: &B,
        request: CreateEntityRequest,
    ) -> CatalogResult<EntityRecord> {
        let folder = request
            .folder()
            .map(str::to_string)
            .ok_or_else(|| CatalogError::validation("No target folder selected"))?;
        if request.kind == EntityKind::Book
            && !request.format_enabled("monitor_ebook")
            && !request.format_enabled("monitor_audiobook")
        {
            return Err(CatalogError::validation(
                "At least one format must stay monitored",
            ));
        }

        let entity = backend.create_entity(&request).await?;

        // The backend may return an existing entity for a duplicate
        // request; drop any previous copy before splicing to the front.
        self.entities.sources.retain(|e| e.id != entity.id);
        self.entities.authors.retain(|a| a.id != entity.id);
        if entity.kind == EntityKind::Author {
            if let Some(author) = author_view(&entity) {
                self.entities.authors.insert(0, author);
            }
        }
        self.entities.sources.insert(0, entity.clone());
        self.bump_generation();

        remember_folder_root(backend, &folder).await;
        Ok(entity)
    }
}

/// Record the parent directory of a chosen folder as a reusable root.
async fn remember_folder_root<B: CatalogBackend>(backend: &B, folder: &str) {
    let Some(parent) = Path::new(folder)
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .filter(|p| !p.is_empty())
    else {
        return;
    };

    let mut prefs = match backend.get_preferences().await {
        Ok(prefs) => prefs,
        Err(e) => {
            log::debug!("Skipping folder-root learning, preferences unavailable: {e}");
            return;
        }
    };
    if prefs.folder_roots.iter().any(|root| root == &parent) {
        return;
    }
    prefs.folder_roots.push(parent);
    if let Err(e) = backend.update_preferences(&prefs).await {
        log::debug!("Failed to persist learned folder root: {e}");
    }
}
