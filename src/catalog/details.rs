//! Sequence-guarded detail loads.
//!
//! Reopening details for a subject (the per-entity file listing) can race
//! with an earlier still-in-flight request for the same or another subject.
//! Each open bumps a monotonically increasing sequence; a response carrying
//! a superseded sequence is silently discarded.

use crate::client::{CatalogBackend, ClientResult, FileRecord};

/// Ticket tying one fetch to the open that started it.
#[derive(Debug, Clone, Copy)]
pub struct DetailTicket {
    pub entity_id: i64,
    seq: u64,
}

/// Detail-view state for the currently open subject.
#[derive(Debug, Default)]
pub struct DetailState {
    subject: Option<i64>,
    seq: u64,
    pub files: Vec<FileRecord>,
}

impl DetailState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subject(&self) -> Option<i64> {
        self.subject
    }

    /// Open details for an entity, superseding any in-flight fetch.
    pub fn begin_open(&mut self, entity_id: i64) -> DetailTicket {
        self.seq += 1;
        self.subject = Some(entity_id);
        self.files.clear();
        DetailTicket {
            entity_id,
            seq: self.seq,
        }
    }

    /// Fetch the file listing for a ticket. Holds no state borrow so the
    /// caller can interleave other work while it is in flight.
    pub async fn fetch<B: CatalogBackend>(
        backend: &B,
        ticket: DetailTicket,
    ) -> ClientResult<Vec<FileRecord>> {
        backend.list_files(ticket.entity_id).await
    }

    /// Apply a fetched file listing. Returns `false` (discarding the data)
    /// when the ticket was superseded by a newer open.
    pub fn commit(&mut self, ticket: DetailTicket, files: Vec<FileRecord>) -> bool {
        if ticket.seq != self.seq {
            log::debug!(
                "Discarding stale detail response for entity {}",
                ticket.entity_id
            );
            return false;
        }
        self.files = files;
        true
    }

    pub fn close(&mut self) {
        self.seq += 1;
        self.subject = None;
        self.files.clear();
    }
}
