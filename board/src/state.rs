//! Board state management
//!
//! The record store is the single in-memory source of truth for a session.
//! Every mutation replaces the whole sequence so the coordinator always sees a
//! complete snapshot.

use shared::{Investor, InvestorStatus, RecordId};

use crate::core::layout::{visible_statuses, BoardLayout, LayoutMetrics};

/// Ordered record sequence owned by one board session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordStore {
    records: Vec<Investor>,
}

impl RecordStore {
    pub fn new(records: Vec<Investor>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Investor] {
        &self.records
    }

    /// Swap in a new sequence, returning the previous one
    pub fn replace(&mut self, records: Vec<Investor>) -> Vec<Investor> {
        std::mem::replace(&mut self.records, records)
    }

    pub fn get(&self, id: &RecordId) -> Option<&Investor> {
        self.records.iter().find(|record| &record.id == id)
    }

    /// Records of one column, in flat order
    pub fn in_status(&self, status: InvestorStatus) -> impl Iterator<Item = &Investor> {
        self.records.iter().filter(move |record| record.status == status)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Presentation filters applied when the board geometry is built
#[derive(Debug, Clone, PartialEq)]
pub struct BoardView {
    pub query: String,
    pub show_dropped: bool,
    pub metrics: LayoutMetrics,
}

impl Default for BoardView {
    fn default() -> Self {
        Self {
            query: String::new(),
            show_dropped: true,
            metrics: LayoutMetrics::default(),
        }
    }
}

impl BoardView {
    pub fn layout(&self, store: &RecordStore) -> BoardLayout {
        BoardLayout::build(
            store.records(),
            &visible_statuses(self.show_dropped),
            &self.query,
            &self.metrics,
        )
    }
}
