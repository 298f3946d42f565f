use std::sync::Arc;

use anyhow::Result;
use bulkline_db::Store;
use bulkline_types::models::HistoryEntry;

/// Append-only send log. The remote API exposes no history endpoint, so
/// this is backed by the local store alone.
pub struct HistoryService {
    store: Arc<Store>,
}

impl HistoryService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub fn append(&self, entry: &HistoryEntry) -> Result<()> {
        self.store.insert_history(entry)
    }

    /// Newest first.
    pub fn list(&self) -> Result<Vec<HistoryEntry>> {
        self.store.list_history()
    }
}
