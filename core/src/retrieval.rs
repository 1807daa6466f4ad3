use crate::index::{build_snapshot, IndexSnapshot, IndexStats, InputDocument};
use crate::persist::IndexState;
use crate::search::{self, SearchHit};
use anyhow::Result;
use parking_lot::RwLock;
use std::sync::Arc;

/// Owned, thread-safe retrieval index.
///
/// Every mutation builds a complete [`IndexSnapshot`] off to the side and then
/// swaps it in under a short write lock, so concurrent searches observe either
/// the previous snapshot or the new one, never a half-built index.
#[derive(Debug, Default)]
pub struct RetrievalIndex {
    current: RwLock<Arc<IndexSnapshot>>,
}

impl RetrievalIndex {
    pub fn new() -> Self { Self::default() }

    /// The snapshot searches currently run against.
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        self.current.read().clone()
    }

    fn publish(&self, snapshot: IndexSnapshot) {
        *self.current.write() = Arc::new(snapshot);
    }

    /// Full rebuild from `documents`, discarding all previous vectors, idf and metadata.
    pub fn create_index(&self, documents: &[InputDocument]) -> IndexStats {
        let snapshot = build_snapshot(documents);
        let stats = snapshot.stats();
        self.publish(snapshot);
        tracing::info!(
            num_docs = stats.num_docs,
            num_vectorized = stats.num_vectorized,
            num_terms = stats.num_terms,
            "index rebuilt"
        );
        stats
    }

    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        let snapshot = self.snapshot();
        if !snapshot.is_searchable() {
            tracing::debug!("search against an index without document vectors");
        }
        search::search(&snapshot, query, limit)
    }

    pub fn export_state(&self) -> IndexState {
        IndexState::from_snapshot(&self.snapshot())
    }

    /// Replace idf and metadata with `state`. Document vectors are cleared, so
    /// searches return nothing until the next [`create_index`](Self::create_index).
    pub fn import_state(&self, state: IndexState) {
        let snapshot = state.into_snapshot();
        tracing::info!(num_terms = snapshot.idf.len(), num_snippets = snapshot.metadata.len(), "index state imported");
        self.publish(snapshot);
    }

    /// Parse and import a serialized state. A malformed blob is logged and
    /// returned as an error while the live index stays untouched.
    pub fn import_state_json(&self, blob: &str) -> Result<()> {
        match IndexState::from_json(blob) {
            Ok(state) => {
                self.import_state(state);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "ignoring malformed index state");
                Err(e)
            }
        }
    }

    pub fn stats(&self) -> IndexStats {
        self.snapshot().stats()
    }
}
