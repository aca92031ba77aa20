use mnemo_core::{MemoryId, MnemoError, Result};
use std::path::Path;
use tracing::{debug, info};

use crate::context::{self, ContextOptions};
use crate::maintenance;
use crate::query;
use crate::ranking;
use crate::record::{MemoryRecord, NewMemory};
use crate::store::{MemoryStore, stamp_now};

/// The public face of the memory layer: write, ranked recall, recency
/// listing, context assembly, and capacity maintenance.
///
/// Cloning is cheap; clones share the same underlying store.
#[derive(Clone)]
pub struct MemoryModule {
    store: MemoryStore,
    context: ContextOptions,
}

impl MemoryModule {
    /// Open or create the memory database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::with_store(MemoryStore::open(path)?))
    }

    /// Open an in-memory database (for tests).
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::with_store(MemoryStore::open_in_memory()?))
    }

    pub fn with_store(store: MemoryStore) -> Self {
        Self {
            store,
            context: ContextOptions::default(),
        }
    }

    /// Override the bucket sizes and pinned query used by [`Self::context`].
    pub fn with_context_options(mut self, options: ContextOptions) -> Self {
        self.context = options;
        self
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    // ── Write ──────────────────────────────────────────────────

    /// Persist a new memory and return its id. Importance is clamped to
    /// `[0, 1]`; empty text is rejected.
    pub fn remember(&self, memory: NewMemory) -> Result<MemoryId> {
        if memory.text.trim().is_empty() {
            return Err(MnemoError::InvalidInput("memory text must not be empty".into()));
        }
        let record = memory.into_record(stamp_now());
        self.store.insert(&record)
    }

    // ── Read ───────────────────────────────────────────────────

    /// Top `k` memories for `query` by composite rank. Every returned record
    /// is marked as accessed.
    pub fn recall(&self, query: &str, k: usize) -> Result<Vec<MemoryRecord>> {
        if k == 0 {
            return Ok(Vec::new());
        }
        let Some(matcher) = query::sanitize(query) else {
            debug!(query, "query has no searchable tokens");
            return Ok(Vec::new());
        };

        let candidates = self.store.search(&matcher, k.saturating_mul(2).max(1))?;
        let now = stamp_now();
        let mut top = ranking::rerank(candidates, now);
        top.truncate(k);

        let ids: Vec<MemoryId> = top.iter().map(|m| m.id).collect();
        self.store.touch(&ids, now)?;
        for m in &mut top {
            m.last_accessed_at = now.max(m.created_at);
        }
        Ok(top)
    }

    /// The `k` most recently accessed memories. Does not mark them accessed.
    pub fn recent(&self, k: usize) -> Result<Vec<MemoryRecord>> {
        self.store.recent(k)
    }

    pub fn get(&self, id: MemoryId) -> Result<Option<MemoryRecord>> {
        self.store.get(id)
    }

    pub fn count(&self) -> Result<usize> {
        self.store.count()
    }

    // ── Context ────────────────────────────────────────────────

    /// A digest of task-relevant, recent, and pinned memories, never longer
    /// than `budget` characters.
    pub fn context(&self, task: &str, budget: usize) -> Result<String> {
        let opts = &self.context;
        let relevant = self.recall(task, opts.relevant_k)?;
        let recent = self.recent(opts.recent_k)?;
        let pinned = self.recall(&opts.pinned_query, opts.pinned_k)?;

        let digest = context::assemble(&[
            ("Task-Relevant Memories", relevant),
            ("Recent Session", recent),
            ("Pinned Facts", pinned),
        ]);
        let out = context::truncate_to_budget(&digest, budget);
        debug!(
            full_chars = digest.chars().count(),
            out_chars = out.chars().count(),
            budget,
            "context assembled"
        );
        Ok(out)
    }

    // ── Maintenance ────────────────────────────────────────────

    /// Reserved hook for lowering the importance of stale memories. The decay
    /// function is not defined yet, so this changes nothing.
    pub fn decay(&self, min_importance: f64, hours_threshold: f64) -> Result<()> {
        debug!(min_importance, hours_threshold, "decay requested; no decay policy configured");
        Ok(())
    }

    /// Evict low-importance memories while the store holds more than
    /// `max_items`. Returns the number of records removed.
    pub fn prune(&self, max_items: usize, drop_below: f64) -> Result<usize> {
        let rows = self.store.all_ids_with_scores()?;
        let total = rows.len();
        let victims = maintenance::select_evictions(rows, max_items, drop_below);
        let removed = self.store.delete(&victims)?;
        if removed > 0 {
            info!(removed, total, max_items, drop_below, "pruned memories");
        } else if total > max_items {
            debug!(total, max_items, drop_below, "over capacity but nothing eligible for eviction");
        }
        Ok(removed)
    }

    /// Explicitly delete memories. Unknown ids are ignored.
    pub fn forget(&self, ids: &[MemoryId]) -> Result<usize> {
        self.store.delete(ids)
    }
}
