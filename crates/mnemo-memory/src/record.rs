use chrono::{DateTime, Utc};
use mnemo_core::{MemoryId, MemoryKind, clamp_importance};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A stored memory. Records are handed out by value; callers never hold
/// references into the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub id: MemoryId,
    pub kind: MemoryKind,
    /// Raw content.
    pub text: String,
    /// Short human-readable gloss.
    pub summary: Option<String>,
    pub tags: Vec<String>,
    /// Always within `[0.0, 1.0]`.
    pub importance: f64,
    pub created_at: DateTime<Utc>,
    /// Bumped whenever the record is surfaced by a ranked recall.
    pub last_accessed_at: DateTime<Utc>,
    /// Opaque annotations, e.g. `{"task_id": "...", "tool": "search"}`.
    pub meta: BTreeMap<String, String>,
}

/// The eviction-relevant projection of a record.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRow {
    pub id: MemoryId,
    pub importance: f64,
    pub last_accessed_at: DateTime<Utc>,
}

/// A memory waiting to be written by [`crate::MemoryModule::remember`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewMemory {
    pub text: String,
    pub kind: MemoryKind,
    pub summary: Option<String>,
    pub tags: Vec<String>,
    pub importance: f64,
    pub meta: BTreeMap<String, String>,
}

impl NewMemory {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: MemoryKind::Episodic,
            summary: None,
            tags: Vec::new(),
            importance: 0.5,
            meta: BTreeMap::new(),
        }
    }

    pub fn kind(mut self, kind: MemoryKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Set the importance. Out-of-range values are clamped, not rejected.
    pub fn importance(mut self, importance: f64) -> Self {
        self.importance = clamp_importance(importance);
        self
    }

    pub fn meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Stamp the pending memory into a full record. `id` is a placeholder until
    /// the store assigns the real one.
    pub(crate) fn into_record(self, now: DateTime<Utc>) -> MemoryRecord {
        MemoryRecord {
            id: 0,
            kind: self.kind,
            text: self.text,
            summary: self.summary.filter(|s| !s.is_empty()),
            tags: self.tags,
            importance: clamp_importance(self.importance),
            created_at: now,
            last_accessed_at: now,
            meta: self.meta,
        }
    }
}
