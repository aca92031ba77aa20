//! Re-orders lexical search output using recency and importance.
//!
//! Lexical relevance is never recomputed here; the position a candidate held
//! in the BM25 ordering is taken as-is and combined with two side signals.
//! Lower cost sorts first.

use chrono::{DateTime, Utc};

use crate::record::MemoryRecord;

/// Penalty applied to a record with importance 0.0.
pub const IMPORTANCE_WEIGHT: f64 = 2.0;

/// Hours since `at`, floored at zero for timestamps in the future.
pub fn age_hours(at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let secs = (now - at).num_milliseconds() as f64 / 1000.0;
    (secs / 3600.0).max(0.0)
}

/// `ln(1 + hours since last access)`: zero for a record touched right now.
pub fn recency_penalty(record: &MemoryRecord, now: DateTime<Utc>) -> f64 {
    age_hours(record.last_accessed_at, now).ln_1p()
}

/// Zero for importance 1.0, [`IMPORTANCE_WEIGHT`] for importance 0.0.
pub fn importance_gain(record: &MemoryRecord) -> f64 {
    (1.0 - record.importance) * IMPORTANCE_WEIGHT
}

/// Composite cost of a candidate at 1-based `lexical_rank`.
pub fn cost(record: &MemoryRecord, lexical_rank: usize, now: DateTime<Utc>) -> f64 {
    lexical_rank as f64 + recency_penalty(record, now) + importance_gain(record)
}

/// Stable-sort candidates (given in best-lexical-match-first order) by
/// ascending cost. Equal costs keep their lexical order.
pub fn rerank(candidates: Vec<MemoryRecord>, now: DateTime<Utc>) -> Vec<MemoryRecord> {
    let mut scored: Vec<(f64, MemoryRecord)> = candidates
        .into_iter()
        .enumerate()
        .map(|(i, m)| (cost(&m, i + 1, now), m))
        .collect();
    scored.sort_by(|a, b| a.0.total_cmp(&b.0));
    scored.into_iter().map(|(_, m)| m).collect()
}
