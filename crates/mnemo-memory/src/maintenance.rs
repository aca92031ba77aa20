use mnemo_core::MemoryId;

use crate::record::ScoreRow;

/// Pick the ids to evict so the store moves back toward `max_items`.
///
/// Only records with `importance <= drop_below` are ever eligible, least
/// important first and least recently accessed as tiebreak. At most
/// `len - max_items` ids are returned, so the result can fall short of the
/// cap when too few records qualify.
pub fn select_evictions(mut rows: Vec<ScoreRow>, max_items: usize, drop_below: f64) -> Vec<MemoryId> {
    if rows.len() <= max_items {
        return Vec::new();
    }
    let overflow = rows.len() - max_items;

    rows.sort_by(|a, b| {
        a.importance
            .total_cmp(&b.importance)
            .then(a.last_accessed_at.cmp(&b.last_accessed_at))
    });

    rows.into_iter()
        .filter(|r| r.importance <= drop_below)
        .take(overflow)
        .map(|r| r.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn row(id: MemoryId, importance: f64, hours_ago: i64) -> ScoreRow {
        ScoreRow {
            id,
            importance,
            last_accessed_at: Utc::now() - Duration::hours(hours_ago),
        }
    }

    #[test]
    fn test_under_cap_is_noop() {
        let rows = vec![row(1, 0.0, 0), row(2, 0.0, 0)];
        assert!(select_evictions(rows, 2, 0.5).is_empty());
    }

    #[test]
    fn test_only_overflow_is_evicted() {
        let rows = vec![row(1, 0.01, 0), row(2, 0.02, 0), row(3, 0.03, 0), row(4, 0.9, 0)];
        assert_eq!(select_evictions(rows, 3, 0.10), vec![1]);
    }

    #[test]
    fn test_oldest_first_on_equal_importance() {
        let rows = vec![row(1, 0.05, 1), row(2, 0.05, 10), row(3, 0.05, 5), row(4, 0.8, 0)];
        assert_eq!(select_evictions(rows, 2, 0.10), vec![2, 3]);
    }

    #[test]
    fn test_above_threshold_never_evicted() {
        let rows = (1..=5).map(|id| row(id, 0.5, 0)).collect();
        assert!(select_evictions(rows, 3, 0.10).is_empty());
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let rows = vec![row(1, 0.10, 0), row(2, 0.5, 0)];
        assert_eq!(select_evictions(rows, 1, 0.10), vec![1]);
    }
}
