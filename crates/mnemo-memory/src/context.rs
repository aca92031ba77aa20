//! Bounded textual digest of the memory state, built from three buckets:
//! task-relevant recall, recent session, and pinned facts.

use crate::record::MemoryRecord;

/// Characters reserved below the budget when truncating.
pub const TRUNCATION_HEADROOM: usize = 200;

pub const TRUNCATION_MARKER: &str = "[...truncated memory...]";

const BLOCK_SEPARATOR: &str = "\n\n";

/// Bucket sizes and the marker query used for the pinned bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextOptions {
    pub relevant_k: usize,
    pub recent_k: usize,
    pub pinned_k: usize,
    pub pinned_query: String,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            relevant_k: 6,
            recent_k: 8,
            pinned_k: 3,
            pinned_query: "tags pinned".into(),
        }
    }
}

/// Render one titled block, one line per record.
pub fn format_block(title: &str, memories: &[MemoryRecord]) -> String {
    let mut lines = Vec::with_capacity(memories.len() + 1);
    lines.push(format!("### {title}"));
    for m in memories {
        lines.push(format_line(m));
    }
    lines.join("\n")
}

/// `- (kind [tags]; imp=0.00) text — summary`
pub fn format_line(m: &MemoryRecord) -> String {
    let tags = if m.tags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", m.tags.join(","))
    };
    let summary = match m.summary.as_deref() {
        Some(s) if !s.is_empty() => format!(" — {s}"),
        _ => String::new(),
    };
    format!("- ({}{}; imp={:.2}) {}{}", m.kind, tags, m.importance, m.text, summary)
}

/// Join the non-empty buckets in order, each under its title.
pub fn assemble(buckets: &[(&str, Vec<MemoryRecord>)]) -> String {
    buckets
        .iter()
        .filter(|(_, records)| !records.is_empty())
        .map(|(title, records)| format_block(title, records))
        .collect::<Vec<_>>()
        .join(BLOCK_SEPARATOR)
}

/// Cut `text` so it fits in `budget` characters, ending with the truncation
/// marker whenever anything was dropped.
pub fn truncate_to_budget(text: &str, budget: usize) -> String {
    if text.chars().count() <= budget {
        return text.to_string();
    }

    let full_suffix = format!("{BLOCK_SEPARATOR}{TRUNCATION_MARKER}");
    let suffix_len = full_suffix.chars().count();
    let marker_len = TRUNCATION_MARKER.chars().count();

    if budget < marker_len {
        return TRUNCATION_MARKER.chars().take(budget).collect();
    }
    if budget < suffix_len {
        return TRUNCATION_MARKER.to_string();
    }

    let keep = budget
        .saturating_sub(TRUNCATION_HEADROOM)
        .min(budget - suffix_len);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(&full_suffix);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mnemo_core::MemoryKind;
    use std::collections::BTreeMap;

    fn record(text: &str, tags: &[&str], summary: Option<&str>) -> MemoryRecord {
        MemoryRecord {
            id: 1,
            kind: MemoryKind::Semantic,
            text: text.into(),
            summary: summary.map(String::from),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            importance: 0.9,
            created_at: Utc::now(),
            last_accessed_at: Utc::now(),
            meta: BTreeMap::new(),
        }
    }

    #[test]
    fn test_line_format() {
        let m = record("prefers code", &["user_pref", "pinned"], Some("User preference"));
        assert_eq!(
            format_line(&m),
            "- (semantic [user_pref,pinned]; imp=0.90) prefers code — User preference"
        );
        let bare = record("plain", &[], None);
        assert_eq!(format_line(&bare), "- (semantic; imp=0.90) plain");
    }

    #[test]
    fn test_empty_buckets_skipped() {
        let out = assemble(&[
            ("Task-Relevant Memories", vec![]),
            ("Recent Session", vec![record("a", &[], None)]),
        ]);
        assert!(out.starts_with("### Recent Session"));
        assert!(!out.contains("Task-Relevant"));
    }

    #[test]
    fn test_under_budget_untouched() {
        assert_eq!(truncate_to_budget("short", 2400), "short");
    }

    #[test]
    fn test_headroom_applies_to_large_budgets() {
        let text = "x".repeat(3000);
        let out = truncate_to_budget(&text, 2400);
        assert_eq!(out.chars().count(), 2200 + 2 + TRUNCATION_MARKER.len());
        assert!(out.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_small_budget_never_exceeded() {
        let text = "y".repeat(300);
        for budget in [0, 5, 24, 25, 26, 50, 199, 250] {
            let out = truncate_to_budget(&text, budget);
            assert!(out.chars().count() <= budget, "budget {budget}: {out:?}");
        }
        assert!(truncate_to_budget(&text, 50).ends_with(TRUNCATION_MARKER));
        assert_eq!(truncate_to_budget(&text, 24), TRUNCATION_MARKER);
    }

    #[test]
    fn test_multibyte_text_cut_on_char_boundary() {
        let text = "é".repeat(500);
        let out = truncate_to_budget(&text, 260);
        assert_eq!(out.chars().count(), 60 + 2 + TRUNCATION_MARKER.len());
    }
}
