//! Turns free-form text into an FTS5 `MATCH` expression that never trips the
//! FTS5 query parser.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("static regex"));

/// Tokens at least this long (in characters) match as prefixes.
pub const PREFIX_MIN_CHARS: usize = 3;

/// A sanitized, OR-joined lexical query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchQuery {
    terms: Vec<String>,
}

impl MatchQuery {
    /// The raw tokens this query was built from.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Render as an FTS5 expression. Every token is quoted so words like `OR`
    /// or `NEAR` in user text stay literal.
    pub fn to_fts5(&self) -> String {
        self.terms
            .iter()
            .map(|t| {
                if t.chars().count() >= PREFIX_MIN_CHARS {
                    format!("\"{t}\"*")
                } else {
                    format!("\"{t}\"")
                }
            })
            .collect::<Vec<_>>()
            .join(" OR ")
    }
}

impl fmt::Display for MatchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fts5())
    }
}

/// Extract the maximal runs of alphanumeric/underscore characters.
pub fn tokens(input: &str) -> Vec<String> {
    TOKEN_RE
        .find_iter(input)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Build a tolerant query from natural-language input.
///
/// Returns `None` when nothing survives tokenization; callers treat that as
/// "no results" rather than an error.
pub fn sanitize(input: &str) -> Option<MatchQuery> {
    let terms = tokens(input);
    if terms.is_empty() {
        return None;
    }
    Some(MatchQuery { terms })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_punctuation_only_is_empty() {
        assert!(sanitize("???").is_none());
        assert!(sanitize("  -- !! ").is_none());
        assert!(sanitize("").is_none());
    }

    #[test]
    fn test_prefix_and_exact_terms() {
        let q = sanitize("What about docker?").unwrap();
        assert_eq!(q.terms(), ["What", "about", "docker"]);
        assert_eq!(q.to_fts5(), "\"What\"* OR \"about\"* OR \"docker\"*");

        let q = sanitize("go to ECR").unwrap();
        assert_eq!(q.to_fts5(), "\"go\" OR \"to\" OR \"ECR\"*");
    }

    #[test]
    fn test_underscore_kept_inside_token() {
        assert_eq!(tokens("user_pref, pinned!"), ["user_pref", "pinned"]);
    }

    #[test]
    fn test_operators_are_quoted() {
        let q = sanitize("cats AND NOT dogs: NEAR(x)").unwrap();
        let fts = q.to_fts5();
        assert!(fts.contains("\"AND\"*"));
        assert!(fts.contains("\"NOT\"*"));
        assert!(fts.contains("\"NEAR\"*"));
        assert!(fts.contains("\"x\""));
        assert!(!fts.contains(':'));
    }

    #[test]
    fn test_length_counts_chars_not_bytes() {
        // Two characters, six bytes: still an exact term.
        let q = sanitize("日本").unwrap();
        assert_eq!(q.to_fts5(), "\"日本\"");
    }
}
