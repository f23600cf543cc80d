//! Query templates with a filter marker
//!
//! A template is the operator-configured SQL text. It may contain the
//! `{filterBy}` marker, which the filter compiler replaces with a predicate.

use std::sync::LazyLock;

use regex::{NoExpand, Regex};

/// Literal marker token designating where the filter predicate is spliced in
pub const FILTER_MARKER: &str = "{filterBy}";

static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("(?i){}", regex::escape(FILTER_MARKER))).expect("Invalid regex")
});

/// SQL template containing zero or more filter markers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderTemplate {
    raw: String,
}

impl PlaceholderTemplate {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn has_marker(&self) -> bool {
        MARKER_RE.is_match(&self.raw)
    }

    pub fn marker_count(&self) -> usize {
        MARKER_RE.find_iter(&self.raw).count()
    }

    /// Replace every marker occurrence with `replacement`.
    ///
    /// The replacement is inserted literally; `$` sequences are not expanded.
    pub fn replace_marker(&self, replacement: &str) -> String {
        MARKER_RE
            .replace_all(&self.raw, NoExpand(replacement))
            .into_owned()
    }
}

impl From<&str> for PlaceholderTemplate {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_detection_is_case_insensitive() {
        assert!(PlaceholderTemplate::new("SELECT 1 WHERE {filterBy}").has_marker());
        assert!(PlaceholderTemplate::new("SELECT 1 WHERE {FILTERBY}").has_marker());
        assert!(PlaceholderTemplate::new("SELECT 1 WHERE {filterby}").has_marker());
        assert!(!PlaceholderTemplate::new("SELECT 1 WHERE filterBy").has_marker());
    }

    #[test]
    fn test_replace_marker_is_global() {
        let template = PlaceholderTemplate::new("SELECT * FROM a WHERE {filterBy} UNION SELECT * FROM b WHERE {FilterBy}");
        assert_eq!(template.marker_count(), 2);
        assert_eq!(
            template.replace_marker("(1 = 1)"),
            "SELECT * FROM a WHERE (1 = 1) UNION SELECT * FROM b WHERE (1 = 1)"
        );
    }

    #[test]
    fn test_replace_marker_is_literal() {
        let template = PlaceholderTemplate::new("SELECT * FROM t WHERE {filterBy}");
        assert_eq!(
            template.replace_marker("price > '$1'"),
            "SELECT * FROM t WHERE price > '$1'"
        );
    }

    #[test]
    fn test_template_without_marker_is_unchanged() {
        let template = PlaceholderTemplate::new("SELECT * FROM t");
        assert_eq!(template.marker_count(), 0);
        assert_eq!(template.replace_marker("(1 = 1)"), "SELECT * FROM t");
    }
}
