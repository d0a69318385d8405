//! Shared search types and query normalization.
//!
//! Both backends implement the same substring search contract; the
//! blank-query rule lives here so they cannot drift apart.

use serde::{Deserialize, Serialize};

use crate::models::{Experiment, Note, Project};

/// Results of a combined search across all three record categories.
///
/// The three category searches execute independently; a record belongs to
/// exactly one category, so no cross-category deduplication is needed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
    pub projects: Vec<Project>,
    pub experiments: Vec<Experiment>,
    pub notes: Vec<Note>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty() && self.experiments.is_empty() && self.notes.is_empty()
    }
}

/// Normalize a free-text query for matching.
///
/// Returns `None` for empty or whitespace-only input — a blank query matches
/// nothing, never everything.
pub fn trimmed_query(query: &str) -> Option<&str> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trimmed_query_blank() {
        assert_eq!(trimmed_query(""), None);
        assert_eq!(trimmed_query("   "), None);
        assert_eq!(trimmed_query("\t\n"), None);
    }

    #[test]
    fn test_trimmed_query_strips_whitespace() {
        assert_eq!(trimmed_query("  assay "), Some("assay"));
    }

    #[test]
    fn test_search_results_is_empty() {
        let results = SearchResults::default();
        assert!(results.is_empty());
    }
}
