//! In-memory substring search.
//!
//! Mirrors the relational backend's ILIKE semantics: case-insensitive
//! substring match over two fields per category, with missing optional
//! fields matching as empty strings.

use async_trait::async_trait;

use labtrail_core::{
    trimmed_query, Experiment, Note, Project, RecordSearch, Result, SearchResults,
};

use crate::state::{self, SharedState};

/// In-memory implementation of RecordSearch.
#[derive(Clone)]
pub struct MemRecordSearch {
    state: SharedState,
}

impl MemRecordSearch {
    pub(crate) fn new(state: SharedState) -> Self {
        Self { state }
    }
}

fn field_matches(needle: &str, primary: &str, secondary: Option<&str>) -> bool {
    primary.to_lowercase().contains(needle)
        || secondary.unwrap_or_default().to_lowercase().contains(needle)
}

#[async_trait]
impl RecordSearch for MemRecordSearch {
    async fn search_projects(&self, query: &str) -> Result<Vec<Project>> {
        let Some(q) = trimmed_query(query) else {
            return Ok(Vec::new());
        };
        let needle = q.to_lowercase();

        Ok(state::read(&self.state)
            .projects
            .values()
            .filter(|p| field_matches(&needle, &p.name, p.description.as_deref()))
            .cloned()
            .collect())
    }

    async fn search_experiments(&self, query: &str) -> Result<Vec<Experiment>> {
        let Some(q) = trimmed_query(query) else {
            return Ok(Vec::new());
        };
        let needle = q.to_lowercase();

        Ok(state::read(&self.state)
            .experiments
            .values()
            .filter(|e| field_matches(&needle, &e.name, e.description.as_deref()))
            .cloned()
            .collect())
    }

    async fn search_notes(&self, query: &str) -> Result<Vec<Note>> {
        let Some(q) = trimmed_query(query) else {
            return Ok(Vec::new());
        };
        let needle = q.to_lowercase();

        Ok(state::read(&self.state)
            .notes
            .values()
            .filter(|n| field_matches(&needle, &n.title, n.content.as_deref()))
            .cloned()
            .collect())
    }

    async fn search_all(&self, query: &str) -> Result<SearchResults> {
        Ok(SearchResults {
            projects: self.search_projects(query).await?,
            experiments: self.search_experiments(query).await?,
            notes: self.search_notes(query).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_matches_case_insensitive() {
        assert!(field_matches("assay", "Protein Assay", None));
        assert!(field_matches("assay", "PROTEIN ASSAY", None));
        assert!(!field_matches("assay", "Buffer Screen", None));
    }

    #[test]
    fn test_field_matches_secondary_field() {
        assert!(field_matches("gradient", "Buffer Screen", Some("phosphate GRADIENT")));
        assert!(!field_matches("gradient", "Buffer Screen", None));
    }
}
