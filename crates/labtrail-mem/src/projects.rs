//! In-memory project repository.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use labtrail_core::{
    CreateProjectRequest, Error, Project, ProjectRepository, Result, UpdateProjectRequest,
};

use crate::state::{self, SharedState};

/// In-memory implementation of ProjectRepository.
#[derive(Clone)]
pub struct MemProjectRepository {
    state: SharedState,
}

impl MemProjectRepository {
    pub(crate) fn new(state: SharedState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl ProjectRepository for MemProjectRepository {
    async fn create(&self, req: CreateProjectRequest) -> Result<Project> {
        req.validate()?;
        let mut state = state::write(&self.state);

        if !state.users.contains_key(&req.owner_id) {
            return Err(Error::ReferentialIntegrity(format!(
                "owner user {} does not exist",
                req.owner_id
            )));
        }

        let now = Utc::now();
        let project = Project {
            id: state.next_project_id(),
            name: req.name,
            description: req.description,
            owner_id: req.owner_id,
            created_at_utc: now,
            updated_at_utc: now,
        };
        state.projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn get(&self, id: i64) -> Result<Option<Project>> {
        Ok(state::read(&self.state).projects.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Project>> {
        Ok(state::read(&self.state)
            .projects
            .values()
            .cloned()
            .collect())
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Project>> {
        let state = state::read(&self.state);

        // Owned ∪ collaborated, deduplicated by project id.
        let collaborated: HashSet<i64> = state
            .collaborators
            .values()
            .filter(|c| c.user_id == user_id)
            .map(|c| c.project_id)
            .collect();

        let mut seen: HashSet<i64> = HashSet::new();
        let mut projects = Vec::new();
        for project in state.projects.values() {
            if project.owner_id == user_id && seen.insert(project.id) {
                projects.push(project.clone());
            }
        }
        for project in state.projects.values() {
            if collaborated.contains(&project.id) && seen.insert(project.id) {
                projects.push(project.clone());
            }
        }
        Ok(projects)
    }

    async fn update(&self, id: i64, req: UpdateProjectRequest) -> Result<Option<Project>> {
        req.validate()?;
        let mut state = state::write(&self.state);
        let Some(project) = state.projects.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(name) = req.name {
            project.name = name;
        }
        if let Some(description) = req.description {
            project.description = description;
        }
        project.updated_at_utc = Utc::now();
        Ok(Some(project.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut state = state::write(&self.state);
        if !state.projects.contains_key(&id) {
            return Ok(false);
        }

        // Leaf-to-root under the held write lock, mirroring the relational
        // backend's transactional ordering.
        let experiment_ids: HashSet<i64> = state
            .experiments
            .values()
            .filter(|e| e.project_id == id)
            .map(|e| e.id)
            .collect();
        let note_ids: HashSet<i64> = state
            .notes
            .values()
            .filter(|n| experiment_ids.contains(&n.experiment_id))
            .map(|n| n.id)
            .collect();

        state
            .attachments
            .retain(|_, a| !note_ids.contains(&a.note_id));
        state.notes.retain(|_, n| !note_ids.contains(&n.id));
        state
            .experiments
            .retain(|_, e| !experiment_ids.contains(&e.id));
        state.collaborators.retain(|_, c| c.project_id != id);
        let removed = state.projects.remove(&id).is_some();

        if removed {
            debug!(
                subsystem = "mem",
                component = "projects",
                op = "cascade_delete",
                record_id = id,
                "Project subtree deleted"
            );
        }
        Ok(removed)
    }
}
