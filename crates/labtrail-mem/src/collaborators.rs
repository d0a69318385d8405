//! In-memory project collaborator repository.

use async_trait::async_trait;

use labtrail_core::{
    AddCollaboratorRequest, CollaboratorRepository, Error, ProjectCollaborator, Result,
};

use crate::state::{self, SharedState};

/// In-memory implementation of CollaboratorRepository.
#[derive(Clone)]
pub struct MemCollaboratorRepository {
    state: SharedState,
}

impl MemCollaboratorRepository {
    pub(crate) fn new(state: SharedState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl CollaboratorRepository for MemCollaboratorRepository {
    async fn add(&self, req: AddCollaboratorRequest) -> Result<ProjectCollaborator> {
        req.validate()?;
        let role = req.role_or_default();

        let mut state = state::write(&self.state);

        if !state.projects.contains_key(&req.project_id) {
            return Err(Error::ReferentialIntegrity(format!(
                "project {} does not exist",
                req.project_id
            )));
        }
        if !state.users.contains_key(&req.user_id) {
            return Err(Error::ReferentialIntegrity(format!(
                "user {} does not exist",
                req.user_id
            )));
        }
        if state
            .collaborators
            .values()
            .any(|c| c.project_id == req.project_id && c.user_id == req.user_id)
        {
            return Err(Error::Validation(format!(
                "user {} is already a collaborator on project {}",
                req.user_id, req.project_id
            )));
        }

        let collaborator = ProjectCollaborator {
            id: state.next_collaborator_id(),
            project_id: req.project_id,
            user_id: req.user_id,
            role,
        };
        state
            .collaborators
            .insert(collaborator.id, collaborator.clone());
        Ok(collaborator)
    }

    async fn remove(&self, project_id: i64, user_id: i64) -> Result<bool> {
        let mut state = state::write(&self.state);
        let before = state.collaborators.len();
        state
            .collaborators
            .retain(|_, c| !(c.project_id == project_id && c.user_id == user_id));
        Ok(state.collaborators.len() < before)
    }

    async fn list_for_project(&self, project_id: i64) -> Result<Vec<ProjectCollaborator>> {
        Ok(state::read(&self.state)
            .collaborators
            .values()
            .filter(|c| c.project_id == project_id)
            .cloned()
            .collect())
    }
}
