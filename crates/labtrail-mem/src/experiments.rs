//! In-memory experiment repository.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;

use labtrail_core::{
    CreateExperimentRequest, Error, Experiment, ExperimentRepository, Result,
    UpdateExperimentRequest,
};

use crate::state::{self, SharedState};

/// In-memory implementation of ExperimentRepository.
#[derive(Clone)]
pub struct MemExperimentRepository {
    state: SharedState,
}

impl MemExperimentRepository {
    pub(crate) fn new(state: SharedState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl ExperimentRepository for MemExperimentRepository {
    async fn create(&self, req: CreateExperimentRequest) -> Result<Experiment> {
        req.validate()?;
        let mut state = state::write(&self.state);

        if !state.projects.contains_key(&req.project_id) {
            return Err(Error::ReferentialIntegrity(format!(
                "project {} does not exist",
                req.project_id
            )));
        }

        let now = Utc::now();
        let experiment = Experiment {
            id: state.next_experiment_id(),
            name: req.name,
            description: req.description,
            project_id: req.project_id,
            created_at_utc: now,
            updated_at_utc: now,
        };
        state.experiments.insert(experiment.id, experiment.clone());
        Ok(experiment)
    }

    async fn get(&self, id: i64) -> Result<Option<Experiment>> {
        Ok(state::read(&self.state).experiments.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Experiment>> {
        Ok(state::read(&self.state)
            .experiments
            .values()
            .cloned()
            .collect())
    }

    async fn list_by_project(&self, project_id: i64) -> Result<Vec<Experiment>> {
        Ok(state::read(&self.state)
            .experiments
            .values()
            .filter(|e| e.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn update(&self, id: i64, req: UpdateExperimentRequest) -> Result<Option<Experiment>> {
        req.validate()?;
        let mut state = state::write(&self.state);

        // Re-parenting must point at an existing project.
        if let Some(project_id) = req.project_id {
            if !state.projects.contains_key(&project_id) {
                return Err(Error::ReferentialIntegrity(format!(
                    "project {project_id} does not exist"
                )));
            }
        }

        let Some(experiment) = state.experiments.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(name) = req.name {
            experiment.name = name;
        }
        if let Some(description) = req.description {
            experiment.description = description;
        }
        if let Some(project_id) = req.project_id {
            experiment.project_id = project_id;
        }
        experiment.updated_at_utc = Utc::now();
        Ok(Some(experiment.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut state = state::write(&self.state);
        if !state.experiments.contains_key(&id) {
            return Ok(false);
        }

        let note_ids: HashSet<i64> = state
            .notes
            .values()
            .filter(|n| n.experiment_id == id)
            .map(|n| n.id)
            .collect();

        state
            .attachments
            .retain(|_, a| !note_ids.contains(&a.note_id));
        state.notes.retain(|_, n| !note_ids.contains(&n.id));
        Ok(state.experiments.remove(&id).is_some())
    }
}
