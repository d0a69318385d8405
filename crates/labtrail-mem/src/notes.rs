//! In-memory note repository.

use async_trait::async_trait;
use chrono::Utc;

use labtrail_core::{
    CreateNoteRequest, Error, Note, NoteRepository, Result, UpdateNoteRequest,
};

use crate::state::{self, SharedState};

/// In-memory implementation of NoteRepository.
#[derive(Clone)]
pub struct MemNoteRepository {
    state: SharedState,
}

impl MemNoteRepository {
    pub(crate) fn new(state: SharedState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl NoteRepository for MemNoteRepository {
    async fn create(&self, req: CreateNoteRequest) -> Result<Note> {
        req.validate()?;
        let mut state = state::write(&self.state);

        if !state.experiments.contains_key(&req.experiment_id) {
            return Err(Error::ReferentialIntegrity(format!(
                "experiment {} does not exist",
                req.experiment_id
            )));
        }
        if !state.users.contains_key(&req.author_id) {
            return Err(Error::ReferentialIntegrity(format!(
                "author user {} does not exist",
                req.author_id
            )));
        }

        let now = Utc::now();
        let note = Note {
            id: state.next_note_id(),
            title: req.title,
            content: req.content,
            experiment_id: req.experiment_id,
            author_id: req.author_id,
            created_at_utc: now,
            updated_at_utc: now,
        };
        state.notes.insert(note.id, note.clone());
        Ok(note)
    }

    async fn get(&self, id: i64) -> Result<Option<Note>> {
        Ok(state::read(&self.state).notes.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Note>> {
        Ok(state::read(&self.state).notes.values().cloned().collect())
    }

    async fn list_by_experiment(&self, experiment_id: i64) -> Result<Vec<Note>> {
        Ok(state::read(&self.state)
            .notes
            .values()
            .filter(|n| n.experiment_id == experiment_id)
            .cloned()
            .collect())
    }

    async fn update(&self, id: i64, req: UpdateNoteRequest) -> Result<Option<Note>> {
        req.validate()?;
        let mut state = state::write(&self.state);

        // Re-parenting must point at an existing experiment.
        if let Some(experiment_id) = req.experiment_id {
            if !state.experiments.contains_key(&experiment_id) {
                return Err(Error::ReferentialIntegrity(format!(
                    "experiment {experiment_id} does not exist"
                )));
            }
        }

        let Some(note) = state.notes.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(title) = req.title {
            note.title = title;
        }
        if let Some(content) = req.content {
            note.content = content;
        }
        if let Some(experiment_id) = req.experiment_id {
            note.experiment_id = experiment_id;
        }
        note.updated_at_utc = Utc::now();
        Ok(Some(note.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut state = state::write(&self.state);
        if !state.notes.contains_key(&id) {
            return Ok(false);
        }

        state.attachments.retain(|_, a| a.note_id != id);
        Ok(state.notes.remove(&id).is_some())
    }
}
