//! In-memory attachment repository.

use async_trait::async_trait;
use chrono::Utc;

use labtrail_core::{
    compute_content_hash, Attachment, AttachmentRepository, AttachmentSummary,
    CreateAttachmentRequest, Error, Result,
};

use crate::state::{self, SharedState};

/// In-memory implementation of AttachmentRepository.
#[derive(Clone)]
pub struct MemAttachmentRepository {
    state: SharedState,
}

impl MemAttachmentRepository {
    pub(crate) fn new(state: SharedState) -> Self {
        Self { state }
    }
}

fn to_summary(a: &Attachment) -> AttachmentSummary {
    AttachmentSummary {
        id: a.id,
        note_id: a.note_id,
        file_name: a.file_name.clone(),
        file_type: a.file_type.clone(),
        file_size: a.file_size,
        content_hash: a.content_hash.clone(),
        created_at_utc: a.created_at_utc,
    }
}

#[async_trait]
impl AttachmentRepository for MemAttachmentRepository {
    async fn create(&self, req: CreateAttachmentRequest) -> Result<Attachment> {
        req.validate()?;
        let file_name = req.safe_file_name();
        let content_hash = compute_content_hash(&req.file_data);

        let mut state = state::write(&self.state);

        if !state.notes.contains_key(&req.note_id) {
            return Err(Error::ReferentialIntegrity(format!(
                "note {} does not exist",
                req.note_id
            )));
        }

        let attachment = Attachment {
            id: state.next_attachment_id(),
            note_id: req.note_id,
            file_name,
            file_type: req.file_type,
            file_size: req.file_size,
            content_hash,
            file_data: req.file_data,
            created_at_utc: Utc::now(),
        };
        state.attachments.insert(attachment.id, attachment.clone());
        Ok(attachment)
    }

    async fn get(&self, id: i64) -> Result<Option<Attachment>> {
        Ok(state::read(&self.state).attachments.get(&id).cloned())
    }

    async fn list_by_note(&self, note_id: i64) -> Result<Vec<AttachmentSummary>> {
        Ok(state::read(&self.state)
            .attachments
            .values()
            .filter(|a| a.note_id == note_id)
            .map(to_summary)
            .collect())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        Ok(state::write(&self.state).attachments.remove(&id).is_some())
    }
}
