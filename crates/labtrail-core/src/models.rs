//! Core data models for labtrail.
//!
//! These types are shared across all labtrail crates and represent the
//! record hierarchy: Project → Experiment → Note → Attachment, plus the
//! User and ProjectCollaborator relations around it.
//!
//! Insert shapes (`Create*Request`) carry only caller-supplied fields; the
//! store assigns `id` and timestamps. Patch shapes (`Update*Request`) are
//! partial merges: only supplied fields change. Nullable columns use a
//! double `Option` so a caller can distinguish "leave alone" (`None`) from
//! "clear" (`Some(None)`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::validate;

// =============================================================================
// USER TYPES
// =============================================================================

/// A registered user. Root of ownership: projects reference their owner,
/// notes their author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub display_name: String,
    pub role: String,
    pub created_at_utc: DateTime<Utc>,
}

/// Request for creating a new user.
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub username: String,
    pub display_name: String,
    pub role: String,
}

impl CreateUserRequest {
    /// Validate the shape before any storage mutation.
    pub fn validate(&self) -> Result<()> {
        validate::require_non_blank("username", &self.username)?;
        validate::require_non_blank("display_name", &self.display_name)?;
        validate::require_non_blank("role", &self.role)
    }
}

/// Request for updating a user. Omitted fields retain prior values;
/// `username` is immutable once assigned.
#[derive(Debug, Clone, Default)]
pub struct UpdateUserRequest {
    pub display_name: Option<String>,
    pub role: Option<String>,
}

// =============================================================================
// PROJECT TYPES
// =============================================================================

/// A research project, the root of the record hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: i64,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: DateTime<Utc>,
}

/// Request for creating a new project.
#[derive(Debug, Clone)]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: Option<String>,
    pub owner_id: i64,
}

impl CreateProjectRequest {
    pub fn validate(&self) -> Result<()> {
        validate::require_non_blank("name", &self.name)
    }
}

/// Request for updating a project.
#[derive(Debug, Clone, Default)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
}

impl UpdateProjectRequest {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate::require_non_blank("name", name)?;
        }
        Ok(())
    }
}

// =============================================================================
// EXPERIMENT TYPES
// =============================================================================

/// An experiment within a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub project_id: i64,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: DateTime<Utc>,
}

/// Request for creating a new experiment.
#[derive(Debug, Clone)]
pub struct CreateExperimentRequest {
    pub name: String,
    pub description: Option<String>,
    pub project_id: i64,
}

impl CreateExperimentRequest {
    pub fn validate(&self) -> Result<()> {
        validate::require_non_blank("name", &self.name)
    }
}

/// Request for updating an experiment. Supplying `project_id` re-parents the
/// experiment; the new parent must exist.
#[derive(Debug, Clone, Default)]
pub struct UpdateExperimentRequest {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub project_id: Option<i64>,
}

impl UpdateExperimentRequest {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate::require_non_blank("name", name)?;
        }
        Ok(())
    }
}

// =============================================================================
// NOTE TYPES
// =============================================================================

/// An observation note within an experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: Option<String>,
    pub experiment_id: i64,
    pub author_id: i64,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: DateTime<Utc>,
}

/// Request for creating a new note.
#[derive(Debug, Clone)]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: Option<String>,
    pub experiment_id: i64,
    pub author_id: i64,
}

impl CreateNoteRequest {
    pub fn validate(&self) -> Result<()> {
        validate::require_non_blank("title", &self.title)
    }
}

/// Request for updating a note. Supplying `experiment_id` re-parents the
/// note; the new parent must exist.
#[derive(Debug, Clone, Default)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<Option<String>>,
    pub experiment_id: Option<i64>,
}

impl UpdateNoteRequest {
    pub fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            validate::require_non_blank("title", title)?;
        }
        Ok(())
    }
}

// =============================================================================
// ATTACHMENT TYPES
// =============================================================================

/// A binary attachment on a note, payload included.
///
/// `file_data` is serialized as base64 since the payload crosses process
/// boundaries as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: i64,
    pub note_id: i64,
    pub file_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub content_hash: String,
    #[serde(with = "base64_bytes")]
    pub file_data: Vec<u8>,
    pub created_at_utc: DateTime<Utc>,
}

/// Listing view of an attachment without the payload bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentSummary {
    pub id: i64,
    pub note_id: i64,
    pub file_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub content_hash: String,
    pub created_at_utc: DateTime<Utc>,
}

/// Request for creating a new attachment. The payload arrives already
/// decoded; transport concerns (multipart, upload ceilings) live above
/// this layer, but the declared size must match the payload.
#[derive(Debug, Clone)]
pub struct CreateAttachmentRequest {
    pub note_id: i64,
    pub file_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub file_data: Vec<u8>,
}

impl CreateAttachmentRequest {
    pub fn validate(&self) -> Result<()> {
        validate::require_non_blank("file_name", &self.file_name)?;
        if !validate::is_valid_mime_type(&self.file_type) {
            return Err(Error::Validation(format!(
                "file_type {:?} is not a valid MIME type",
                self.file_type
            )));
        }
        if self.file_size <= 0 {
            return Err(Error::Validation(
                "file_size must be positive".to_string(),
            ));
        }
        if self.file_size as usize != self.file_data.len() {
            return Err(Error::Validation(format!(
                "declared file_size {} does not match payload length {}",
                self.file_size,
                self.file_data.len()
            )));
        }
        if self.file_data.len() > validate::MAX_ATTACHMENT_BYTES {
            return Err(Error::Validation(format!(
                "payload of {} bytes exceeds the {} byte limit",
                self.file_data.len(),
                validate::MAX_ATTACHMENT_BYTES
            )));
        }
        Ok(())
    }

    /// Filename as stored: path components stripped, unsafe characters
    /// replaced.
    pub fn safe_file_name(&self) -> String {
        validate::sanitize_filename(&self.file_name)
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// COLLABORATOR TYPES
// =============================================================================

/// Default role granted when a collaborator is added without one.
pub const DEFAULT_COLLABORATOR_ROLE: &str = "Viewer";

/// A project↔user join record granting a non-owner access to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectCollaborator {
    pub id: i64,
    pub project_id: i64,
    pub user_id: i64,
    pub role: String,
}

/// Request for adding a collaborator to a project.
#[derive(Debug, Clone)]
pub struct AddCollaboratorRequest {
    pub project_id: i64,
    pub user_id: i64,
    /// Defaults to [`DEFAULT_COLLABORATOR_ROLE`] when absent.
    pub role: Option<String>,
}

impl AddCollaboratorRequest {
    pub fn validate(&self) -> Result<()> {
        if let Some(role) = &self.role {
            validate::require_non_blank("role", role)?;
        }
        Ok(())
    }

    pub fn role_or_default(&self) -> String {
        self.role
            .clone()
            .unwrap_or_else(|| DEFAULT_COLLABORATOR_ROLE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_request_rejects_blank_username() {
        let req = CreateUserRequest {
            username: "   ".to_string(),
            display_name: "Someone".to_string(),
            role: "Researcher".to_string(),
        };
        assert!(matches!(req.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_update_project_request_default_is_empty() {
        let req = UpdateProjectRequest::default();
        assert!(req.name.is_none());
        assert!(req.description.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_update_project_request_clear_description() {
        let req = UpdateProjectRequest {
            name: None,
            description: Some(None),
        };
        assert!(req.validate().is_ok());
        assert_eq!(req.description, Some(None));
    }

    #[test]
    fn test_attachment_request_size_mismatch() {
        let req = CreateAttachmentRequest {
            note_id: 1,
            file_name: "scan.png".to_string(),
            file_type: "image/png".to_string(),
            file_size: 4,
            file_data: vec![1, 2, 3],
        };
        assert!(matches!(req.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_attachment_request_rejects_zero_size() {
        let req = CreateAttachmentRequest {
            note_id: 1,
            file_name: "empty.bin".to_string(),
            file_type: "application/octet-stream".to_string(),
            file_size: 0,
            file_data: Vec::new(),
        };
        assert!(matches!(req.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_attachment_request_rejects_bad_mime() {
        let req = CreateAttachmentRequest {
            note_id: 1,
            file_name: "scan.png".to_string(),
            file_type: "not a mime".to_string(),
            file_size: 3,
            file_data: vec![1, 2, 3],
        };
        assert!(matches!(req.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_attachment_base64_round_trip() {
        let attachment = Attachment {
            id: 7,
            note_id: 3,
            file_name: "scan.png".to_string(),
            file_type: "image/png".to_string(),
            file_size: 4,
            content_hash: "blake3:abcd".to_string(),
            file_data: vec![0x89, 0x50, 0x4E, 0x47],
            created_at_utc: Utc::now(),
        };

        let json = serde_json::to_value(&attachment).unwrap();
        assert_eq!(json["file_data"], "iVBORw==");

        let parsed: Attachment = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.file_data, attachment.file_data);
    }

    #[test]
    fn test_collaborator_role_defaulting() {
        let req = AddCollaboratorRequest {
            project_id: 1,
            user_id: 2,
            role: None,
        };
        assert_eq!(req.role_or_default(), "Viewer");

        let req = AddCollaboratorRequest {
            project_id: 1,
            user_id: 2,
            role: Some("Editor".to_string()),
        };
        assert_eq!(req.role_or_default(), "Editor");
    }
}
