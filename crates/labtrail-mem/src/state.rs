//! Shared in-memory state.
//!
//! One `RwLock` guards the whole store. Repository operations take the lock
//! once, do all their work, and release it without ever suspending, so a
//! multi-step cascade is a single unit of work: no caller can observe an
//! intermediate state.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use labtrail_core::{Attachment, Experiment, Note, Project, ProjectCollaborator, User};

/// Keyed collections plus a monotonically increasing counter per entity
/// type, seeded at 1. `BTreeMap` keeps natural id order for listings.
#[derive(Debug)]
pub(crate) struct MemState {
    pub users: BTreeMap<i64, User>,
    pub projects: BTreeMap<i64, Project>,
    pub experiments: BTreeMap<i64, Experiment>,
    pub notes: BTreeMap<i64, Note>,
    pub attachments: BTreeMap<i64, Attachment>,
    pub collaborators: BTreeMap<i64, ProjectCollaborator>,
    next_user_id: i64,
    next_project_id: i64,
    next_experiment_id: i64,
    next_note_id: i64,
    next_attachment_id: i64,
    next_collaborator_id: i64,
}

impl MemState {
    pub fn new() -> Self {
        Self {
            users: BTreeMap::new(),
            projects: BTreeMap::new(),
            experiments: BTreeMap::new(),
            notes: BTreeMap::new(),
            attachments: BTreeMap::new(),
            collaborators: BTreeMap::new(),
            next_user_id: 1,
            next_project_id: 1,
            next_experiment_id: 1,
            next_note_id: 1,
            next_attachment_id: 1,
            next_collaborator_id: 1,
        }
    }

    pub fn next_user_id(&mut self) -> i64 {
        let id = self.next_user_id;
        self.next_user_id += 1;
        id
    }

    pub fn next_project_id(&mut self) -> i64 {
        let id = self.next_project_id;
        self.next_project_id += 1;
        id
    }

    pub fn next_experiment_id(&mut self) -> i64 {
        let id = self.next_experiment_id;
        self.next_experiment_id += 1;
        id
    }

    pub fn next_note_id(&mut self) -> i64 {
        let id = self.next_note_id;
        self.next_note_id += 1;
        id
    }

    pub fn next_attachment_id(&mut self) -> i64 {
        let id = self.next_attachment_id;
        self.next_attachment_id += 1;
        id
    }

    pub fn next_collaborator_id(&mut self) -> i64 {
        let id = self.next_collaborator_id;
        self.next_collaborator_id += 1;
        id
    }
}

pub(crate) type SharedState = Arc<RwLock<MemState>>;

/// Take the read lock, recovering from poisoning: state mutations are
/// applied atomically under the write lock, so a panicked writer cannot
/// have left a half-applied cascade behind.
pub(crate) fn read(state: &SharedState) -> RwLockReadGuard<'_, MemState> {
    state.read().unwrap_or_else(PoisonError::into_inner)
}

/// Take the write lock, recovering from poisoning.
pub(crate) fn write(state: &SharedState) -> RwLockWriteGuard<'_, MemState> {
    state.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_seed_at_one() {
        let mut state = MemState::new();
        assert_eq!(state.next_user_id(), 1);
        assert_eq!(state.next_user_id(), 2);
        assert_eq!(state.next_project_id(), 1);
        assert_eq!(state.next_attachment_id(), 1);
    }
}
