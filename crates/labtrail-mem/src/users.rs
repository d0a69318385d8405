//! In-memory user repository.

use async_trait::async_trait;
use chrono::Utc;

use labtrail_core::{
    CreateUserRequest, Error, Result, UpdateUserRequest, User, UserRepository,
};

use crate::state::{self, SharedState};

/// In-memory implementation of UserRepository.
#[derive(Clone)]
pub struct MemUserRepository {
    state: SharedState,
}

impl MemUserRepository {
    pub(crate) fn new(state: SharedState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl UserRepository for MemUserRepository {
    async fn create(&self, req: CreateUserRequest) -> Result<User> {
        req.validate()?;
        let mut state = state::write(&self.state);

        if state.users.values().any(|u| u.username == req.username) {
            return Err(Error::Validation(format!(
                "username {:?} is already taken",
                req.username
            )));
        }

        let user = User {
            id: state.next_user_id(),
            username: req.username,
            display_name: req.display_name,
            role: req.role,
            created_at_utc: Utc::now(),
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get(&self, id: i64) -> Result<Option<User>> {
        Ok(state::read(&self.state).users.get(&id).cloned())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(state::read(&self.state)
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>> {
        Ok(state::read(&self.state).users.values().cloned().collect())
    }

    async fn update(&self, id: i64, req: UpdateUserRequest) -> Result<Option<User>> {
        let mut state = state::write(&self.state);
        let Some(user) = state.users.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(display_name) = req.display_name {
            user.display_name = display_name;
        }
        if let Some(role) = req.role {
            user.role = role;
        }
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut state = state::write(&self.state);
        if !state.users.contains_key(&id) {
            return Ok(false);
        }
        if state.projects.values().any(|p| p.owner_id == id) {
            return Err(Error::ReferentialIntegrity(format!(
                "user {id} still owns projects"
            )));
        }

        state.collaborators.retain(|_, c| c.user_id != id);
        Ok(state.users.remove(&id).is_some())
    }
}
