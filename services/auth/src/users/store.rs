//! User record storage.
//!
//! The service depends only on [`UserStore`]; deployments back it with their
//! own database. [`InMemoryUserStore`] is used for standalone runs and tests.

use crate::error::{AuthError, AuthResult};
use crate::users::model::User;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Keyed lookup and creation of user records.
///
/// Implementations are arbitrary-latency I/O and must bound their own calls.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find by email or username.
    async fn find_by_identifier(&self, identifier: &str) -> AuthResult<Option<User>>;

    /// Find by primary key.
    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<User>>;

    /// Insert a new record. Fails with `EmailTaken` or `UsernameTaken` when
    /// either is already registered, checked in that order.
    async fn insert(&self, user: User) -> AuthResult<()>;
}

/// Process-local store; contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_identifier(&self, identifier: &str) -> AuthResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.email == identifier || u.username == identifier)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn insert(&self, user: User) -> AuthResult<()> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == user.email) {
            return Err(AuthError::EmailTaken);
        }
        if users.values().any(|u| u.username == user.username) {
            return Err(AuthError::UsernameTaken);
        }

        users.insert(user.id, user);
        Ok(())
    }
}
