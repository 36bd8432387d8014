use crate::error::{AuthError, AuthResult};
use crate::users::model::{User, UserSummary};
use crate::users::store::UserStore;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Credential checks and account management over a [`UserStore`].
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    bcrypt_cost: u32,
}

impl UserService {
    /// Service over `store`, hashing new passwords at `bcrypt_cost`.
    pub fn new(store: Arc<dyn UserStore>, bcrypt_cost: u32) -> Self {
        UserService { store, bcrypt_cost }
    }

    /// Validate an identifier (email or username) and password.
    ///
    /// Unknown users and wrong passwords produce the same error.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials`, `AccountDisabled`, or `Internal` if the hash
    /// check cannot run.
    pub async fn authenticate(&self, identifier: &str, password: &str) -> AuthResult<User> {
        let user = self
            .store
            .find_by_identifier(identifier)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.enabled {
            warn!(user_id = %user.id, "Login attempt on disabled account");
            return Err(AuthError::AccountDisabled);
        }

        let hash = user.password_hash.clone();
        let password = password.to_string();
        let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(AuthError::internal)?
            .map_err(AuthError::internal)?;

        if !matches {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Current roles for a user id as carried in a refresh token subject.
    ///
    /// # Errors
    ///
    /// `UserNotFound` for an unknown or unparsable id.
    pub async fn roles(&self, user_id: &str) -> AuthResult<BTreeSet<String>> {
        let id = Uuid::parse_str(user_id).map_err(|_| AuthError::UserNotFound)?;

        self.store
            .find_by_id(id)
            .await?
            .map(|user| user.roles)
            .ok_or(AuthError::UserNotFound)
    }

    /// Create an account with the default role.
    ///
    /// # Errors
    ///
    /// `EmailTaken` or `UsernameTaken` on a conflict, `Internal` if hashing
    /// fails.
    pub async fn register(&self, user_name: &str, email: &str, password: &str) -> AuthResult<UserSummary> {
        let cost = self.bcrypt_cost;
        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(AuthError::internal)?
            .map_err(AuthError::internal)?;

        let user = User::new(email, user_name, password_hash);
        let summary = user.summary();
        let user_id = user.id;

        self.store.insert(user).await?;

        info!(user_id = %user_id, user_name = %user_name, "Registered user");
        Ok(summary)
    }
}
