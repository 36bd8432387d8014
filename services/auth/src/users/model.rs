use serde::Serialize;
use std::collections::BTreeSet;
use uuid::Uuid;

/// Role granted to every newly registered account.
pub const DEFAULT_ROLE: &str = "ROLE_USER";

/// Stored account record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Primary key, also the token subject
    pub id: Uuid,
    /// Unique login email
    pub email: String,
    /// Unique login name
    pub username: String,
    /// bcrypt hash, never the plaintext
    pub password_hash: String,
    /// Granted roles, copied into access tokens
    pub roles: BTreeSet<String>,
    /// Disabled accounts cannot log in
    pub enabled: bool,
}

impl User {
    /// Enabled account with a fresh id and the default role.
    pub fn new(email: impl Into<String>, username: impl Into<String>, password_hash: String) -> Self {
        User {
            id: Uuid::new_v4(),
            email: email.into(),
            username: username.into(),
            password_hash,
            roles: BTreeSet::from([DEFAULT_ROLE.to_string()]),
            enabled: true,
        }
    }

    /// Replace the granted roles.
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Mark the account disabled.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Public view of this account.
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            user_name: self.username.clone(),
            user_mail: self.email.clone(),
            user_roles: self.roles.clone(),
        }
    }
}

/// Public view returned after signup.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// Login name
    pub user_name: String,
    /// Login email
    pub user_mail: String,
    /// Granted roles
    pub user_roles: BTreeSet<String>,
}
