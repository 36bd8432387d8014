//! Request and response bodies.

use crate::error::{AuthError, AuthResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `POST /auth/login` body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    /// Email or username
    pub identifier: String,
    /// Plaintext password, checked against the stored hash
    pub password: String,
}

impl LoginRequest {
    /// Check that both fields are present.
    ///
    /// # Errors
    ///
    /// [`AuthError::Validation`] listing every blank field.
    pub fn validate(&self) -> AuthResult<()> {
        let mut errors = FieldErrors::default();
        errors.required("identifier", &self.identifier, "Username or Email is required");
        errors.required("password", &self.password, "Password is required");
        errors.finish()
    }
}

/// `POST /auth/signup` body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SignUpRequest {
    /// Login name, unique per account
    pub user_name: String,
    /// Login email, unique per account
    pub email: String,
    /// Plaintext password, checked against the stored hash
    pub password: String,
}

impl SignUpRequest {
    /// Check that every field is present.
    ///
    /// # Errors
    ///
    /// [`AuthError::Validation`] listing every blank field.
    pub fn validate(&self) -> AuthResult<()> {
        let mut errors = FieldErrors::default();
        errors.required("userName", &self.user_name, "Username is required");
        errors.required("email", &self.email, "Email is required");
        errors.required("password", &self.password, "Password is required");
        errors.finish()
    }
}

/// `responseData` of login and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    /// Signed access token
    pub access_token: String,
}

/// `responseData` of `POST /auth/introspect`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectResponse {
    /// Token subject
    pub user_id: String,
    /// Roles carried in the token
    pub roles: Vec<String>,
    /// `exp` in unix seconds
    pub expires_at: Option<i64>,
}

#[derive(Default)]
struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Records `message` for `field` when `value` is blank.
    fn required(&mut self, field: &str, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.0.insert(field.to_string(), message.to_string());
        }
    }

    fn finish(self) -> AuthResult<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AuthError::Validation(self.0))
        }
    }
}
