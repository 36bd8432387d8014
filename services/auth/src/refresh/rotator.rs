use crate::error::{AuthError, AuthResult};
use crate::jwt::{TokenIssuer, TokenVerifier};
use crate::metrics::TOKENS_REFRESHED;
use crate::users::UserService;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, warn};

/// Freshly minted access and refresh tokens for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    /// Returned in the response body
    pub access_token: String,
    /// Set as the refresh cookie
    pub refresh_token: String,
}

/// Issues token pairs on login and rotates them on refresh.
///
/// The previous refresh token is not invalidated. It is superseded only by
/// the client replacing its cookie.
#[derive(Clone)]
pub struct TokenRotator {
    issuer: Arc<TokenIssuer>,
    verifier: Arc<TokenVerifier>,
    users: Arc<UserService>,
}

impl TokenRotator {
    /// Rotator over the given issuer, verifier and user lookup.
    pub fn new(issuer: Arc<TokenIssuer>, verifier: Arc<TokenVerifier>, users: Arc<UserService>) -> Self {
        TokenRotator {
            issuer,
            verifier,
            users,
        }
    }

    /// Mint an access token carrying `roles` and a refresh token, both for
    /// `user_id`.
    ///
    /// # Errors
    ///
    /// [`AuthError::Signing`] if either token cannot be signed.
    pub fn issue_pair(&self, user_id: &str, roles: &BTreeSet<String>) -> AuthResult<TokenPair> {
        let access_token = self.issuer.create_access_token(user_id, roles_claim(roles))?;
        let refresh_token = self.issuer.create_refresh_token(user_id)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Rotate the refresh token held in the client's cookie.
    ///
    /// Each step short-circuits on failure and the error is returned as is.
    ///
    /// # Errors
    ///
    /// `MissingToken` for an absent or empty cookie, any verification
    /// failure, `UserNotFound` if the subject no longer exists, or `Signing`.
    pub async fn rotate(&self, refresh_cookie: Option<&str>) -> AuthResult<TokenPair> {
        let result = self.rotate_inner(refresh_cookie).await;

        match &result {
            Ok(_) => TOKENS_REFRESHED.with_label_values(&["success"]).inc(),
            Err(e) => {
                TOKENS_REFRESHED.with_label_values(&[e.code().as_str()]).inc();
                warn!(error = %e, code = e.code().as_str(), "Refresh rejected");
            }
        }

        result
    }

    async fn rotate_inner(&self, refresh_cookie: Option<&str>) -> AuthResult<TokenPair> {
        let token = refresh_cookie
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let user_id = self.verifier.verify_refresh_token(token)?;
        let roles = self.users.roles(&user_id).await?;
        let pair = self.issue_pair(&user_id, &roles)?;

        info!(user_id = %user_id, "Rotated refresh token");
        Ok(pair)
    }
}

fn roles_claim(roles: &BTreeSet<String>) -> Map<String, Value> {
    let mut claims = Map::new();
    claims.insert(
        "roles".to_string(),
        Value::Array(roles.iter().cloned().map(Value::String).collect()),
    );
    claims
}
