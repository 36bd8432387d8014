//! Token verification.
//!
//! Checks run in a fixed order: structure, signature, expiry, type. The
//! first failing check decides the error, so a forged token is reported as a
//! signature failure even if it is also expired.

use crate::error::{AuthError, AuthResult};
use crate::jwt::claims::{Claims, TokenType};
use crate::keys::KeyMaterial;
use jsonwebtoken::{decode, Algorithm, Validation};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Verifies tokens minted by [`crate::jwt::TokenIssuer`] against the loaded
/// public key.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    keys: Arc<KeyMaterial>,
    validation: Validation,
}

impl TokenVerifier {
    /// Verifier for tokens signed by `keys`.
    pub fn new(keys: Arc<KeyMaterial>) -> Self {
        let mut validation = Validation::new(Algorithm::ES256);
        // Expiry and type are checked here, after the signature, with no leeway.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();

        TokenVerifier { keys, validation }
    }

    /// Verify a refresh token and return its subject.
    ///
    /// # Errors
    ///
    /// `MalformedToken`/`BadSignature` (server class), `Expired`/
    /// `WrongTokenType` (client class).
    pub fn verify_refresh_token(&self, token: &str) -> AuthResult<String> {
        self.verify_refresh_token_at(token, chrono::Utc::now().timestamp())
    }

    /// [`Self::verify_refresh_token`] at a fixed instant.
    ///
    /// # Errors
    ///
    /// See [`Self::verify_refresh_token`].
    pub fn verify_refresh_token_at(&self, token: &str, now: i64) -> AuthResult<String> {
        self.verify_at(token, TokenType::Refresh, now)
            .map(|claims| claims.sub)
    }

    /// Verify an access token and return its claims.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Self::verify_refresh_token`].
    pub fn verify_access_token(&self, token: &str) -> AuthResult<Claims> {
        self.verify_access_token_at(token, chrono::Utc::now().timestamp())
    }

    /// [`Self::verify_access_token`] at a fixed instant.
    ///
    /// # Errors
    ///
    /// See [`Self::verify_refresh_token`].
    pub fn verify_access_token_at(&self, token: &str, now: i64) -> AuthResult<Claims> {
        self.verify_at(token, TokenType::Access, now)
    }

    fn verify_at(&self, token: &str, expected: TokenType, now: i64) -> AuthResult<Claims> {
        let data = decode::<Claims>(token, self.keys.decoding_key(), &self.validation)
            .map_err(|e| {
                debug!(error = %e, expected = %expected, "Token rejected during decode");
                AuthError::from(e)
            })?;
        let claims = data.claims;

        if claims.is_expired_at(now) {
            debug!(jti = %claims.jti, exp = ?claims.exp, now, "Token expired");
            return Err(AuthError::Expired);
        }

        if claims.token_type() != Some(expected) {
            debug!(
                jti = %claims.jti,
                expected = %expected,
                found = ?claims.token_type,
                "Token type mismatch"
            );
            return Err(AuthError::WrongTokenType);
        }

        Ok(claims)
    }
}
