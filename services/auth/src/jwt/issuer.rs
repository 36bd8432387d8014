//! Token minting.
//!
//! Access and refresh tokens share one shape and differ only in `type`,
//! lifetime, and whether extra claims are attached.

use crate::error::{AuthError, AuthResult};
use crate::jwt::claims::{Claims, TokenType};
use crate::keys::KeyMaterial;
use crate::metrics::TOKENS_ISSUED;
use jsonwebtoken::{encode, Algorithm, Header};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// Lifetimes and issuer name applied to every minted token.
#[derive(Debug, Clone)]
pub struct IssuerSettings {
    /// `iss` claim
    pub issuer: String,
    /// Access token lifetime
    pub access_token_ttl: Duration,
    /// Refresh token lifetime, also the refresh cookie max-age
    pub refresh_token_ttl: Duration,
}

/// Mints ES256-signed access and refresh tokens.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    keys: Arc<KeyMaterial>,
    settings: IssuerSettings,
}

impl TokenIssuer {
    /// Issuer signing with `keys` under `settings`.
    pub fn new(keys: Arc<KeyMaterial>, settings: IssuerSettings) -> Self {
        TokenIssuer { keys, settings }
    }

    /// Mint an access token carrying `extra_claims` (typically `roles`).
    ///
    /// # Errors
    ///
    /// [`AuthError::Signing`] if the private key cannot sign.
    pub fn create_access_token(&self, user_id: &str, extra_claims: Map<String, Value>) -> AuthResult<String> {
        self.issue_at(TokenType::Access, user_id, extra_claims, now())
    }

    /// Mint a refresh token. Refresh tokens never carry extra claims.
    ///
    /// # Errors
    ///
    /// [`AuthError::Signing`] if the private key cannot sign.
    pub fn create_refresh_token(&self, user_id: &str) -> AuthResult<String> {
        self.issue_at(TokenType::Refresh, user_id, Map::new(), now())
    }

    /// Refresh lifetime in seconds. Cookie max-age must use this value so the
    /// cookie and the token it holds expire together.
    #[must_use]
    pub const fn refresh_token_expiry(&self) -> u64 {
        self.settings.refresh_token_ttl.as_secs()
    }

    /// Access lifetime in seconds.
    #[must_use]
    pub const fn access_token_expiry(&self) -> u64 {
        self.settings.access_token_ttl.as_secs()
    }

    /// Mint a token as if the current time were `issued_at` (unix seconds).
    ///
    /// # Errors
    ///
    /// [`AuthError::Signing`] if the private key cannot sign,
    /// [`AuthError::Internal`] if the lifetime overflows the expiry.
    pub fn issue_at(
        &self,
        token_type: TokenType,
        user_id: &str,
        extra_claims: Map<String, Value>,
        issued_at: i64,
    ) -> AuthResult<String> {
        let ttl = match token_type {
            TokenType::Access => self.settings.access_token_ttl,
            TokenType::Refresh => self.settings.refresh_token_ttl,
        };
        let ttl = i64::try_from(ttl.as_secs()).map_err(AuthError::internal)?;

        let claims = Claims::new(token_type, self.settings.issuer.clone(), user_id, issued_at, ttl)?
            .with_extra(extra_claims);

        let mut header = Header::new(Algorithm::ES256);
        header.kid = Some(self.keys.current_key_id().to_string());

        let token = encode(&header, &claims, self.keys.encoding_key()).map_err(|e| {
            error!(error = %e, token_type = %token_type, "Failed to sign token");
            AuthError::Signing(e.to_string())
        })?;

        TOKENS_ISSUED.with_label_values(&[token_type.as_str()]).inc();
        debug!(user_id = %user_id, token_type = %token_type, jti = %claims.jti, "Issued token");

        Ok(token)
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
