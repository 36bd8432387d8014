use crate::error::{AuthError, AuthResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Claim names the issuer owns; extra claims can never replace them.
pub const RESERVED_CLAIMS: &[&str] = &["sub", "iss", "iat", "exp", "jti", "type", "nbf", "aud"];

/// Which credential a token is. Carried in the `type` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    /// Short-lived credential presented on every protected request
    Access,
    /// Long-lived credential accepted only by the refresh endpoint
    Refresh,
}

impl TokenType {
    /// Wire value of the `type` claim.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "access" => Ok(Self::Access),
            "refresh" => Ok(Self::Refresh),
            other => Err(format!("unknown token type: {other}")),
        }
    }
}

/// Payload of access and refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// Issuer name
    pub iss: String,
    /// Issued at, unix seconds
    pub iat: i64,
    /// Expiry, unix seconds. Optional on the wire so a token without `exp`
    /// is reported as expired rather than malformed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Unique per token
    pub jti: String,
    /// `access` or `refresh`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Additional claims such as `roles`
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Claims {
    /// Claims for a new token with a fresh `jti`, valid from `issued_at` for
    /// `ttl_seconds`.
    ///
    /// # Errors
    ///
    /// [`AuthError::Internal`] if `exp` would not fit in an `i64`.
    pub fn new(
        token_type: TokenType,
        issuer: impl Into<String>,
        subject: impl Into<String>,
        issued_at: i64,
        ttl_seconds: i64,
    ) -> AuthResult<Self> {
        let exp = issued_at.checked_add(ttl_seconds).ok_or_else(|| {
            AuthError::internal(format!("token lifetime of {ttl_seconds}s overflows expiry"))
        })?;

        Ok(Claims {
            sub: subject.into(),
            iss: issuer.into(),
            iat: issued_at,
            exp: Some(exp),
            jti: uuid::Uuid::new_v4().to_string(),
            token_type: Some(token_type.as_str().to_string()),
            extra: HashMap::new(),
        })
    }

    /// Merge extra claims, skipping reserved names.
    pub fn with_extra<I>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        for (key, value) in extra {
            if RESERVED_CLAIMS.contains(&key.as_str()) {
                tracing::warn!(claim = %key, "Ignoring extra claim that shadows a reserved claim");
                continue;
            }
            self.extra.insert(key, value);
        }
        self
    }

    /// Parsed `type` claim, `None` when absent or unknown.
    #[must_use]
    pub fn token_type(&self) -> Option<TokenType> {
        self.token_type.as_deref().and_then(|t| t.parse().ok())
    }

    /// `exp` absent or strictly before `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp.map_or(true, |exp| exp < now)
    }

    /// `roles` extra claim as strings, empty when absent.
    #[must_use]
    pub fn roles(&self) -> Vec<String> {
        self.extra
            .get("roles")
            .and_then(serde_json::Value::as_array)
            .map(|roles| {
                roles
                    .iter()
                    .filter_map(|r| r.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}
