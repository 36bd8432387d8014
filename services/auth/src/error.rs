//! Request-level error taxonomy.
//!
//! Every core operation returns [`AuthResult`]. The error variant fixes the
//! HTTP status, so callers short-circuit with `?` and the HTTP layer renders
//! the failure into the response envelope unchanged.

use axum::http::StatusCode;
use std::collections::BTreeMap;
use thiserror::Error;

/// Outcome of a core operation.
pub type AuthResult<T> = Result<T, AuthError>;

/// Failures surfaced to callers of the token engine and its HTTP surface.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Refresh cookie absent or empty
    #[error("Refresh Token Missing in Cookie")]
    MissingToken,

    /// Bearer credential absent on an access-token call site
    #[error("Access Token Missing in Authorization header")]
    MissingBearer,

    /// Token is not a well-formed compact JWS
    #[error("Unable to parse token: {0}")]
    MalformedToken(String),

    /// Signature does not verify against the loaded public key
    #[error("Invalid token signature")]
    BadSignature,

    /// `exp` is absent or in the past
    #[error("Token expired")]
    Expired,

    /// Token `type` claim does not match the call site
    #[error("Invalid token type")]
    WrongTokenType,

    /// Signing with the private key failed
    #[error("Error occurred while signing token: {0}")]
    Signing(String),

    /// Unknown identifier or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Account exists but is disabled
    #[error("User account is disabled")]
    AccountDisabled,

    /// No user with the requested id
    #[error("User not found")]
    UserNotFound,

    /// Email is registered to another account
    #[error("Email Already In Use")]
    EmailTaken,

    /// Username is registered to another account
    #[error("Username Already Taken")]
    UsernameTaken,

    /// Request body failed field validation
    #[error("Validation Failed")]
    Validation(BTreeMap<String, String>),

    /// Request body could not be parsed
    #[error("Invalid request body: {0}")]
    BadRequest(String),

    /// Route exists but not for this method
    #[error("HTTP method not allowed for this endpoint")]
    MethodNotAllowed,

    /// Missing or wrong gateway secret
    #[error("Unauthorized Gateway")]
    GatewayRejected,

    /// Anything else; message is safe to show
    #[error("Something went wrong: {0}")]
    Internal(String),
}

/// Stable machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// No refresh cookie or bearer token
    TokenMissing,
    /// Token is not a compact JWS
    TokenMalformed,
    /// Signature does not verify
    TokenSignatureInvalid,
    /// Token past `exp`
    TokenExpired,
    /// Token used at the wrong call site
    TokenTypeInvalid,
    /// Signing failed
    TokenSigningFailed,
    /// Login rejected
    CredentialsInvalid,
    /// Unknown user id
    UserNotFound,
    /// Email or username already registered
    UserConflict,
    /// Request body rejected
    ValidationFailed,
    /// Wrong method for the path
    MethodNotAllowed,
    /// Missing or wrong gateway secret
    GatewayRejected,
    /// Anything else
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TokenMissing => "AUTH_TOKEN_MISSING",
            Self::TokenMalformed => "AUTH_TOKEN_MALFORMED",
            Self::TokenSignatureInvalid => "AUTH_TOKEN_SIGNATURE_INVALID",
            Self::TokenExpired => "AUTH_TOKEN_EXPIRED",
            Self::TokenTypeInvalid => "AUTH_TOKEN_TYPE_INVALID",
            Self::TokenSigningFailed => "AUTH_TOKEN_SIGNING_FAILED",
            Self::CredentialsInvalid => "AUTH_CREDENTIALS_INVALID",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::UserConflict => "USER_CONFLICT",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::GatewayRejected => "GATEWAY_REJECTED",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

impl AuthError {
    /// HTTP status for this failure. Downstream clients branch on these, so
    /// the mapping must not change between releases.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingToken
            | Self::Expired
            | Self::WrongTokenType
            | Self::InvalidCredentials
            | Self::AccountDisabled
            | Self::EmailTaken
            | Self::UsernameTaken
            | Self::Validation(_)
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::MissingBearer | Self::GatewayRejected => StatusCode::UNAUTHORIZED,
            Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            // Corruption or a key mismatch, not a client mistake
            Self::MalformedToken(_) | Self::BadSignature | Self::Signing(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Machine-readable code for logs and metrics.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::MissingToken | Self::MissingBearer => ErrorCode::TokenMissing,
            Self::MalformedToken(_) => ErrorCode::TokenMalformed,
            Self::BadSignature => ErrorCode::TokenSignatureInvalid,
            Self::Expired => ErrorCode::TokenExpired,
            Self::WrongTokenType => ErrorCode::TokenTypeInvalid,
            Self::Signing(_) => ErrorCode::TokenSigningFailed,
            Self::InvalidCredentials | Self::AccountDisabled => ErrorCode::CredentialsInvalid,
            Self::UserNotFound => ErrorCode::UserNotFound,
            Self::EmailTaken | Self::UsernameTaken => ErrorCode::UserConflict,
            Self::Validation(_) | Self::BadRequest(_) => ErrorCode::ValidationFailed,
            Self::MethodNotAllowed => ErrorCode::MethodNotAllowed,
            Self::GatewayRejected => ErrorCode::GatewayRejected,
            Self::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Whether the failure is attributable to the client request.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }

    /// Build an internal error from any displayable source.
    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidSignature => Self::BadSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::MalformedToken(err.to_string()),
        }
    }
}
