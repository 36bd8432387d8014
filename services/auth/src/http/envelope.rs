//! Uniform response body.
//!
//! Success and failure share one shape:
//! `{"statusCode":"OK","responseData":{},"responseMessage":"","responseStatus":0}`.

use crate::error::AuthError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::error;

/// `responseStatus` for a successful call.
pub const RESPONSE_OK: u8 = 0;
/// `responseStatus` for a failed call.
pub const RESPONSE_FAILED: u8 = 1;

/// Response body shared by every JSON endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse<T> {
    /// Upper-snake HTTP reason, e.g. `BAD_REQUEST`
    pub status_code: String,
    /// Payload, `{}` when there is none
    pub response_data: T,
    /// Human-readable outcome
    pub response_message: String,
    /// [`RESPONSE_OK`] or [`RESPONSE_FAILED`]
    pub response_status: u8,
}

impl<T: Serialize> AuthResponse<T> {
    /// Successful response with an explicit status.
    pub fn success(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        AuthResponse {
            status_code: status_name(status),
            response_data: data,
            response_message: message.into(),
            response_status: RESPONSE_OK,
        }
    }

    /// Successful `200 OK` response.
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self::success(StatusCode::OK, data, message)
    }
}

impl AuthResponse<Value> {
    /// Failed response.
    pub fn failure(status: StatusCode, data: Value, message: impl Into<String>) -> Self {
        AuthResponse {
            status_code: status_name(status),
            response_data: data,
            response_message: message.into(),
            response_status: RESPONSE_FAILED,
        }
    }
}

/// Upper-snake reason phrase, e.g. `BAD_REQUEST`.
pub fn status_name(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("UNKNOWN")
        .to_ascii_uppercase()
        .replace([' ', '-'], "_")
}

/// Empty `responseData`.
pub fn empty_data() -> Value {
    Value::Object(Map::new())
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            error!(error = %self, code = self.code().as_str(), "Request failed");
        }

        let (data, message) = match self {
            AuthError::Validation(fields) => (
                Value::Object(fields.into_iter().map(|(k, v)| (k, Value::String(v))).collect()),
                "Validation Failed".to_string(),
            ),
            AuthError::Internal(_) => (empty_data(), "Something went wrong".to_string()),
            other => (empty_data(), other.to_string()),
        };

        (status, Json(AuthResponse::failure(status, data, message))).into_response()
    }
}
