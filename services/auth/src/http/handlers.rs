//! Route handlers.
//!
//! Handlers only parse and validate input and shape responses; every
//! decision is made by the token and user components.

use crate::error::{AuthError, AuthResult};
use crate::http::cookies::{cleared_refresh_cookie, read_refresh_cookie, refresh_cookie};
use crate::http::dto::{AccessTokenResponse, IntrospectResponse, LoginRequest, SignUpRequest};
use crate::http::envelope::{empty_data, AuthResponse};
use crate::http::router::AppState;
use crate::metrics::{self, LOGIN_ATTEMPTS};
use crate::refresh::TokenPair;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, SET_COOKIE};
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::info;

/// Body of the liveness check.
pub const HEALTH_MESSAGE: &str = "OK - auth-service";

/// `POST /auth/login`: check credentials, return an access token and set the refresh cookie.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AuthResult<Response> {
    let Json(request) = payload.map_err(bad_body)?;
    request.validate()?;

    let user = match state.users.authenticate(&request.identifier, &request.password).await {
        Ok(user) => {
            LOGIN_ATTEMPTS.with_label_values(&["success"]).inc();
            user
        }
        Err(e) => {
            LOGIN_ATTEMPTS.with_label_values(&[e.code().as_str()]).inc();
            return Err(e);
        }
    };

    let pair = state.rotator.issue_pair(&user.id.to_string(), &user.roles)?;
    info!(user_id = %user.id, "User logged in");

    Ok(token_response(&state, pair))
}

/// `POST /auth/refresh`: rotate the refresh cookie and return a new access token.
pub async fn refresh(State(state): State<AppState>, headers: HeaderMap) -> AuthResult<Response> {
    let cookie = read_refresh_cookie(&headers);
    let pair = state.rotator.rotate(cookie.as_deref()).await?;

    Ok(token_response(&state, pair))
}

/// `POST /auth/signup`: create an account.
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignUpRequest>, JsonRejection>,
) -> AuthResult<Response> {
    let Json(request) = payload.map_err(bad_body)?;
    request.validate()?;

    let summary = state
        .users
        .register(&request.user_name, &request.email, &request.password)
        .await?;
    let message = format!("Created User : {}", summary.user_name);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::success(StatusCode::CREATED, summary, message)),
    )
        .into_response())
}

/// Drops the refresh cookie. The token itself is not checked or revoked.
pub async fn logout() -> Response {
    (
        [(SET_COOKIE, cleared_refresh_cookie().to_string())],
        Json(AuthResponse::ok(empty_data(), "Logged out successfully")),
    )
        .into_response()
}

/// `POST /auth/introspect`: verify the bearer access token.
pub async fn introspect(State(state): State<AppState>, headers: HeaderMap) -> AuthResult<Response> {
    let token = bearer_token(&headers).ok_or(AuthError::MissingBearer)?;
    let claims = state.verifier.verify_access_token(token)?;

    let body = IntrospectResponse {
        roles: claims.roles(),
        expires_at: claims.exp,
        user_id: claims.sub,
    };

    Ok(Json(AuthResponse::ok(body, "Access Token Valid")).into_response())
}

/// Public key set for downstream verifiers.
pub async fn jwks(State(state): State<AppState>) -> Response {
    Json(state.jwks.public_key_set()).into_response()
}

/// `GET /actuator/health`
pub async fn health() -> &'static str {
    HEALTH_MESSAGE
}

/// `GET /actuator/metrics`
pub async fn prometheus_metrics() -> Response {
    (
        [(CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::render(),
    )
        .into_response()
}

/// Fallback for a known path under another method.
pub async fn method_not_allowed() -> AuthError {
    AuthError::MethodNotAllowed
}

/// Fallback for unknown paths.
pub async fn not_found(uri: Uri) -> Response {
    let message = format!("No endpoint {}", uri.path());
    (
        StatusCode::NOT_FOUND,
        Json(AuthResponse::failure(StatusCode::NOT_FOUND, empty_data(), message)),
    )
        .into_response()
}

fn token_response(state: &AppState, pair: TokenPair) -> Response {
    let cookie = refresh_cookie(pair.refresh_token, state.issuer.refresh_token_expiry());
    let body = AccessTokenResponse {
        access_token: pair.access_token,
    };

    (
        [(SET_COOKIE, cookie.to_string())],
        Json(AuthResponse::ok(body, "Access Token Successfully Created")),
    )
        .into_response()
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn bad_body(rejection: JsonRejection) -> AuthError {
    AuthError::BadRequest(rejection.body_text())
}
