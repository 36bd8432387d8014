//! Refresh cookie construction and lookup.

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use cookie::time::Duration;
use cookie::{Cookie, SameSite};

/// Cookie carrying the refresh token.
pub const REFRESH_COOKIE_NAME: &str = "refreshToken";
/// The cookie is only sent to the rotation endpoint.
pub const REFRESH_COOKIE_PATH: &str = "/auth/refresh";

/// Cookie holding `token`, living exactly as long as the token does.
pub fn refresh_cookie(token: String, max_age_secs: u64) -> Cookie<'static> {
    let max_age = i64::try_from(max_age_secs).unwrap_or(i64::MAX);

    Cookie::build((REFRESH_COOKIE_NAME, token))
        .http_only(true)
        .secure(true)
        .path(REFRESH_COOKIE_PATH)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(max_age))
        .build()
}

/// Expired cookie that makes the browser drop the refresh token.
pub fn cleared_refresh_cookie() -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE_NAME, ""))
        .http_only(true)
        .secure(true)
        .path(REFRESH_COOKIE_PATH)
        .same_site(SameSite::Lax)
        .max_age(Duration::ZERO)
        .build()
}

/// Value of the refresh cookie, if the request carries one.
pub fn read_refresh_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == REFRESH_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
}
