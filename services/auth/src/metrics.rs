//! Prometheus metrics for the auth service.
//!
//! Provides counters for token issuance, refresh outcomes, logins and
//! gateway rejections, plus text rendering for the actuator endpoint.

use once_cell::sync::Lazy;
use prometheus::{
    register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec,
    TextEncoder,
};

/// Tokens issued counter.
pub static TOKENS_ISSUED: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "auth_service_tokens_issued_total",
        "Total number of tokens issued",
        &["token_type"]
    )
    .expect("Failed to register tokens_issued metric")
});

/// Refresh rotations by outcome.
pub static TOKENS_REFRESHED: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "auth_service_tokens_refreshed_total",
        "Total number of refresh attempts",
        &["status"]
    )
    .expect("Failed to register tokens_refreshed metric")
});

/// Login attempts by outcome.
pub static LOGIN_ATTEMPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "auth_service_login_attempts_total",
        "Total number of login attempts",
        &["status"]
    )
    .expect("Failed to register login_attempts metric")
});

/// Requests turned away by the gateway trust filter.
pub static GATEWAY_REJECTIONS: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "auth_service_gateway_rejections_total",
        "Total number of requests rejected for a missing or wrong gateway secret"
    )
    .expect("Failed to register gateway_rejections metric")
});

/// Render the default registry in the Prometheus text format.
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        tracing::warn!(error = %e, "Failed to encode metrics");
    }
    String::from_utf8(buffer).unwrap_or_default()
}
