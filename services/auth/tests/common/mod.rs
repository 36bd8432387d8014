//! Shared fixtures for integration tests.

#![allow(dead_code)]

use auth_service::jwt::{IssuerSettings, TokenIssuer, TokenVerifier};
use auth_service::users::{InMemoryUserStore, UserService};
use auth_service::{AppState, KeyMaterial};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub const PRIVATE_PEM: &str = include_str!("../fixtures/ec_private.pem");
pub const PUBLIC_PEM: &str = include_str!("../fixtures/ec_public.pem");
pub const OTHER_PRIVATE_PEM: &str = include_str!("../fixtures/other_private.pem");
pub const OTHER_PUBLIC_PEM: &str = include_str!("../fixtures/other_public.pem");

pub const ACCESS_TTL: u64 = 900;
pub const REFRESH_TTL: u64 = 3600;
pub const TEST_BCRYPT_COST: u32 = 4;

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn keys() -> Arc<KeyMaterial> {
    Arc::new(KeyMaterial::from_pem(PRIVATE_PEM, PUBLIC_PEM).unwrap())
}

pub fn other_keys() -> Arc<KeyMaterial> {
    Arc::new(KeyMaterial::from_pem(OTHER_PRIVATE_PEM, OTHER_PUBLIC_PEM).unwrap())
}

pub fn settings() -> IssuerSettings {
    IssuerSettings {
        issuer: "auth-service".to_string(),
        access_token_ttl: Duration::from_secs(ACCESS_TTL),
        refresh_token_ttl: Duration::from_secs(REFRESH_TTL),
    }
}

pub fn issuer_and_verifier() -> (TokenIssuer, TokenVerifier) {
    let keys = keys();
    (TokenIssuer::new(keys.clone(), settings()), TokenVerifier::new(keys))
}

pub fn app_state() -> AppState {
    AppState::new(
        keys(),
        settings(),
        Arc::new(InMemoryUserStore::new()),
        TEST_BCRYPT_COST,
    )
}

/// Registers `alice` / `alice@example.com` with password `correct-horse`.
pub async fn register_alice(users: &UserService) {
    users
        .register("alice", "alice@example.com", "correct-horse")
        .await
        .unwrap();
}
