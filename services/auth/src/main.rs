use anyhow::Context;
use auth_service::users::InMemoryUserStore;
use auth_service::{build_router, AppState, Config, KeyMaterial, RouterOptions};
use rust_common::{init_tracing, shutdown_signal, TracingConfig};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("invalid configuration")?;

    init_tracing(
        &TracingConfig::default()
            .with_service_name("auth-service")
            .with_log_level(config.log_level.clone())
            .with_json_output(config.log_json),
    )?;

    info!("Starting Auth Service");

    // No request is served before the key pair is loaded
    let keys = KeyMaterial::load(&config.private_key_path, &config.public_key_path)
        .context("failed to load signing keys")?;

    let state = AppState::new(
        Arc::new(keys),
        config.issuer_settings(),
        Arc::new(InMemoryUserStore::new()),
        config.bcrypt_cost,
    );

    if config.gateway_secret.is_none() {
        warn!("GATEWAY_SECRET not set, running without gateway trust check");
    }

    let address = config.bind_address();
    let app = build_router(
        state,
        RouterOptions {
            gateway_secret: config.gateway_secret,
            request_timeout: config.request_timeout,
            cors_allowed_origin: config.cors_allowed_origin,
        },
    );

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!(address = %address, "Auth Service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Auth Service stopped");
    Ok(())
}
