//! Tracing subscriber bootstrap.
//!
//! Every service installs exactly one global subscriber at startup. The filter
//! comes from `RUST_LOG` when set, otherwise from the configured level.

use tracing_subscriber::{
    layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError, EnvFilter,
};

/// Tracing configuration.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Service name attached to the startup event
    pub service_name: String,
    /// Log level filter used when `RUST_LOG` is absent
    pub log_level: String,
    /// Whether to output JSON format
    pub json_output: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            service_name: "rust-service".to_string(),
            log_level: "info".to_string(),
            json_output: false,
        }
    }
}

impl TracingConfig {
    /// Create config with custom service name.
    #[must_use]
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Create config with custom log level.
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Toggle JSON output.
    #[must_use]
    pub const fn with_json_output(mut self, enabled: bool) -> Self {
        self.json_output = enabled;
        self
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_level))
    }
}

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber was already installed.
pub fn init_tracing(config: &TracingConfig) -> Result<(), TryInitError> {
    let filter = config.filter();

    if config.json_output {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .try_init()?;
    }

    tracing::info!(service = %config.service_name, json = config.json_output, "Tracing initialized");
    Ok(())
}
