//! Service configuration.
//!
//! Loaded from environment variables (optionally a `.env` file) and
//! validated once at startup.

use crate::jwt::IssuerSettings;
use axum::http::HeaderValue;
use secrecy::SecretString;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Upper bound for access and refresh token lifetimes (10 years).
pub const MAX_TOKEN_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Configuration errors. Any of these stops startup.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is present but cannot be used
    #[error("Invalid {name}: {reason}")]
    Invalid {
        /// Environment variable name
        name: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}

/// Auth service configuration.
#[derive(Debug)]
pub struct Config {
    // Server settings
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Upper bound on handling a single request
    pub request_timeout: Duration,
    /// Browser origin allowed to call with credentials
    pub cors_allowed_origin: HeaderValue,

    // JWT settings
    /// `iss` claim
    pub jwt_issuer: String,
    /// Access token lifetime
    pub access_token_ttl: Duration,
    /// Refresh token lifetime, also the refresh cookie max-age
    pub refresh_token_ttl: Duration,
    /// PEM file holding the P-256 private key
    pub private_key_path: PathBuf,
    /// PEM file holding the matching public key
    pub public_key_path: PathBuf,

    // Security
    /// Shared secret expected from the gateway; `None` runs standalone
    pub gateway_secret: Option<SecretString>,
    /// bcrypt work factor for new password hashes
    pub bcrypt_cost: u32,

    // Logging
    /// Filter used when `RUST_LOG` is absent
    pub log_level: String,
    /// Emit JSON log lines
    pub log_json: bool,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but invalid.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let host = var("HOST", "0.0.0.0");
        let port = parse_var(&lookup, "PORT", 8081)?;
        let request_timeout = Duration::from_secs(positive(&lookup, "REQUEST_TIMEOUT_SECS", 30)?);
        let cors_allowed_origin = HeaderValue::from_str(&var("CORS_ALLOWED_ORIGIN", "http://localhost:5173"))
            .map_err(|e| ConfigError::Invalid {
                name: "CORS_ALLOWED_ORIGIN",
                reason: e.to_string(),
            })?;

        let jwt_issuer = var("JWT_ISSUER", "auth-service");
        let access_token_ttl = Duration::from_secs(token_ttl(&lookup, "ACCESS_TOKEN_TTL", 900)?);
        let refresh_token_ttl = Duration::from_secs(token_ttl(&lookup, "REFRESH_TOKEN_TTL", 2_592_000)?);
        let private_key_path = PathBuf::from(var("JWT_PRIVATE_KEY_PATH", "keys/private.pem"));
        let public_key_path = PathBuf::from(var("JWT_PUBLIC_KEY_PATH", "keys/public.pem"));

        let gateway_secret = lookup("GATEWAY_SECRET")
            .filter(|s| !s.is_empty())
            .map(SecretString::from);
        let bcrypt_cost = parse_var(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                name: "BCRYPT_COST",
                reason: format!("{bcrypt_cost} is outside 4..=31"),
            });
        }

        let log_level = var("LOG_LEVEL", "info");
        let log_json = parse_var(&lookup, "LOG_JSON", false)?;

        Ok(Self {
            host,
            port,
            request_timeout,
            cors_allowed_origin,
            jwt_issuer,
            access_token_ttl,
            refresh_token_ttl,
            private_key_path,
            public_key_path,
            gateway_secret,
            bcrypt_cost,
            log_level,
            log_json,
        })
    }

    /// Socket address string to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Issuer name and lifetimes for [`crate::jwt::TokenIssuer`].
    pub fn issuer_settings(&self) -> IssuerSettings {
        IssuerSettings {
            issuer: self.jwt_issuer.clone(),
            access_token_ttl: self.access_token_ttl,
            refresh_token_ttl: self.refresh_token_ttl,
        }
    }
}

/// Parse a variable with a default value.
fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(val) => val.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn positive<F>(lookup: &F, name: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match parse_var(lookup, name, default)? {
        0 => Err(ConfigError::Invalid {
            name,
            reason: "must be greater than zero".to_string(),
        }),
        secs => Ok(secs),
    }
}

/// Token lifetime in seconds, bounded so `iat + ttl` always fits in `exp`.
fn token_ttl<F>(lookup: &F, name: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match positive(lookup, name, default)? {
        secs if secs > MAX_TOKEN_TTL_SECS => Err(ConfigError::Invalid {
            name,
            reason: format!("{secs} exceeds the maximum of {MAX_TOKEN_TTL_SECS} seconds"),
        }),
        secs => Ok(secs),
    }
}
