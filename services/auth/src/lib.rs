//! Auth service library.
//!
//! Issues ES256 access and refresh tokens, rotates refresh tokens, publishes
//! the verification key as a JWKS document and guards the whole surface with
//! an optional gateway shared-secret check.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod http;
pub mod jwks;
pub mod jwt;
pub mod keys;
pub mod metrics;
pub mod middleware;
pub mod refresh;
pub mod users;

// Re-exports for convenience
pub use config::Config;
pub use error::{AuthError, AuthResult};
pub use http::{build_router, AppState, RouterOptions};
pub use keys::KeyMaterial;
