//! Shared library for cross-cutting concerns in auth-platform Rust services.
//!
//! This crate provides:
//! - Tracing subscriber bootstrap with env-filter and JSON output
//! - Shutdown signal handling for graceful server termination

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod shutdown;
pub mod tracing_config;

pub use shutdown::shutdown_signal;
pub use tracing_config::{init_tracing, TracingConfig};
