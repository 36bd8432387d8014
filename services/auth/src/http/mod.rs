//! HTTP surface: routes, envelope and cookie handling.

pub mod cookies;
pub mod dto;
pub mod envelope;
pub mod handlers;
pub mod router;

pub use envelope::AuthResponse;
pub use router::{build_router, AppState, RouterOptions};
