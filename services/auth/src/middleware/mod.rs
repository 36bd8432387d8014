//! Tower middleware for the auth service.

pub mod gateway;

pub use gateway::{GatewayTrustLayer, GatewayTrustService, GATEWAY_SECRET_HEADER};
