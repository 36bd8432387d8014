//! Refresh rotation: verify the presented refresh token, re-read roles and
//! reissue both tokens.

pub mod rotator;

pub use rotator::{TokenPair, TokenRotator};
