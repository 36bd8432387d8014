//! Signing key material.
//!
//! One P-256 key pair is loaded at startup and shared read-only for the life
//! of the process. Replacing the key requires a restart.

pub mod material;
pub mod pem;

pub use material::{KeyError, KeyMaterial, KEY_ID_TAG};
pub use pem::decode_pem;
