pub mod claims;
pub mod issuer;
pub mod verifier;

pub use claims::{Claims, TokenType, RESERVED_CLAIMS};
pub use issuer::{IssuerSettings, TokenIssuer};
pub use verifier::TokenVerifier;
