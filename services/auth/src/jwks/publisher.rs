use crate::keys::KeyMaterial;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// RFC 7517 public key entry for a P-256 signing key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Jwk {
    /// Key type, always `EC`
    pub kty: String,
    /// Curve, always `P-256`
    pub crv: String,
    /// base64url x coordinate
    pub x: String,
    /// base64url y coordinate
    pub y: String,
    /// Key id, matches the token header `kid`
    pub kid: String,
    /// Always `sig`
    #[serde(rename = "use")]
    pub key_use: String,
    /// Always `ES256`
    pub alg: String,
}

/// RFC 7517 key set document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Jwks {
    /// Published keys
    pub keys: Vec<Jwk>,
}

impl Jwks {
    /// Serialized document.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Key with the given id, if published.
    pub fn find(&self, kid: &str) -> Option<&Jwk> {
        self.keys.iter().find(|k| k.kid == kid)
    }
}

/// Projects the loaded public key into a key-set document. Holds no state of
/// its own; the output always reflects the key the process was started with.
#[derive(Debug, Clone)]
pub struct JwksPublisher {
    keys: Arc<KeyMaterial>,
}

impl JwksPublisher {
    /// Publisher for the loaded key pair.
    pub fn new(keys: Arc<KeyMaterial>) -> Self {
        JwksPublisher { keys }
    }

    /// The active public key as a JWK.
    pub fn current_jwk(&self) -> Jwk {
        let point = self.keys.public_key().to_encoded_point(false);
        // Uncompressed point is 0x04 || x || y, 32 bytes each
        let coords = &point.as_bytes()[1..];
        let (x, y) = coords.split_at(32);

        Jwk {
            kty: "EC".to_string(),
            crv: "P-256".to_string(),
            x: URL_SAFE_NO_PAD.encode(x),
            y: URL_SAFE_NO_PAD.encode(y),
            kid: self.keys.current_key_id().to_string(),
            key_use: "sig".to_string(),
            alg: "ES256".to_string(),
        }
    }

    /// Key set holding only the active key.
    pub fn public_key_set(&self) -> Jwks {
        Jwks {
            keys: vec![self.current_jwk()],
        }
    }
}
