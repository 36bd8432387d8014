use crate::keys::pem::decode_pem;
use jsonwebtoken::{DecodingKey, EncodingKey};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::pkcs8::spki::SubjectPublicKeyInfoRef;
use p256::pkcs8::{
    DecodePrivateKey, DecodePublicKey, EncodePrivateKey, ObjectIdentifier, PrivateKeyInfo,
};
use p256::{PublicKey, SecretKey};
use sha2::{Digest, Sha256};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;
use zeroize::Zeroizing;

/// Product tag prefixed to every key id.
pub const KEY_ID_TAG: &str = "ashen-phoenix";

const EC_PUBLIC_KEY_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");
const P256_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");

/// Startup failures while loading key material. Any of these prevents the
/// service from serving traffic.
#[derive(Error, Debug)]
pub enum KeyError {
    /// A configured PEM file does not exist
    #[error("PEM resource not found: {}", path.display())]
    ResourceNotFound {
        /// Configured location
        path: PathBuf,
    },

    /// A PEM file exists but cannot be read
    #[error("Failed to read PEM resource {}: {source}", path.display())]
    Io {
        /// Configured location
        path: PathBuf,
        /// Underlying read failure
        #[source]
        source: io::Error,
    },

    /// Not PEM, or the DER inside cannot be parsed
    #[error("Malformed PEM: {0}")]
    MalformedPem(String),

    /// Parsed, but not a P-256 EC key
    #[error("Unsupported key type: {0}")]
    UnsupportedKeyType(String),

    /// The private key's public half differs from the configured public key
    #[error("Private key does not correspond to the configured public key")]
    KeyMismatch,
}

/// The active ES256 key pair and its content-addressed identifier.
///
/// Only obtainable through a successful load, so every holder has usable keys.
pub struct KeyMaterial {
    key_id: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    public_key: PublicKey,
}

impl KeyMaterial {
    /// Load the key pair from PEM files.
    ///
    /// # Errors
    ///
    /// Fails if either file is missing or unreadable, or see [`Self::from_pem`].
    pub fn load(private_key_path: &Path, public_key_path: &Path) -> Result<Self, KeyError> {
        let private_pem = Zeroizing::new(read_resource(private_key_path)?);
        let public_pem = read_resource(public_key_path)?;

        let material = Self::from_pem(&private_pem, &public_pem)?;
        info!(
            kid = %material.key_id,
            private_key = %private_key_path.display(),
            public_key = %public_key_path.display(),
            "Loaded signing key"
        );
        Ok(material)
    }

    /// Build key material from PEM text.
    ///
    /// The private key may be PKCS#8 or SEC1; the public key must be a
    /// SubjectPublicKeyInfo. Both must be P-256 and belong together.
    ///
    /// # Errors
    ///
    /// `MalformedPem` for undecodable input, `UnsupportedKeyType` for non
    /// P-256 keys, `KeyMismatch` when the halves do not match.
    pub fn from_pem(private_pem: &str, public_pem: &str) -> Result<Self, KeyError> {
        let private_der = decode_pem(private_pem, "PRIVATE KEY")?;
        let public_der = decode_pem(public_pem, "PUBLIC KEY")?;

        let (secret_key, pkcs8_der) = parse_private_key(&private_der)?;
        let public_key = parse_public_key(&public_der)?;

        if secret_key.public_key() != public_key {
            return Err(KeyError::KeyMismatch);
        }

        let point = public_key.to_encoded_point(false);

        Ok(Self {
            key_id: compute_key_id(&public_der),
            encoding_key: EncodingKey::from_ec_der(&pkcs8_der),
            // ring verifies against the raw uncompressed point
            decoding_key: DecodingKey::from_ec_der(point.as_bytes()),
            public_key,
        })
    }

    /// Content-addressed key id carried in every token header.
    #[must_use]
    pub fn current_key_id(&self) -> &str {
        &self.key_id
    }

    /// Key used to sign tokens.
    #[must_use]
    pub const fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    /// Key used to verify token signatures.
    #[must_use]
    pub const fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    /// Public half of the pair.
    #[must_use]
    pub const fn public_key(&self) -> &PublicKey {
        &self.public_key
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

/// `<tag>-es256-<hex(sha256(spki der))>`
#[must_use]
pub fn compute_key_id(public_der: &[u8]) -> String {
    let digest = Sha256::digest(public_der);
    format!("{KEY_ID_TAG}-es256-{}", hex::encode(digest))
}

fn read_resource(path: &Path) -> Result<String, KeyError> {
    std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            KeyError::ResourceNotFound {
                path: path.to_path_buf(),
            }
        } else {
            KeyError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

fn check_algorithm(oid: ObjectIdentifier, curve: Option<ObjectIdentifier>) -> Result<(), KeyError> {
    if oid != EC_PUBLIC_KEY_OID {
        return Err(KeyError::UnsupportedKeyType(format!(
            "expected an EC key, found algorithm {oid}"
        )));
    }
    match curve {
        Some(curve) if curve == P256_OID => Ok(()),
        Some(curve) => Err(KeyError::UnsupportedKeyType(format!(
            "expected curve P-256, found {curve}"
        ))),
        None => Err(KeyError::UnsupportedKeyType(
            "EC key without named curve".to_string(),
        )),
    }
}

/// Returns the secret key and a PKCS#8 encoding of it for the JWT signer.
fn parse_private_key(der: &[u8]) -> Result<(SecretKey, Zeroizing<Vec<u8>>), KeyError> {
    if let Ok(info) = PrivateKeyInfo::try_from(der) {
        check_algorithm(info.algorithm.oid, info.algorithm.parameters_oid().ok())?;
        let secret = SecretKey::from_pkcs8_der(der)
            .map_err(|e| KeyError::MalformedPem(format!("invalid PKCS#8 EC key: {e}")))?;
        return Ok((secret, Zeroizing::new(der.to_vec())));
    }

    // SEC1 `EC PRIVATE KEY` blocks carry no algorithm identifier
    let secret = SecretKey::from_sec1_der(der).map_err(|_| {
        KeyError::MalformedPem("private key is neither PKCS#8 nor SEC1 P-256".to_string())
    })?;
    let pkcs8 = secret
        .to_pkcs8_der()
        .map_err(|e| KeyError::MalformedPem(format!("cannot re-encode SEC1 key: {e}")))?;
    Ok((secret, Zeroizing::new(pkcs8.as_bytes().to_vec())))
}

fn parse_public_key(der: &[u8]) -> Result<PublicKey, KeyError> {
    let info = SubjectPublicKeyInfoRef::try_from(der)
        .map_err(|e| KeyError::MalformedPem(format!("invalid SubjectPublicKeyInfo: {e}")))?;
    check_algorithm(info.algorithm.oid, info.algorithm.parameters_oid().ok())?;

    PublicKey::from_public_key_der(der)
        .map_err(|e| KeyError::MalformedPem(format!("invalid P-256 public key: {e}")))
}
