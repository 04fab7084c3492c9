//! Public-key material used to verify access-token signatures.
//!
//! Keys are loaded once at startup and are read-only afterwards. The verifying side
//! only ever holds the public half of the signing key pair.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use jsonwebtoken::{Algorithm, DecodingKey};

/// Where a PEM-encoded public key comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    /// PEM text supplied directly (e.g. from an environment variable).
    Pem(String),
    /// Path to a PEM file read at startup.
    File(PathBuf),
}

#[derive(Debug, thiserror::Error)]
pub enum KeyMaterialError {
    #[error("no key material configured for key id '{0}'")]
    UnknownKeyId(String),
    #[error("failed to read key file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid {algorithm:?} public key pem: {source}")]
    InvalidPem {
        algorithm: Algorithm,
        #[source]
        source: jsonwebtoken::errors::Error,
    },
    #[error("algorithm {0:?} is not an asymmetric signature algorithm")]
    UnsupportedAlgorithm(Algorithm),
    #[error("key '{key_id}' is not registered for {expected:?}")]
    AlgorithmMismatch { key_id: String, expected: Algorithm },
}

/// A loaded public key together with the one algorithm it may be used with.
///
/// Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct VerificationKey {
    algorithm: Algorithm,
    decoding_key: DecodingKey,
}

impl fmt::Debug for VerificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationKey")
            .field("algorithm", &self.algorithm)
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl VerificationKey {
    /// Parse a PEM public key for `algorithm`.
    ///
    /// Only asymmetric algorithms are accepted.
    pub fn from_pem(pem: &str, algorithm: Algorithm) -> Result<Self, KeyMaterialError> {
        let bytes = pem.as_bytes();
        let parsed = match algorithm {
            Algorithm::EdDSA => DecodingKey::from_ed_pem(bytes),
            Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(bytes),
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => DecodingKey::from_rsa_pem(bytes),
            // HMAC: a shared secret is not public-key material.
            _ => return Err(KeyMaterialError::UnsupportedAlgorithm(algorithm)),
        };

        let decoding_key =
            parsed.map_err(|source| KeyMaterialError::InvalidPem { algorithm, source })?;

        Ok(Self {
            algorithm,
            decoding_key,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

/// Lookup of verification keys by configured key identifier.
pub trait KeyMaterialProvider: Send + Sync {
    fn public_key(&self, key_id: &str) -> Result<VerificationKey, KeyMaterialError>;
}

/// Provider backed by keys registered at startup. No write path exists after construction.
#[derive(Debug, Default, Clone)]
pub struct StaticKeyProvider {
    keys: HashMap<String, VerificationKey>,
}

impl StaticKeyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `source` and register it under `key_id`.
    pub fn with_key(
        mut self,
        key_id: impl Into<String>,
        source: &KeySource,
        algorithm: Algorithm,
    ) -> Result<Self, KeyMaterialError> {
        let pem = match source {
            KeySource::Pem(pem) => pem.clone(),
            KeySource::File(path) => {
                std::fs::read_to_string(path).map_err(|source| KeyMaterialError::Read {
                    path: path.clone(),
                    source,
                })?
            }
        };

        let key = VerificationKey::from_pem(&pem, algorithm)?;
        self.keys.insert(key_id.into(), key);
        Ok(self)
    }
}

impl KeyMaterialProvider for StaticKeyProvider {
    fn public_key(&self, key_id: &str) -> Result<VerificationKey, KeyMaterialError> {
        self.keys
            .get(key_id)
            .cloned()
            .ok_or_else(|| KeyMaterialError::UnknownKeyId(key_id.to_string()))
    }
}
