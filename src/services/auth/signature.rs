//! Signature verification pinned to a single configured algorithm.

use jsonwebtoken::{Algorithm, Validation};

use crate::services::auth::key_material::VerificationKey;
use crate::services::auth::token::ParsedToken;

/// Verifies compact JWS signatures for exactly one algorithm.
///
/// Claim checks are deliberately switched off in the underlying `Validation`: issuer,
/// audience and time bounds belong to `ClaimsValidator`, which works against an
/// injected clock.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    algorithm: Algorithm,
    validation: Validation,
}

impl SignatureVerifier {
    pub fn new(algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;

        Self {
            algorithm,
            validation,
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// `true` only when the header declares the pinned algorithm, the key belongs to
    /// it, and the signature over the raw `header.payload` bytes checks out.
    pub fn verify(&self, token: &ParsedToken<'_>, key: &VerificationKey) -> bool {
        // Compare the declared name before handing anything to the crypto backend.
        if !alg_name_matches(&token.header.alg, self.algorithm) {
            tracing::debug!(declared = %token.header.alg, "token algorithm does not match the pinned algorithm");
            return false;
        }
        if key.algorithm() != self.algorithm {
            tracing::warn!(
                key_algorithm = ?key.algorithm(),
                "verification key is not registered for the pinned algorithm"
            );
            return false;
        }

        match jsonwebtoken::decode::<serde_json::Value>(
            token.raw(),
            key.decoding_key(),
            &self.validation,
        ) {
            Ok(_) => true,
            Err(err) => {
                tracing::debug!(error = %err, "token signature verification failed");
                false
            }
        }
    }
}

fn alg_name_matches(declared: &str, expected: Algorithm) -> bool {
    declared
        .parse::<Algorithm>()
        .is_ok_and(|declared| declared == expected)
}
