//! Access-token authentication: parse → verify signature → validate claims → principal.
//!
//! `TokenAuthenticator` is built once from `AuthSettings` and shared read-only across
//! requests. `authenticate` is a pure function of the token and the supplied clock
//! value, so the same input always yields the same outcome.

use jsonwebtoken::Algorithm;
use serde_json::{Map, Value};
use tracing::instrument;

use crate::services::auth::claims::ClaimsValidator;
use crate::services::auth::key_material::{
    KeyMaterialError, KeyMaterialProvider, VerificationKey,
};
use crate::services::auth::principal::AuthenticatedPrincipal;
use crate::services::auth::rejection::Rejection;
use crate::services::auth::signature::SignatureVerifier;
use crate::services::auth::token::ParsedToken;

/// Trust configuration for the authenticator.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub issuer: String,
    pub audiences: Vec<String>,
    pub algorithm: Algorithm,
    /// Identifier handed to the key provider.
    pub key_id: String,
    pub leeway_seconds: u64,
    /// Payload claims copied into `AuthenticatedPrincipal::claims`.
    pub principal_claims: Vec<String>,
    /// Raw tokens longer than this are `Malformed`.
    pub max_token_bytes: usize,
}

#[derive(Debug)]
pub struct TokenAuthenticator {
    key: VerificationKey,
    verifier: SignatureVerifier,
    claims_validator: ClaimsValidator,
    principal_claims: Vec<String>,
    max_token_bytes: usize,
}

impl TokenAuthenticator {
    /// Resolve key material and pin the algorithm.
    ///
    /// Fails with `KeyMaterialError` when the configured key is missing or was loaded
    /// for a different algorithm; callers treat this as a startup fault.
    pub fn new(
        settings: &AuthSettings,
        keys: &dyn KeyMaterialProvider,
    ) -> Result<Self, KeyMaterialError> {
        let key = keys.public_key(&settings.key_id)?;
        if key.algorithm() != settings.algorithm {
            return Err(KeyMaterialError::AlgorithmMismatch {
                key_id: settings.key_id.clone(),
                expected: settings.algorithm,
            });
        }

        Ok(Self {
            key,
            verifier: SignatureVerifier::new(settings.algorithm),
            claims_validator: ClaimsValidator::new(
                settings.issuer.clone(),
                settings.audiences.clone(),
                settings.leeway_seconds,
            ),
            principal_claims: settings.principal_claims.clone(),
            max_token_bytes: settings.max_token_bytes,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.verifier.algorithm()
    }

    /// Authenticate a raw bearer token at time `now` (seconds since epoch, UTC).
    #[instrument(skip_all)]
    pub fn authenticate(&self, raw: &str, now: i64) -> Result<AuthenticatedPrincipal, Rejection> {
        let token = ParsedToken::parse(raw, self.max_token_bytes).map_err(|err| {
            tracing::debug!(error = %err, "token parse failed");
            Rejection::Malformed
        })?;

        if !self.verifier.verify(&token, &self.key) {
            return Err(Rejection::InvalidSignature);
        }

        self.claims_validator.validate(&token.claims, now)?;

        self.principal_from(token)
    }

    fn principal_from(&self, token: ParsedToken<'_>) -> Result<AuthenticatedPrincipal, Rejection> {
        let mut claims = token.claims;

        // Registered claims live in typed fields, everything else in `extra`.
        let mut selected = Map::new();
        for name in &self.principal_claims {
            let value = match name.as_str() {
                "iss" => claims.iss.clone().map(Value::from),
                "sub" => claims.sub.clone().map(Value::from),
                "aud" => claims
                    .aud
                    .as_ref()
                    .and_then(|aud| serde_json::to_value(aud).ok()),
                "exp" => claims.exp.map(Value::from),
                "nbf" => claims.nbf.map(Value::from),
                "iat" => claims.iat.map(Value::from),
                _ => claims.extra.remove(name),
            };
            if let Some(value) = value {
                selected.insert(name.clone(), value);
            }
        }

        let subject = claims
            .sub
            .take()
            .filter(|sub| !sub.trim().is_empty())
            .ok_or(Rejection::Malformed)?;

        // The validator has already required these; absence here would be a logic error.
        let (Some(issuer), Some(audience), Some(expires_at)) = (claims.iss, claims.aud, claims.exp)
        else {
            return Err(Rejection::Malformed);
        };

        Ok(AuthenticatedPrincipal {
            subject,
            issuer,
            audiences: audience.to_vec(),
            expires_at,
            claims: selected,
        })
    }
}
