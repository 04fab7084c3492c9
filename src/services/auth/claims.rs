//! Access-token claims and their validation against the configured trust policy.
//!
//! The current time is always passed in by the caller; nothing in this module reads
//! the system clock.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::services::auth::rejection::Rejection;

/// `aud` may be a single string or an array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    Single(String),
    Many(Vec<String>),
}

impl Audience {
    pub fn contains(&self, expected: &str) -> bool {
        match self {
            Self::Single(aud) => aud == expected,
            Self::Many(auds) => auds.iter().any(|aud| aud == expected),
        }
    }

    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::Single(aud) => vec![aud.clone()],
            Self::Many(auds) => auds.clone(),
        }
    }
}

/// Payload claims of an access token.
///
/// Registered claims are optional at the type level so that a missing claim
/// surfaces as a specific rejection instead of a parse failure.
#[derive(Clone, Default, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub iss: Option<String>,
    #[serde(default)]
    pub aud: Option<Audience>,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub nbf: Option<i64>,
    #[serde(default)]
    pub iat: Option<i64>,

    /// Everything else in the payload.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// `sub` identifies a user or client and stays out of logs.
impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("iss", &self.iss)
            .field("aud", &self.aud)
            .field("sub", &self.sub.as_ref().map(|_| "[REDACTED]"))
            .field("exp", &self.exp)
            .field("nbf", &self.nbf)
            .field("iat", &self.iat)
            .field("extra", &self.extra.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Issuer/audience/time expectations every accepted token must meet.
#[derive(Debug, Clone)]
pub struct ClaimsValidator {
    issuer: String,
    audiences: Vec<String>,
    leeway_seconds: i64,
}

impl ClaimsValidator {
    /// `audiences` is the set of accepted audiences; a token matches when its `aud`
    /// contains at least one of them.
    pub fn new(issuer: impl Into<String>, audiences: Vec<String>, leeway_seconds: u64) -> Self {
        Self {
            issuer: issuer.into(),
            audiences,
            leeway_seconds: i64::try_from(leeway_seconds).unwrap_or(i64::MAX),
        }
    }

    /// Checks run in a fixed order and stop at the first failure:
    /// issuer, audience, expiry, not-before, issued-at.
    ///
    /// With zero leeway a token expires at `exp` itself (`now == exp` is rejected).
    pub fn validate(&self, claims: &Claims, now: i64) -> Result<(), Rejection> {
        match claims.iss.as_deref() {
            Some(iss) if iss == self.issuer => {}
            _ => return Err(Rejection::IssuerMismatch),
        }

        let audience_ok = claims.aud.as_ref().is_some_and(|aud| {
            self.audiences
                .iter()
                .any(|expected| aud.contains(expected))
        });
        if !audience_ok {
            return Err(Rejection::AudienceMismatch);
        }

        let exp = claims.exp.ok_or(Rejection::Expired)?;
        if now >= exp.saturating_add(self.leeway_seconds) {
            return Err(Rejection::Expired);
        }

        let skewed_now = now.saturating_add(self.leeway_seconds);
        if let Some(nbf) = claims.nbf
            && skewed_now < nbf
        {
            return Err(Rejection::NotYetValid);
        }
        if let Some(iat) = claims.iat
            && skewed_now < iat
        {
            return Err(Rejection::NotYetValid);
        }

        Ok(())
    }
}
