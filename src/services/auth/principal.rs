use std::fmt;

use serde_json::{Map, Value};

/// Identity established by a fully validated access token.
///
/// Built once per request by `TokenAuthenticator` and never mutated afterwards.
#[derive(Clone, PartialEq)]
pub struct AuthenticatedPrincipal {
    pub subject: String,
    pub issuer: String,
    pub audiences: Vec<String>,
    /// `exp` (seconds since epoch, UTC).
    pub expires_at: i64,
    /// Extra payload claims the deployment asked to carry along (e.g. `scope`, `roles`).
    pub claims: Map<String, Value>,
}

impl fmt::Debug for AuthenticatedPrincipal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedPrincipal")
            .field("subject", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("audiences", &self.audiences)
            .field("expires_at", &self.expires_at)
            .field("claims", &self.claims.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl AuthenticatedPrincipal {
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }
}
