//! Factory: build the process-wide `TokenAuthenticator` from application `Config`.
//!
//! Any key-material problem is returned to the caller, which aborts startup.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::{KeyMaterialError, StaticKeyProvider, TokenAuthenticator};

pub fn build_authenticator(config: &Config) -> Result<Arc<TokenAuthenticator>, KeyMaterialError> {
    let keys = StaticKeyProvider::new().with_key(
        config.auth_key_id.clone(),
        &config.access_jwt_public_key,
        config.auth_algorithm,
    )?;

    let auth = TokenAuthenticator::new(&config.auth_settings(), &keys)?;

    tracing::info!(
        algorithm = ?auth.algorithm(),
        key_id = %config.auth_key_id,
        issuer = %config.auth_issuer,
        audiences = ?config.auth_audiences,
        leeway_seconds = config.access_token_leeway_seconds,
        max_token_bytes = config.access_token_max_bytes,
        "access token authenticator ready"
    );

    Ok(Arc::new(auth))
}
