/*
 * Responsibility
 * - 環境変数の読み込み (PORT, CORS 許可, issuer/audience/algorithm, 公開鍵など)
 * - 設定値のバリデーション (不足なら起動失敗)
 * - 起動後は不変 (runtime reconfiguration はしない)
 */
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use jsonwebtoken::Algorithm;

use crate::services::auth::{AuthSettings, KeySource, DEFAULT_MAX_TOKEN_BYTES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn parse(value: Option<&str>) -> Self {
        match value.unwrap_or("development").to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub http_timeout_seconds: u64,
    pub http_body_limit_bytes: usize,
    pub access_token_max_bytes: usize,

    pub auth_issuer: String,
    pub auth_audiences: Vec<String>,
    pub auth_algorithm: Algorithm,
    pub auth_key_id: String,
    pub access_token_leeway_seconds: u64,
    pub auth_principal_claims: Vec<String>,

    pub access_jwt_public_key: KeySource,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match lookup("PORT") {
            Some(s) => s.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV").as_deref());

        let cors_allowed_origins = split_list(lookup("CORS_ALLOWED_ORIGINS"));

        let http_timeout_seconds = match lookup("HTTP_TIMEOUT_SECONDS") {
            Some(v) => positive(&v).ok_or(ConfigError::Invalid("HTTP_TIMEOUT_SECONDS"))?,
            None => 30,
        };

        let http_body_limit_bytes = match lookup("HTTP_BODY_LIMIT_BYTES") {
            Some(v) => positive(&v).ok_or(ConfigError::Invalid("HTTP_BODY_LIMIT_BYTES"))?,
            None => 1024 * 1024,
        };

        let access_token_max_bytes = match lookup("ACCESS_TOKEN_MAX_BYTES") {
            Some(v) => positive(&v).ok_or(ConfigError::Invalid("ACCESS_TOKEN_MAX_BYTES"))?,
            None => DEFAULT_MAX_TOKEN_BYTES,
        };

        let auth_issuer = lookup("AUTH_ISSUER")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("AUTH_ISSUER"))?;

        let auth_audiences = split_list(lookup("AUTH_AUDIENCE"));
        if auth_audiences.is_empty() {
            return Err(ConfigError::Missing("AUTH_AUDIENCE"));
        }

        let auth_algorithm = match lookup("AUTH_ALGORITHM") {
            Some(alg) => Algorithm::from_str(alg.trim())
                .map_err(|_| ConfigError::Invalid("AUTH_ALGORITHM"))?,
            None => Algorithm::EdDSA,
        };

        let auth_key_id = lookup("AUTH_KEY_ID")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "access".to_string());

        // Zero tolerance unless explicitly configured.
        let access_token_leeway_seconds = match lookup("ACCESS_TOKEN_LEEWAY_SECONDS") {
            Some(v) => v
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("ACCESS_TOKEN_LEEWAY_SECONDS"))?,
            None => 0,
        };

        let auth_principal_claims = split_list(lookup("AUTH_PRINCIPAL_CLAIMS"));

        let access_jwt_public_key = match (
            lookup("ACCESS_JWT_PUBLIC_KEY_PEM"),
            lookup("ACCESS_JWT_PUBLIC_KEY_PATH"),
        ) {
            (Some(pem), _) => KeySource::Pem(pem.replace("\\n", "\n")),
            (None, Some(path)) => KeySource::File(PathBuf::from(path)),
            (None, None) => return Err(ConfigError::Missing("ACCESS_JWT_PUBLIC_KEY_PEM")),
        };

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            http_timeout_seconds,
            http_body_limit_bytes,
            access_token_max_bytes,
            auth_issuer,
            auth_audiences,
            auth_algorithm,
            auth_key_id,
            access_token_leeway_seconds,
            auth_principal_claims,
            access_jwt_public_key,
        })
    }

    pub fn auth_settings(&self) -> AuthSettings {
        AuthSettings {
            issuer: self.auth_issuer.clone(),
            audiences: self.auth_audiences.clone(),
            algorithm: self.auth_algorithm,
            key_id: self.auth_key_id.clone(),
            leeway_seconds: self.access_token_leeway_seconds,
            principal_claims: self.auth_principal_claims.clone(),
            max_token_bytes: self.access_token_max_bytes,
        }
    }
}

/// Non-zero unsigned integer.
fn positive<T>(value: &str) -> Option<T>
where
    T: FromStr + Default + PartialEq,
{
    value
        .trim()
        .parse::<T>()
        .ok()
        .filter(|n| *n != T::default())
}

fn split_list(value: Option<String>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
