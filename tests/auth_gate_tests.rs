//! Authentication gate integration tests.
//!
//! Drives the full router (gate, CORS, HTTP layers, protected resource) in-process and
//! mints tokens with the fixture keys under `tests/fixtures/`.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::{Value, json};
use tower::ServiceExt;

use webapi_oauth::api::v1::dto::weather_forecast::WeatherForecastResponse;
use webapi_oauth::app::{build_router, build_state};
use webapi_oauth::config::{Config, ConfigError};
use webapi_oauth::error::StartupError;
use webapi_oauth::services::clock::FixedClock;
use webapi_oauth::state::AppState;

const ED25519_PRIVATE_PEM: &str = include_str!("fixtures/ed25519_private.pem");
const ED25519_PUBLIC_PEM: &str = include_str!("fixtures/ed25519_public.pem");
const UNTRUSTED_PRIVATE_PEM: &str = include_str!("fixtures/untrusted_ed25519_private.pem");
const ES256_PUBLIC_PEM: &str = include_str!("fixtures/es256_public.pem");

const ISSUER: &str = "https://login.example.com/tenant/v2.0";
const AUDIENCE: &str = "web-api-oauth-test";
const FORECAST_PATH: &str = "/api/v1/weather-forecast";

fn config_with(overrides: &[(&str, &str)]) -> Config {
    Config::from_lookup(|key| {
        if let Some((_, v)) = overrides.iter().rev().find(|(k, _)| *k == key) {
            return Some(v.to_string());
        }
        match key {
            "AUTH_ISSUER" => Some(ISSUER.to_string()),
            "AUTH_AUDIENCE" => Some(AUDIENCE.to_string()),
            "ACCESS_JWT_PUBLIC_KEY_PEM" => Some(ED25519_PUBLIC_PEM.to_string()),
            _ => None,
        }
    })
    .expect("test config should be valid")
}

fn config() -> Config {
    config_with(&[])
}

fn app() -> Router {
    let config = config();
    let state = build_state(&config).expect("state should build");
    build_router(state, &config)
}

fn app_at(now: i64) -> Router {
    let config = config();
    let state = build_state(&config).expect("state should build");
    let state = AppState::with_clock(state.auth, Arc::new(FixedClock(now)));
    build_router(state, &config)
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

fn claims(exp: i64) -> Value {
    json!({
        "iss": ISSUER,
        "aud": AUDIENCE,
        "sub": "00000000-0000-0000-0000-000000000001",
        "exp": exp,
        "iat": exp - 7200,
    })
}

fn sign_with(private_pem: &str, claims: &Value) -> String {
    let key = EncodingKey::from_ed_pem(private_pem.as_bytes()).expect("fixture key");
    let mut header = Header::new(Algorithm::EdDSA);
    header.typ = Some("JWT".to_string());
    encode(&header, claims, &key).expect("token should sign")
}

fn sign(claims: &Value) -> String {
    sign_with(ED25519_PRIVATE_PEM, claims)
}

fn get(path: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).expect("request should build")
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be json")
}

async fn assert_unauthorized(response: axum::response::Response) {
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .expect("challenge header"),
        "Bearer"
    );
    assert_eq!(
        body_json(response).await,
        json!({"error": {"code": "UNAUTHORIZED", "message": "unauthorized"}})
    );
}

#[tokio::test]
async fn test_valid_token_returns_five_forecasts() {
    let token = sign(&claims(now() + 3600));

    let response = app().oneshot(get(FORECAST_PATH, Some(&token))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let forecasts: Vec<WeatherForecastResponse> = serde_json::from_value(body).unwrap();
    assert_eq!(forecasts.len(), 5);
}

#[tokio::test]
async fn test_missing_authorization_header_is_401() {
    let response = app().oneshot(get(FORECAST_PATH, None)).await.unwrap();
    assert_unauthorized(response).await;
}

#[tokio::test]
async fn test_non_bearer_scheme_is_401() {
    let request = Request::builder()
        .uri(FORECAST_PATH)
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_unauthorized(response).await;
}

#[tokio::test]
async fn test_lowercase_bearer_scheme_is_accepted() {
    let token = sign(&claims(now() + 3600));
    let request = Request::builder()
        .uri(FORECAST_PATH)
        .header(header::AUTHORIZATION, format!("bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_expired_token_is_401() {
    let token = sign(&claims(now() - 3600));

    let response = app().oneshot(get(FORECAST_PATH, Some(&token))).await.unwrap();
    assert_unauthorized(response).await;
}

#[tokio::test]
async fn test_wrong_audience_is_401() {
    let mut wrong = claims(now() + 3600);
    wrong["aud"] = json!("invalid");
    let token = sign(&wrong);

    let response = app().oneshot(get(FORECAST_PATH, Some(&token))).await.unwrap();
    assert_unauthorized(response).await;
}

#[tokio::test]
async fn test_wrong_issuer_is_401() {
    let mut wrong = claims(now() + 3600);
    wrong["iss"] = json!("https://attacker.example");
    let token = sign(&wrong);

    let response = app().oneshot(get(FORECAST_PATH, Some(&token))).await.unwrap();
    assert_unauthorized(response).await;
}

#[tokio::test]
async fn test_token_signed_by_other_key_is_401() {
    let token = sign_with(UNTRUSTED_PRIVATE_PEM, &claims(now() + 3600));

    let response = app().oneshot(get(FORECAST_PATH, Some(&token))).await.unwrap();
    assert_unauthorized(response).await;
}

#[tokio::test]
async fn test_malformed_token_is_401() {
    let response = app()
        .oneshot(get(FORECAST_PATH, Some("not-a-jwt")))
        .await
        .unwrap();
    assert_unauthorized(response).await;
}

#[tokio::test]
async fn test_token_size_cap_follows_config() {
    let token = sign(&claims(now() + 3600));
    let limit = (token.len() - 1).to_string();
    let config = config_with(&[("ACCESS_TOKEN_MAX_BYTES", limit.as_str())]);
    let app = build_router(build_state(&config).expect("state should build"), &config);

    let response = app.oneshot(get(FORECAST_PATH, Some(&token))).await.unwrap();
    assert_unauthorized(response).await;
}

#[test]
fn test_zero_timeout_is_rejected_at_startup() {
    let err = Config::from_lookup(|key| match key {
        "AUTH_ISSUER" => Some(ISSUER.to_string()),
        "AUTH_AUDIENCE" => Some(AUDIENCE.to_string()),
        "ACCESS_JWT_PUBLIC_KEY_PEM" => Some(ED25519_PUBLIC_PEM.to_string()),
        "HTTP_TIMEOUT_SECONDS" => Some("0".to_string()),
        _ => None,
    })
    .unwrap_err();
    assert_eq!(err, ConfigError::Invalid("HTTP_TIMEOUT_SECONDS"));
}

#[tokio::test]
async fn test_expiry_boundary_with_fixed_clock() {
    const NOW: i64 = 1_800_000_000;

    let at_now = sign(&claims(NOW));
    let response = app_at(NOW)
        .oneshot(get(FORECAST_PATH, Some(&at_now)))
        .await
        .unwrap();
    assert_unauthorized(response).await;

    let one_second_left = sign(&claims(NOW + 1));
    let response = app_at(NOW)
        .oneshot(get(FORECAST_PATH, Some(&one_second_left)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_rejections_are_indistinguishable() {
    let mut wrong_aud = claims(now() + 3600);
    wrong_aud["aud"] = json!("invalid");

    let tokens = [
        sign(&claims(now() - 3600)),
        sign(&wrong_aud),
        sign_with(UNTRUSTED_PRIVATE_PEM, &claims(now() + 3600)),
        "garbage".to_string(),
    ];

    let mut bodies = Vec::new();
    for token in &tokens {
        let response = app().oneshot(get(FORECAST_PATH, Some(token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        bodies.push(body_json(response).await);
    }
    assert!(bodies.windows(2).all(|pair| pair[0] == pair[1]));
}

#[tokio::test]
async fn test_same_token_same_result() {
    let token = sign(&claims(now() + 3600));
    let app = app();

    let first = app
        .clone()
        .oneshot(get(FORECAST_PATH, Some(&token)))
        .await
        .unwrap();
    let second = app.oneshot(get(FORECAST_PATH, Some(&token))).await.unwrap();

    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_is_public() {
    let response = app().oneshot(get("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let response = app().oneshot(get("/nope", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-123")
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.headers().get("x-request-id").unwrap(), "req-123");
}

#[test]
fn test_unusable_key_material_fails_startup() {
    let config = config_with(&[("ACCESS_JWT_PUBLIC_KEY_PEM", "not a pem")]);
    let err = build_state(&config).unwrap_err();
    assert!(matches!(err, StartupError::KeyMaterialUnavailable(_)));

    // Key of another family than the pinned algorithm.
    let config = config_with(&[("ACCESS_JWT_PUBLIC_KEY_PEM", ES256_PUBLIC_PEM)]);
    assert!(matches!(
        build_state(&config).unwrap_err(),
        StartupError::KeyMaterialUnavailable(_)
    ));

    let config = Config::from_lookup(|key| match key {
        "AUTH_ISSUER" => Some(ISSUER.to_string()),
        "AUTH_AUDIENCE" => Some(AUDIENCE.to_string()),
        "ACCESS_JWT_PUBLIC_KEY_PATH" => Some("/nonexistent/access.pem".to_string()),
        _ => None,
    })
    .unwrap();
    assert!(matches!(
        build_state(&config).unwrap_err(),
        StartupError::KeyMaterialUnavailable(_)
    ));
}

#[test]
fn test_key_material_from_file() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/ed25519_public.pem");
    let config = Config::from_lookup(|key| match key {
        "AUTH_ISSUER" => Some(ISSUER.to_string()),
        "AUTH_AUDIENCE" => Some(AUDIENCE.to_string()),
        "ACCESS_JWT_PUBLIC_KEY_PATH" => Some(path.to_string()),
        _ => None,
    })
    .unwrap();
    assert!(build_state(&config).is_ok());
}
