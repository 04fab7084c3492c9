/*
 * Responsibility
 * - tracing / panic hook の初期化
 * - Config 読み込み → 依存生成 (鍵の読み込みに失敗したら起動しない) → Router 組み立て
 * - Middleware の適用 (Bearer 認証 / CORS / HTTP 共通)
 * - axum::serve() で起動
 */
use std::{panic, process};

use axum::{Router, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::{self, v1::handlers::health::health};
use crate::config::Config;
use crate::error::{AppError, StartupError};
use crate::middleware;
use crate::services::auth::build_authenticator;
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,webapi_oauth=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Surface panics via tracing too; stderr may not be collected.
        tracing::error!(?info, "panic");

        // Development: crash immediately so the panic is noticed.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<(), StartupError> {
    init_tracing();

    let config = Config::from_env().inspect_err(|err| {
        tracing::error!(error = %err, "configuration rejected");
    })?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config)?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Process-level services, built once and injected into the shared state.
pub fn build_state(config: &Config) -> Result<AppState, StartupError> {
    let auth = build_authenticator(config).inspect_err(|err| {
        tracing::error!(error = %err, "access token key material unavailable");
    })?;

    Ok(AppState::new(auth))
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let v1 = middleware::auth::access::apply(api::v1::routes(), state.clone());

    let router = Router::new()
        .route("/health", get(health))
        .nest("/api/v1", v1)
        .fallback(|| async { AppError::not_found("route") })
        .with_state(state);

    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router, config)
}
