//! Authentication gate: `Authorization: Bearer <jwt>` の検証 → AuthenticatedPrincipal を extensions に入れる
//!
//! - ヘッダが無い / Bearer 以外 → engine を呼ばずに 401 (MissingCredential)
//! - 検証失敗 → 401。理由コードはログにだけ出す (レスポンスには出さない)
//! - 生のトークンはログに出さない

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::services::auth::Rejection;
use crate::state::AppState;

/// 保護したい Router に認証を掛ける。
///
/// 例：
/// ```ignore
/// let v1 = api::v1::routes();
/// let v1 = middleware::auth::access::apply(v1, state.clone());
/// app = app.nest("/api/v1", v1);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = match bearer_token(req.headers()) {
        Ok(token) => token,
        Err(rejection) => {
            tracing::debug!(reason = rejection.code(), "no bearer credential");
            return Err(AppError::Unauthorized);
        }
    };

    let principal = match state.auth.authenticate(token, state.clock.now()) {
        Ok(principal) => principal,
        Err(rejection) => {
            tracing::warn!(
                reason = rejection.code(),
                "access token verification failed"
            );
            return Err(AppError::Unauthorized);
        }
    };

    tracing::debug!(issuer = %principal.issuer, "access token accepted");

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

/// Pull the token out of `Authorization: Bearer <token>`.
///
/// The scheme is matched case-insensitively; exactly one non-empty token must follow.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, Rejection> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(Rejection::MissingCredential)?;

    let (scheme, token) = value
        .trim()
        .split_once(' ')
        .ok_or(Rejection::MissingCredential)?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(Rejection::MissingCredential);
    }

    let token = token.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(Rejection::MissingCredential);
    }

    Ok(token)
}
