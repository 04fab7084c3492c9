use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::AuthenticatedPrincipal;

/// Handler で認証済み principal を受け取るための extractor
/// middleware が AuthenticatedPrincipal を request.extensions() に insert 済みである前提
/// 見つからない場合は 401 を返す（ミドルウェア未設定のルートでも fail closed）
#[derive(Debug, Clone)]
pub struct AuthCtx(pub AuthenticatedPrincipal);

impl<S> FromRequestParts<S> for AuthCtx
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedPrincipal>()
            .cloned()
            .map(AuthCtx)
            .ok_or(AppError::Unauthorized)
    }
}
