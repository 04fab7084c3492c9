/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - auth: TokenAuthenticator (起動時に構築、以後 read-only)
 *   - clock: 検証時刻のソース (本番は SystemClock、テストは FixedClock)
 * - Clone 前提で持つ (内部は Arc なので Clone cheap)
 */
use std::sync::Arc;

use crate::services::auth::TokenAuthenticator;
use crate::services::clock::{Clock, SystemClock};

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<TokenAuthenticator>,
    pub clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(auth: Arc<TokenAuthenticator>) -> Self {
        Self::with_clock(auth, Arc::new(SystemClock))
    }

    pub fn with_clock(auth: Arc<TokenAuthenticator>, clock: Arc<dyn Clock>) -> Self {
        Self { auth, clock }
    }
}
