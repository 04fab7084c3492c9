/*
 * Responsibility
 * - middleware の公開インターフェース
 *   - auth: Bearer 認証 gate (保護対象の Router にだけ掛ける)
 *   - cors / http: 全ルート共通の横断的関心事
 */
pub mod auth;
pub mod cors;
pub mod http;
