/*!
 * Authentication context extractor
 *
 * Responsibility:
 * - 認証済みリクエストの principal を handler に提供する
 * - 検証ロジックは middleware/services 側。ここは extensions から取り出すだけ
 *
 * Public API:
 * - AuthCtx
 */

mod core;

pub use core::AuthCtx;
