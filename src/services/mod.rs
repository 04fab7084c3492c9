/*
 * Responsibility
 * - token validation (auth) と時刻ソース (clock) の公開
 */
pub mod auth;
pub mod clock;
