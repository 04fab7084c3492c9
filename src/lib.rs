//! Bearer-token authentication gate for an axum HTTP API.
//!
//! Every request under `/api/v1` must carry `Authorization: Bearer <jwt>`. The token is
//! verified against a public key pinned to one algorithm, then its issuer, audience and
//! time bounds are checked against the configured trust policy. Anything else is a 401.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
