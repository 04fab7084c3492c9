/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - v1 配下はすべて保護対象。認証は app.rs で middleware::auth::access::apply によって掛ける
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::weather_forecast::list_weather_forecasts;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/weather-forecast", get(list_weather_forecasts))
}
