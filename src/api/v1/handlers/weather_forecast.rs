/*
 * Responsibility
 * - GET /api/v1/weather-forecast (保護対象のサンプル resource)
 * - 認証済み principal は AuthCtx extractor で受け取る
 */
use axum::Json;
use chrono::{Datelike, Days, NaiveDate, Utc};

use crate::api::v1::dto::weather_forecast::WeatherForecastResponse;
use crate::api::v1::extractors::AuthCtx;

pub const FORECAST_DAYS: u64 = 5;

const SUMMARIES: [&str; 10] = [
    "Freezing",
    "Bracing",
    "Chilly",
    "Cool",
    "Mild",
    "Warm",
    "Balmy",
    "Hot",
    "Sweltering",
    "Scorching",
];

pub async fn list_weather_forecasts(
    AuthCtx(principal): AuthCtx,
) -> Json<Vec<WeatherForecastResponse>> {
    tracing::debug!(
        issuer = %principal.issuer,
        expires_at = principal.expires_at,
        scope = ?principal.claim("scope"),
        "listing weather forecasts"
    );

    Json(forecasts_from(Utc::now().date_naive()))
}

/// Forecasts for the `FORECAST_DAYS` days following `today`. Deterministic per date.
pub fn forecasts_from(today: NaiveDate) -> Vec<WeatherForecastResponse> {
    (1..=FORECAST_DAYS)
        .filter_map(|offset| today.checked_add_days(Days::new(offset)))
        .map(|date| {
            // -20..=55 °C
            let temperature_c = (date.ordinal() as i32 * 37 + date.year() * 11).rem_euclid(76) - 20;
            let bucket = ((temperature_c + 20) as usize * SUMMARIES.len()) / 76;
            let summary = SUMMARIES[bucket.min(SUMMARIES.len() - 1)];
            WeatherForecastResponse::new(date, temperature_c, summary)
        })
        .collect()
}
