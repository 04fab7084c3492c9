/*
 * Responsibility
 * - WeatherForecast の response DTO
 */
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherForecastResponse {
    pub date: NaiveDate,
    pub temperature_c: i32,
    pub temperature_f: i32,
    pub summary: String,
}

impl WeatherForecastResponse {
    pub fn new(date: NaiveDate, temperature_c: i32, summary: impl Into<String>) -> Self {
        Self {
            date,
            temperature_c,
            temperature_f: 32 + (temperature_c as f64 / 0.5556) as i32,
            summary: summary.into(),
        }
    }
}
