pub mod health;
pub mod weather_forecast;
