//! services/api/src/adapters/weather.rs
//!
//! A `WeatherService` with no live provider behind it. It answers every
//! location with the same baseline readings, which is also what the dashboard
//! falls back to when the weather function is unreachable.

use async_trait::async_trait;
use rytu_mitra_core::client::display::{
    FALLBACK_HUMIDITY, FALLBACK_RAINFALL, FALLBACK_TEMPERATURE, FALLBACK_WIND_SPEED,
};
use rytu_mitra_core::domain::WeatherReport;
use rytu_mitra_core::ports::{PortResult, WeatherService};
use tracing::debug;

#[derive(Clone, Copy, Debug, Default)]
pub struct BaselineWeatherAdapter;

impl BaselineWeatherAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WeatherService for BaselineWeatherAdapter {
    async fn current_weather(&self, location: &str) -> PortResult<WeatherReport> {
        debug!(%location, "Serving baseline weather readings.");
        Ok(WeatherReport {
            temperature: Some(FALLBACK_TEMPERATURE),
            humidity: Some(FALLBACK_HUMIDITY),
            wind_speed: Some(FALLBACK_WIND_SPEED),
            rainfall: Some(FALLBACK_RAINFALL),
        })
    }
}
