//! crates/rytu_mitra_core/src/client/display.rs
//!
//! Read-only dashboard widgets: the weather card and the crop-health series.
//! Both fall back to fixed values when there is nothing to show.

use crate::domain::{CropHealthPoint, Language, WeatherReport};
use crate::ports::HostedBackend;
use tracing::{error, warn};
use uuid::Uuid;

//=========================================================================================
// Weather
//=========================================================================================

pub const FALLBACK_TEMPERATURE: f64 = 28.0;
pub const FALLBACK_HUMIDITY: f64 = 65.0;
pub const FALLBACK_WIND_SPEED: f64 = 12.0;
pub const FALLBACK_RAINFALL: f64 = 0.0;

/// The formatted weather card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherDisplay {
    pub location: String,
    pub temperature: String,
    pub humidity: String,
    pub wind_speed: String,
    pub rainfall: String,
}

impl WeatherDisplay {
    pub fn from_report(location: &str, report: Option<&WeatherReport>) -> Self {
        let reading = |value: Option<f64>, fallback: f64| value.unwrap_or(fallback);
        let report = report.cloned().unwrap_or_default();
        Self {
            location: location.to_string(),
            temperature: format!("{}°C", reading(report.temperature, FALLBACK_TEMPERATURE)),
            humidity: format!("{}%", reading(report.humidity, FALLBACK_HUMIDITY)),
            wind_speed: format!("{} km/h", reading(report.wind_speed, FALLBACK_WIND_SPEED)),
            rainfall: format!("{} mm", reading(report.rainfall, FALLBACK_RAINFALL)),
        }
    }
}

/// The advisory line under the weather card.
pub fn weather_advice(language: Language) -> &'static str {
    language.pick(
        "Weather conditions are favorable for farming activities",
        "వ్యవసాయ కార్యకలాపాలకు వాతావరణ పరిస్థితులు అనుకూలంగా ఉన్నాయి",
    )
}

/// Loads the weather card. A failed fetch is logged and shown with fallback values.
pub async fn fetch_weather(backend: &dyn HostedBackend, location: &str) -> WeatherDisplay {
    match backend.invoke_weather(location).await {
        Ok(report) => WeatherDisplay::from_report(location, Some(&report)),
        Err(e) => {
            error!(error = %e, location, "Weather fetch error.");
            WeatherDisplay::from_report(location, None)
        }
    }
}

//=========================================================================================
// Crop health
//=========================================================================================

/// How many points the trend chart shows.
pub const CROP_HEALTH_LIMIT: u32 = 10;

/// One point of the trend chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropHealthSample {
    pub label: String,
    pub health: i32,
}

impl CropHealthSample {
    fn new(label: impl Into<String>, health: i32) -> Self {
        Self {
            label: label.into(),
            health,
        }
    }
}

impl From<&CropHealthPoint> for CropHealthSample {
    fn from(point: &CropHealthPoint) -> Self {
        Self::new(point.created_at.format("%d/%m/%Y").to_string(), point.health_score)
    }
}

/// Shown when the farmer has no stored measurements yet.
pub fn fallback_crop_health() -> Vec<CropHealthSample> {
    vec![
        CropHealthSample::new("Day 1", 75),
        CropHealthSample::new("Day 3", 78),
        CropHealthSample::new("Day 5", 82),
        CropHealthSample::new("Day 7", 85),
        CropHealthSample::new("Day 9", 88),
    ]
}

/// Loads the trend series for the signed-in user.
pub async fn fetch_crop_health(
    backend: &dyn HostedBackend,
    user_id: Option<Uuid>,
) -> Vec<CropHealthSample> {
    let Some(user_id) = user_id else {
        return Vec::new();
    };
    match backend.crop_health(user_id, CROP_HEALTH_LIMIT).await {
        Ok(points) if points.is_empty() => fallback_crop_health(),
        Ok(points) => points.iter().map(CropHealthSample::from).collect(),
        Err(e) => {
            warn!(error = %e, "Error fetching crop health.");
            fallback_crop_health()
        }
    }
}
