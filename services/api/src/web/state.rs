//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use rytu_mitra_core::ports::{
    CropImageAnalysisService, DatabaseService, FarmingAdviceService, WeatherService,
};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
    pub advisor: Arc<dyn FarmingAdviceService>,
    pub image_analyzer: Arc<dyn CropImageAnalysisService>,
    pub weather: Arc<dyn WeatherService>,
}
