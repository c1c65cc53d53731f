//! services/api/src/web/proxy.rs
//!
//! The three function routes. Each takes a small JSON body, forwards it to the
//! matching service port and answers with JSON. Failures answer `{"error": ...}`.

use crate::error::RouteError;
use crate::web::protocol::{
    ChatRequest, ChatResponse, ErrorBody, PestDetectionRequest, PestDetectionResponse,
    WeatherRequest, WeatherResponse,
};
use crate::web::state::AppState;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use regex::Regex;
use rytu_mitra_core::domain::{Language, PestReport};
use std::sync::{Arc, LazyLock};
use std::time::Instant;
use tracing::info;

static IMAGE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(data:image/[A-Za-z0-9.+-]+;base64,|https?://)").expect("image url pattern")
});

/// Accepts a base64 image data URL or an http(s) URL.
fn is_supported_image(image: &str) -> bool {
    IMAGE_URL.is_match(image)
}

/// Answer a farmer's question in Telugu or English.
#[utoipa::path(
    post,
    path = "/functions/v1/farming-ai-chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "The assistant's reply", body = ChatResponse),
        (status = 400, description = "Malformed body or empty message", body = ErrorBody),
        (status = 500, description = "Gateway failure", body = ErrorBody)
    )
)]
pub async fn farming_ai_chat_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, RouteError> {
    let Json(req) = payload?;
    if req.message.trim().is_empty() {
        return Err(RouteError::BadRequest("message is required".to_string()));
    }

    let language = Language::from_preference(&req.language);
    info!(%language, "Farming AI chat request");

    let started = Instant::now();
    let response = state.advisor.advise(&req.message, language).await?;
    info!(%language, elapsed = ?started.elapsed(), "Farming AI chat answered");

    Ok(Json(ChatResponse { response }))
}

/// Analyse a crop image for pests and diseases.
///
/// The pest name and severity are fixed placeholders; the model's analysis is
/// returned as the recommendations.
#[utoipa::path(
    post,
    path = "/functions/v1/detect-pest",
    request_body = PestDetectionRequest,
    responses(
        (status = 200, description = "The analysis", body = PestDetectionResponse),
        (status = 400, description = "Malformed body or unsupported image", body = ErrorBody),
        (status = 500, description = "Gateway failure", body = ErrorBody)
    )
)]
pub async fn detect_pest_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PestDetectionRequest>, JsonRejection>,
) -> Result<Json<PestDetectionResponse>, RouteError> {
    let Json(req) = payload?;
    if !is_supported_image(&req.image) {
        return Err(RouteError::BadRequest(
            "image must be a base64 image data URL or an http(s) URL".to_string(),
        ));
    }

    let language = Language::from_preference(&req.language);
    info!(%language, image_bytes = req.image.len(), "Pest detection request");

    let started = Instant::now();
    let analysis = state
        .image_analyzer
        .analyze_crop_image(&req.image, language)
        .await?;
    info!(%language, elapsed = ?started.elapsed(), "Pest detection answered");

    Ok(Json(PestReport::from_analysis(analysis).into()))
}

/// Current weather readings for a location.
#[utoipa::path(
    post,
    path = "/functions/v1/get-weather",
    request_body = WeatherRequest,
    responses(
        (status = 200, description = "Weather readings", body = WeatherResponse),
        (status = 400, description = "Malformed body", body = ErrorBody),
        (status = 500, description = "Weather lookup failed", body = ErrorBody)
    )
)]
pub async fn get_weather_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<WeatherRequest>, JsonRejection>,
) -> Result<Json<WeatherResponse>, RouteError> {
    let Json(req) = payload?;
    let report = state.weather.current_weather(&req.location).await?;
    Ok(Json(report.into()))
}
