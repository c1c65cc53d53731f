//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the row-store endpoints and the master
//! definition for the OpenAPI specification. Every handler here sits behind
//! `require_auth` and acts on the session's user only.

use crate::error::RouteError;
use crate::web::protocol::{
    AuthResponse, ChatRequest, ChatResponse, CropHealthBody, ErrorBody, LoginRequest,
    PestDetectionRecordBody, PestDetectionRequest, PestDetectionResponse, ProfileBody,
    ProfileUpdateBody, QueryRecordBody, SignupRequest, WeatherRequest, WeatherResponse,
};
use crate::web::state::AppState;
use crate::web::{auth, proxy};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use rytu_mitra_core::client::display::CROP_HEALTH_LIMIT;
use rytu_mitra_core::domain::ProfileUpdate;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use utoipa::{IntoParams, OpenApi};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        proxy::farming_ai_chat_handler,
        proxy::detect_pest_handler,
        proxy::get_weather_handler,
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::current_user_handler,
        get_profile_handler,
        update_profile_handler,
        create_query_handler,
        create_pest_detection_handler,
        list_crop_health_handler,
    ),
    components(
        schemas(
            ErrorBody, ChatRequest, ChatResponse, PestDetectionRequest, PestDetectionResponse,
            WeatherRequest, WeatherResponse, SignupRequest, LoginRequest, AuthResponse,
            ProfileBody, ProfileUpdateBody, QueryRecordBody, PestDetectionRecordBody,
            CropHealthBody
        )
    ),
    tags(
        (name = "Rytu Mitra API", description = "Farming assistant functions, auth and row store.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Profiles
//=========================================================================================

/// The signed-in user's profile.
#[utoipa::path(
    get,
    path = "/rest/v1/profiles/me",
    responses(
        (status = 200, description = "The profile", body = ProfileBody),
        (status = 401, description = "No active session", body = ErrorBody),
        (status = 404, description = "No profile row", body = ErrorBody)
    )
)]
pub async fn get_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<ProfileBody>, RouteError> {
    let profile = state.db.get_profile(user_id).await?;
    Ok(Json(profile.into()))
}

/// Writes the onboarding fields: location, crop type and preferred language.
#[utoipa::path(
    patch,
    path = "/rest/v1/profiles/me",
    request_body = ProfileUpdateBody,
    responses(
        (status = 200, description = "The updated profile", body = ProfileBody),
        (status = 400, description = "Malformed body or unknown language", body = ErrorBody),
        (status = 401, description = "No active session", body = ErrorBody),
        (status = 404, description = "No profile row", body = ErrorBody)
    )
)]
pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    payload: Result<Json<ProfileUpdateBody>, JsonRejection>,
) -> Result<Json<ProfileBody>, RouteError> {
    let Json(body) = payload?;
    let update = ProfileUpdate::try_from(body)?;

    let profile = state.db.update_profile(user_id, &update).await?;
    info!(%user_id, location = %update.location, crop = %update.crop_type, "Profile onboarded.");
    Ok(Json(profile.into()))
}

//=========================================================================================
// Audit Logs
//=========================================================================================

/// Stores one chat exchange.
#[utoipa::path(
    post,
    path = "/rest/v1/queries",
    request_body = QueryRecordBody,
    responses(
        (status = 201, description = "Stored"),
        (status = 400, description = "Malformed body", body = ErrorBody),
        (status = 401, description = "No active session", body = ErrorBody)
    )
)]
pub async fn create_query_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    payload: Result<Json<QueryRecordBody>, JsonRejection>,
) -> Result<StatusCode, RouteError> {
    let Json(body) = payload?;
    let record = body.into_record(user_id)?;
    state.db.save_query(record).await?;
    Ok(StatusCode::CREATED)
}

/// Stores one pest analysis.
#[utoipa::path(
    post,
    path = "/rest/v1/pest_detections",
    request_body = PestDetectionRecordBody,
    responses(
        (status = 201, description = "Stored"),
        (status = 400, description = "Malformed body or flat columns disagreeing with detection_result", body = ErrorBody),
        (status = 401, description = "No active session", body = ErrorBody)
    )
)]
pub async fn create_pest_detection_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    payload: Result<Json<PestDetectionRecordBody>, JsonRejection>,
) -> Result<StatusCode, RouteError> {
    let Json(body) = payload?;
    let record = body.into_record(user_id)?;
    state.db.save_pest_detection(record).await?;
    Ok(StatusCode::CREATED)
}

//=========================================================================================
// Crop Health
//=========================================================================================

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CropHealthQuery {
    /// How many points to return, oldest first. Defaults to 10.
    pub limit: Option<u32>,
}

#[utoipa::path(
    get,
    path = "/rest/v1/crop_health",
    params(CropHealthQuery),
    responses(
        (status = 200, description = "The user's crop health points", body = [CropHealthBody]),
        (status = 400, description = "Bad limit", body = ErrorBody),
        (status = 401, description = "No active session", body = ErrorBody)
    )
)]
pub async fn list_crop_health_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    query: Result<Query<CropHealthQuery>, QueryRejection>,
) -> Result<Json<Vec<CropHealthBody>>, RouteError> {
    let Query(query) = query.map_err(|e| RouteError::BadRequest(e.body_text()))?;
    let limit = query.limit.unwrap_or(CROP_HEALTH_LIMIT);

    let points = state.db.get_crop_health(user_id, limit).await?;
    Ok(Json(points.into_iter().map(CropHealthBody::from).collect()))
}
