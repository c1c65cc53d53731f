pub mod auth;
pub mod middleware;
pub mod protocol;
pub mod proxy;
pub mod rest;
pub mod state;

pub use middleware::require_auth;

use crate::config::ConfigError;
use crate::error::ApiError;
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use rest::ApiDoc;
use state::AppState;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Builds the complete application: function routes, auth, the row store and
/// the Swagger UI.
pub fn build_router(state: Arc<AppState>) -> Result<Router, ApiError> {
    // Function routes are called from any origin without credentials.
    let function_cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ]);

    let client_origin = state
        .config
        .client_origin
        .parse::<HeaderValue>()
        .map_err(|e| ConfigError::InvalidValue("CLIENT_ORIGIN".to_string(), e.to_string()))?;
    let session_cors = CorsLayer::new()
        .allow_origin(client_origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    let function_routes = Router::new()
        .route("/functions/v1/farming-ai-chat", post(proxy::farming_ai_chat_handler))
        .route("/functions/v1/detect-pest", post(proxy::detect_pest_handler))
        .route("/functions/v1/get-weather", post(proxy::get_weather_handler))
        .layer(function_cors);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/signup", post(auth::signup_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/auth/user", get(auth::current_user_handler))
        .route(
            "/rest/v1/profiles/me",
            get(rest::get_profile_handler).patch(rest::update_profile_handler),
        )
        .route("/rest/v1/queries", post(rest::create_query_handler))
        .route(
            "/rest/v1/pest_detections",
            post(rest::create_pest_detection_handler),
        )
        .route("/rest/v1/crop_health", get(rest::list_crop_health_handler))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let session_routes = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(session_cors);

    let api_router = Router::new()
        .merge(function_routes)
        .merge(session_routes)
        .layer(DefaultBodyLimit::max(state.config.max_body_bytes))
        .with_state(state);

    Ok(Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())))
}
