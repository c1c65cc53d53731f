//! services/api/src/error.rs
//!
//! Defines the error types of the API service: `ApiError` for startup and the
//! binaries, `RouteError` for request handlers.

use crate::config::ConfigError;
use crate::web::protocol::ErrorBody;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rytu_mitra_core::ports::PortError;
use tracing::error;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a failure to apply the embedded migrations.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// Errors returned by request handlers.
///
/// Every variant renders as `{"error": "..."}` so callers never have to parse
/// a second error shape.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Port(#[from] PortError),

    #[error("{0}")]
    Internal(String),
}

impl From<JsonRejection> for RouteError {
    fn from(rejection: JsonRejection) -> Self {
        RouteError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            RouteError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            RouteError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            RouteError::Port(e) => match e {
                PortError::NotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
                PortError::Unauthorized => (StatusCode::UNAUTHORIZED, e.to_string()),
                PortError::InvalidInput(_) => (StatusCode::BAD_REQUEST, e.to_string()),
                // Gateway failures are relayed to the caller as-is.
                PortError::Upstream { .. }
                | PortError::Transport(_)
                | PortError::MalformedResponse(_) => {
                    error!(error = %e, "Upstream gateway failure");
                    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
                }
                PortError::Unexpected(_) => {
                    error!(error = %e, "Unexpected port failure");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal server error".to_string(),
                    )
                }
            },
            RouteError::Internal(m) => {
                error!(message = %m, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
