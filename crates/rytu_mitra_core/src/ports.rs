//! crates/rytu_mitra_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! The server-side ports (database, AI gateway, weather) are implemented by the
//! `api` service; the client-side `HostedBackend` port is what the chat,
//! detection and onboarding flows talk to.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    CropHealthPoint, Language, PestDetectionRecord, PestReport, Profile, ProfileUpdate,
    QueryRecord, SignupDetails, User, UserCredentials, WeatherReport,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    InvalidInput(String),
    #[error("Network error: {0}")]
    Transport(String),
    /// The remote side answered with a non-success status.
    #[error("{message}")]
    Upstream { status: Option<u16>, message: String },
    /// The remote side answered, but without the field we need.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Server-side Ports
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Auth ---
    /// Creates the user together with its (empty) profile row.
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
        details: &SignupDetails,
    ) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User>;

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    // --- Profiles ---
    async fn get_profile(&self, user_id: Uuid) -> PortResult<Profile>;

    /// Writes exactly the three onboarding fields and returns the updated profile.
    async fn update_profile(&self, user_id: Uuid, update: &ProfileUpdate) -> PortResult<Profile>;

    // --- Audit logs ---
    async fn save_query(&self, record: QueryRecord) -> PortResult<()>;

    async fn save_pest_detection(&self, record: PestDetectionRecord) -> PortResult<()>;

    // --- Crop health ---
    /// The oldest `limit` points for the user, ascending by creation time.
    async fn get_crop_health(&self, user_id: Uuid, limit: u32) -> PortResult<Vec<CropHealthPoint>>;
}

#[async_trait]
pub trait FarmingAdviceService: Send + Sync {
    /// Answers a farmer's question, replying in the given language.
    async fn advise(&self, message: &str, language: Language) -> PortResult<String>;
}

#[async_trait]
pub trait CropImageAnalysisService: Send + Sync {
    /// Returns the model's free-text analysis of a crop image (data URL or http URL).
    async fn analyze_crop_image(&self, image_url: &str, language: Language) -> PortResult<String>;
}

#[async_trait]
pub trait WeatherService: Send + Sync {
    async fn current_weather(&self, location: &str) -> PortResult<WeatherReport>;
}

//=========================================================================================
// Client-side Port
//=========================================================================================

/// Everything the client flows need from the hosted backend: auth, the row
/// store and the function-invocation transport.
#[async_trait]
pub trait HostedBackend: Send + Sync {
    /// The signed-in user, or `None` when there is no session.
    async fn current_user(&self) -> PortResult<Option<User>>;

    async fn sign_out(&self) -> PortResult<()>;

    async fn fetch_profile(&self, user_id: Uuid) -> PortResult<Option<Profile>>;

    async fn update_profile(&self, user_id: Uuid, update: &ProfileUpdate) -> PortResult<()>;

    async fn invoke_chat(&self, message: &str, language: Language) -> PortResult<String>;

    async fn invoke_pest_detection(&self, image: &str, language: Language)
        -> PortResult<PestReport>;

    async fn invoke_weather(&self, location: &str) -> PortResult<WeatherReport>;

    async fn record_query(&self, record: QueryRecord) -> PortResult<()>;

    async fn record_pest_detection(&self, record: PestDetectionRecord) -> PortResult<()>;

    async fn crop_health(&self, user_id: Uuid, limit: u32) -> PortResult<Vec<CropHealthPoint>>;
}
