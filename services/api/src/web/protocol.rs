//! services/api/src/web/protocol.rs
//!
//! Wire shapes exchanged between the browser (or the `farmer` client) and the
//! API server. Function responses are camelCase; the row-store routes use the
//! table column names.

use chrono::{DateTime, Utc};
use rytu_mitra_core::domain::{
    CropHealthPoint, Language, PestDetectionRecord, PestReport, Profile, ProfileUpdate,
    QueryKind, QueryRecord, User, WeatherReport,
};
use rytu_mitra_core::ports::PortError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// Errors
//=========================================================================================

/// The body of every failed request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

//=========================================================================================
// Function Routes
//=========================================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    /// `"telugu"` selects Telugu; any other value selects English.
    #[serde(default)]
    pub language: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PestDetectionRequest {
    /// A `data:image/...;base64,` URL or an http(s) URL.
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PestDetectionResponse {
    pub pest_name: String,
    pub severity: String,
    pub recommendations: String,
}

impl From<PestReport> for PestDetectionResponse {
    fn from(report: PestReport) -> Self {
        Self {
            pest_name: report.pest_name,
            severity: report.severity,
            recommendations: report.recommendations,
        }
    }
}

impl From<PestDetectionResponse> for PestReport {
    fn from(body: PestDetectionResponse) -> Self {
        Self {
            pest_name: body.pest_name,
            severity: body.severity,
            recommendations: body.recommendations,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WeatherRequest {
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeatherResponse {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub rainfall: Option<f64>,
}

impl From<WeatherReport> for WeatherResponse {
    fn from(report: WeatherReport) -> Self {
        Self {
            temperature: report.temperature,
            humidity: report.humidity,
            wind_speed: report.wind_speed,
            rainfall: report.rainfall,
        }
    }
}

impl From<WeatherResponse> for WeatherReport {
    fn from(body: WeatherResponse) -> Self {
        Self {
            temperature: body.temperature,
            humidity: body.humidity,
            wind_speed: body.wind_speed,
            rainfall: body.rainfall,
        }
    }
}

//=========================================================================================
// Auth Routes
//=========================================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub email: Option<String>,
}

impl From<User> for AuthResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            email: user.email,
        }
    }
}

impl From<AuthResponse> for User {
    fn from(body: AuthResponse) -> Self {
        Self {
            user_id: body.user_id,
            email: body.email,
        }
    }
}

//=========================================================================================
// Row-store Routes
//=========================================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileBody {
    pub user_id: Uuid,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub preferred_language: Option<String>,
    pub location: Option<String>,
    pub crop_type: Option<String>,
}

impl From<Profile> for ProfileBody {
    fn from(profile: Profile) -> Self {
        Self {
            user_id: profile.user_id,
            full_name: profile.full_name,
            phone: profile.phone,
            preferred_language: profile.preferred_language.map(|l| l.as_str().to_string()),
            location: profile.location,
            crop_type: profile.crop_type,
        }
    }
}

impl TryFrom<ProfileBody> for Profile {
    type Error = PortError;

    fn try_from(body: ProfileBody) -> Result<Self, Self::Error> {
        let preferred_language = body
            .preferred_language
            .map(|l| l.parse::<Language>())
            .transpose()
            .map_err(|e| PortError::MalformedResponse(e.to_string()))?;
        Ok(Self {
            user_id: body.user_id,
            full_name: body.full_name,
            phone: body.phone,
            preferred_language,
            location: body.location,
            crop_type: body.crop_type,
        })
    }
}

/// The onboarding write: exactly these three columns.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileUpdateBody {
    pub location: String,
    pub crop_type: String,
    pub preferred_language: String,
}

impl From<&ProfileUpdate> for ProfileUpdateBody {
    fn from(update: &ProfileUpdate) -> Self {
        Self {
            location: update.location.clone(),
            crop_type: update.crop_type.clone(),
            preferred_language: update.preferred_language.as_str().to_string(),
        }
    }
}

impl TryFrom<ProfileUpdateBody> for ProfileUpdate {
    type Error = PortError;

    fn try_from(body: ProfileUpdateBody) -> Result<Self, Self::Error> {
        let preferred_language = body
            .preferred_language
            .parse::<Language>()
            .map_err(|e| PortError::InvalidInput(e.to_string()))?;
        Ok(Self {
            location: body.location,
            crop_type: body.crop_type,
            preferred_language,
        })
    }
}

/// A chat exchange to store. The user id comes from the session.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QueryRecordBody {
    pub query_text: String,
    pub response_text: String,
    pub query_language: String,
    pub query_type: String,
}

impl From<&QueryRecord> for QueryRecordBody {
    fn from(record: &QueryRecord) -> Self {
        Self {
            query_text: record.query_text.clone(),
            response_text: record.response_text.clone(),
            query_language: record.query_language.clone(),
            query_type: record.query_type.as_str().to_string(),
        }
    }
}

impl QueryRecordBody {
    pub fn into_record(self, user_id: Uuid) -> Result<QueryRecord, PortError> {
        let query_type = match self.query_type.as_str() {
            "text" => QueryKind::Text,
            "voice" => QueryKind::Voice,
            other => {
                return Err(PortError::InvalidInput(format!(
                    "unknown query_type '{}'",
                    other
                )))
            }
        };
        Ok(QueryRecord {
            user_id,
            query_text: self.query_text,
            response_text: self.response_text,
            query_language: self.query_language,
            query_type,
        })
    }
}

/// A detection result to store. The user id comes from the session.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PestDetectionRecordBody {
    pub image_url: String,
    pub detection_result: PestDetectionResponse,
    pub pest_name: String,
    pub severity: String,
    pub recommendations: String,
}

impl From<&PestDetectionRecord> for PestDetectionRecordBody {
    fn from(record: &PestDetectionRecord) -> Self {
        Self {
            image_url: record.image_url.clone(),
            detection_result: record.detection_result.clone().into(),
            pest_name: record.pest_name().to_string(),
            severity: record.severity().to_string(),
            recommendations: record.recommendations().to_string(),
        }
    }
}

impl PestDetectionRecordBody {
    /// The flat columns must repeat `detection_result`; the stored row is
    /// built from `detection_result` alone.
    pub fn into_record(self, user_id: Uuid) -> Result<PestDetectionRecord, PortError> {
        let result = &self.detection_result;
        let mismatched = [
            ("pest_name", &self.pest_name, &result.pest_name),
            ("severity", &self.severity, &result.severity),
            ("recommendations", &self.recommendations, &result.recommendations),
        ]
        .into_iter()
        .find(|(_, flat, nested)| flat != nested);

        if let Some((column, _, _)) = mismatched {
            return Err(PortError::InvalidInput(format!(
                "{} does not match detection_result",
                column
            )));
        }

        Ok(PestDetectionRecord {
            user_id,
            image_url: self.image_url,
            detection_result: self.detection_result.into(),
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CropHealthBody {
    pub user_id: Uuid,
    pub health_score: i32,
    pub created_at: DateTime<Utc>,
}

impl From<CropHealthPoint> for CropHealthBody {
    fn from(point: CropHealthPoint) -> Self {
        Self {
            user_id: point.user_id,
            health_score: point.health_score,
            created_at: point.created_at,
        }
    }
}

impl From<CropHealthBody> for CropHealthPoint {
    fn from(body: CropHealthBody) -> Self {
        Self {
            user_id: body.user_id,
            health_score: body.health_score,
            created_at: body.created_at,
        }
    }
}
