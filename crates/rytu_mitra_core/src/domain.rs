//! crates/rytu_mitra_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

//=========================================================================================
// Language
//=========================================================================================

/// The two languages the assistant speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    Telugu,
    English,
}

impl Language {
    /// Maps a raw preference string onto a language.
    ///
    /// Only the exact value `"telugu"` selects Telugu; anything else (including
    /// unknown values) falls back to English.
    pub fn from_preference(value: &str) -> Self {
        if value == "telugu" {
            Language::Telugu
        } else {
            Language::English
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Telugu => "telugu",
            Language::English => "english",
        }
    }

    /// Picks the text matching this language.
    pub fn pick<'a>(&self, english: &'a str, telugu: &'a str) -> &'a str {
        match self {
            Language::Telugu => telugu,
            Language::English => english,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported language '{0}', expected 'telugu' or 'english'")]
pub struct UnknownLanguage(pub String);

/// Strict parsing, used where a stored profile value must be one of the two languages.
impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "telugu" => Ok(Language::Telugu),
            "english" => Ok(Language::English),
            other => Err(UnknownLanguage(other.to_string())),
        }
    }
}

//=========================================================================================
// Users & Auth
//=========================================================================================

// Represents a user - used throughout app
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: Uuid,
    pub email: Option<String>,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

/// Details collected on the sign-up form besides the credentials.
#[derive(Debug, Clone, Default)]
pub struct SignupDetails {
    pub full_name: Option<String>,
    pub phone: Option<String>,
}

//=========================================================================================
// Profile
//=========================================================================================

/// The crop choices offered during onboarding. Stored crop types are not
/// restricted to this list.
pub const KNOWN_CROPS: [&str; 8] = [
    "rice",
    "cotton",
    "turmeric",
    "chili",
    "maize",
    "sugarcane",
    "vegetables",
    "other",
];

/// The per-user farming context.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub user_id: Uuid,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub preferred_language: Option<Language>,
    pub location: Option<String>,
    pub crop_type: Option<String>,
}

impl Profile {
    /// A fresh profile as created at sign-up.
    pub fn new(user_id: Uuid, details: SignupDetails) -> Self {
        Self {
            user_id,
            full_name: details.full_name,
            phone: details.phone,
            preferred_language: None,
            location: None,
            crop_type: None,
        }
    }

    /// A profile without a location has not finished onboarding.
    pub fn needs_onboarding(&self) -> bool {
        self.location.as_deref().map_or(true, |l| l.trim().is_empty())
    }

    pub fn language(&self) -> Language {
        self.preferred_language.unwrap_or_default()
    }

    pub fn apply(&mut self, update: &ProfileUpdate) {
        self.location = Some(update.location.clone());
        self.crop_type = Some(update.crop_type.clone());
        self.preferred_language = Some(update.preferred_language);
    }
}

/// The three fields written by onboarding.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub location: String,
    pub crop_type: String,
    pub preferred_language: Language,
}

//=========================================================================================
// Chat
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

/// A single line of the chat transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Text,
    Voice,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Text => "text",
            QueryKind::Voice => "voice",
        }
    }
}

/// Audit row written after every answered chat message.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRecord {
    pub user_id: Uuid,
    pub query_text: String,
    pub response_text: String,
    /// The raw language value the client sent with the question.
    pub query_language: String,
    pub query_type: QueryKind,
}

//=========================================================================================
// Pest detection
//=========================================================================================

/// Pest name reported for every analysis. The model's free text is not parsed.
pub const PLACEHOLDER_PEST_NAME: &str = "Detected from AI";
/// Severity reported for every analysis.
pub const PLACEHOLDER_SEVERITY: &str = "medium";

/// The weakly-typed analysis result shown to the farmer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PestReport {
    pub pest_name: String,
    pub severity: String,
    pub recommendations: String,
}

impl PestReport {
    /// Wraps the model's analysis text. Name and severity are fixed placeholders.
    pub fn from_analysis(analysis: impl Into<String>) -> Self {
        Self {
            pest_name: PLACEHOLDER_PEST_NAME.to_string(),
            severity: PLACEHOLDER_SEVERITY.to_string(),
            recommendations: analysis.into(),
        }
    }

    pub fn is_high_severity(&self) -> bool {
        self.severity == "high"
    }
}

/// Audit row written after every successful analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct PestDetectionRecord {
    pub user_id: Uuid,
    pub image_url: String,
    pub detection_result: PestReport,
}

impl PestDetectionRecord {
    pub fn pest_name(&self) -> &str {
        &self.detection_result.pest_name
    }

    pub fn severity(&self) -> &str {
        &self.detection_result.severity
    }

    pub fn recommendations(&self) -> &str {
        &self.detection_result.recommendations
    }
}

//=========================================================================================
// Display data
//=========================================================================================

/// Weather values as returned by the weather function. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherReport {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub rainfall: Option<f64>,
}

/// A stored crop-health measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct CropHealthPoint {
    pub user_id: Uuid,
    pub health_score: i32,
    pub created_at: DateTime<Utc>,
}
