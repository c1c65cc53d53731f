//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL row store using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rytu_mitra_core::domain::{
    CropHealthPoint, Language, PestDetectionRecord, Profile, ProfileUpdate, QueryRecord,
    SignupDetails, User, UserCredentials,
};
use rytu_mitra_core::ports::{DatabaseService, PortError, PortResult};
use serde_json::json;
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn not_found_or_unexpected(what: String) -> impl FnOnce(sqlx::Error) -> PortError {
    move |e| match e {
        sqlx::Error::RowNotFound => PortError::NotFound(what),
        _ => PortError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    user_id: Uuid,
    email: String,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            user_id: self.user_id,
            email: Some(self.email),
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    user_id: Uuid,
    email: String,
    hashed_password: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user_id: self.user_id,
            email: self.email,
            hashed_password: self.hashed_password,
        }
    }
}

#[derive(FromRow)]
struct ProfileRecord {
    user_id: Uuid,
    full_name: Option<String>,
    phone: Option<String>,
    preferred_language: Option<String>,
    location: Option<String>,
    crop_type: Option<String>,
}
impl ProfileRecord {
    fn to_domain(self) -> Profile {
        Profile {
            user_id: self.user_id,
            full_name: self.full_name,
            phone: self.phone,
            preferred_language: self
                .preferred_language
                .as_deref()
                .map(Language::from_preference),
            location: self.location,
            crop_type: self.crop_type,
        }
    }
}

#[derive(FromRow)]
struct CropHealthRecord {
    user_id: Uuid,
    health_score: i32,
    created_at: DateTime<Utc>,
}
impl CropHealthRecord {
    fn to_domain(self) -> CropHealthPoint {
        CropHealthPoint {
            user_id: self.user_id,
            health_score: self.health_score,
            created_at: self.created_at,
        }
    }
}

const PROFILE_COLUMNS: &str = "user_id, full_name, phone, preferred_language, location, crop_type";

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
        details: &SignupDetails,
    ) -> PortResult<User> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (user_id, email, hashed_password) VALUES ($1, $2, $3) \
             RETURNING user_id, email",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                PortError::InvalidInput("User already registered".to_string())
            }
            _ => PortError::Unexpected(e.to_string()),
        })?;

        sqlx::query(
            "INSERT INTO profiles (id, user_id, full_name, phone) VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::new_v4())
        .bind(record.user_id)
        .bind(details.full_name.as_deref())
        .bind(details.phone.as_deref())
        .execute(&mut *tx)
        .await
        .map_err(unexpected)?;

        tx.commit().await.map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT user_id, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or_unexpected(format!("User {} not found", email)))?;
        Ok(record.to_domain())
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        let record =
            sqlx::query_as::<_, UserRecord>("SELECT user_id, email FROM users WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(not_found_or_unexpected(format!("User {} not found", user_id)))?;
        Ok(record.to_domain())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (session_id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let user_id: Option<Uuid> = sqlx::query_scalar(
            "SELECT user_id FROM auth_sessions WHERE session_id = $1 AND expires_at > NOW()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        user_id.ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn get_profile(&self, user_id: Uuid) -> PortResult<Profile> {
        let record = sqlx::query_as::<_, ProfileRecord>(&format!(
            "SELECT {} FROM profiles WHERE user_id = $1",
            PROFILE_COLUMNS
        ))
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or_unexpected(format!(
            "Profile for user {} not found",
            user_id
        )))?;
        Ok(record.to_domain())
    }

    async fn update_profile(&self, user_id: Uuid, update: &ProfileUpdate) -> PortResult<Profile> {
        let record = sqlx::query_as::<_, ProfileRecord>(&format!(
            "UPDATE profiles SET location = $1, crop_type = $2, preferred_language = $3, \
             updated_at = NOW() WHERE user_id = $4 RETURNING {}",
            PROFILE_COLUMNS
        ))
        .bind(&update.location)
        .bind(&update.crop_type)
        .bind(update.preferred_language.as_str())
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or_unexpected(format!(
            "Profile for user {} not found",
            user_id
        )))?;
        Ok(record.to_domain())
    }

    async fn save_query(&self, record: QueryRecord) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO queries (id, user_id, query_text, response_text, query_language, query_type) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(Uuid::new_v4())
        .bind(record.user_id)
        .bind(&record.query_text)
        .bind(&record.response_text)
        .bind(&record.query_language)
        .bind(record.query_type.as_str())
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn save_pest_detection(&self, record: PestDetectionRecord) -> PortResult<()> {
        let detection_result = json!({
            "pestName": record.pest_name(),
            "severity": record.severity(),
            "recommendations": record.recommendations(),
        });

        sqlx::query(
            "INSERT INTO pest_detections \
             (id, user_id, image_url, detection_result, pest_name, severity, recommendations) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(Uuid::new_v4())
        .bind(record.user_id)
        .bind(&record.image_url)
        .bind(Json(detection_result))
        .bind(record.pest_name())
        .bind(record.severity())
        .bind(record.recommendations())
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn get_crop_health(&self, user_id: Uuid, limit: u32) -> PortResult<Vec<CropHealthPoint>> {
        let records = sqlx::query_as::<_, CropHealthRecord>(
            "SELECT user_id, health_score, created_at FROM crop_health \
             WHERE user_id = $1 ORDER BY created_at ASC LIMIT $2",
        )
        .bind(user_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }
}
