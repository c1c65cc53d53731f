//! Shared fixtures for the API integration tests: an in-memory row store,
//! scripted AI services and a router wired to them.

#![allow(dead_code)]

use api_lib::adapters::BaselineWeatherAdapter;
use api_lib::config::Config;
use api_lib::web::{build_router, state::AppState};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use rytu_mitra_core::domain::{
    CropHealthPoint, Language, PestDetectionRecord, Profile, ProfileUpdate, QueryRecord,
    SignupDetails, User, UserCredentials,
};
use rytu_mitra_core::ports::{
    CropImageAnalysisService, DatabaseService, FarmingAdviceService, PortError, PortResult,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

//=========================================================================================
// In-memory Row Store
//=========================================================================================

#[derive(Default)]
pub struct MemoryDb {
    pub users: Mutex<HashMap<Uuid, UserCredentials>>,
    pub sessions: Mutex<HashMap<String, (Uuid, DateTime<Utc>)>>,
    pub profiles: Mutex<HashMap<Uuid, Profile>>,
    pub queries: Mutex<Vec<QueryRecord>>,
    pub detections: Mutex<Vec<PestDetectionRecord>>,
    pub crop_health: Mutex<Vec<CropHealthPoint>>,
}

#[async_trait]
impl DatabaseService for MemoryDb {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
        details: &SignupDetails,
    ) -> PortResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == email) {
            return Err(PortError::InvalidInput("User already registered".to_string()));
        }
        let user_id = Uuid::new_v4();
        users.insert(
            user_id,
            UserCredentials {
                user_id,
                email: email.to_string(),
                hashed_password: hashed_password.to_string(),
            },
        );
        self.profiles
            .lock()
            .unwrap()
            .insert(user_id, Profile::new(user_id, details.clone()));
        Ok(User {
            user_id,
            email: Some(email.to_string()),
        })
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        self.users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", email)))
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        self.users
            .lock()
            .unwrap()
            .get(&user_id)
            .map(|u| User {
                user_id: u.user_id,
                email: Some(u.email.clone()),
            })
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        self.sessions
            .lock()
            .unwrap()
            .insert(session_id.to_string(), (user_id, expires_at));
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        match self.sessions.lock().unwrap().get(session_id) {
            Some((user_id, expires_at)) if *expires_at > Utc::now() => Ok(*user_id),
            _ => Err(PortError::Unauthorized),
        }
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.sessions.lock().unwrap().remove(session_id);
        Ok(())
    }

    async fn get_profile(&self, user_id: Uuid) -> PortResult<Profile> {
        self.profiles
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Profile for user {} not found", user_id)))
    }

    async fn update_profile(&self, user_id: Uuid, update: &ProfileUpdate) -> PortResult<Profile> {
        let mut profiles = self.profiles.lock().unwrap();
        let profile = profiles
            .get_mut(&user_id)
            .ok_or_else(|| PortError::NotFound(format!("Profile for user {} not found", user_id)))?;
        profile.apply(update);
        Ok(profile.clone())
    }

    async fn save_query(&self, record: QueryRecord) -> PortResult<()> {
        self.queries.lock().unwrap().push(record);
        Ok(())
    }

    async fn save_pest_detection(&self, record: PestDetectionRecord) -> PortResult<()> {
        self.detections.lock().unwrap().push(record);
        Ok(())
    }

    async fn get_crop_health(&self, user_id: Uuid, limit: u32) -> PortResult<Vec<CropHealthPoint>> {
        let mut points: Vec<CropHealthPoint> = self
            .crop_health
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        points.sort_by_key(|p| p.created_at);
        points.truncate(limit as usize);
        Ok(points)
    }
}

//=========================================================================================
// Scripted AI Services
//=========================================================================================

/// Answers every call with the same result and remembers what it was asked.
pub struct ScriptedAi {
    pub result: Mutex<PortResult<String>>,
    pub calls: Mutex<Vec<(String, Language)>>,
}

impl ScriptedAi {
    pub fn replying(reply: &str) -> Self {
        Self {
            result: Mutex::new(Ok(reply.to_string())),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_with(&self, error: PortError) {
        *self.result.lock().unwrap() = Err(error);
    }

    pub fn calls(&self) -> Vec<(String, Language)> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, input: &str, language: Language) -> PortResult<String> {
        self.calls
            .lock()
            .unwrap()
            .push((input.to_string(), language));
        self.result.lock().unwrap().clone()
    }
}

#[async_trait]
impl FarmingAdviceService for ScriptedAi {
    async fn advise(&self, message: &str, language: Language) -> PortResult<String> {
        self.answer(message, language)
    }
}

#[async_trait]
impl CropImageAnalysisService for ScriptedAi {
    async fn analyze_crop_image(&self, image_url: &str, language: Language) -> PortResult<String> {
        self.answer(image_url, language)
    }
}

//=========================================================================================
// Application Fixture
//=========================================================================================

pub fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: String::new(),
        log_level: tracing::Level::DEBUG,
        gateway_url: "http://gateway.invalid/v1".to_string(),
        gateway_api_key: "test-key".to_string(),
        model: "google/gemini-2.5-flash".to_string(),
        client_origin: "http://localhost:8080".to_string(),
        max_body_bytes: 10 * 1024 * 1024,
        session_ttl_days: 30,
        secure_cookies: false,
    }
}

pub struct TestApp {
    pub db: Arc<MemoryDb>,
    pub advisor: Arc<ScriptedAi>,
    pub analyzer: Arc<ScriptedAi>,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let db = Arc::new(MemoryDb::default());
        let advisor = Arc::new(ScriptedAi::replying("Apply urea in split doses."));
        let analyzer = Arc::new(ScriptedAi::replying("Leaf blight. Spray neem oil."));
        let state = Arc::new(AppState {
            db: db.clone(),
            config: Arc::new(test_config()),
            advisor: advisor.clone(),
            image_analyzer: analyzer.clone(),
            weather: Arc::new(BaselineWeatherAdapter::new()),
        });
        let router = build_router(state).unwrap();
        Self {
            db,
            advisor,
            analyzer,
            router,
        }
    }
}

//=========================================================================================
// Request Helpers
//=========================================================================================

pub fn json_request(method: &str, uri: &str, body: Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// `session=...` from the response's `Set-Cookie`, ready for a `Cookie` header.
pub fn session_cookie(response: &Response<Body>) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}
