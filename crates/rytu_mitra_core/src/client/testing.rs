//! An in-memory `HostedBackend` for exercising the client flows.

use crate::domain::{
    CropHealthPoint, Language, PestDetectionRecord, PestReport, Profile, ProfileUpdate,
    QueryRecord, SignupDetails, User, WeatherReport,
};
use crate::ports::{HostedBackend, PortError, PortResult};
use async_trait::async_trait;
use std::sync::Mutex;
use uuid::Uuid;

pub(crate) struct MockBackend {
    pub user: Mutex<Option<User>>,
    pub user_error: Mutex<Option<PortError>>,
    pub profile: Mutex<Option<Profile>>,
    pub profile_error: Mutex<Option<PortError>>,
    pub chat_reply: Mutex<PortResult<String>>,
    pub pest_report: Mutex<PortResult<PestReport>>,
    pub weather: Mutex<PortResult<WeatherReport>>,
    pub crop_points: Mutex<PortResult<Vec<CropHealthPoint>>>,
    pub record_error: Mutex<Option<PortError>>,
    pub calls: Mutex<Vec<String>>,
    pub chat_requests: Mutex<Vec<(String, Language)>>,
    pub queries: Mutex<Vec<QueryRecord>>,
    pub detections: Mutex<Vec<PestDetectionRecord>>,
    pub profile_updates: Mutex<Vec<ProfileUpdate>>,
}

impl MockBackend {
    pub fn anonymous() -> Self {
        Self {
            user: Mutex::new(None),
            user_error: Mutex::new(None),
            profile: Mutex::new(None),
            profile_error: Mutex::new(None),
            chat_reply: Mutex::new(Ok("ok".to_string())),
            pest_report: Mutex::new(Ok(PestReport::from_analysis("looks healthy"))),
            weather: Mutex::new(Ok(WeatherReport::default())),
            crop_points: Mutex::new(Ok(Vec::new())),
            record_error: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            chat_requests: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
            detections: Mutex::new(Vec::new()),
            profile_updates: Mutex::new(Vec::new()),
        }
    }

    /// A signed-in user whose profile was created at sign-up.
    pub fn signed_in() -> Self {
        let backend = Self::anonymous();
        let user_id = Uuid::new_v4();
        *backend.user.lock().unwrap() = Some(User {
            user_id,
            email: Some("farmer@example.com".to_string()),
        });
        *backend.profile.lock().unwrap() = Some(Profile::new(
            user_id,
            SignupDetails {
                full_name: Some("Ramesh".to_string()),
                phone: None,
            },
        ));
        backend
    }

    pub fn user_id(&self) -> Uuid {
        self.user.lock().unwrap().as_ref().unwrap().user_id
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn called(&self, name: &str) {
        self.calls.lock().unwrap().push(name.to_string());
    }

    fn record_result(&self) -> PortResult<()> {
        match self.record_error.lock().unwrap().clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl HostedBackend for MockBackend {
    async fn current_user(&self) -> PortResult<Option<User>> {
        self.called("current_user");
        if let Some(e) = self.user_error.lock().unwrap().clone() {
            return Err(e);
        }
        Ok(self.user.lock().unwrap().clone())
    }

    async fn sign_out(&self) -> PortResult<()> {
        self.called("sign_out");
        *self.user.lock().unwrap() = None;
        Ok(())
    }

    async fn fetch_profile(&self, _user_id: Uuid) -> PortResult<Option<Profile>> {
        self.called("fetch_profile");
        if let Some(e) = self.profile_error.lock().unwrap().clone() {
            return Err(e);
        }
        Ok(self.profile.lock().unwrap().clone())
    }

    async fn update_profile(&self, _user_id: Uuid, update: &ProfileUpdate) -> PortResult<()> {
        self.called("update_profile");
        self.profile_updates.lock().unwrap().push(update.clone());
        if let Some(profile) = self.profile.lock().unwrap().as_mut() {
            profile.apply(update);
        }
        Ok(())
    }

    async fn invoke_chat(&self, message: &str, language: Language) -> PortResult<String> {
        self.called("invoke_chat");
        self.chat_requests
            .lock()
            .unwrap()
            .push((message.to_string(), language));
        self.chat_reply.lock().unwrap().clone()
    }

    async fn invoke_pest_detection(
        &self,
        _image: &str,
        _language: Language,
    ) -> PortResult<PestReport> {
        self.called("invoke_pest_detection");
        self.pest_report.lock().unwrap().clone()
    }

    async fn invoke_weather(&self, _location: &str) -> PortResult<WeatherReport> {
        self.called("invoke_weather");
        self.weather.lock().unwrap().clone()
    }

    async fn record_query(&self, record: QueryRecord) -> PortResult<()> {
        self.called("record_query");
        self.record_result()?;
        self.queries.lock().unwrap().push(record);
        Ok(())
    }

    async fn record_pest_detection(&self, record: PestDetectionRecord) -> PortResult<()> {
        self.called("record_pest_detection");
        self.record_result()?;
        self.detections.lock().unwrap().push(record);
        Ok(())
    }

    async fn crop_health(&self, _user_id: Uuid, _limit: u32) -> PortResult<Vec<CropHealthPoint>> {
        self.called("crop_health");
        self.crop_points.lock().unwrap().clone()
    }
}
