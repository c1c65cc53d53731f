//! services/api/src/adapters/http_backend.rs
//!
//! A `HostedBackend` that talks to a running API server over HTTP. It keeps the
//! session cookie in a cookie store, so every call after `login`/`signup` is
//! made as that user. The `user_id` arguments of the port are not sent; the
//! server takes the user from the session.

use crate::web::protocol::{
    AuthResponse, ChatRequest, ChatResponse, CropHealthBody, ErrorBody, LoginRequest,
    PestDetectionRecordBody, PestDetectionRequest, PestDetectionResponse, ProfileBody,
    ProfileUpdateBody, QueryRecordBody, SignupRequest, WeatherRequest, WeatherResponse,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use rytu_mitra_core::domain::{
    CropHealthPoint, Language, PestDetectionRecord, PestReport, Profile, ProfileUpdate,
    QueryRecord, User, WeatherReport,
};
use rytu_mitra_core::ports::{HostedBackend, PortError, PortResult};
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

pub struct HttpBackend {
    http: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> PortResult<Self> {
        let http = Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        full_name: Option<String>,
        phone: Option<String>,
    ) -> PortResult<User> {
        let body = SignupRequest {
            email: email.to_string(),
            password: password.to_string(),
            full_name,
            phone,
        };
        let auth: AuthResponse = read_json(self.http.post(self.url("/auth/signup")).json(&body)).await?;
        Ok(auth.into())
    }

    pub async fn login(&self, email: &str, password: &str) -> PortResult<User> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let auth: AuthResponse = read_json(self.http.post(self.url("/auth/login")).json(&body)).await?;
        Ok(auth.into())
    }
}

//=========================================================================================
// Response Handling
//=========================================================================================

async fn send(request: RequestBuilder) -> PortResult<Response> {
    let response = request
        .send()
        .await
        .map_err(|e| PortError::Transport(e.to_string()))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(PortError::Unauthorized);
    }

    // Failures carry `{"error": ...}`; anything else gets a generic message.
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => format!("Request failed with status: {}", status),
    };
    Err(match status {
        StatusCode::NOT_FOUND => PortError::NotFound(message),
        StatusCode::BAD_REQUEST => PortError::InvalidInput(message),
        _ => PortError::Upstream {
            status: Some(status.as_u16()),
            message,
        },
    })
}

async fn read_json<T: DeserializeOwned>(request: RequestBuilder) -> PortResult<T> {
    send(request)
        .await?
        .json::<T>()
        .await
        .map_err(|e| PortError::MalformedResponse(e.to_string()))
}

//=========================================================================================
// `HostedBackend` Trait Implementation
//=========================================================================================

#[async_trait]
impl HostedBackend for HttpBackend {
    async fn current_user(&self) -> PortResult<Option<User>> {
        match read_json::<AuthResponse>(self.http.get(self.url("/auth/user"))).await {
            Ok(auth) => Ok(Some(auth.into())),
            Err(PortError::Unauthorized) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn sign_out(&self) -> PortResult<()> {
        send(self.http.post(self.url("/auth/logout"))).await?;
        Ok(())
    }

    async fn fetch_profile(&self, _user_id: Uuid) -> PortResult<Option<Profile>> {
        match read_json::<ProfileBody>(self.http.get(self.url("/rest/v1/profiles/me"))).await {
            Ok(body) => Ok(Some(Profile::try_from(body)?)),
            Err(PortError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn update_profile(&self, _user_id: Uuid, update: &ProfileUpdate) -> PortResult<()> {
        let body = ProfileUpdateBody::from(update);
        send(self.http.patch(self.url("/rest/v1/profiles/me")).json(&body)).await?;
        Ok(())
    }

    async fn invoke_chat(&self, message: &str, language: Language) -> PortResult<String> {
        let body = ChatRequest {
            message: message.to_string(),
            language: language.as_str().to_string(),
        };
        debug!(%language, "Invoking farming-ai-chat.");
        let reply: ChatResponse =
            read_json(self.http.post(self.url("/functions/v1/farming-ai-chat")).json(&body)).await?;
        Ok(reply.response)
    }

    async fn invoke_pest_detection(&self, image: &str, language: Language) -> PortResult<PestReport> {
        let body = PestDetectionRequest {
            image: image.to_string(),
            language: language.as_str().to_string(),
        };
        debug!(%language, "Invoking detect-pest.");
        let report: PestDetectionResponse =
            read_json(self.http.post(self.url("/functions/v1/detect-pest")).json(&body)).await?;
        Ok(report.into())
    }

    async fn invoke_weather(&self, location: &str) -> PortResult<WeatherReport> {
        let body = WeatherRequest {
            location: location.to_string(),
        };
        let report: WeatherResponse =
            read_json(self.http.post(self.url("/functions/v1/get-weather")).json(&body)).await?;
        Ok(report.into())
    }

    async fn record_query(&self, record: QueryRecord) -> PortResult<()> {
        let body = QueryRecordBody::from(&record);
        send(self.http.post(self.url("/rest/v1/queries")).json(&body)).await?;
        Ok(())
    }

    async fn record_pest_detection(&self, record: PestDetectionRecord) -> PortResult<()> {
        let body = PestDetectionRecordBody::from(&record);
        send(self.http.post(self.url("/rest/v1/pest_detections")).json(&body)).await?;
        Ok(())
    }

    async fn crop_health(&self, _user_id: Uuid, limit: u32) -> PortResult<Vec<CropHealthPoint>> {
        let rows: Vec<CropHealthBody> = read_json(
            self.http
                .get(self.url("/rest/v1/crop_health"))
                .query(&[("limit", limit)]),
        )
        .await?;
        Ok(rows.into_iter().map(CropHealthPoint::from).collect())
    }
}
