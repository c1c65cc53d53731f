//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for user signup, login, logout and the current user.

use crate::config::Config;
use crate::error::RouteError;
use crate::web::protocol::{AuthResponse, ErrorBody, LoginRequest, SignupRequest};
use crate::web::state::AppState;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use chrono::{Duration, Utc};
use rytu_mitra_core::domain::SignupDetails;
use rytu_mitra_core::ports::PortError;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

//=========================================================================================
// Session Cookies
//=========================================================================================

/// Reads the `session` cookie from the request headers.
pub(crate) fn session_id_from(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())?
        .split(';')
        .find_map(|c| c.trim().strip_prefix("session="))
        .filter(|id| !id.is_empty())
}

fn session_cookie(config: &Config, session_id: &str, max_age_secs: i64) -> String {
    let secure = if config.secure_cookies { " Secure;" } else { "" };
    format!(
        "session={}; HttpOnly;{} SameSite=Lax; Path=/; Max-Age={}",
        session_id, secure, max_age_secs
    )
}

/// Opens a new session for the user and returns the `Set-Cookie` value.
async fn open_session(state: &AppState, user_id: Uuid) -> Result<String, RouteError> {
    let session_id = Uuid::new_v4().to_string();
    let ttl = Duration::days(state.config.session_ttl_days);

    state
        .db
        .create_auth_session(&session_id, user_id, Utc::now() + ttl)
        .await?;

    Ok(session_cookie(&state.config, &session_id, ttl.num_seconds()))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/signup - Create a new user account and its profile
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created successfully", body = AuthResponse),
        (status = 400, description = "Invalid request or email already registered", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<impl IntoResponse, RouteError> {
    let Json(req) = payload?;
    let email = req.email.trim();
    if email.is_empty() || req.password.is_empty() {
        return Err(RouteError::BadRequest(
            "email and password are required".to_string(),
        ));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| RouteError::Internal(format!("Failed to hash password: {}", e)))?
        .to_string();

    let details = SignupDetails {
        full_name: req.full_name,
        phone: req.phone,
    };
    let user = state
        .db
        .create_user_with_email(email, &password_hash, &details)
        .await?;
    info!(user_id = %user.user_id, "User signed up.");

    let cookie = open_session(&state, user.user_id).await?;
    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse::from(user)),
    ))
}

/// POST /auth/login - Login with an existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, RouteError> {
    let Json(req) = payload?;

    let creds = match state.db.get_user_by_email(req.email.trim()).await {
        Ok(creds) => creds,
        Err(PortError::NotFound(_)) => return Err(RouteError::Unauthorized),
        Err(e) => return Err(e.into()),
    };

    let parsed_hash = PasswordHash::new(&creds.hashed_password).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        RouteError::Internal("Authentication error".to_string())
    })?;
    if Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        warn!(user_id = %creds.user_id, "Rejected login with a wrong password.");
        return Err(RouteError::Unauthorized);
    }

    let cookie = open_session(&state, creds.user_id).await?;
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            user_id: creds.user_id,
            email: Some(creds.email),
        }),
    ))
}

/// POST /auth/logout - Invalidate the session and clear the cookie
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "No active session", body = ErrorBody)
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, RouteError> {
    let session_id = session_id_from(&headers).ok_or(RouteError::Unauthorized)?;
    state.db.delete_auth_session(session_id).await?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, session_cookie(&state.config, "", 0))],
    ))
}

/// GET /auth/user - The user behind the session cookie
#[utoipa::path(
    get,
    path = "/auth/user",
    responses(
        (status = 200, description = "The signed-in user", body = AuthResponse),
        (status = 401, description = "No active session", body = ErrorBody)
    )
)]
pub async fn current_user_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<AuthResponse>, RouteError> {
    let user = state.db.get_user_by_id(user_id).await?;
    Ok(Json(user.into()))
}
