//! crates/rytu_mitra_core/src/client/dashboard.rs
//!
//! Resolves what the dashboard should show on load, and signs the user out.

use super::display::{fetch_crop_health, fetch_weather, CropHealthSample, WeatherDisplay};
use super::onboarding::Route;
use super::Notification;
use crate::domain::{Language, Profile};
use crate::ports::HostedBackend;
use tracing::{error, warn};

/// Weather is shown for this location until the farmer sets one.
pub const DEFAULT_LOCATION: &str = "Guntur";

/// Everything the dashboard renders after load.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    /// May be missing if the profile row could not be read.
    pub profile: Option<Profile>,
    pub language: Language,
    pub weather: WeatherDisplay,
    pub crop_health: Vec<CropHealthSample>,
}

impl Dashboard {
    pub fn title(&self) -> &'static str {
        self.language.pick("Rytu Mitra AI", "రైతు మిత్ర AI")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardLoad {
    Redirect(Route),
    Ready(Box<Dashboard>),
}

/// Checks the session and the profile, then loads the widgets.
pub async fn load_dashboard(backend: &dyn HostedBackend) -> DashboardLoad {
    let user = match backend.current_user().await {
        Ok(Some(user)) => user,
        Ok(None) => return DashboardLoad::Redirect(Route::Auth),
        Err(e) => {
            error!(error = %e, "Could not resolve the current user.");
            return DashboardLoad::Redirect(Route::Auth);
        }
    };

    let profile = match backend.fetch_profile(user.user_id).await {
        Ok(profile) => profile,
        Err(e) => {
            warn!(error = %e, user_id = %user.user_id, "Could not load profile.");
            None
        }
    };

    if profile.as_ref().is_some_and(Profile::needs_onboarding) {
        return DashboardLoad::Redirect(Route::Onboarding);
    }

    let language = profile
        .as_ref()
        .map(Profile::language)
        .unwrap_or_default();
    let location = profile
        .as_ref()
        .and_then(|p| p.location.clone())
        .unwrap_or_else(|| DEFAULT_LOCATION.to_string());

    let (weather, crop_health) = futures::join!(
        fetch_weather(backend, &location),
        fetch_crop_health(backend, Some(user.user_id)),
    );

    DashboardLoad::Ready(Box::new(Dashboard {
        profile,
        language,
        weather,
        crop_health,
    }))
}

/// Ends the session. The user lands on the landing page either way.
pub async fn sign_out(backend: &dyn HostedBackend) -> (Route, Notification) {
    if let Err(e) = backend.sign_out().await {
        warn!(error = %e, "Sign-out failed.");
    }
    (Route::Landing, Notification::success("Logged out successfully"))
}
