//! crates/rytu_mitra_core/src/client/onboarding.rs
//!
//! Collects the farmer's location, main crop and language after sign-up.

use super::{failure_message, Notification};
use crate::domain::{Language, ProfileUpdate};
use crate::ports::HostedBackend;
use std::sync::Arc;
use tracing::{error, info};

/// The screens a flow can send the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Landing,
    Auth,
    Onboarding,
    Dashboard,
}

/// The onboarding form. Language starts as Telugu.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OnboardingForm {
    pub location: String,
    pub crop_type: String,
    pub preferred_language: Language,
}

impl OnboardingForm {
    fn to_update(&self) -> ProfileUpdate {
        ProfileUpdate {
            location: self.location.clone(),
            crop_type: self.crop_type.clone(),
            preferred_language: self.preferred_language,
        }
    }
}

pub struct OnboardingClient {
    backend: Arc<dyn HostedBackend>,
    pub form: OnboardingForm,
    submitting: bool,
    notification: Option<Notification>,
}

impl OnboardingClient {
    pub fn new(backend: Arc<dyn HostedBackend>) -> Self {
        Self {
            backend,
            form: OnboardingForm::default(),
            submitting: false,
            notification: None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn take_notification(&mut self) -> Option<Notification> {
        self.notification.take()
    }

    /// Onboarding is only reachable with a session.
    pub async fn guard(&self) -> Route {
        match self.backend.current_user().await {
            Ok(Some(_)) => Route::Onboarding,
            Ok(None) => Route::Auth,
            Err(e) => {
                error!(error = %e, "Could not resolve the current user.");
                Route::Auth
            }
        }
    }

    /// Saves the form to the profile and returns where to go next.
    pub async fn submit(&mut self) -> Route {
        let user = match self.backend.current_user().await {
            Ok(Some(user)) => user,
            Ok(None) => return Route::Auth,
            Err(e) => {
                error!(error = %e, "Could not resolve the current user.");
                return Route::Auth;
            }
        };

        self.submitting = true;
        let update = self.form.to_update();
        let outcome = self.backend.update_profile(user.user_id, &update).await;
        self.submitting = false;

        match outcome {
            Ok(()) => {
                info!(user_id = %user.user_id, location = %update.location, "Profile updated.");
                self.notification = Some(Notification::success(
                    update
                        .preferred_language
                        .pick("Profile updated!", "ప్రొఫైల్ నవీకరించబడింది!"),
                ));
                Route::Dashboard
            }
            Err(e) => {
                error!(error = %e, "Failed to update profile.");
                self.notification = Some(Notification::error(failure_message(
                    &e,
                    "Failed to update profile",
                )));
                Route::Onboarding
            }
        }
    }
}
