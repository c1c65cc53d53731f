//! crates/rytu_mitra_core/src/client/mod.rs
//!
//! The client-side flows: chat, pest detection, onboarding and the dashboard.
//! Each flow owns its local state and talks to the hosted backend only through
//! the `HostedBackend` port.

pub mod chat;
pub mod dashboard;
pub mod detection;
pub mod display;
pub mod onboarding;

#[cfg(test)]
pub(crate) mod testing;

use crate::ports::PortResult;
use std::future::Future;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

//=========================================================================================
// Request Lifecycle
//=========================================================================================

/// Where a client is in its request cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// A request is outstanding; the UI shows its "thinking" indicator and
    /// disables the input.
    AwaitingResponse,
    /// The last request failed and the user has not seen the notification yet.
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A transient, toast-style message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// The Idle -> AwaitingResponse -> Idle cycle shared by the chat and detection
/// clients, with the Error detour that ends once the user has been notified.
#[derive(Debug, Default)]
pub struct Lifecycle {
    phase: Phase,
    pending: Option<Notification>,
}

impl Lifecycle {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_awaiting(&self) -> bool {
        self.phase == Phase::AwaitingResponse
    }

    pub(crate) fn begin(&mut self) {
        // Starting a new request acknowledges any unseen error.
        self.pending = None;
        self.transition(Phase::AwaitingResponse);
    }

    pub(crate) fn succeed(&mut self, notification: Option<Notification>) {
        self.pending = notification;
        self.transition(Phase::Idle);
    }

    pub(crate) fn fail(&mut self, message: impl Into<String>) {
        self.pending = Some(Notification::error(message));
        self.transition(Phase::Error);
    }

    /// Hands the pending notification to the UI. An Error phase ends here.
    pub fn take_notification(&mut self) -> Option<Notification> {
        let notification = self.pending.take();
        if self.phase == Phase::Error {
            self.transition(Phase::Idle);
        }
        notification
    }

    fn transition(&mut self, next: Phase) {
        debug!(from = ?self.phase, to = ?next, "Client phase change");
        self.phase = next;
    }
}

/// Picks the message shown for a failed request.
pub(crate) fn failure_message(error: &crate::ports::PortError, fallback: &str) -> String {
    let message = error.to_string();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

//=========================================================================================
// Background Persistence
//=========================================================================================

/// Runs an audit write in the background. The reply has already been shown, so a
/// failure is only logged.
pub(crate) fn spawn_persistence<F>(what: &'static str, write: F) -> JoinHandle<()>
where
    F: Future<Output = PortResult<()>> + Send + 'static,
{
    tokio::spawn(async move {
        match write.await {
            Ok(()) => debug!("Recorded {}.", what),
            Err(e) => warn!(error = %e, "Failed to record {}.", what),
        }
    })
}
