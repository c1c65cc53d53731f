//! crates/rytu_mitra_core/src/client/detection.rs
//!
//! Crop image analysis: encodes the upload, calls the pest-detection function
//! and records the result in the background.

use super::{failure_message, spawn_persistence, Lifecycle, Notification, Phase};
use crate::domain::{Language, PestDetectionRecord, PestReport};
use crate::ports::{HostedBackend, PortResult};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

const FALLBACK_FAILURE: &str = "Failed to analyze image";

/// An image picked or captured by the farmer.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ImageUpload {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// `data:<mime>;base64,<payload>`, the form the detection function expects.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}

#[derive(Debug)]
pub enum DetectionOutcome {
    Analyzed {
        report: PestReport,
        recording: JoinHandle<()>,
    },
    Failed { message: String },
}

pub struct PestDetectionClient {
    backend: Arc<dyn HostedBackend>,
    language: Language,
    image: Option<String>,
    result: Option<PestReport>,
    lifecycle: Lifecycle,
}

impl PestDetectionClient {
    pub fn new(backend: Arc<dyn HostedBackend>, language: Language) -> Self {
        Self {
            backend,
            language,
            image: None,
            result: None,
            lifecycle: Lifecycle::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.lifecycle.phase()
    }

    pub fn is_analyzing(&self) -> bool {
        self.lifecycle.is_awaiting()
    }

    /// The last uploaded image as a data URL, shown as a preview.
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// The last successful result. Hidden while a new analysis is running.
    pub fn result(&self) -> Option<&PestReport> {
        if self.is_analyzing() {
            None
        } else {
            self.result.as_ref()
        }
    }

    pub fn take_notification(&mut self) -> Option<Notification> {
        self.lifecycle.take_notification()
    }

    pub async fn analyze(&mut self, upload: ImageUpload) -> DetectionOutcome {
        self.analyze_data_url(upload.to_data_url()).await
    }

    pub async fn analyze_data_url(&mut self, image: String) -> DetectionOutcome {
        self.image = Some(image.clone());
        self.lifecycle.begin();

        match self.backend.invoke_pest_detection(&image, self.language).await {
            Ok(report) => {
                info!(severity = %report.severity, "Crop image analysed.");
                self.result = Some(report.clone());
                self.lifecycle.succeed(Some(Notification::success(
                    self.language
                        .pick("Analysis complete!", "విశ్లేషణ పూర్తయింది!"),
                )));
                let recording = self.record(image, report.clone());
                DetectionOutcome::Analyzed { report, recording }
            }
            Err(e) => {
                error!(error = %e, "Pest detection failed.");
                let message = failure_message(&e, FALLBACK_FAILURE);
                self.lifecycle.fail(message.clone());
                DetectionOutcome::Failed { message }
            }
        }
    }

    fn record(&self, image_url: String, report: PestReport) -> JoinHandle<()> {
        let backend = self.backend.clone();
        spawn_persistence("pest detection", async move {
            let Some(user) = backend.current_user().await? else {
                return PortResult::Ok(());
            };
            backend
                .record_pest_detection(PestDetectionRecord {
                    user_id: user.user_id,
                    image_url,
                    detection_result: report,
                })
                .await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::MockBackend;
    use crate::client::NotificationLevel;
    use crate::domain::{PLACEHOLDER_PEST_NAME, PLACEHOLDER_SEVERITY};
    use crate::ports::PortError;

    #[test]
    fn upload_is_encoded_as_data_url() {
        let upload = ImageUpload::new(b"hello".to_vec(), "image/png");
        assert_eq!(upload.to_data_url(), "data:image/png;base64,aGVsbG8=");
    }

    #[tokio::test]
    async fn analysis_is_shown_and_recorded() {
        let backend = Arc::new(MockBackend::signed_in());
        *backend.pest_report.lock().unwrap() = Ok(PestReport::from_analysis(
            "Brown planthopper. Drain the field and spray buprofezin.",
        ));
        let mut client = PestDetectionClient::new(backend.clone(), Language::English);

        let upload = ImageUpload::new(vec![0xFF, 0xD8, 0xFF], "image/jpeg");
        let data_url = upload.to_data_url();
        let DetectionOutcome::Analyzed { report, recording } = client.analyze(upload).await else {
            panic!("expected an analysis");
        };
        recording.await.unwrap();

        assert_eq!(report.pest_name, PLACEHOLDER_PEST_NAME);
        assert_eq!(report.severity, PLACEHOLDER_SEVERITY);
        assert_eq!(client.result(), Some(&report));
        assert_eq!(client.image(), Some(data_url.as_str()));
        assert_eq!(
            client.take_notification(),
            Some(Notification::success("Analysis complete!"))
        );

        let detections = backend.detections.lock().unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].image_url, data_url);
        assert_eq!(detections[0].pest_name(), PLACEHOLDER_PEST_NAME);
        assert_eq!(detections[0].severity(), PLACEHOLDER_SEVERITY);
        assert!(detections[0].recommendations().contains("buprofezin"));
    }

    #[tokio::test]
    async fn telugu_success_message() {
        let backend = Arc::new(MockBackend::signed_in());
        let mut client = PestDetectionClient::new(backend, Language::Telugu);
        client.analyze_data_url("data:image/png;base64,AA==".to_string()).await;
        assert_eq!(
            client.take_notification().unwrap().message,
            "విశ్లేషణ పూర్తయింది!"
        );
    }

    #[tokio::test]
    async fn failure_keeps_previous_result_out_of_the_record() {
        let backend = Arc::new(MockBackend::signed_in());
        *backend.pest_report.lock().unwrap() =
            Err(PortError::Transport("connection reset".to_string()));
        let mut client = PestDetectionClient::new(backend.clone(), Language::English);

        let DetectionOutcome::Failed { message } = client
            .analyze(ImageUpload::new(vec![1, 2, 3], "image/png"))
            .await
        else {
            panic!("expected a failure");
        };
        assert!(message.contains("connection reset"));
        assert!(client.result().is_none());

        let note = client.take_notification().unwrap();
        assert_eq!(note.level, NotificationLevel::Error);
        assert_eq!(client.phase(), Phase::Idle);
        assert!(backend.detections.lock().unwrap().is_empty());
    }
}
