//! crates/rytu_mitra_core/src/client/chat.rs
//!
//! The farming chat: keeps the transcript, sends the draft to the chat
//! function and records every answered question in the background.

use super::{failure_message, spawn_persistence, Lifecycle, Notification, Phase};
use crate::domain::{ChatMessage, Language, QueryKind, QueryRecord};
use crate::ports::{HostedBackend, PortResult};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

const FALLBACK_FAILURE: &str = "Failed to get response";

/// The result of one `send`.
#[derive(Debug)]
pub enum ChatTurn {
    /// The draft was blank; nothing was sent.
    Skipped,
    Answered {
        reply: String,
        /// The background write of the query record.
        recording: JoinHandle<()>,
    },
    Failed { message: String },
}

/// Chat state for one dashboard session.
///
/// `send` takes `&mut self`, so a second submission cannot start while one is
/// outstanding.
pub struct ChatClient {
    backend: Arc<dyn HostedBackend>,
    language: Language,
    messages: Vec<ChatMessage>,
    input: String,
    lifecycle: Lifecycle,
}

impl ChatClient {
    pub fn new(backend: Arc<dyn HostedBackend>, language: Language) -> Self {
        Self {
            backend,
            language,
            messages: Vec::new(),
            input: String::new(),
            lifecycle: Lifecycle::default(),
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn phase(&self) -> Phase {
        self.lifecycle.phase()
    }

    pub fn is_thinking(&self) -> bool {
        self.lifecycle.is_awaiting()
    }

    pub fn input_enabled(&self) -> bool {
        !self.lifecycle.is_awaiting()
    }

    pub fn can_send(&self) -> bool {
        self.input_enabled() && !self.input.trim().is_empty()
    }

    pub fn take_notification(&mut self) -> Option<Notification> {
        self.lifecycle.take_notification()
    }

    /// The greeting shown while the transcript is empty.
    pub fn empty_hint(&self) -> &'static str {
        self.language.pick(
            "Ask me anything about farming, crops, pests, or weather!",
            "వ్యవసాయం, పంటలు, తెగుళ్ళు లేదా వాతావరణం గురించి ఏదైనా అడగండి!",
        )
    }

    /// Sends the current draft to the chat function.
    pub async fn send(&mut self) -> ChatTurn {
        if self.input.trim().is_empty() {
            return ChatTurn::Skipped;
        }

        let message = std::mem::take(&mut self.input);
        self.messages.push(ChatMessage::user(message.clone()));
        self.lifecycle.begin();

        match self.backend.invoke_chat(&message, self.language).await {
            Ok(reply) => {
                info!(language = %self.language, "Chat reply received.");
                self.messages.push(ChatMessage::assistant(reply.clone()));
                self.lifecycle.succeed(None);
                let recording = self.record(message, reply.clone());
                ChatTurn::Answered { reply, recording }
            }
            Err(e) => {
                error!(error = %e, "Chat request failed.");
                let message = failure_message(&e, FALLBACK_FAILURE);
                self.lifecycle.fail(message.clone());
                ChatTurn::Failed { message }
            }
        }
    }

    fn record(&self, query_text: String, response_text: String) -> JoinHandle<()> {
        let backend = self.backend.clone();
        let language = self.language;
        spawn_persistence("chat query", async move {
            let Some(user) = backend.current_user().await? else {
                return PortResult::Ok(());
            };
            backend
                .record_query(QueryRecord {
                    user_id: user.user_id,
                    query_text,
                    response_text,
                    query_language: language.as_str().to_string(),
                    query_type: QueryKind::Text,
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
    use crate::domain::ChatRole;
    use crate::ports::PortError;

    #[tokio::test]
    async fn blank_draft_makes_no_network_call() {
        let backend = Arc::new(MockBackend::signed_in());
        let mut chat = ChatClient::new(backend.clone(), Language::English);

        chat.set_input("   \n");
        assert!(!chat.can_send());
        assert!(matches!(chat.send().await, ChatTurn::Skipped));
        assert!(backend.calls().is_empty());
        assert!(chat.messages().is_empty());
        assert_eq!(chat.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn telugu_question_is_answered_and_recorded() {
        let backend = Arc::new(MockBackend::signed_in());
        *backend.chat_reply.lock().unwrap() =
            Ok("వరికి యూరియా మరియు DAP ఎరువులు ఉత్తమం.".to_string());
        let mut chat = ChatClient::new(backend.clone(), Language::Telugu);

        chat.set_input("best fertilizer for rice");
        let ChatTurn::Answered { reply, recording } = chat.send().await else {
            panic!("expected an answer");
        };
        recording.await.unwrap();

        assert!(!reply.is_empty());
        assert_eq!(chat.input(), "");
        assert_eq!(
            chat.messages(),
            &[
                ChatMessage::user("best fertilizer for rice"),
                ChatMessage::assistant(reply.clone()),
            ]
        );
        assert_eq!(
            backend.chat_requests.lock().unwrap()[0],
            ("best fertilizer for rice".to_string(), Language::Telugu)
        );

        let queries = backend.queries.lock().unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].user_id, backend.user_id());
        assert_eq!(queries[0].query_language, "telugu");
        assert_eq!(queries[0].query_type, QueryKind::Text);
        assert_eq!(queries[0].response_text, reply);
    }

    #[tokio::test]
    async fn upstream_failure_notifies_and_reenables_input() {
        let backend = Arc::new(MockBackend::signed_in());
        *backend.chat_reply.lock().unwrap() = Err(PortError::Upstream {
            status: Some(500),
            message: "Internal Server Error".to_string(),
        });
        let mut chat = ChatClient::new(backend.clone(), Language::English);

        chat.set_input("when to sow cotton?");
        let ChatTurn::Failed { message } = chat.send().await else {
            panic!("expected a failure");
        };
        assert_eq!(message, "Internal Server Error");
        assert_eq!(chat.phase(), Phase::Error);
        assert!(chat.input_enabled());

        let note = chat.take_notification().unwrap();
        assert_eq!(note.level, NotificationLevel::Error);
        assert_eq!(chat.phase(), Phase::Idle);

        // The question stays in the transcript; nothing was recorded.
        assert_eq!(chat.messages().len(), 1);
        assert_eq!(chat.messages()[0].role, ChatRole::User);
        assert!(!backend.calls().contains(&"record_query".to_string()));

        chat.set_input("retry");
        assert!(chat.can_send());
    }

    #[tokio::test]
    async fn recording_failure_does_not_touch_the_reply() {
        let backend = Arc::new(MockBackend::signed_in());
        *backend.record_error.lock().unwrap() =
            Some(PortError::Unexpected("db offline".to_string()));
        let mut chat = ChatClient::new(backend.clone(), Language::English);

        chat.set_input("is it going to rain?");
        let ChatTurn::Answered { recording, .. } = chat.send().await else {
            panic!("expected an answer");
        };
        recording.await.unwrap();

        assert_eq!(chat.messages().len(), 2);
        assert!(chat.take_notification().is_none());
        assert!(backend.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn anonymous_chat_is_not_recorded() {
        let backend = Arc::new(MockBackend::anonymous());
        let mut chat = ChatClient::new(backend.clone(), Language::English);

        chat.set_input("hello");
        let ChatTurn::Answered { recording, .. } = chat.send().await else {
            panic!("expected an answer");
        };
        recording.await.unwrap();

        assert!(!backend.calls().contains(&"record_query".to_string()));
    }
}
