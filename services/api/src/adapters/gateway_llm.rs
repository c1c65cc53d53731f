//! services/api/src/adapters/gateway_llm.rs
//!
//! This module contains the adapter for the OpenAI-compatible AI gateway.
//! It implements both the `FarmingAdviceService` and the
//! `CropImageAnalysisService` ports from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImageArgs,
        ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContentPart,
        CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse, ImageUrlArgs,
    },
    Client,
};
use async_trait::async_trait;
use rytu_mitra_core::{
    domain::Language,
    ports::{CropImageAnalysisService, FarmingAdviceService, PortError, PortResult},
    prompts::{chat_system_prompt, pest_analysis_prompt},
};
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use std::time::{Duration, Instant};
use tracing::info;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that talks to the AI gateway with a fixed model.
#[derive(Clone)]
pub struct GatewayAiAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl GatewayAiAdapter {
    /// Creates a new `GatewayAiAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    /// Builds a client for the gateway at `api_base`, authenticated with `api_key`.
    /// Gateway failures surface on the first attempt.
    pub fn connect(api_base: &str, api_key: &str, model: String) -> Self {
        let config = OpenAIConfig::new()
            .with_api_base(api_base)
            .with_api_key(api_key);
        let client = Client::with_config(config).with_backoff(single_attempt());
        Self::new(client, model)
    }

    async fn complete(&self, request: CreateChatCompletionRequest) -> PortResult<String> {
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(map_gateway_error)?;
        first_choice_text(response)
    }
}

/// A backoff whose elapsed-time budget is spent before the first retry.
fn single_attempt() -> ExponentialBackoff {
    ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build()
}

//=========================================================================================
// Request Builders
//=========================================================================================

/// `[system, user]` chat request for a farmer's question.
fn build_chat_request(
    model: &str,
    message: &str,
    language: Language,
) -> Result<CreateChatCompletionRequest, OpenAIError> {
    let messages: Vec<ChatCompletionRequestMessage> = vec![
        ChatCompletionRequestSystemMessageArgs::default()
            .content(chat_system_prompt(language))
            .build()?
            .into(),
        ChatCompletionRequestUserMessageArgs::default()
            .content(message)
            .build()?
            .into(),
    ];

    CreateChatCompletionRequestArgs::default()
        .model(model)
        .messages(messages)
        .build()
}

/// A single user message carrying the analysis prompt and the crop image.
fn build_vision_request(
    model: &str,
    image_url: &str,
    language: Language,
) -> Result<CreateChatCompletionRequest, OpenAIError> {
    let prompt_part: ChatCompletionRequestUserMessageContentPart =
        ChatCompletionRequestMessageContentPartTextArgs::default()
            .text(pest_analysis_prompt(language))
            .build()?
            .into();
    let image_part: ChatCompletionRequestUserMessageContentPart =
        ChatCompletionRequestMessageContentPartImageArgs::default()
            .image_url(ImageUrlArgs::default().url(image_url).build()?)
            .build()?
            .into();

    let messages: Vec<ChatCompletionRequestMessage> = vec![
        ChatCompletionRequestUserMessageArgs::default()
            .content(vec![prompt_part, image_part])
            .build()?
            .into(),
    ];

    CreateChatCompletionRequestArgs::default()
        .model(model)
        .messages(messages)
        .build()
}

/// Returns the first choice's content verbatim. Blank content is malformed.
fn first_choice_text(response: CreateChatCompletionResponse) -> PortResult<String> {
    let choice = response.choices.into_iter().next().ok_or_else(|| {
        PortError::MalformedResponse("gateway returned no choices".to_string())
    })?;
    match choice.message.content {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(PortError::MalformedResponse(
            "gateway choice contained no text content".to_string(),
        )),
    }
}

fn map_gateway_error(e: OpenAIError) -> PortError {
    match e {
        OpenAIError::ApiError(api) => PortError::Upstream {
            status: None,
            message: api.message,
        },
        OpenAIError::Reqwest(e) => PortError::Transport(e.to_string()),
        OpenAIError::JSONDeserialize(..) => PortError::MalformedResponse(e.to_string()),
        other => PortError::Unexpected(other.to_string()),
    }
}

//=========================================================================================
// Port Implementations
//=========================================================================================

#[async_trait]
impl FarmingAdviceService for GatewayAiAdapter {
    async fn advise(&self, message: &str, language: Language) -> PortResult<String> {
        let request = build_chat_request(&self.model, message, language)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let started = Instant::now();
        let reply = self.complete(request).await?;
        info!(%language, elapsed = ?started.elapsed(), "Farming advice generated.");
        Ok(reply)
    }
}

#[async_trait]
impl CropImageAnalysisService for GatewayAiAdapter {
    async fn analyze_crop_image(&self, image_url: &str, language: Language) -> PortResult<String> {
        let request = build_vision_request(&self.model, image_url, language)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let started = Instant::now();
        let analysis = self.complete(request).await?;
        info!(%language, elapsed = ?started.elapsed(), "Crop image analysed.");
        Ok(analysis)
    }
}
