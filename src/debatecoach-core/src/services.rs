//! External service seams and their OpenAI-compatible implementations.
//!
//! The pipelines only see the three traits below. [`ChatClient`] talks to any
//! OpenAI-compatible chat endpoint and backs all of them.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessage, ChatCompletionRequestUserMessage,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{
    Config, Credentials, EndpointConfig, FactCheckConfig, GENERATION_KEY_VAR, RETRIEVAL_KEY_VAR,
    ServicesConfig,
};
use crate::error::{CoachError, ServiceError};
use crate::participant::{Speaker, Turn};

/// Role of a message sent to a generation service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

impl From<&Turn> for ChatMessage {
    fn from(turn: &Turn) -> Self {
        match turn.speaker {
            Speaker::User => ChatMessage::user(turn.text.clone()),
            Speaker::Opponent | Speaker::Coach => ChatMessage::assistant(turn.text.clone()),
        }
    }
}

/// Free-text generation (coaching feedback, opponent replies).
#[async_trait]
pub trait TextGenerationService: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, ServiceError>;
}

/// Web-grounded search returning a free-form summary that may embed URLs.
#[async_trait]
pub trait RetrievalService: Send + Sync {
    fn name(&self) -> &str;

    async fn search(&self, query: &str) -> Result<String, ServiceError>;
}

/// Scores how well `premise` supports `hypothesis`, as free-form text.
#[async_trait]
pub trait GroundednessService: Send + Sync {
    fn name(&self) -> &str;

    async fn score(&self, premise: &str, hypothesis: &str) -> Result<String, ServiceError>;
}

/// The set of services available to the pipelines. Any of them may be absent.
#[derive(Clone, Default)]
pub struct Services {
    pub generation: Option<Arc<dyn TextGenerationService>>,
    pub retrieval: Option<Arc<dyn RetrievalService>>,
    pub groundedness: Option<Arc<dyn GroundednessService>>,
}

impl Services {
    /// Build HTTP-backed services for every credential that is present.
    pub fn from_credentials(credentials: &Credentials, config: &Config) -> Result<Self, CoachError> {
        let services = &config.services;
        let mut built = Services::default();

        match &credentials.generation_api_key {
            Some(key) => {
                built.generation = Some(Arc::new(ChatClient::new(
                    "generation",
                    &services.generation,
                    key,
                    services,
                )?));
            }
            None => warn!("{} not set: coaching feedback and opponent replies use built-in text", GENERATION_KEY_VAR),
        }

        match &credentials.retrieval_api_key {
            Some(key) => {
                let client = ChatClient::new("retrieval", &services.retrieval, key, services)?;
                built.retrieval = Some(Arc::new(ChatRetrieval::new(
                    client,
                    &config.prompts.fact_check_system,
                    &config.fact_check,
                )));
            }
            None => warn!("{} not set: fact checking is unavailable", RETRIEVAL_KEY_VAR),
        }

        match &credentials.groundedness_api_key {
            Some(key) => {
                let client = ChatClient::new("groundedness", &services.groundedness, key, services)?;
                built.groundedness = Some(Arc::new(ChatGroundedness::new(client)));
            }
            None => warn!("no groundedness credential: verdicts fall back to search-summary keywords"),
        }

        Ok(built)
    }

    pub fn is_empty(&self) -> bool {
        self.generation.is_none() && self.retrieval.is_none() && self.groundedness.is_none()
    }

    pub fn with_generation(mut self, service: Arc<dyn TextGenerationService>) -> Self {
        self.generation = Some(service);
        self
    }

    pub fn with_retrieval(mut self, service: Arc<dyn RetrievalService>) -> Self {
        self.retrieval = Some(service);
        self
    }

    pub fn with_groundedness(mut self, service: Arc<dyn GroundednessService>) -> Self {
        self.groundedness = Some(service);
        self
    }
}

/// Client for one OpenAI-compatible chat endpoint.
#[derive(Debug, Clone)]
pub struct ChatClient {
    name: String,
    model: String,
    client: Client<OpenAIConfig>,
}

impl ChatClient {
    pub fn new(
        name: impl Into<String>,
        endpoint: &EndpointConfig,
        api_key: &str,
        services: &ServicesConfig,
    ) -> Result<Self, CoachError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(services.request_timeout_secs))
            .connect_timeout(Duration::from_secs(services.connect_timeout_secs))
            .build()?;

        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(&endpoint.api_base);

        Ok(Self {
            name: name.into(),
            model: endpoint.model.clone(),
            client: Client::with_config(config).with_http_client(http_client),
        })
    }

    /// Single chat completion. No retries; the first failure is returned.
    async fn complete(
        &self,
        messages: Vec<ChatCompletionRequestMessage>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<String, ServiceError> {
        let start = Instant::now();

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model).messages(messages);
        if let Some(max_tokens) = max_tokens {
            args.max_completion_tokens(max_tokens);
        }
        if let Some(temperature) = temperature {
            args.temperature(temperature);
        }
        let request = args.build()?;

        let response = self.client.chat().create(request).await?;
        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        debug!(
            service = %self.name,
            model = %self.model,
            latency_ms = start.elapsed().as_millis() as u64,
            chars = content.len(),
            "chat completion finished"
        );

        if content.trim().is_empty() {
            return Err(ServiceError::EmptyResponse);
        }
        Ok(content)
    }
}

fn system_message(content: &str) -> ChatCompletionRequestMessage {
    ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
        content: content.to_string().into(),
        name: None,
    })
}

fn user_message(content: &str) -> ChatCompletionRequestMessage {
    ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
        content: content.to_string().into(),
        name: None,
    })
}

fn assistant_message(content: &str) -> Result<ChatCompletionRequestMessage, ServiceError> {
    let message = ChatCompletionRequestAssistantMessageArgs::default()
        .content(content)
        .build()?;
    Ok(message.into())
}

#[async_trait]
impl TextGenerationService for ChatClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, ServiceError> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(system_message(system_prompt));
        for m in history {
            messages.push(match m.role {
                ChatRole::User => user_message(&m.content),
                ChatRole::Assistant => assistant_message(&m.content)?,
            });
        }

        self.complete(messages, Some(max_tokens), Some(temperature)).await
    }
}

/// Retrieval through an online (search-augmented) chat model.
#[derive(Debug, Clone)]
pub struct ChatRetrieval {
    client: ChatClient,
    system_prompt: String,
    max_tokens: u32,
    temperature: f32,
}

impl ChatRetrieval {
    pub fn new(client: ChatClient, system_prompt: &str, config: &FactCheckConfig) -> Self {
        Self {
            client,
            system_prompt: system_prompt.to_string(),
            max_tokens: config.search_max_tokens,
            temperature: config.search_temperature,
        }
    }
}

#[async_trait]
impl RetrievalService for ChatRetrieval {
    fn name(&self) -> &str {
        &self.client.name
    }

    async fn search(&self, query: &str) -> Result<String, ServiceError> {
        let messages = vec![system_message(&self.system_prompt), user_message(query)];
        self.client
            .complete(messages, Some(self.max_tokens), Some(self.temperature))
            .await
    }
}

/// Groundedness scoring through a chat endpoint that takes the premise as the
/// user turn and the hypothesis as the assistant turn.
#[derive(Debug, Clone)]
pub struct ChatGroundedness {
    client: ChatClient,
}

impl ChatGroundedness {
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl GroundednessService for ChatGroundedness {
    fn name(&self) -> &str {
        &self.client.name
    }

    async fn score(&self, premise: &str, hypothesis: &str) -> Result<String, ServiceError> {
        let messages = vec![user_message(premise), assistant_message(hypothesis)?];
        self.client.complete(messages, None, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_config;

    #[test]
    fn test_turn_to_chat_message() {
        let user: ChatMessage = (&Turn::user("안녕하세요")).into();
        let opponent: ChatMessage = (&Turn::opponent("반갑습니다")).into();
        assert_eq!(user.role, ChatRole::User);
        assert_eq!(opponent.role, ChatRole::Assistant);
        assert_eq!(opponent.content, "반갑습니다");

        let coach: ChatMessage = (&Turn::coach("좋은 근거입니다")).into();
        assert_eq!(coach.role, ChatRole::Assistant);
    }

    #[test]
    fn test_assistant_message_carries_text() {
        use async_openai::types::chat::ChatCompletionRequestAssistantMessageContent;

        let message = assistant_message("근거가 충분합니다").unwrap();
        let ChatCompletionRequestMessage::Assistant(assistant) = message else {
            panic!("expected an assistant message");
        };
        assert!(matches!(
            assistant.content,
            Some(ChatCompletionRequestAssistantMessageContent::Text(ref text)) if text == "근거가 충분합니다"
        ));
        assert!(assistant.tool_calls.is_none());
    }

    #[test]
    fn test_services_follow_credentials() {
        let config = default_config();

        let none = Services::from_credentials(&Credentials::default(), &config).unwrap();
        assert!(none.is_empty());

        let creds = Credentials::from_lookup(|key| {
            (key == RETRIEVAL_KEY_VAR).then(|| "pplx-test".to_string())
        });
        let retrieval_only = Services::from_credentials(&creds, &config).unwrap();
        assert!(retrieval_only.retrieval.is_some());
        assert!(retrieval_only.generation.is_none());
        assert!(retrieval_only.groundedness.is_none());

        let creds = Credentials::from_lookup(|key| {
            (key == GENERATION_KEY_VAR).then(|| "up-test".to_string())
        });
        let upstage = Services::from_credentials(&creds, &config).unwrap();
        assert_eq!(upstage.generation.as_ref().map(|s| s.name().to_string()).as_deref(), Some("generation"));
        assert!(upstage.groundedness.is_some());
    }
}
