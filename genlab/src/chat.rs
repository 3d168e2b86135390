//! Chat completion types and provider traits.
//!
//! This module provides:
//! - [`ChatRequest`]: an ordered conversation plus sampling options
//! - [`ChatResponse`]: the next assistant turn
//! - [`ChatProvider`]: the trait every chat backend implements
//!
//! # Example
//!
//! ```rust,ignore
//! use genlab::prelude::*;
//!
//! let request = ChatRequest::new("gpt-4o-mini")
//!     .system("You are a helpful assistant.")
//!     .user("Who won the world series in 2020?")
//!     .max_tokens(100)
//!     .temperature(0.7);
//!
//! let response = provider.chat(&request).await?;
//! println!("{}", response.text().unwrap_or_default());
//! ```

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::error::{LlmError, Result};
use crate::message::Message;
use crate::stream::{StopReason, StreamChunk};
use crate::usage::Usage;

/// A chat completion request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model identifier. Empty means the provider's default chat model.
    #[serde(default)]
    pub model: String,

    /// Conversation turns, oldest first.
    #[serde(default)]
    pub messages: Vec<Message>,

    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Sampling temperature (0.0 to 2.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Nucleus sampling parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    /// Number of choices to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,

    /// Stop sequences.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,

    /// Presence penalty (-2.0 to 2.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,

    /// Frequency penalty (-2.0 to 2.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,

    /// Seed for best-effort deterministic sampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,

    /// End-user identifier for abuse monitoring.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Whether to stream the response.
    #[serde(default)]
    pub stream: bool,
}

impl ChatRequest {
    /// Creates a request for the given model with no messages.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Creates a request with an existing conversation.
    #[must_use]
    pub fn with_messages(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            ..Default::default()
        }
    }

    /// Appends a system message.
    #[must_use]
    pub fn system(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Message::system(content));
        self
    }

    /// Appends a user message.
    #[must_use]
    pub fn user(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Message::user(content));
        self
    }

    /// Appends an assistant message.
    #[must_use]
    pub fn assistant(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Message::assistant(content));
        self
    }

    /// Appends an arbitrary message.
    #[must_use]
    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Sets the maximum number of tokens to generate.
    #[must_use]
    pub const fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub const fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets nucleus sampling.
    #[must_use]
    pub const fn top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Sets the number of choices.
    #[must_use]
    pub const fn n(mut self, n: u32) -> Self {
        self.n = Some(n);
        self
    }

    /// Sets stop sequences.
    #[must_use]
    pub fn stop(mut self, stop: Vec<String>) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Sets the presence penalty.
    #[must_use]
    pub const fn presence_penalty(mut self, penalty: f32) -> Self {
        self.presence_penalty = Some(penalty);
        self
    }

    /// Sets the frequency penalty.
    #[must_use]
    pub const fn frequency_penalty(mut self, penalty: f32) -> Self {
        self.frequency_penalty = Some(penalty);
        self
    }

    /// Sets the sampling seed.
    #[must_use]
    pub const fn seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the end-user identifier.
    #[must_use]
    pub fn user_id(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Enables or disables streaming.
    #[must_use]
    pub const fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }
}

/// A chat completion response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The generated assistant turn (first choice).
    pub message: Message,

    /// Why the model stopped generating.
    pub stop_reason: StopReason,

    /// Token usage statistics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,

    /// Model identifier used for this response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Unique completion ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Unix timestamp of creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<u64>,
}

impl ChatResponse {
    /// Creates a new response with a message.
    #[must_use]
    pub const fn new(message: Message) -> Self {
        Self {
            message,
            stop_reason: StopReason::Stop,
            usage: None,
            model: None,
            id: None,
            created: None,
        }
    }

    /// Creates a response from text content.
    #[must_use]
    pub fn from_text(content: impl Into<String>) -> Self {
        Self::new(Message::assistant(content))
    }

    /// Sets the stop reason.
    #[must_use]
    pub const fn with_stop_reason(mut self, reason: StopReason) -> Self {
        self.stop_reason = reason;
        self
    }

    /// Sets usage statistics.
    #[must_use]
    pub const fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Sets the model identifier.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the completion ID.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Returns the text content of the response.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        self.message.text()
    }

    /// Returns `true` if the response was truncated due to length.
    #[must_use]
    pub const fn is_truncated(&self) -> bool {
        self.stop_reason.is_truncated()
    }
}

impl Default for ChatResponse {
    fn default() -> Self {
        Self::new(Message::assistant(""))
    }
}

/// Boxed stream of chat chunks.
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<StreamChunk>> + Send>>;

/// Trait for providers that support chat completions.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send a chat completion request and receive the next assistant turn.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse>;

    /// Send a chat completion request and receive a streaming response.
    ///
    /// By default streaming is not supported.
    async fn chat_stream(&self, request: &ChatRequest) -> Result<ChatStream> {
        let _ = request;
        Err(LlmError::not_supported("streaming").into())
    }

    /// Get the name of this provider.
    ///
    /// Used for error messages and logging.
    fn provider_name(&self) -> &'static str;

    /// Get the default chat model for this provider.
    fn default_model(&self) -> &str;

    /// Check if this provider supports streaming.
    fn supports_streaming(&self) -> bool {
        false
    }
}

/// Extension trait for [`ChatProvider`] with one-shot helpers.
#[async_trait]
pub trait ChatProviderExt: ChatProvider {
    /// Send a single user message and get the reply text.
    async fn ask(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest::new(self.default_model()).user(prompt);
        let response = self.chat(&request).await?;
        Ok(response.text().unwrap_or_default())
    }

    /// Send a user message preceded by a system prompt.
    async fn ask_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        let request = ChatRequest::new(self.default_model())
            .system(system)
            .user(prompt);
        let response = self.chat(&request).await?;
        Ok(response.text().unwrap_or_default())
    }
}

impl<T: ChatProvider + ?Sized> ChatProviderExt for T {}

/// Type alias for an Arc-wrapped chat provider.
pub type SharedChatProvider = std::sync::Arc<dyn ChatProvider>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::message::Role;

    mod chat_request {
        use super::*;

        #[test]
        fn new_creates_with_model() {
            let req = ChatRequest::new("gpt-4o-mini");
            assert_eq!(req.model, "gpt-4o-mini");
            assert!(req.messages.is_empty());
            assert!(!req.stream);
        }

        #[test]
        fn builders_append_in_order() {
            let req = ChatRequest::new("gpt-4o-mini")
                .system("You are a helpful assistant.")
                .user("Who won the world series in 2020?")
                .assistant("The Los Angeles Dodgers won the World Series in 2020.")
                .user("Where was it played?");

            let roles: Vec<Role> = req.messages.iter().map(|m| m.role).collect();
            assert_eq!(
                roles,
                [Role::System, Role::User, Role::Assistant, Role::User]
            );
            assert_eq!(
                req.messages[3].content.as_deref(),
                Some("Where was it played?")
            );
        }

        #[test]
        fn sampling_options() {
            let req = ChatRequest::new("m")
                .max_tokens(64)
                .temperature(0.2)
                .top_p(0.9)
                .n(2)
                .seed(7)
                .stop(vec!["\n".to_owned()]);

            assert_eq!(req.max_tokens, Some(64));
            assert_eq!(req.temperature, Some(0.2));
            assert_eq!(req.top_p, Some(0.9));
            assert_eq!(req.n, Some(2));
            assert_eq!(req.seed, Some(7));
            assert_eq!(req.stop.as_deref(), Some(&["\n".to_owned()][..]));
        }
    }

    mod chat_response {
        use super::*;

        #[test]
        fn from_text_is_assistant_turn() {
            let resp = ChatResponse::from_text("Hi!").with_model("gpt-4o-mini");
            assert_eq!(resp.message.role, Role::Assistant);
            assert_eq!(resp.text().as_deref(), Some("Hi!"));
            assert_eq!(resp.model.as_deref(), Some("gpt-4o-mini"));
            assert!(!resp.is_truncated());
        }

        #[test]
        fn truncated_when_length() {
            let resp = ChatResponse::from_text("cut").with_stop_reason(StopReason::Length);
            assert!(resp.is_truncated());
        }
    }

    mod provider_ext {
        use super::*;

        struct Echo;

        #[async_trait]
        impl ChatProvider for Echo {
            async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
                let joined = request
                    .messages
                    .iter()
                    .filter_map(|m| m.content.clone())
                    .collect::<Vec<_>>()
                    .join("|");
                Ok(ChatResponse::from_text(joined))
            }

            fn provider_name(&self) -> &'static str {
                "echo"
            }

            fn default_model(&self) -> &str {
                "echo-1"
            }
        }

        #[tokio::test]
        async fn ask_sends_single_user_turn() {
            assert_eq!(Echo.ask("ping").await.unwrap(), "ping");
        }

        #[tokio::test]
        async fn ask_with_system_prepends_system_turn() {
            let reply = Echo.ask_with_system("be brief", "ping").await.unwrap();
            assert_eq!(reply, "be brief|ping");
        }

        #[tokio::test]
        async fn streaming_is_unsupported_by_default() {
            let err = Echo.chat_stream(&ChatRequest::new("m")).await.err().unwrap();
            assert!(err.to_string().contains("not supported"));
        }
    }
}
