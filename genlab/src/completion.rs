//! Text completion types and provider trait.
//!
//! The completion endpoint extends a prompt with generated text. Unlike chat
//! there is no conversation structure: the request is a single prompt string
//! and each choice is a continuation of it.
//!
//! # Example
//!
//! ```rust,ignore
//! use genlab::prelude::*;
//!
//! let request = CompletionRequest::new("gpt-3.5-turbo-instruct", "Say this is a test")
//!     .max_tokens(7)
//!     .temperature(0.0);
//!
//! let response = provider.complete(&request).await?;
//! println!("{}", response.text().unwrap_or_default());
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::stream::StopReason;
use crate::usage::Usage;

/// A text completion request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model identifier. Empty means the provider's default completion model.
    #[serde(default)]
    pub model: String,

    /// The prompt to continue.
    pub prompt: String,

    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Sampling temperature (0.0 to 2.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Nucleus sampling parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    /// Number of completions to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,

    /// Stop sequences.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,

    /// Text that comes after the inserted completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,

    /// Echo the prompt in addition to the completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub echo: Option<bool>,

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
}

impl CompletionRequest {
    /// Creates a request for the given model and prompt.
    #[must_use]
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            ..Default::default()
        }
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

    /// Sets the number of completions.
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

    /// Sets the suffix.
    #[must_use]
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    /// Echo the prompt back in the completion.
    #[must_use]
    pub const fn echo(mut self, echo: bool) -> Self {
        self.echo = Some(echo);
        self
    }

    /// Sets the sampling seed.
    #[must_use]
    pub const fn seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// One generated continuation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionChoice {
    /// Position of this choice in the response.
    pub index: usize,
    /// Generated text.
    pub text: String,
    /// Why generation stopped.
    pub stop_reason: StopReason,
}

/// A text completion response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Unique completion ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Model that produced the completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Unix timestamp of creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<u64>,
    /// Generated choices, ordered by index.
    pub choices: Vec<CompletionChoice>,
    /// Token usage statistics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl CompletionResponse {
    /// Creates a single-choice response from text.
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            choices: vec![CompletionChoice {
                index: 0,
                text: text.into(),
                stop_reason: StopReason::Stop,
            }],
            ..Default::default()
        }
    }

    /// Returns the text of the first choice.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.choices.first().map(|c| c.text.as_str())
    }

    /// Returns the stop reason of the first choice.
    #[must_use]
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.choices.first().map(|c| c.stop_reason)
    }
}

/// Trait for providers that support text completion.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Extend the request's prompt with generated text.
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse>;

    /// Get the default completion model for this provider.
    fn default_completion_model(&self) -> &str;
}
