//! Mock provider for testing.
//!
//! [`MockProvider`] implements every provider trait without touching the
//! network: chat and completion return canned replies in sequence (cycling),
//! moderation flags inputs containing configured terms, and speech-to-text
//! returns a fixed transcript. Every prompt it receives is recorded.
//!
//! # Example
//!
//! ```rust,ignore
//! use genlab::prelude::*;
//!
//! let provider = MockProvider::new(vec!["Hello!".to_owned(), "Goodbye!".to_owned()]);
//! // First call returns "Hello!", second returns "Goodbye!", third returns "Hello!" again...
//! ```

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::audio::{
    SpeechToTextProvider, TranscriptionRequest, TranscriptionResponse, TranslationRequest,
};
use crate::chat::{ChatProvider, ChatRequest, ChatResponse, ChatStream};
use crate::completion::{CompletionProvider, CompletionRequest, CompletionResponse};
use crate::error::{LlmError, Result};
use crate::message::Role;
use crate::moderation::{
    ModerationCategory, ModerationProvider, ModerationRequest, ModerationResponse,
    ModerationResult,
};
use crate::stream::{StopReason, StreamChunk};
use crate::usage::Usage;

/// A deterministic provider for tests and offline demos.
#[derive(Debug)]
pub struct MockProvider {
    model_id: String,
    responses: Vec<String>,
    response_index: AtomicUsize,
    flagged_terms: Vec<String>,
    transcript: String,
    prompts: Mutex<Vec<String>>,
}

impl MockProvider {
    /// Create a new mock provider with predefined replies.
    #[must_use]
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            model_id: "mock-model".to_owned(),
            responses,
            response_index: AtomicUsize::new(0),
            flagged_terms: Vec::new(),
            transcript: String::new(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Use a custom model ID.
    #[must_use]
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Flag moderation inputs that contain any of these terms (case-insensitive).
    #[must_use]
    pub fn with_flagged_terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.flagged_terms = terms
            .into_iter()
            .map(|t| t.into().to_lowercase())
            .collect();
        self
    }

    /// Text returned by transcription and translation.
    #[must_use]
    pub fn with_transcript(mut self, transcript: impl Into<String>) -> Self {
        self.transcript = transcript.into();
        self
    }

    /// Prompts received so far, in order.
    ///
    /// For chat this is the last user turn of each request.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    fn record(&self, prompt: &str) {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_owned());
        }
    }

    fn next_reply(&self) -> Result<String> {
        if self.responses.is_empty() {
            return Err(LlmError::provider("mock", "no canned responses configured").into());
        }
        let index = self.response_index.fetch_add(1, Ordering::SeqCst);
        Ok(self.responses[index % self.responses.len()].clone())
    }

    fn resolve_model(&self, requested: &str) -> String {
        if requested.is_empty() {
            self.model_id.clone()
        } else {
            requested.to_owned()
        }
    }
}

fn word_count(text: &str) -> u32 {
    u32::try_from(text.split_whitespace().count()).unwrap_or(u32::MAX)
}

fn last_user_turn(request: &ChatRequest) -> String {
    request
        .messages
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .and_then(|m| m.content.clone())
        .unwrap_or_default()
}

#[async_trait]
impl ChatProvider for MockProvider {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let prompt = last_user_turn(request);
        self.record(&prompt);
        let reply = self.next_reply()?;
        let usage = Usage::new(word_count(&prompt), word_count(&reply));

        Ok(ChatResponse::from_text(reply)
            .with_usage(usage)
            .with_model(self.resolve_model(&request.model)))
    }

    async fn chat_stream(&self, request: &ChatRequest) -> Result<ChatStream> {
        let response = self.chat(request).await?;
        let text = response.text().unwrap_or_default();

        let mut chunks: Vec<Result<StreamChunk>> = text
            .split_inclusive(' ')
            .map(|piece| Ok(StreamChunk::text(piece)))
            .collect();
        if let Some(usage) = response.usage {
            chunks.push(Ok(StreamChunk::Usage(usage)));
        }
        chunks.push(Ok(StreamChunk::done(Some(StopReason::Stop))));

        Ok(Box::pin(futures::stream::iter(chunks)))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn default_model(&self) -> &str {
        &self.model_id
    }

    fn supports_streaming(&self) -> bool {
        true
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        self.record(&request.prompt);
        let reply = self.next_reply()?;
        let usage = Usage::new(word_count(&request.prompt), word_count(&reply));

        let mut response = CompletionResponse::from_text(reply);
        response.model = Some(self.resolve_model(&request.model));
        response.usage = Some(usage);
        Ok(response)
    }

    fn default_completion_model(&self) -> &str {
        &self.model_id
    }
}

#[async_trait]
impl ModerationProvider for MockProvider {
    async fn moderate(&self, request: &ModerationRequest) -> Result<ModerationResponse> {
        let results = request
            .input
            .iter()
            .map(|input| {
                self.record(input);
                let lowered = input.to_lowercase();
                let flagged = self.flagged_terms.iter().any(|t| lowered.contains(t));

                let mut result = ModerationResult {
                    flagged,
                    ..Default::default()
                };
                for category in ModerationCategory::ALL {
                    let hit = flagged && category == ModerationCategory::Violence;
                    result.categories.insert(category.as_str().to_owned(), hit);
                    result
                        .category_scores
                        .insert(category.as_str().to_owned(), if hit { 0.99 } else { 0.0 });
                }
                result
            })
            .collect();

        Ok(ModerationResponse {
            id: Some("modr-mock".to_owned()),
            model: Some(self.resolve_model(&request.model)),
            results,
        })
    }

    fn default_moderation_model(&self) -> &str {
        &self.model_id
    }
}

#[async_trait]
impl SpeechToTextProvider for MockProvider {
    async fn transcribe(&self, request: &TranscriptionRequest) -> Result<TranscriptionResponse> {
        self.record(request.prompt.as_deref().unwrap_or_default());
        let mut response = TranscriptionResponse::new(self.transcript.clone());
        if let Some(language) = &request.language {
            response = response.with_language(language.clone());
        }
        Ok(response)
    }

    async fn translate(&self, request: &TranslationRequest) -> Result<TranscriptionResponse> {
        self.record(request.prompt.as_deref().unwrap_or_default());
        Ok(TranscriptionResponse::new(self.transcript.clone()).with_language("english"))
    }

    fn default_audio_model(&self) -> &str {
        &self.model_id
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::chat::ChatProviderExt;
    use crate::stream::StreamAggregator;
    use futures::StreamExt;

    #[tokio::test]
    async fn cycles_responses() {
        let provider = MockProvider::new(vec!["first".to_owned(), "second".to_owned()]);
        assert_eq!(provider.ask("a").await.unwrap(), "first");
        assert_eq!(provider.ask("b").await.unwrap(), "second");
        assert_eq!(provider.ask("c").await.unwrap(), "first");
        assert_eq!(provider.prompts(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn empty_responses_is_an_error() {
        let provider = MockProvider::new(Vec::new());
        let err = provider.ask("hello").await.unwrap_err();
        assert!(err.to_string().contains("no canned responses"));
    }

    #[tokio::test]
    async fn stream_reassembles_reply() {
        let provider = MockProvider::new(vec!["streamed reply text".to_owned()]);
        let mut stream = provider
            .chat_stream(&ChatRequest::new("").user("go"))
            .await
            .unwrap();

        let mut agg = StreamAggregator::new();
        while let Some(chunk) = stream.next().await {
            agg.apply(&chunk.unwrap());
        }
        assert_eq!(agg.text(), "streamed reply text");
        assert_eq!(agg.stop_reason(), Some(StopReason::Stop));
    }

    #[tokio::test]
    async fn completion_uses_default_model_when_empty() {
        let provider = MockProvider::new(vec!["done".to_owned()]).with_model_id("mock-1");
        let response = provider
            .complete(&CompletionRequest::new("", "Say this is a test"))
            .await
            .unwrap();
        assert_eq!(response.text(), Some("done"));
        assert_eq!(response.model.as_deref(), Some("mock-1"));
        assert_eq!(response.usage, Some(Usage::new(4, 1)));
    }

    #[tokio::test]
    async fn moderation_flags_configured_terms() {
        let provider = MockProvider::new(Vec::new()).with_flagged_terms(["Hurt"]);
        let response = provider
            .moderate(&ModerationRequest::batch([
                "I will hurt them",
                "Have a nice day",
            ]))
            .await
            .unwrap();

        assert!(response.flagged());
        assert!(response.results[0].is_flagged(ModerationCategory::Violence));
        assert!(!response.results[1].flagged);
        assert_eq!(response.results[1].flagged_categories(), Vec::<&str>::new());
    }

    #[tokio::test]
    async fn transcription_returns_configured_text() {
        let provider = MockProvider::new(Vec::new()).with_transcript("hello there");
        let request = TranscriptionRequest::new("whisper-1", vec![0; 4]).language("en");
        let response = provider.transcribe(&request).await.unwrap();
        assert_eq!(response.text, "hello there");
        assert_eq!(response.language.as_deref(), Some("en"));

        let translated = provider
            .translate(&TranslationRequest::new("whisper-1", vec![0; 4]))
            .await
            .unwrap();
        assert_eq!(translated.language.as_deref(), Some("english"));
    }
}
