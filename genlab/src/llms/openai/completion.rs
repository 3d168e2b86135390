//! OpenAI CompletionProvider implementation.

use async_trait::async_trait;

use crate::completion::{
    CompletionChoice, CompletionProvider, CompletionRequest, CompletionResponse,
};
use crate::error::Result;
use crate::stream::StopReason;

use super::client::OpenAI;
use super::types::{OpenAICompletionRequest, OpenAICompletionResponse};

impl OpenAI {
    /// Build the completion request body.
    pub(crate) fn build_completion_body(&self, request: &CompletionRequest) -> OpenAICompletionRequest {
        OpenAICompletionRequest {
            model: Self::resolve_model(&request.model, &self.config.completion_model),
            prompt: request.prompt.clone(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            top_p: request.top_p,
            n: request.n,
            stop: request.stop.clone(),
            suffix: request.suffix.clone(),
            echo: request.echo,
            presence_penalty: request.presence_penalty,
            frequency_penalty: request.frequency_penalty,
            seed: request.seed,
            user: request.user.clone(),
        }
    }

    /// Parse the wire response into a [`CompletionResponse`].
    pub(crate) fn parse_completion(response: OpenAICompletionResponse) -> CompletionResponse {
        let mut choices: Vec<CompletionChoice> = response
            .choices
            .into_iter()
            .map(|choice| CompletionChoice {
                index: choice.index,
                text: choice.text,
                stop_reason: StopReason::from_finish_reason(choice.finish_reason.as_deref()),
            })
            .collect();
        choices.sort_by_key(|c| c.index);

        CompletionResponse {
            id: response.id,
            model: response.model,
            created: response.created,
            choices,
            usage: response.usage,
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAI {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        let body = self.build_completion_body(request);
        tracing::debug!(model = %body.model, "sending completion request");

        let parsed: OpenAICompletionResponse = self.post_json("completions", &body).await?;
        Ok(Self::parse_completion(parsed))
    }

    fn default_completion_model(&self) -> &str {
        &self.config.completion_model
    }
}
