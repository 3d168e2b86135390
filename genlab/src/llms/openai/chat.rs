//! OpenAI ChatProvider implementation.

use async_trait::async_trait;
use futures::StreamExt;

use crate::chat::{ChatProvider, ChatRequest, ChatResponse, ChatStream};
use crate::error::{LlmError, Result};
use crate::message::{Message, Role};
use crate::stream::StopReason;

use super::client::OpenAI;
use super::stream::SseDecoder;
use super::types::{OpenAIChatRequest, OpenAIChatResponse, OpenAIMessage, StreamOptions};

impl OpenAI {
    /// Convert a [`Message`] to the wire format.
    pub(crate) fn convert_message(msg: &Message) -> OpenAIMessage {
        OpenAIMessage {
            role: msg.role.as_str().to_owned(),
            content: msg.content.clone(),
            name: msg.name.clone(),
        }
    }

    /// Build the chat request body.
    pub(crate) fn build_chat_body(&self, request: &ChatRequest) -> OpenAIChatRequest {
        OpenAIChatRequest {
            model: Self::resolve_model(&request.model, &self.config.chat_model),
            messages: request.messages.iter().map(Self::convert_message).collect(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            top_p: request.top_p,
            n: request.n,
            stop: request.stop.clone(),
            presence_penalty: request.presence_penalty,
            frequency_penalty: request.frequency_penalty,
            seed: request.seed,
            user: request.user.clone(),
            stream: request.stream,
            stream_options: request.stream.then_some(StreamOptions {
                include_usage: true,
            }),
        }
    }

    /// Parse the wire response into a [`ChatResponse`].
    pub(crate) fn parse_chat(response: OpenAIChatResponse) -> Result<ChatResponse> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::response_format("at least one choice", "empty choices"))?;

        let stop_reason = StopReason::from_finish_reason(choice.finish_reason.as_deref());
        // A refusal is surfaced as the assistant's text.
        let content = choice.message.content.or(choice.message.refusal);

        Ok(ChatResponse {
            message: Message {
                role: Role::Assistant,
                content,
                name: None,
            },
            stop_reason,
            usage: response.usage,
            model: response.model,
            id: response.id,
            created: response.created,
        })
    }

    fn check_messages(request: &ChatRequest) -> Result<()> {
        if request.messages.is_empty() {
            return Err(LlmError::invalid_request("chat request has no messages").into());
        }
        Ok(())
    }
}

#[async_trait]
impl ChatProvider for OpenAI {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        Self::check_messages(request)?;
        let mut body = self.build_chat_body(request);
        body.stream = false;
        body.stream_options = None;
        tracing::debug!(model = %body.model, turns = body.messages.len(), "sending chat request");

        let parsed: OpenAIChatResponse = self.post_json("chat/completions", &body).await?;
        Self::parse_chat(parsed)
    }

    async fn chat_stream(&self, request: &ChatRequest) -> Result<ChatStream> {
        Self::check_messages(request)?;
        let mut body = self.build_chat_body(request);
        body.stream = true;
        body.stream_options = Some(StreamOptions {
            include_usage: true,
        });
        tracing::debug!(model = %body.model, turns = body.messages.len(), "sending streaming chat request");

        let url = self.url("chat/completions");
        let response = self
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(LlmError::from)?;
        let response = Self::check_status(response).await?;

        let events = Box::pin(response.bytes_stream());
        let parsed_stream = futures::stream::unfold(
            Some((events, SseDecoder::default())),
            |state| async move {
                let (mut events, mut decoder) = state?;
                if decoder.is_finished() {
                    return None;
                }
                match events.next().await {
                    Some(Ok(bytes)) => {
                        let chunks = decoder.feed(&bytes);
                        Some((chunks, Some((events, decoder))))
                    }
                    Some(Err(e)) => Some((vec![Err(LlmError::stream(e.to_string()).into())], None)),
                    None => Some((decoder.finish(), None)),
                }
            },
        )
        .flat_map(futures::stream::iter);

        Ok(Box::pin(parsed_stream))
    }

    fn provider_name(&self) -> &'static str {
        Self::PROVIDER
    }

    fn default_model(&self) -> &str {
        &self.config.chat_model
    }

    fn supports_streaming(&self) -> bool {
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::llms::openai::OpenAIConfig;

    fn client() -> OpenAI {
        OpenAI::new(OpenAIConfig::new("test-key")).unwrap()
    }

    #[test]
    fn test_message_conversion() {
        let converted = OpenAI::convert_message(&Message::user("Hello!").with_name("ada"));
        assert_eq!(converted.role, "user");
        assert_eq!(converted.content.as_deref(), Some("Hello!"));
        assert_eq!(converted.name.as_deref(), Some("ada"));
    }

    #[test]
    fn test_body_keeps_turn_order_and_defaults_model() {
        let request = ChatRequest::new("")
            .system("You are a helpful assistant.")
            .user("Knock knock.")
            .assistant("Who's there?")
            .user("Orange.");
        let body = client().build_chat_body(&request);

        assert_eq!(body.model, OpenAIConfig::DEFAULT_CHAT_MODEL);
        let roles: Vec<&str> = body.messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, ["system", "user", "assistant", "user"]);
        assert!(body.stream_options.is_none());
    }

    #[test]
    fn test_stream_body_requests_usage() {
        let body = client().build_chat_body(&ChatRequest::new("m").user("hi").stream(true));
        assert!(body.stream);
        assert!(body.stream_options.unwrap().include_usage);
    }

    #[test]
    fn test_parse_refusal_and_empty_choices() {
        let wire: OpenAIChatResponse = serde_json::from_value(serde_json::json!({
            "id": "chatcmpl-1",
            "model": "gpt-4o-mini",
            "choices": [{
                "message": {"role": "assistant", "content": null, "refusal": "I can't help with that."},
                "finish_reason": "stop"
            }]
        }))
        .unwrap();
        let response = OpenAI::parse_chat(wire).unwrap();
        assert_eq!(response.text().as_deref(), Some("I can't help with that."));
        assert_eq!(response.id.as_deref(), Some("chatcmpl-1"));

        let empty: OpenAIChatResponse =
            serde_json::from_value(serde_json::json!({"choices": []})).unwrap();
        assert!(OpenAI::parse_chat(empty).is_err());
    }

    #[tokio::test]
    async fn test_empty_conversation_rejected_before_sending() {
        let err = client().chat(&ChatRequest::new("m")).await.unwrap_err();
        assert_eq!(
            err.as_llm().unwrap().kind,
            crate::error::LlmErrorKind::InvalidRequest
        );
    }
}
