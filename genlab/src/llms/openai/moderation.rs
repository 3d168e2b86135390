//! OpenAI ModerationProvider implementation.

use async_trait::async_trait;

use crate::error::{LlmError, Result};
use crate::moderation::{ModerationProvider, ModerationRequest, ModerationResponse};

use super::client::OpenAI;
use super::types::{OpenAIModerationInput, OpenAIModerationRequest};

impl OpenAI {
    /// Build the moderation request body.
    pub(crate) fn build_moderation_body(
        &self,
        request: &ModerationRequest,
    ) -> Result<OpenAIModerationRequest> {
        if request.input.is_empty() {
            return Err(LlmError::invalid_request("moderation request has no input").into());
        }
        Ok(OpenAIModerationRequest {
            model: Self::resolve_model(&request.model, &self.config.moderation_model),
            input: OpenAIModerationInput::from_inputs(&request.input),
        })
    }
}

#[async_trait]
impl ModerationProvider for OpenAI {
    async fn moderate(&self, request: &ModerationRequest) -> Result<ModerationResponse> {
        let body = self.build_moderation_body(request)?;
        tracing::debug!(model = %body.model, inputs = request.input.len(), "sending moderation request");

        let response: ModerationResponse = self.post_json("moderations", &body).await?;
        if response.results.len() != request.input.len() {
            tracing::warn!(
                expected = request.input.len(),
                got = response.results.len(),
                "moderation result count does not match input count"
            );
        }
        Ok(response)
    }

    fn default_moderation_model(&self) -> &str {
        &self.config.moderation_model
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::llms::openai::OpenAIConfig;
    use crate::moderation::ModerationCategory;

    fn client() -> OpenAI {
        OpenAI::new(OpenAIConfig::new("test-key")).unwrap()
    }

    #[test]
    fn body_uses_default_model_and_single_string() {
        let body = client()
            .build_moderation_body(&ModerationRequest::new("hello"))
            .unwrap();
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], OpenAIConfig::DEFAULT_MODERATION_MODEL);
        assert_eq!(json["input"], "hello");
    }

    #[test]
    fn empty_input_rejected() {
        let request = ModerationRequest::batch(Vec::<String>::new());
        assert!(client().build_moderation_body(&request).is_err());
    }

    #[test]
    fn wire_response_parses_into_public_type() {
        let json = r#"{
            "id": "modr-XXXXX",
            "model": "omni-moderation-latest",
            "results": [{
                "flagged": true,
                "categories": {
                    "sexual": false, "hate": false, "harassment": false,
                    "self-harm": false, "sexual/minors": false,
                    "hate/threatening": false, "violence/graphic": false,
                    "self-harm/intent": false, "self-harm/instructions": false,
                    "harassment/threatening": true, "violence": true
                },
                "category_scores": {
                    "sexual": 1.2e-05, "hate": 0.0002, "harassment": 0.42,
                    "violence": 0.997, "harassment/threatening": 0.63
                },
                "category_applied_input_types": {"violence": ["text"]}
            }]
        }"#;

        let response: ModerationResponse = serde_json::from_str(json).unwrap();
        let result = response.first().unwrap();
        assert!(response.flagged());
        assert!(result.is_flagged(ModerationCategory::HarassmentThreatening));
        assert_eq!(result.top_category().unwrap().0, "violence");
    }
}
