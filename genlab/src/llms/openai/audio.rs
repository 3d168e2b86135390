//! OpenAI Audio API implementation (Whisper transcription and translation).

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use crate::audio::{
    AudioFormat, SpeechToTextProvider, TranscriptionRequest, TranscriptionResponse,
    TranscriptionResponseFormat, TranslationRequest,
};
use crate::error::{LlmError, Result};

use super::client::OpenAI;
use super::types::OpenAITranscriptionResponse;

/// Fields shared by transcription and translation uploads.
struct AudioUpload<'a> {
    model: String,
    audio: &'a [u8],
    format: AudioFormat,
    language: Option<&'a str>,
    prompt: Option<&'a str>,
    response_format: Option<TranscriptionResponseFormat>,
    temperature: Option<f32>,
}

impl AudioUpload<'_> {
    fn into_form(self) -> Result<Form> {
        if self.audio.is_empty() {
            return Err(LlmError::invalid_request("audio data is empty").into());
        }

        let file_part = Part::bytes(self.audio.to_vec())
            .file_name(format!("audio.{}", self.format.extension()))
            .mime_str(self.format.mime_type())
            .map_err(|e| LlmError::internal(format!("Invalid MIME type: {e}")))?;

        let mut form = Form::new().text("model", self.model).part("file", file_part);

        if let Some(lang) = self.language {
            form = form.text("language", lang.to_owned());
        }
        if let Some(prompt) = self.prompt {
            form = form.text("prompt", prompt.to_owned());
        }
        if let Some(format) = self.response_format {
            form = form.text("response_format", format.as_str());
        }
        if let Some(temp) = self.temperature {
            form = form.text("temperature", temp.to_string());
        }

        Ok(form)
    }
}

impl OpenAI {
    async fn post_audio(&self, path: &str, form: Form) -> Result<TranscriptionResponse> {
        let url = self.url(path);
        let response = self
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(LlmError::from)?;
        let response = Self::check_status(response).await?;

        let response_text = response.text().await.map_err(LlmError::from)?;
        Ok(Self::parse_transcription(response_text))
    }

    /// Parse a transcription body: JSON when possible, plain text otherwise.
    pub(crate) fn parse_transcription(body: String) -> TranscriptionResponse {
        match serde_json::from_str::<OpenAITranscriptionResponse>(&body) {
            Ok(parsed) => TranscriptionResponse {
                text: parsed.text,
                language: parsed.language,
                duration: parsed.duration,
            },
            // text, srt and vtt formats
            Err(_) => TranscriptionResponse::new(body),
        }
    }
}

#[async_trait]
impl SpeechToTextProvider for OpenAI {
    async fn transcribe(&self, request: &TranscriptionRequest) -> Result<TranscriptionResponse> {
        let upload = AudioUpload {
            model: Self::resolve_model(&request.model, &self.config.audio_model),
            audio: &request.audio,
            format: request.format,
            language: request.language.as_deref(),
            prompt: request.prompt.as_deref(),
            response_format: request.response_format,
            temperature: request.temperature,
        };
        tracing::debug!(model = %upload.model, bytes = request.audio.len(), "sending transcription request");

        self.post_audio("audio/transcriptions", upload.into_form()?)
            .await
    }

    async fn translate(&self, request: &TranslationRequest) -> Result<TranscriptionResponse> {
        let upload = AudioUpload {
            model: Self::resolve_model(&request.model, &self.config.audio_model),
            audio: &request.audio,
            format: request.format,
            language: None,
            prompt: request.prompt.as_deref(),
            response_format: request.response_format,
            temperature: request.temperature,
        };
        tracing::debug!(model = %upload.model, bytes = request.audio.len(), "sending translation request");

        self.post_audio("audio/translations", upload.into_form()?)
            .await
    }

    fn default_audio_model(&self) -> &str {
        &self.config.audio_model
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod transcription_parsing {
        use super::*;

        #[test]
        fn json_body() {
            let response = OpenAI::parse_transcription(r#"{"text": "Hello world"}"#.to_owned());
            assert_eq!(response.text, "Hello world");
            assert!(response.language.is_none());
        }

        #[test]
        fn verbose_json_body() {
            let json = r#"{
                "task": "transcribe",
                "language": "english",
                "duration": 8.47,
                "text": "The beach was a popular spot on a hot summer day.",
                "segments": []
            }"#;
            let response = OpenAI::parse_transcription(json.to_owned());
            assert!(response.text.contains("beach"));
            assert_eq!(response.language.as_deref(), Some("english"));
            assert!((response.duration.unwrap() - 8.47).abs() < 0.001);
        }

        #[test]
        fn plain_text_body() {
            let response = OpenAI::parse_transcription("Just the words.\n".to_owned());
            assert_eq!(response.text, "Just the words.\n");
        }

        #[test]
        fn subtitle_body_kept_verbatim() {
            let srt = "1\n00:00:00,000 --> 00:00:01,500\nHello there.\n";
            assert_eq!(OpenAI::parse_transcription(srt.to_owned()).text, srt);
        }
    }

    mod upload {
        use super::*;

        fn upload(audio: &[u8]) -> AudioUpload<'_> {
            AudioUpload {
                model: "whisper-1".to_owned(),
                audio,
                format: AudioFormat::Mp3,
                language: Some("en"),
                prompt: Some("hint"),
                response_format: Some(TranscriptionResponseFormat::Text),
                temperature: Some(0.2),
            }
        }

        #[test]
        fn empty_audio_rejected() {
            assert!(upload(&[]).into_form().is_err());
        }

        #[test]
        fn builds_form_for_audio() {
            assert!(upload(&[1, 2, 3]).into_form().is_ok());
        }
    }
}
