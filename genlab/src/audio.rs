//! Speech-to-text types and provider trait.
//!
//! Two operations are covered, both backed by Whisper-style models:
//! - **Transcription**: audio to text in the spoken language
//! - **Translation**: audio in any supported language to English text
//!
//! # Example
//!
//! ```rust,ignore
//! use genlab::prelude::*;
//!
//! let audio = std::fs::read("interview.mp3")?;
//! let request = TranscriptionRequest::new("whisper-1", audio)
//!     .format(AudioFormat::Mp3)
//!     .prompt("ZyntriQix, Digique Plus, CynapseFive");
//! let response = provider.transcribe(&request).await?;
//! println!("{}", response.text);
//! ```

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{LlmError, Result};

/// Audio container formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// FLAC format
    Flac,
    /// MP3 format
    #[default]
    Mp3,
    /// MP4 container
    Mp4,
    /// MPEG format
    Mpeg,
    /// MPGA format
    Mpga,
    /// M4A format
    M4a,
    /// OGG format
    Ogg,
    /// WAV format
    Wav,
    /// WebM format
    WebM,
}

impl AudioFormat {
    /// Get the file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Flac => "flac",
            Self::Mp3 => "mp3",
            Self::Mp4 => "mp4",
            Self::Mpeg => "mpeg",
            Self::Mpga => "mpga",
            Self::M4a => "m4a",
            Self::Ogg => "ogg",
            Self::Wav => "wav",
            Self::WebM => "webm",
        }
    }

    /// Get the MIME type for this format.
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Flac => "audio/flac",
            Self::Mp3 | Self::Mpeg | Self::Mpga => "audio/mpeg",
            Self::Mp4 => "audio/mp4",
            Self::M4a => "audio/m4a",
            Self::Ogg => "audio/ogg",
            Self::Wav => "audio/wav",
            Self::WebM => "audio/webm",
        }
    }

    /// Detect format from file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "flac" => Some(Self::Flac),
            "mp3" => Some(Self::Mp3),
            "mp4" => Some(Self::Mp4),
            "mpeg" => Some(Self::Mpeg),
            "mpga" => Some(Self::Mpga),
            "m4a" => Some(Self::M4a),
            "ogg" | "oga" => Some(Self::Ogg),
            "wav" => Some(Self::Wav),
            "webm" => Some(Self::WebM),
            _ => None,
        }
    }

    /// Detect format from a file path's extension.
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

/// Output format for transcription and translation responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptionResponseFormat {
    /// JSON format with text only.
    #[default]
    Json,
    /// Plain text format.
    Text,
    /// SRT subtitle format.
    Srt,
    /// VTT subtitle format.
    Vtt,
    /// Verbose JSON with language and duration.
    VerboseJson,
}

impl TranscriptionResponseFormat {
    /// Get the format string for API requests.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
            Self::Srt => "srt",
            Self::Vtt => "vtt",
            Self::VerboseJson => "verbose_json",
        }
    }

    /// Parse a format name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "text" => Some(Self::Text),
            "srt" => Some(Self::Srt),
            "vtt" => Some(Self::Vtt),
            "verbose_json" => Some(Self::VerboseJson),
            _ => None,
        }
    }
}

/// Request for transcribing audio to text.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionRequest {
    /// Model to use (e.g., "whisper-1"). Empty means the provider default.
    pub model: String,
    /// Audio data to transcribe.
    pub audio: Vec<u8>,
    /// Audio format.
    pub format: AudioFormat,
    /// Optional language hint (ISO 639-1 code, e.g., "en", "zh").
    pub language: Option<String>,
    /// Optional prompt to guide spelling and style.
    pub prompt: Option<String>,
    /// Output format.
    pub response_format: Option<TranscriptionResponseFormat>,
    /// Sampling temperature (0.0 to 1.0).
    pub temperature: Option<f32>,
}

impl TranscriptionRequest {
    /// Create a new transcription request.
    #[must_use]
    pub fn new(model: impl Into<String>, audio: Vec<u8>) -> Self {
        Self {
            model: model.into(),
            audio,
            format: AudioFormat::default(),
            language: None,
            prompt: None,
            response_format: None,
            temperature: None,
        }
    }

    /// Set the audio format.
    #[must_use]
    pub const fn format(mut self, format: AudioFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the language hint (ISO 639-1 code).
    #[must_use]
    pub fn language(mut self, lang: impl Into<String>) -> Self {
        self.language = Some(lang.into());
        self
    }

    /// Set the prompt to guide transcription.
    #[must_use]
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Set the response format.
    #[must_use]
    pub const fn response_format(mut self, format: TranscriptionResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    /// Set the temperature (0.0 to 1.0).
    #[must_use]
    pub const fn temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }
}

/// Request for translating speech into English text.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationRequest {
    /// Model to use (e.g., "whisper-1"). Empty means the provider default.
    pub model: String,
    /// Audio data to translate.
    pub audio: Vec<u8>,
    /// Audio format.
    pub format: AudioFormat,
    /// Optional English prompt to guide style.
    pub prompt: Option<String>,
    /// Output format.
    pub response_format: Option<TranscriptionResponseFormat>,
    /// Sampling temperature (0.0 to 1.0).
    pub temperature: Option<f32>,
}

impl TranslationRequest {
    /// Create a new translation request.
    #[must_use]
    pub fn new(model: impl Into<String>, audio: Vec<u8>) -> Self {
        Self {
            model: model.into(),
            audio,
            format: AudioFormat::default(),
            prompt: None,
            response_format: None,
            temperature: None,
        }
    }

    /// Set the audio format.
    #[must_use]
    pub const fn format(mut self, format: AudioFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the prompt to guide translation.
    #[must_use]
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Set the response format.
    #[must_use]
    pub const fn response_format(mut self, format: TranscriptionResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    /// Set the temperature (0.0 to 1.0).
    #[must_use]
    pub const fn temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }
}

/// Response from a transcription or translation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionResponse {
    /// The transcribed (or translated) text.
    pub text: String,
    /// Detected language, when the provider reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Duration of the audio in seconds, when the provider reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f32>,
}

impl TranscriptionResponse {
    /// Create a new transcription response with just text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Set the detected language.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Set the audio duration.
    #[must_use]
    pub const fn with_duration(mut self, duration: f32) -> Self {
        self.duration = Some(duration);
        self
    }
}

/// Read an audio file and detect its format from the extension.
///
/// # Errors
///
/// Returns an invalid-request error when the extension is not a supported
/// audio format or the file cannot be read.
pub async fn read_audio_file(path: &Path) -> Result<(Vec<u8>, AudioFormat)> {
    let format = AudioFormat::from_path(path).ok_or_else(|| {
        LlmError::invalid_request(format!(
            "unsupported audio file {} (expected flac, mp3, mp4, mpeg, mpga, m4a, ogg, wav or webm)",
            path.display()
        ))
    })?;
    let audio = tokio::fs::read(path).await.map_err(|e| {
        LlmError::invalid_request(format!(
            "Failed to read audio file {}: {e}",
            path.display()
        ))
    })?;
    Ok((audio, format))
}

/// Trait for providers that support speech-to-text.
#[async_trait]
pub trait SpeechToTextProvider: Send + Sync {
    /// Transcribe audio data to text.
    async fn transcribe(&self, request: &TranscriptionRequest) -> Result<TranscriptionResponse>;

    /// Translate audio data to English text.
    async fn translate(&self, request: &TranslationRequest) -> Result<TranscriptionResponse>;

    /// Get the default speech-to-text model for this provider.
    fn default_audio_model(&self) -> &str;

    /// Transcribe an audio file, detecting the format from its extension.
    async fn transcribe_file(
        &self,
        model: &str,
        path: &Path,
        prompt: Option<&str>,
    ) -> Result<TranscriptionResponse> {
        let (audio, format) = read_audio_file(path).await?;
        let mut request = TranscriptionRequest::new(model, audio).format(format);
        if let Some(prompt) = prompt {
            request = request.prompt(prompt);
        }
        self.transcribe(&request).await
    }

    /// Translate an audio file, detecting the format from its extension.
    async fn translate_file(
        &self,
        model: &str,
        path: &Path,
        prompt: Option<&str>,
    ) -> Result<TranscriptionResponse> {
        let (audio, format) = read_audio_file(path).await?;
        let mut request = TranslationRequest::new(model, audio).format(format);
        if let Some(prompt) = prompt {
            request = request.prompt(prompt);
        }
        self.translate(&request).await
    }
}
