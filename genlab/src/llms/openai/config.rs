//! OpenAI client configuration.

use crate::error::{LlmError, Result};

/// Configuration for the OpenAI client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAIConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Base URL for the API (defaults to OpenAI's API).
    pub base_url: String,
    /// Optional organization ID.
    pub organization: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Default chat model.
    pub chat_model: String,
    /// Default text completion model.
    pub completion_model: String,
    /// Default moderation model.
    pub moderation_model: String,
    /// Default speech-to-text model.
    pub audio_model: String,
}

impl OpenAIConfig {
    /// Default OpenAI API base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";
    /// Default chat model.
    pub const DEFAULT_CHAT_MODEL: &'static str = "gpt-4o-mini";
    /// Default text completion model.
    pub const DEFAULT_COMPLETION_MODEL: &'static str = "gpt-3.5-turbo-instruct";
    /// Default moderation model.
    pub const DEFAULT_MODERATION_MODEL: &'static str = "omni-moderation-latest";
    /// Default speech-to-text model.
    pub const DEFAULT_AUDIO_MODEL: &'static str = "whisper-1";
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    /// Creates a new configuration with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Creates configuration from environment variables.
    ///
    /// Reads from:
    /// - `OPENAI_API_KEY` - Required API key
    /// - `OPENAI_BASE_URL` - Optional base URL
    /// - `OPENAI_MODEL` - Optional default chat model
    /// - `OPENAI_ORGANIZATION` - Optional organization ID
    ///
    /// # Errors
    ///
    /// Returns an authentication error if `OPENAI_API_KEY` is not set.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| LlmError::auth("openai", "OPENAI_API_KEY environment variable not set"))?;

        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            config.chat_model = model;
        }
        config.organization = std::env::var("OPENAI_ORGANIZATION").ok();

        Ok(config)
    }

    /// Sets the base URL. A trailing slash is removed.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.base_url = url.trim_end_matches('/').to_owned();
        self
    }

    /// Sets the default chat model.
    #[must_use]
    pub fn with_chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = model.into();
        self
    }

    /// Sets the default text completion model.
    #[must_use]
    pub fn with_completion_model(mut self, model: impl Into<String>) -> Self {
        self.completion_model = model.into();
        self
    }

    /// Sets the default moderation model.
    #[must_use]
    pub fn with_moderation_model(mut self, model: impl Into<String>) -> Self {
        self.moderation_model = model.into();
        self
    }

    /// Sets the default speech-to-text model.
    #[must_use]
    pub fn with_audio_model(mut self, model: impl Into<String>) -> Self {
        self.audio_model = model.into();
        self
    }

    /// Sets the organization ID.
    #[must_use]
    pub fn with_organization(mut self, org: impl Into<String>) -> Self {
        self.organization = Some(org.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Disables the request timeout.
    #[must_use]
    pub const fn without_timeout(mut self) -> Self {
        self.timeout_secs = None;
        self
    }
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: Self::DEFAULT_BASE_URL.to_owned(),
            organization: None,
            timeout_secs: Some(Self::DEFAULT_TIMEOUT_SECS),
            chat_model: Self::DEFAULT_CHAT_MODEL.to_owned(),
            completion_model: Self::DEFAULT_COMPLETION_MODEL.to_owned(),
            moderation_model: Self::DEFAULT_MODERATION_MODEL.to_owned(),
            audio_model: Self::DEFAULT_AUDIO_MODEL.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new() {
        let config = OpenAIConfig::new("test-key");
        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.base_url, OpenAIConfig::DEFAULT_BASE_URL);
        assert_eq!(config.chat_model, OpenAIConfig::DEFAULT_CHAT_MODEL);
        assert_eq!(config.completion_model, OpenAIConfig::DEFAULT_COMPLETION_MODEL);
        assert_eq!(config.moderation_model, OpenAIConfig::DEFAULT_MODERATION_MODEL);
        assert_eq!(config.audio_model, OpenAIConfig::DEFAULT_AUDIO_MODEL);
        assert_eq!(config.timeout_secs, Some(120));
    }

    #[test]
    fn test_config_builder() {
        let config = OpenAIConfig::new("key")
            .with_chat_model("gpt-4o")
            .with_completion_model("davinci-002")
            .with_moderation_model("text-moderation-latest")
            .with_audio_model("gpt-4o-transcribe")
            .with_organization("org-123")
            .with_timeout(60);

        assert_eq!(config.chat_model, "gpt-4o");
        assert_eq!(config.completion_model, "davinci-002");
        assert_eq!(config.moderation_model, "text-moderation-latest");
        assert_eq!(config.audio_model, "gpt-4o-transcribe");
        assert_eq!(config.organization.as_deref(), Some("org-123"));
        assert_eq!(config.timeout_secs, Some(60));
        assert_eq!(config.without_timeout().timeout_secs, None);
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let config = OpenAIConfig::new("key").with_base_url("http://localhost:8080/v1/");
        assert_eq!(config.base_url, "http://localhost:8080/v1");
    }
}
