//! Configuration schema definitions.

use genlab::llms::OpenAIConfig;
use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenlabConfig {
    /// API connection settings.
    #[serde(default)]
    pub openai: OpenAISection,

    /// Default model per endpoint family.
    #[serde(default)]
    pub models: ModelsSection,

    /// Default sampling options for completion, chat and chain.
    #[serde(default)]
    pub sampling: SamplingSection,
}

/// `[openai]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenAISection {
    /// API key. `OPENAI_API_KEY` takes precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Base URL of an OpenAI-compatible API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Organization ID sent as `OpenAI-Organization`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for OpenAISection {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            organization: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    OpenAIConfig::DEFAULT_BASE_URL.to_owned()
}

const fn default_timeout() -> u64 {
    OpenAIConfig::DEFAULT_TIMEOUT_SECS
}

/// `[models]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelsSection {
    /// Text completion model.
    #[serde(default = "default_completion_model")]
    pub completion: String,
    /// Chat model. `OPENAI_MODEL` takes precedence.
    #[serde(default = "default_chat_model")]
    pub chat: String,
    /// Moderation model.
    #[serde(default = "default_moderation_model")]
    pub moderation: String,
    /// Speech-to-text model.
    #[serde(default = "default_audio_model")]
    pub audio: String,
}

impl Default for ModelsSection {
    fn default() -> Self {
        Self {
            completion: default_completion_model(),
            chat: default_chat_model(),
            moderation: default_moderation_model(),
            audio: default_audio_model(),
        }
    }
}

fn default_completion_model() -> String {
    OpenAIConfig::DEFAULT_COMPLETION_MODEL.to_owned()
}

fn default_chat_model() -> String {
    OpenAIConfig::DEFAULT_CHAT_MODEL.to_owned()
}

fn default_moderation_model() -> String {
    OpenAIConfig::DEFAULT_MODERATION_MODEL.to_owned()
}

fn default_audio_model() -> String {
    OpenAIConfig::DEFAULT_AUDIO_MODEL.to_owned()
}

/// `[sampling]` section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SamplingSection {
    /// Maximum tokens to generate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl GenlabConfig {
    /// Validate the configuration and return any issues found.
    #[must_use]
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self
            .openai
            .api_key
            .as_deref()
            .is_none_or(|key| key.trim().is_empty())
        {
            issues.push(ConfigIssue::error(
                "openai.api_key",
                "No API key configured. Set OPENAI_API_KEY or openai.api_key.",
            ));
        }

        if self.openai.timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                "openai.timeout_secs",
                "Timeout must be at least 1 second",
            ));
        }

        if self.sampling.max_tokens == Some(0) {
            issues.push(ConfigIssue::error(
                "sampling.max_tokens",
                "Max tokens must be at least 1",
            ));
        }

        if let Some(temperature) = self.sampling.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            issues.push(ConfigIssue::error(
                "sampling.temperature",
                format!("Temperature {temperature} is outside 0.0..=2.0"),
            ));
        }

        for (path, model) in [
            ("models.completion", &self.models.completion),
            ("models.chat", &self.models.chat),
            ("models.moderation", &self.models.moderation),
            ("models.audio", &self.models.audio),
        ] {
            if model.trim().is_empty() {
                issues.push(ConfigIssue::warning(
                    path,
                    "Model is empty, requests will be rejected by the API",
                ));
            }
        }

        issues
    }

    /// Check if the configuration is valid (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate()
            .iter()
            .all(|issue| issue.level != IssueLevel::Error)
    }

    /// Merge environment variables into the configuration.
    #[must_use]
    pub fn with_env(self) -> Self {
        self.merge_env(|key| std::env::var(key).ok())
    }

    /// Merge values from a variable lookup. Set variables override file values.
    #[must_use]
    pub fn merge_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(key) = var("OPENAI_API_KEY") {
            self.openai.api_key = Some(key);
        }
        if let Some(url) = var("OPENAI_BASE_URL") {
            self.openai.base_url = url;
        }
        if let Some(org) = var("OPENAI_ORGANIZATION") {
            self.openai.organization = Some(org);
        }
        if let Some(model) = var("OPENAI_MODEL") {
            self.models.chat = model;
        }
        self
    }

    /// Build the client configuration.
    ///
    /// Returns `None` when no API key is available.
    #[must_use]
    pub fn to_openai_config(&self) -> Option<OpenAIConfig> {
        let api_key = self
            .openai
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())?;

        let mut config = OpenAIConfig::new(api_key)
            .with_base_url(self.openai.base_url.clone())
            .with_timeout(self.openai.timeout_secs)
            .with_completion_model(self.models.completion.clone())
            .with_chat_model(self.models.chat.clone())
            .with_moderation_model(self.models.moderation.clone())
            .with_audio_model(self.models.audio.clone());
        if let Some(org) = &self.openai.organization {
            config = config.with_organization(org.clone());
        }
        Some(config)
    }

    /// A copy safe to print: the API key is masked.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.openai.api_key = self.openai.api_key.as_deref().map(mask_secret);
        copy
    }
}

/// Mask all but the last four characters of a secret.
#[must_use]
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{tail}", chars[..3].iter().collect::<String>())
}

/// A configuration validation issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    /// Issue severity level.
    pub level: IssueLevel,
    /// Configuration path (e.g., "sampling.temperature").
    pub path: String,
    /// Human-readable message.
    pub message: String,
}

impl ConfigIssue {
    /// Create an error-level issue.
    #[must_use]
    pub fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Error,
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a warning-level issue.
    #[must_use]
    pub fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Warning,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.level {
            IssueLevel::Error => "ERROR",
            IssueLevel::Warning => "WARN",
        };
        write!(f, "[{}] {}: {}", prefix, self.path, self.message)
    }
}

/// Severity level for configuration issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueLevel {
    /// Error that prevents requests from succeeding.
    Error,
    /// Warning about potential issues.
    Warning,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    mod parsing {
        use super::*;

        #[test]
        fn empty_file_gives_defaults() {
            let config: GenlabConfig = toml::from_str("").unwrap();
            assert_eq!(config, GenlabConfig::default());
            assert_eq!(config.models.audio, "whisper-1");
            assert_eq!(config.openai.timeout_secs, 120);
        }

        #[test]
        fn partial_sections_fill_defaults() {
            let config: GenlabConfig = toml::from_str(
                r#"
                [openai]
                api_key = "sk-file"

                [models]
                chat = "gpt-4o"

                [sampling]
                temperature = 0.7
                "#,
            )
            .unwrap();
            assert_eq!(config.openai.api_key.as_deref(), Some("sk-file"));
            assert_eq!(config.openai.base_url, OpenAIConfig::DEFAULT_BASE_URL);
            assert_eq!(config.models.chat, "gpt-4o");
            assert_eq!(config.models.completion, "gpt-3.5-turbo-instruct");
            assert_eq!(config.sampling.temperature, Some(0.7));
            assert_eq!(config.sampling.max_tokens, None);
        }

        #[test]
        fn unknown_section_rejected() {
            assert!(toml::from_str::<GenlabConfig>("[agents]\nmodel = \"x\"").is_err());
        }

        #[test]
        fn default_serializes_without_key() {
            let text = toml::to_string_pretty(&GenlabConfig::default()).unwrap();
            assert!(text.contains("[models]"));
            assert!(!text.contains("api_key"));
        }
    }

    mod validation {
        use super::*;

        fn valid() -> GenlabConfig {
            let mut config = GenlabConfig::default();
            config.openai.api_key = Some("sk-test".to_owned());
            config
        }

        #[test]
        fn default_config_reports_missing_key() {
            let issues = GenlabConfig::default().validate();
            assert_eq!(issues.len(), 1);
            assert_eq!(issues[0].path, "openai.api_key");
            assert!(!GenlabConfig::default().is_valid());
        }

        #[test]
        fn configured_key_is_valid() {
            assert!(valid().validate().is_empty());
        }

        #[test]
        fn temperature_range() {
            let mut config = valid();
            config.sampling.temperature = Some(2.5);
            assert!(!config.is_valid());

            config.sampling.temperature = Some(2.0);
            assert!(config.is_valid());

            config.sampling.temperature = Some(-0.1);
            assert!(!config.is_valid());
        }

        #[test]
        fn zero_limits_are_errors() {
            let mut config = valid();
            config.sampling.max_tokens = Some(0);
            config.openai.timeout_secs = 0;
            let paths: Vec<String> = config.validate().into_iter().map(|i| i.path).collect();
            assert_eq!(paths, vec!["openai.timeout_secs", "sampling.max_tokens"]);
        }

        #[test]
        fn empty_model_is_warning() {
            let mut config = valid();
            config.models.audio = String::new();
            let issues = config.validate();
            assert_eq!(issues.len(), 1);
            assert_eq!(issues[0].level, IssueLevel::Warning);
            assert!(config.is_valid());
            assert_eq!(
                issues[0].to_string(),
                "[WARN] models.audio: Model is empty, requests will be rejected by the API"
            );
        }
    }

    mod precedence {
        use super::*;

        #[test]
        fn env_overrides_file() {
            let mut config = GenlabConfig::default();
            config.openai.api_key = Some("sk-file".to_owned());
            config.models.chat = "gpt-4o".to_owned();

            let merged = config.merge_env(env(&[
                ("OPENAI_API_KEY", "sk-env"),
                ("OPENAI_MODEL", "gpt-4.1-mini"),
                ("OPENAI_BASE_URL", "http://localhost:8000/v1"),
            ]));
            assert_eq!(merged.openai.api_key.as_deref(), Some("sk-env"));
            assert_eq!(merged.models.chat, "gpt-4.1-mini");
            assert_eq!(merged.openai.base_url, "http://localhost:8000/v1");
        }

        #[test]
        fn unset_or_empty_env_keeps_file() {
            let mut config = GenlabConfig::default();
            config.openai.api_key = Some("sk-file".to_owned());

            let merged = config.merge_env(env(&[("OPENAI_API_KEY", "")]));
            assert_eq!(merged.openai.api_key.as_deref(), Some("sk-file"));
        }

        #[test]
        fn client_config_carries_models() {
            let mut config = GenlabConfig::default();
            config.openai.api_key = Some("sk-test".to_owned());
            config.openai.organization = Some("org-1".to_owned());
            config.models.moderation = "text-moderation-latest".to_owned();

            let client = config.to_openai_config().unwrap();
            assert_eq!(client.api_key, "sk-test");
            assert_eq!(client.organization.as_deref(), Some("org-1"));
            assert_eq!(client.moderation_model, "text-moderation-latest");
            assert_eq!(client.timeout_secs, Some(120));
        }

        #[test]
        fn no_key_no_client_config() {
            assert!(GenlabConfig::default().to_openai_config().is_none());
        }
    }

    mod masking {
        use super::*;

        #[test]
        fn long_secret_keeps_prefix_and_tail() {
            assert_eq!(mask_secret("sk-abcdefghijklmnop"), "sk-...mnop");
        }

        #[test]
        fn short_secret_fully_masked() {
            assert_eq!(mask_secret("short"), "*****");
        }

        #[test]
        fn redacted_leaves_original() {
            let mut config = GenlabConfig::default();
            config.openai.api_key = Some("sk-abcdefghijklmnop".to_owned());
            let redacted = config.redacted();
            assert_eq!(redacted.openai.api_key.as_deref(), Some("sk-...mnop"));
            assert_eq!(config.openai.api_key.as_deref(), Some("sk-abcdefghijklmnop"));
        }
    }
}
