//! OpenAI API client implementation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::error::{LlmError, Result};

use super::config::OpenAIConfig;
use super::types::OpenAIErrorResponse;

/// OpenAI API client.
///
/// Cheap to clone: the configuration and the connection pool are shared.
#[derive(Debug, Clone)]
pub struct OpenAI {
    pub(crate) config: Arc<OpenAIConfig>,
    pub(crate) client: Client,
}

impl OpenAI {
    pub(crate) const PROVIDER: &'static str = "openai";

    /// Create a new OpenAI client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an authentication error if the API key is empty, or an
    /// internal error if the HTTP client cannot be built.
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(LlmError::auth(Self::PROVIDER, "API key is required").into());
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        let client = builder
            .build()
            .map_err(|e| LlmError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    /// Create a client from environment variables.
    ///
    /// # Errors
    ///
    /// See [`OpenAIConfig::from_env`] and [`OpenAI::new`].
    pub fn from_env() -> Result<Self> {
        let config = OpenAIConfig::from_env()?;
        Self::new(config)
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Build the URL for an API path such as `chat/completions`.
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    /// Picks the request model, falling back to the given default.
    pub(crate) fn resolve_model(requested: &str, default: &str) -> String {
        if requested.is_empty() {
            default.to_owned()
        } else {
            requested.to_owned()
        }
    }

    /// Build a POST request with authentication headers.
    pub(crate) fn post(&self, url: &str) -> reqwest::RequestBuilder {
        let mut req = self.client.post(url).bearer_auth(&self.config.api_key);

        if let Some(org) = &self.config.organization {
            req = req.header("OpenAI-Organization", org);
        }

        req
    }

    /// Fail on non-success statuses, mapping the body to an [`LlmError`].
    pub(crate) async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let error_text = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), body = %error_text, "openai request failed");
        Err(Self::parse_error(status.as_u16(), &error_text).into())
    }

    /// Send a JSON body and decode a JSON response.
    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: serde::Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let response = self
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(LlmError::from)?;
        let response = Self::check_status(response).await?;

        let response_text = response.text().await.map_err(LlmError::from)?;
        serde_json::from_str(&response_text).map_err(|e| {
            LlmError::response_format(
                format!("valid OpenAI response from {path}"),
                format!("parse error: {e}, response: {response_text}"),
            )
            .into()
        })
    }

    /// Parse an error response from OpenAI.
    pub(crate) fn parse_error(status: u16, body: &str) -> LlmError {
        if let Ok(error_response) = serde_json::from_str::<OpenAIErrorResponse>(body) {
            let error = error_response.error;
            let code = error.code_string();

            return match status {
                401 | 403 => LlmError::auth(Self::PROVIDER, error.message),
                429 => LlmError::rate_limited(Self::PROVIDER),
                400 if error.message.contains("context_length")
                    || code.as_deref() == Some("context_length_exceeded") =>
                {
                    LlmError::context_exceeded(error.message)
                }
                _ => match code {
                    Some(code) => LlmError::provider_code(Self::PROVIDER, code, error.message),
                    None => LlmError::provider(Self::PROVIDER, error.message),
                },
            };
        }

        match status {
            401 | 403 => LlmError::auth(Self::PROVIDER, body.to_owned()),
            429 => LlmError::rate_limited(Self::PROVIDER),
            _ => LlmError::http_status(status, body.to_owned()),
        }
    }
}
