//! Unified error types for genlab.
//!
//! This module provides the error hierarchy shared by every endpoint family:
//! - Provider errors (authentication, rate limiting, malformed responses, etc.)
//! - Chain composition errors
//! - I/O and serialization failures

use std::fmt;

/// Result type alias for genlab operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for genlab.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// LLM provider error.
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Prompt chain error.
    #[error("Chain error: {0}")]
    Chain(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a chain error with a message.
    #[must_use]
    pub fn chain(msg: impl Into<String>) -> Self {
        Self::Chain(msg.into())
    }

    /// Returns the provider error if this is one.
    #[must_use]
    pub const fn as_llm(&self) -> Option<&LlmError> {
        match self {
            Self::Llm(err) => Some(err),
            _ => None,
        }
    }
}

/// Error type for LLM provider operations.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct LlmError {
    /// The error kind.
    pub kind: LlmErrorKind,
    /// The provider name (e.g., "openai", "mock").
    pub provider: Option<String>,
    /// Additional error message.
    pub message: String,
    /// Optional error code from the provider.
    pub code: Option<String>,
}

/// Categories of LLM errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum LlmErrorKind {
    /// Authentication or authorization failure.
    Auth,
    /// Rate limit exceeded.
    RateLimited,
    /// Context length exceeded.
    ContextExceeded,
    /// Invalid request parameters.
    InvalidRequest,
    /// Response format error.
    ResponseFormat,
    /// Network or connection error.
    Network,
    /// Streaming error.
    Stream,
    /// HTTP status error.
    HttpStatus,
    /// Provider-specific error.
    Provider,
    /// Internal error.
    Internal,
    /// Feature not supported.
    NotSupported,
}

impl LlmError {
    const fn bare(kind: LlmErrorKind, message: String) -> Self {
        Self {
            kind,
            provider: None,
            message,
            code: None,
        }
    }

    /// Create an authentication error.
    #[must_use]
    pub fn auth(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            provider: Some(provider.into()),
            ..Self::bare(LlmErrorKind::Auth, message.into())
        }
    }

    /// Create a rate limit error.
    #[must_use]
    pub fn rate_limited(provider: impl Into<String>) -> Self {
        Self {
            provider: Some(provider.into()),
            ..Self::bare(
                LlmErrorKind::RateLimited,
                "Rate limit exceeded. Please retry after some time.".into(),
            )
        }
    }

    /// Create a context exceeded error from the provider's message.
    #[must_use]
    pub fn context_exceeded(message: impl Into<String>) -> Self {
        Self::bare(LlmErrorKind::ContextExceeded, message.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::bare(LlmErrorKind::InvalidRequest, message.into())
    }

    /// Create a response format error.
    #[must_use]
    pub fn response_format(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Self::bare(
            LlmErrorKind::ResponseFormat,
            format!("Expected {}, got {}", expected.into(), got.into()),
        )
    }

    /// Create a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::bare(LlmErrorKind::Network, message.into())
    }

    /// Create a streaming error.
    #[must_use]
    pub fn stream(message: impl Into<String>) -> Self {
        Self::bare(LlmErrorKind::Stream, message.into())
    }

    /// Create an HTTP status error.
    #[must_use]
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            code: Some(status.to_string()),
            ..Self::bare(
                LlmErrorKind::HttpStatus,
                format!("HTTP {status}: {}", body.into()),
            )
        }
    }

    /// Create a provider-specific error.
    #[must_use]
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            provider: Some(provider.into()),
            ..Self::bare(LlmErrorKind::Provider, message.into())
        }
    }

    /// Create a provider error with an error code.
    #[must_use]
    pub fn provider_code(
        provider: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            provider: Some(provider.into()),
            code: Some(code.into()),
            ..Self::bare(LlmErrorKind::Provider, message.into())
        }
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::bare(LlmErrorKind::Internal, message.into())
    }

    /// Create a not supported error.
    #[must_use]
    pub fn not_supported(feature: impl Into<String>) -> Self {
        Self::bare(
            LlmErrorKind::NotSupported,
            format!("Feature not supported: {}", feature.into()),
        )
    }

    /// Check if this is a retryable error.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind, LlmErrorKind::RateLimited | LlmErrorKind::Network)
    }
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{provider}] ")?;
        }
        write!(f, "{}", self.message)?;
        if let Some(code) = &self.code {
            write!(f, " (code: {code})")?;
        }
        Ok(())
    }
}

impl std::error::Error for LlmError {}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network("Request timed out")
        } else if err.is_connect() {
            Self::network(format!("Connection failed: {err}"))
        } else {
            Self::network(err.to_string())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    mod error {
        use super::*;

        #[test]
        fn chain_creates_error() {
            let err = Error::chain("step 2 returned no text");
            assert!(matches!(err, Error::Chain(_)));
            assert!(err.to_string().contains("step 2"));
        }

        #[test]
        fn from_llm_error() {
            let err: Error = LlmError::network("timeout").into();
            assert!(matches!(err, Error::Llm(_)));
            assert_eq!(err.as_llm().unwrap().kind, LlmErrorKind::Network);
        }

        #[test]
        fn from_io_error() {
            let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
            let err: Error = io_err.into();
            assert!(matches!(err, Error::Io(_)));
            assert!(err.as_llm().is_none());
        }

        #[test]
        fn from_json_error() {
            let json_err = serde_json::from_str::<i32>("invalid").unwrap_err();
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    mod llm_error {
        use super::*;

        #[test]
        fn auth_creates_error() {
            let err = LlmError::auth("openai", "Invalid API key");
            assert_eq!(err.kind, LlmErrorKind::Auth);
            assert_eq!(err.provider.as_deref(), Some("openai"));
            assert!(err.message.contains("Invalid API key"));
            assert!(err.code.is_none());
        }

        #[test]
        fn http_status_keeps_code() {
            let err = LlmError::http_status(503, "upstream unavailable");
            assert_eq!(err.kind, LlmErrorKind::HttpStatus);
            assert_eq!(err.code.as_deref(), Some("503"));
            assert!(err.message.contains("upstream unavailable"));
        }

        #[test]
        fn display_includes_provider_and_code() {
            let err = LlmError::provider_code("openai", "model_not_found", "no such model");
            assert_eq!(
                err.to_string(),
                "[openai] no such model (code: model_not_found)"
            );
        }

        #[test]
        fn display_without_provider() {
            let err = LlmError::stream("connection reset");
            assert_eq!(err.to_string(), "connection reset");
        }

        #[test]
        fn retryable_kinds() {
            assert!(LlmError::rate_limited("openai").is_retryable());
            assert!(LlmError::network("down").is_retryable());
            assert!(!LlmError::auth("openai", "bad key").is_retryable());
            assert!(!LlmError::context_exceeded("too long").is_retryable());
            assert!(!LlmError::not_supported("streaming").is_retryable());
        }
    }
}
