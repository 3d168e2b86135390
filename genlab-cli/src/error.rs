//! CLI error type.

use crate::config::ConfigError;

/// Result type alias for CLI commands.
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors surfaced by CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Library error (request, provider or chain failure).
    #[error(transparent)]
    Genlab(#[from] genlab::Error),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid combination of arguments.
    #[error("{0}")]
    Usage(String),

    /// Some walkthrough examples failed.
    #[error("{failed} of {total} examples failed")]
    Walkthrough {
        /// Number of failed examples.
        failed: usize,
        /// Number of examples run.
        total: usize,
    },
}

impl CliError {
    /// Create a usage error.
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }
}
