//! Configuration management for the genlab CLI.
//!
//! Settings are resolved from, lowest to highest precedence:
//! 1. Default values
//! 2. Config file (`~/.genlab/config.toml`)
//! 3. Environment variables
//! 4. Command-line flags

mod schema;

pub use schema::{GenlabConfig, IssueLevel, SamplingSection};

use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    /// TOML serialization error.
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    /// Missing required field.
    #[error("missing required config: {0}")]
    MissingField(String),
    /// Invalid value.
    #[error("invalid config value: {0}")]
    InvalidValue(String),
    /// Config file already present.
    #[error("configuration already exists at {0} (use --force to overwrite)")]
    AlreadyExists(PathBuf),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Get the default config directory path.
#[must_use]
pub fn default_config_dir() -> PathBuf {
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".genlab")
}

/// Get the default config file path.
#[must_use]
pub fn config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

/// Load configuration from a specific path. A missing file yields defaults.
pub async fn load_config_from(path: &Path) -> ConfigResult<GenlabConfig> {
    if !path.exists() {
        info!(path = %path.display(), "config file not found, using defaults");
        return Ok(GenlabConfig::default());
    }

    let content = tokio::fs::read_to_string(path).await?;
    let config: GenlabConfig = toml::from_str(&content)?;
    debug!(path = %path.display(), "loaded config file");

    Ok(config)
}

/// Save configuration to a specific path.
pub async fn save_config_to(config: &GenlabConfig, path: &Path) -> ConfigResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let content = toml::to_string_pretty(config)?;
    tokio::fs::write(path, content).await?;
    info!(path = %path.display(), "saved config file");

    Ok(())
}

/// Write a default config file at `path`.
pub async fn init_config_at(path: &Path, force: bool) -> ConfigResult<GenlabConfig> {
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists(path.to_path_buf()));
    }

    let config = GenlabConfig::default();
    save_config_to(&config, path).await?;
    Ok(config)
}

/// Load the file, then apply environment variables.
pub async fn resolve(path: &Path) -> ConfigResult<GenlabConfig> {
    Ok(load_config_from(path).await?.with_env())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn test_default_paths() {
        assert!(default_config_dir().ends_with(".genlab"));
        assert!(config_path().ends_with("config.toml"));
    }

    #[tokio::test]
    async fn missing_file_gives_defaults() {
        let temp = assert_fs::TempDir::new().unwrap();
        let config = load_config_from(&temp.path().join("absent.toml"))
            .await
            .unwrap();
        assert_eq!(config, GenlabConfig::default());
    }

    #[tokio::test]
    async fn save_then_load() {
        let temp = assert_fs::TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");

        let mut config = GenlabConfig::default();
        config.models.chat = "gpt-4o".to_owned();
        config.sampling.max_tokens = Some(256);
        save_config_to(&config, &path).await.unwrap();

        assert_eq!(load_config_from(&path).await.unwrap(), config);
    }

    #[tokio::test]
    async fn malformed_file_is_parse_error() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("config.toml");
        file.write_str("[openai\napi_key = 1").unwrap();

        let err = load_config_from(file.path()).await.unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[tokio::test]
    async fn init_refuses_to_overwrite_without_force() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("config.toml");
        file.write_str("[models]\nchat = \"keep-me\"\n").unwrap();

        let err = init_config_at(file.path(), false).await.unwrap_err();
        assert!(matches!(err, ConfigError::AlreadyExists(_)));
        assert!(std::fs::read_to_string(file.path()).unwrap().contains("keep-me"));

        init_config_at(file.path(), true).await.unwrap();
        assert!(std::fs::read_to_string(file.path()).unwrap().contains("gpt-4o-mini"));
    }
}
