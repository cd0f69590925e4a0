//! Client configuration.
//!
//! Defines [`ClientConfig`], the persisted settings for the confab client:
//! which server to talk to, connection timeout, the session question limit,
//! and the sample questions offered in the side menu.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the confab client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the answer service.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Connection timeout in seconds. Streamed bodies are not bounded.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Questions allowed per session before the limit notice is shown.
    ///
    /// The server enforces the cap; this only controls when the client
    /// surfaces the notice.
    #[serde(default = "default_session_limit")]
    pub session_limit: u32,

    /// Sample questions offered in the side menu.
    #[serde(default = "default_sample_questions")]
    pub sample_questions: Vec<String>,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".into()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_session_limit() -> u32 {
    50
}

fn default_sample_questions() -> Vec<String> {
    vec![
        "What can you help me with?".into(),
        "Summarize the most recent documents.".into(),
        "What sources do your answers come from?".into(),
    ]
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_seconds: default_request_timeout(),
            session_limit: default_session_limit(),
            sample_questions: default_sample_questions(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Parse)
    }

    /// Load configuration, falling back to defaults if the file is missing.
    ///
    /// A file that exists but fails to parse is still an error; silently
    /// ignoring a broken config would mask typos.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        std::fs::write(path, content).map_err(ConfigError::Io)
    }
}

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing config JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Error serializing config to JSON.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.session_limit, 50);
        assert!(!config.sample_questions.is_empty());
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("confab.json");

        let mut config = ClientConfig::default();
        config.base_url = "https://answers.example.com".into();
        config.session_limit = 10;
        config.save(&path).unwrap();

        let loaded = ClientConfig::load(&path).unwrap();
        assert_eq!(loaded.base_url, "https://answers.example.com");
        assert_eq!(loaded.session_limit, 10);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"base_url":"http://host:8080"}"#).unwrap();
        assert_eq!(config.base_url, "http://host:8080");
        assert_eq!(config.session_limit, 50);
        assert_eq!(config.request_timeout_seconds, 30);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load_or_default(&dir.path().join("missing.json")).unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:5000");
    }

    #[test]
    fn test_load_or_default_broken_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("confab.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(ClientConfig::load_or_default(&path).is_err());
    }
}
