// Runtime configuration
// Read from the environment (after `.env` is loaded by main)

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::infrastructure::github::DEFAULT_GITHUB_API_URL;
use crate::infrastructure::relays::DEFAULT_CHAT_BACKEND_URL;

const DEFAULT_PROJECT_FOLDER: &str = "/default/path/to/working/directory";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Where compiled crew files are written
    pub project_folder: PathBuf,
    pub openai_api_key: String,
    pub openai_base_url: String,
    /// Overrides every crew agent's model when set
    pub crew_model: Option<String>,
    pub github_token: Option<String>,
    pub github_api_url: String,
    pub chat_backend_url: String,
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    /// Build the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let project_folder = var("PROJECT_FOLDER_PATH").unwrap_or_else(|| {
            tracing::warn!("PROJECT_FOLDER_PATH not set, using default");
            DEFAULT_PROJECT_FOLDER.to_string()
        });

        let openai_api_key = var("OPENAI_API_KEY").ok_or(ConfigError::Missing("OPENAI_API_KEY"))?;

        let bind_addr: SocketAddr = var("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                name: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        Ok(Self {
            project_folder: PathBuf::from(project_folder),
            openai_api_key,
            openai_base_url: var("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            crew_model: var("CREW_MODEL"),
            github_token: var("GITHUB_TOKEN"),
            github_api_url: var("GITHUB_API_URL")
                .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
            chat_backend_url: var("CHAT_BACKEND_URL")
                .unwrap_or_else(|| DEFAULT_CHAT_BACKEND_URL.to_string()),
            bind_addr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let config = config(&[("OPENAI_API_KEY", "sk-test")]).unwrap();

        assert_eq!(config.project_folder, PathBuf::from(DEFAULT_PROJECT_FOLDER));
        assert_eq!(config.openai_base_url, "https://api.openai.com/v1");
        assert_eq!(config.chat_backend_url, "http://localhost:5001/api/chat-messages");
        assert_eq!(config.github_api_url, "https://api.github.com");
        assert_eq!(config.bind_addr.port(), 5000);
        assert!(config.github_token.is_none());
        assert!(config.crew_model.is_none());
    }

    #[test]
    fn missing_api_key_is_an_error() {
        let result = config(&[("PROJECT_FOLDER_PATH", "/tmp/crews")]);

        assert!(matches!(result, Err(ConfigError::Missing("OPENAI_API_KEY"))));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = config(&[("OPENAI_API_KEY", "sk-test"), ("GITHUB_TOKEN", "  ")]).unwrap();

        assert!(config.github_token.is_none());
    }

    #[test]
    fn overrides_are_read() {
        let config = config(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("PROJECT_FOLDER_PATH", "/tmp/crews"),
            ("CREW_MODEL", "gpt-4o"),
            ("GITHUB_TOKEN", "ghp_x"),
            ("CHAT_BACKEND_URL", "http://chat:5001/api/chat-messages"),
            ("BIND_ADDR", "127.0.0.1:8080"),
        ])
        .unwrap();

        assert_eq!(config.project_folder, PathBuf::from("/tmp/crews"));
        assert_eq!(config.crew_model.as_deref(), Some("gpt-4o"));
        assert_eq!(config.github_token.as_deref(), Some("ghp_x"));
        assert_eq!(config.chat_backend_url, "http://chat:5001/api/chat-messages");
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn bad_bind_addr_is_rejected() {
        let result = config(&[("OPENAI_API_KEY", "sk-test"), ("BIND_ADDR", "not-an-addr")]);

        assert!(matches!(result, Err(ConfigError::Invalid { name: "BIND_ADDR", .. })));
    }
}
