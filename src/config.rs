//! Configuration module for filedesk.

use serde::Deserialize;
use std::path::Path;

use crate::{FiledeskError, Result};

/// Environment variable overriding `api.base_url`.
pub const ENV_BASE_URL: &str = "FILEDESK_API_BASE_URL";

/// Environment variable overriding `api.token`.
pub const ENV_TOKEN: &str = "FILEDESK_API_TOKEN";

/// File service API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the file service (e.g. `https://files.example.com/api`).
    #[serde(default)]
    pub base_url: String,
    /// Bearer token sent on upload and delete. Empty means "not configured".
    #[serde(default)]
    pub token: String,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Total request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    60
}

fn default_user_agent() -> String {
    format!("filedesk/{}", env!("CARGO_PKG_VERSION"))
}

impl ApiConfig {
    /// Create a config pointing at the given base URL, with default timeouts.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Set the bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    /// Returns the token if one is configured.
    pub fn token(&self) -> Option<&str> {
        if self.token.is_empty() {
            None
        } else {
            Some(&self.token)
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token: String::new(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Download configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadConfig {
    /// Directory downloaded files are saved into.
    #[serde(default = "default_download_dir")]
    pub directory: String,
}

fn default_download_dir() -> String {
    "downloads".to_string()
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            directory: default_download_dir(),
        }
    }
}

/// Display configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    /// Timezone for displaying dates (e.g., "Europe/Bucharest", "UTC").
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file. Leave empty to log to stderr only.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/filedesk.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// File service API configuration.
    #[serde(default)]
    pub api: ApiConfig,
    /// Download configuration.
    #[serde(default)]
    pub download: DownloadConfig,
    /// Display configuration.
    #[serde(default)]
    pub display: DisplayConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(FiledeskError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| FiledeskError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `FILEDESK_API_BASE_URL`: Override the API base URL
    /// - `FILEDESK_API_TOKEN`: Override the bearer token
    pub fn apply_env_overrides(&mut self) {
        if let Ok(base_url) = std::env::var(ENV_BASE_URL) {
            if !base_url.is_empty() {
                self.api.base_url = base_url;
            }
        }

        if let Ok(token) = std::env::var(ENV_TOKEN) {
            if !token.is_empty() {
                self.api.token = token;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if the API base URL is not set.
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(FiledeskError::Config(format!(
                "api.base_url is missing. Set it in filedesk.toml or via the {ENV_BASE_URL} \
                 environment variable."
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.api.base_url.is_empty());
        assert!(config.api.token.is_empty());
        assert!(config.api.token().is_none());
        assert_eq!(config.api.connect_timeout_secs, 10);
        assert_eq!(config.api.request_timeout_secs, 60);
        assert!(config.api.user_agent.starts_with("filedesk/"));

        assert_eq!(config.download.directory, "downloads");
        assert_eq!(config.display.timezone, "UTC");

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/filedesk.log");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[api]
base_url = "https://files.example.com/api/"
token = "secret-token"
connect_timeout_secs = 5
request_timeout_secs = 120
user_agent = "custom-agent"

[download]
directory = "/tmp/saved"

[display]
timezone = "Europe/Bucharest"

[logging]
level = "debug"
file = "custom/logs/app.log"
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.api.base_url, "https://files.example.com/api/");
        assert_eq!(config.api.token(), Some("secret-token"));
        assert_eq!(config.api.connect_timeout_secs, 5);
        assert_eq!(config.api.request_timeout_secs, 120);
        assert_eq!(config.api.user_agent, "custom-agent");

        assert_eq!(config.download.directory, "/tmp/saved");
        assert_eq!(config.display.timezone, "Europe/Bucharest");

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, "custom/logs/app.log");
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[api]
base_url = "http://localhost:8000/api"
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.api.base_url, "http://localhost:8000/api");
        assert!(config.api.token().is_none());
        assert_eq!(config.api.request_timeout_secs, 60);
        assert_eq!(config.download.directory, "downloads");
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("this is not valid toml [[[");

        assert!(result.is_err());
        if let Err(FiledeskError::Config(msg)) = result {
            assert!(msg.contains("config parse error"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load("nonexistent.toml");
        assert!(matches!(result, Err(FiledeskError::Io(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filedesk.toml");
        std::fs::write(&path, "[api]\nbase_url = \"http://127.0.0.1:9000\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.api.base_url, "http://127.0.0.1:9000");
    }

    // Both env vars are touched in one test to avoid races between parallel tests.
    #[test]
    fn test_apply_env_overrides() {
        let original_url = std::env::var(ENV_BASE_URL).ok();
        let original_token = std::env::var(ENV_TOKEN).ok();

        std::env::set_var(ENV_BASE_URL, "http://env.example.com");
        std::env::set_var(ENV_TOKEN, "env-token");

        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.api.base_url, "http://env.example.com");
        assert_eq!(config.api.token(), Some("env-token"));

        // Empty values do not override.
        std::env::set_var(ENV_BASE_URL, "");
        std::env::set_var(ENV_TOKEN, "");

        let mut config = Config::default();
        config.api.base_url = "http://file.example.com".to_string();
        config.api.token = "file-token".to_string();
        config.apply_env_overrides();
        assert_eq!(config.api.base_url, "http://file.example.com");
        assert_eq!(config.api.token(), Some("file-token"));

        match original_url {
            Some(val) => std::env::set_var(ENV_BASE_URL, val),
            None => std::env::remove_var(ENV_BASE_URL),
        }
        match original_token {
            Some(val) => std::env::set_var(ENV_TOKEN, val),
            None => std::env::remove_var(ENV_TOKEN),
        }
    }

    #[test]
    fn test_validate_missing_base_url() {
        let config = Config::default();

        let result = config.validate();
        assert!(result.is_err());
        if let Err(FiledeskError::Config(msg)) = result {
            assert!(msg.contains("base_url"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_validate_blank_base_url() {
        let mut config = Config::default();
        config.api.base_url = "   ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_with_base_url() {
        let mut config = Config::default();
        config.api.base_url = "http://localhost:8000/api".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_api_config_builder() {
        let api = ApiConfig::new("http://localhost").with_token("abc");
        assert_eq!(api.base_url, "http://localhost");
        assert_eq!(api.token(), Some("abc"));
        assert_eq!(api.connect_timeout_secs, 10);
    }
}
