//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::client::ClientConfig;
use crate::controller::ControllerOptions;
use crate::state::DEFAULT_MESSAGE_DURATION_MS;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote activities API
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            request_timeout_ms: self.request_timeout_secs.saturating_mul(1000),
        }
    }
}

/// Where the session token is kept between runs
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
}

fn default_storage_path() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("signup-desk").join("storage.json").to_string_lossy().to_string())
        .unwrap_or_else(|| "./signup_desk_storage.json".to_string())
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
        }
    }
}

/// Page behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_message_duration")]
    pub message_duration_ms: u64,
}

fn default_message_duration() -> u64 {
    DEFAULT_MESSAGE_DURATION_MS
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            message_duration_ms: default_message_duration(),
        }
    }
}

impl UiConfig {
    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            message_duration: chrono::Duration::milliseconds(
                self.message_duration_ms.min(u64::from(u32::MAX)) as i64,
            ),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("signup-desk").join("config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("SIGNUP_DESK_API_URL") {
            self.api.base_url = url;
        }
        if let Some(path) = lookup("SIGNUP_DESK_STORAGE_PATH") {
            self.session.storage_path = path;
        }
        if let Some(ms) = lookup("SIGNUP_DESK_MESSAGE_MS") {
            if let Ok(ms) = ms.parse() {
                self.ui.message_duration_ms = ms;
            }
        }
        if let Some(level) = lookup("SIGNUP_DESK_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("SIGNUP_DESK_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Signup Desk Configuration
#
# Environment variables override these settings:
# - SIGNUP_DESK_API_URL
# - SIGNUP_DESK_STORAGE_PATH
# - SIGNUP_DESK_MESSAGE_MS
# - SIGNUP_DESK_LOG_LEVEL
# - SIGNUP_DESK_LOG_FORMAT

[api]
# Activities API base URL
base_url = "http://localhost:8000"

# Request timeout in seconds
request_timeout_secs = 30

[session]
# File holding the teacher's bearer token between runs
# storage_path = "~/.local/share/signup-desk/storage.json"

[ui]
# How long result messages stay visible (ms)
message_duration_ms = 5000

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
