//! Configuration management

use crate::error::{AgroError, AgroResult, ErrorContext};
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default backend the client talks to
pub const DEFAULT_BASE_URL: &str = "http://172.16.65.127:5001";

/// Delay before the splash screen hands over to login
pub const DEFAULT_SPLASH_DELAY_MS: u64 = 3000;

/// Client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgroConfig {
    pub backend: BackendConfig,
    pub boot: BootConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL for `/getUsername` and `/logout`
    pub base_url: String,
    /// User agent string
    pub user_agent: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: format!("agrolens/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BootConfig {
    pub splash_delay_ms: u64,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            splash_delay_ms: DEFAULT_SPLASH_DELAY_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding `authToken` and `use_id`; `~` is expanded
    pub session_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            session_file: "~/.agrolens/session.json".to_string(),
        }
    }
}

impl StorageConfig {
    /// Session file path with a leading `~` resolved against the home directory
    pub fn session_path(&self) -> PathBuf {
        expand_home(&self.session_file)
    }
}

/// Resolve a leading `~/` against the user's home directory
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Default location of the configuration file
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("agrolens")
        .join("config.toml")
}

impl AgroConfig {
    /// Load configuration from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AgroResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AgroError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: AgroConfig = toml::from_str(&content).map_err(|e| AgroError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when it exists, otherwise fall back to defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> AgroResult<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> AgroResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| AgroError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content).map_err(|e| AgroError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> AgroResult<()> {
        let url = url::Url::parse(&self.backend.base_url).map_err(|e| AgroError::Config {
            message: format!("Invalid backend base_url '{}': {}", self.backend.base_url, e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("validate")
                .with_suggestion("Set backend.base_url to an absolute http(s) URL"),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(AgroError::Config {
                message: format!("Unsupported backend scheme: {}", url.scheme()),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Use an http or https URL"),
            });
        }

        if self.boot.splash_delay_ms == 0 {
            return Err(AgroError::Config {
                message: "Boot splash_delay_ms must be greater than 0".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set boot.splash_delay_ms to a positive value"),
            });
        }

        if self.storage.session_file.trim().is_empty() {
            return Err(AgroError::Config {
                message: "Storage session_file must not be empty".to_string(),
                source: None,
                context: ErrorContext::new("config").with_operation("validate"),
            });
        }

        Ok(())
    }
}
