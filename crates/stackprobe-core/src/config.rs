//! Configuration management for stackprobe.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default fingerprinting endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://whatcms.org/API/Tech";

/// Main application configuration.
///
/// This is loaded from `~/.config/stackprobe/config.toml` (or platform
/// equivalent) unless an explicit path is given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Fingerprinting API settings
    pub api: ApiConfig,
    /// Input table settings
    pub input: InputConfig,
    /// Report output settings
    pub output: OutputConfig,
}

impl AppConfig {
    /// Load configuration from the platform config path, falling back to
    /// defaults if the file does not exist.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit file. A missing file is an error.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }

        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// `path` selects an explicit config file; `None` uses [`AppConfig::load`].
    ///
    /// Supports the following environment variables:
    /// - `STACKPROBE_API_KEY`: API key
    /// - `STACKPROBE_INPUT`: input table path
    /// - `STACKPROBE_OUTPUT`: report output path
    /// - `STACKPROBE_RATE_LIMIT_DELAY_SECS`: delay after each request
    pub fn load_with_env(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => Self::load()?,
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Apply overrides from an environment lookup function.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("STACKPROBE_API_KEY") {
            self.api.key = Some(key);
            tracing::debug!("Override api.key from env");
        }

        if let Some(path) = lookup("STACKPROBE_INPUT") {
            tracing::debug!("Override input.path from env: {}", path);
            self.input.path = PathBuf::from(path);
        }

        if let Some(path) = lookup("STACKPROBE_OUTPUT") {
            tracing::debug!("Override output.path from env: {}", path);
            self.output.path = PathBuf::from(path);
        }

        if let Some(val) = lookup("STACKPROBE_RATE_LIMIT_DELAY_SECS") {
            if let Ok(secs) = val.parse() {
                self.api.rate_limit_delay_secs = secs;
                tracing::debug!("Override api.rate_limit_delay_secs from env: {}", secs);
            }
        }
    }

    /// Pre-flight checks that must pass before any network activity.
    pub fn validate(&self) -> ConfigResult<()> {
        self.api.api_key()?;

        if self.api.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "api.timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.input.url_column.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "input.url_column".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        if !self.input.path.exists() {
            return Err(ConfigError::InputNotFound {
                path: self.input.path.clone(),
            });
        }

        Ok(())
    }

    /// Render the configuration as TOML with the API key masked.
    pub fn to_masked_toml(&self) -> ConfigResult<String> {
        let mut masked = self.clone();
        masked.api.key = masked.api.key.as_deref().map(mask_secret);
        Ok(toml::to_string_pretty(&masked)?)
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/stackprobe/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "stackprobe", "stackprobe")
            .ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{visible}****")
    }
}

/// Fingerprinting API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API key sent as the `key` query parameter
    pub key: Option<String>,
    /// Endpoint URL
    pub endpoint: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Pause after every request in seconds
    pub rate_limit_delay_secs: u64,
}

impl ApiConfig {
    /// The configured API key, or [`ConfigError::MissingApiKey`] if unset or blank.
    pub fn api_key(&self) -> ConfigResult<&str> {
        self.key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 30,
            rate_limit_delay_secs: 10,
        }
    }
}

/// Input table settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Path to the input table
    pub path: PathBuf,
    /// Sheet holding the URLs (spreadsheet inputs only)
    pub sheet_name: String,
    /// Column holding the URLs
    pub url_column: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/input.csv"),
            sheet_name: "WHATCMS INPUT".to_string(),
            url_column: "url".to_string(),
        }
    }
}

/// Report output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of the report; the extension selects the format
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/output.csv"),
        }
    }
}
