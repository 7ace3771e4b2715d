//! Application settings configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{default_config_path, ConfigError, Result};

/// Environment variable overriding [`Settings::api_url`].
pub const API_URL_ENV: &str = "STAYHUB_API_URL";

/// Application-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the StayHub API.
    pub api_url: String,
    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Attempts for idempotent requests before giving up.
    pub retry_attempts: u32,
    /// Rows per page in lists.
    pub page_size: u32,
    /// Terminal width (columns) at which tables switch from cards to a grid.
    pub narrow_breakpoint: u16,
    /// Whether the stays tab hides finished stays.
    pub only_incoming_stays: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3030".to_string(),
            request_timeout_secs: 10,
            retry_attempts: 3,
            page_size: 10,
            narrow_breakpoint: 100,
            only_incoming_stays: true,
        }
    }
}

impl Settings {
    /// Load settings from the default location, applying env overrides.
    ///
    /// A missing file is created with default values.
    ///
    /// # Errors
    ///
    /// Fails when the config directory cannot be determined, and otherwise
    /// as [`Settings::load_from`] does.
    pub fn load() -> Result<Self> {
        let path = default_config_path()?;
        Self::load_from(&path)
    }

    /// Load settings from `path`, applying env overrides.
    ///
    /// A missing file is created with default values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the file exists but cannot be read or is not valid TOML
    /// - the default file cannot be written
    /// - the result, after `STAYHUB_API_URL`, fails [`Settings::validate`]
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut settings = if path.exists() {
            debug!(path = %path.display(), "Reading settings");
            let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
            toml::from_str::<Settings>(&contents)?
        } else {
            info!(path = %path.display(), "No settings file, writing defaults");
            let settings = Settings::default();
            settings.save_to(path)?;
            settings
        };

        settings.apply_env(std::env::var(API_URL_ENV).ok());
        settings.validate()?;
        Ok(settings)
    }

    /// Write settings to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::CreateDirError` or `ConfigError::WriteError`
    /// on I/O failure.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::CreateDirError)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents).map_err(ConfigError::WriteError)
    }

    /// Apply the API URL override if set and non-empty.
    fn apply_env(&mut self, api_url: Option<String>) {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            debug!(api_url = %url, "API URL overridden by environment");
            self.api_url = url.trim().to_string();
        }
    }

    /// Validate the settings.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::ValidationError` describing the first
    /// invalid value.
    pub fn validate(&self) -> Result<()> {
        let url = self.api_url.trim();
        if url.is_empty() {
            return Err(ConfigError::ValidationError(
                "api_url cannot be empty".to_string(),
            ));
        }
        if !url.starts_with("https://") && !url.starts_with("http://") {
            return Err(ConfigError::ValidationError(format!(
                "api_url '{}' must start with http:// or https://",
                url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.page_size == 0 {
            return Err(ConfigError::ValidationError(
                "page_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
