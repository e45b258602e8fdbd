//! Client configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Environment variable overriding the authority base URL.
pub const API_BASE_URL_ENV: &str = "OX_API_BASE_URL";

/// Environment variable overriding the credential file location.
pub const CREDENTIAL_PATH_ENV: &str = "STRICTLY_OX_CREDENTIAL";

/// Client configuration, loaded from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the authority (without the `/api/game` prefix).
    #[serde(default = "default_api_base_url")]
    api_base_url: String,

    /// Seconds between leaderboard refreshes.
    #[serde(default = "default_ranking_interval_secs")]
    ranking_interval_secs: u64,

    /// Where the credential is persisted. Resolved from the environment
    /// when unset.
    #[serde(default)]
    credential_path: Option<PathBuf>,

    /// Log file used while the TUI owns the terminal.
    #[serde(default = "default_log_file")]
    log_file: PathBuf,
}

fn default_api_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_ranking_interval_secs() -> u64 {
    60
}

fn default_log_file() -> PathBuf {
    PathBuf::from("strictly_ox.log")
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            ranking_interval_secs: default_ranking_interval_secs(),
            credential_path: None,
            log_file: default_log_file(),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        info!(api_base_url = %config.api_base_url, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise returns defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            info!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Applies environment overrides using `lookup` (normally
    /// `std::env::var(..).ok()`).
    #[instrument(skip_all)]
    pub fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(API_BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            debug!(api_base_url = %url, "Using {}", API_BASE_URL_ENV);
            self.api_base_url = url;
        }
        if self.credential_path.is_none() {
            self.credential_path = Some(default_credential_path(&lookup));
        }
        self
    }

    /// Overrides the authority base URL (from the command line).
    pub fn with_api_base_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url {
            self.api_base_url = url;
        }
        self
    }

    /// Refresh interval for the leaderboard.
    pub fn ranking_interval(&self) -> Duration {
        Duration::from_secs(self.ranking_interval_secs)
    }

    /// Credential file location, falling back to the process environment.
    #[instrument(skip(self))]
    pub fn resolved_credential_path(&self) -> PathBuf {
        self.credential_path
            .clone()
            .unwrap_or_else(|| default_credential_path(|key| std::env::var(key).ok()))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.ranking_interval_secs == 0 {
            return Err(ConfigError::new(
                "ranking_interval_secs must be at least 1".to_string(),
            ));
        }
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::new("api_base_url must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Default credential file location.
///
/// Resolution order:
/// 1. `$STRICTLY_OX_CREDENTIAL`
/// 2. `$XDG_CONFIG_HOME/strictly_ox/credential`
/// 3. `$HOME/.config/strictly_ox/credential`
/// 4. `./.strictly_ox_credential`
#[instrument(skip(lookup))]
pub fn default_credential_path(lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(path) = lookup(CREDENTIAL_PATH_ENV) {
        debug!(path = %path, "Using {}", CREDENTIAL_PATH_ENV);
        return PathBuf::from(path);
    }

    if let Some(xdg) = lookup("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("strictly_ox").join("credential");
    }

    if let Some(home) = lookup("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join("strictly_ox")
            .join("credential");
    }

    debug!("Falling back to working directory");
    PathBuf::from(".strictly_ox_credential")
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
