//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::models::PlayerRef;
use crate::parse_duration;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    #[error("No API key: set api.api_key or the {0} environment variable")]
    MissingApiKey(String),
}

/// Ladder API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Inline API key. Leave unset to read it from `api_key_env`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Host for account lookups
    #[serde(default = "default_regional_url")]
    pub regional_url: String,

    /// Host for summoner and league lookups
    #[serde(default = "default_platform_url")]
    pub platform_url: String,

    /// Timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_api_key_env() -> String {
    "RIOT_API_KEY".to_string()
}

fn default_regional_url() -> String {
    "https://americas.api.riotgames.com".to_string()
}

fn default_platform_url() -> String {
    "https://la1.api.riotgames.com".to_string()
}

fn default_timeout() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: default_api_key_env(),
            regional_url: default_regional_url(),
            platform_url: default_platform_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// How often the roster is refreshed (e.g. "1h", "30m")
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: String,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub server: ServerConfig,

    /// Players to track
    #[serde(default = "default_roster")]
    pub roster: Vec<PlayerRef>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_refresh_interval() -> String {
    "1h".to_string()
}

fn default_roster() -> Vec<PlayerRef> {
    vec![
        PlayerRef::new("Pause", "lan"),
        PlayerRef::new("Dritzh", "098"),
        PlayerRef::new("Sleeper", "9905"),
        PlayerRef::new("Gërsön", "lan"),
    ]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            refresh_interval: default_refresh_interval(),
            api: ApiConfig::default(),
            server: ServerConfig::default(),
            roster: default_roster(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Refresh period as a duration.
    pub fn refresh_period(&self) -> Result<Duration, ConfigError> {
        match parse_duration(&self.refresh_interval) {
            Some(period) if !period.is_zero() => Ok(period),
            _ => Err(ConfigError::ValidationError(format!(
                "Invalid refresh interval: {:?}",
                self.refresh_interval
            ))),
        }
    }

    /// Resolve the API key from the file or the environment.
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    fn resolve_api_key_with<F>(&self, lookup: F) -> Result<String, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.api
            .api_key
            .clone()
            .or_else(|| lookup(&self.api.api_key_env))
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ConfigError::MissingApiKey(self.api.api_key_env.clone()))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "API timeout must be greater than 0".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        self.refresh_period()?;

        if self.roster.is_empty() {
            return Err(ConfigError::ValidationError(
                "Roster must contain at least one player".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for player in &self.roster {
            if player.name.trim().is_empty() || player.tag.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "Roster entry {:?} needs both a name and a tag",
                    player.to_string()
                )));
            }
            // Snapshot entries are keyed by name.
            if !seen.insert(player.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "Duplicate roster name: {}",
                    player.name
                )));
            }
        }

        Ok(())
    }
}
