//! Configuration management for Chirp
//!
//! Settings come from a TOML file in the XDG config directory, with the
//! four Twitter credentials overridable from the environment. A missing
//! config file is tolerated (defaults plus environment); a present but
//! unreadable or malformed file is an error.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::credentials::Credentials;
use crate::error::{ConfigError, Result};

const ENV_VARS: [&str; 4] = [
    "TWITTER_API_KEY",
    "TWITTER_API_SECRET",
    "TWITTER_ACCESS_TOKEN",
    "TWITTER_ACCESS_SECRET",
];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub twitter: TwitterConfig,
    #[serde(default)]
    pub daemon: DaemonConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Path of the queue document. Tilde-expanded on use.
    pub path: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            path: "~/.local/share/chirp/queue.json".to_string(),
        }
    }
}

/// Credential values as stored in the config file. Environment variables of
/// the same names take precedence over every field.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TwitterConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_secret: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub access_secret: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Seconds between scheduler ticks.
    pub poll_interval: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self { poll_interval: 60 }
    }
}

impl Config {
    /// Load configuration from the default location, falling back to
    /// defaults when no config file exists.
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        if !config_path.exists() {
            debug!(path = %config_path.display(), "no config file, using defaults and environment");
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Resolves the four OAuth credentials, letting `TWITTER_*` environment
    /// variables override the config file. Fails listing every missing
    /// variable name.
    pub fn credentials(&self) -> Result<Credentials> {
        let file_values = [
            self.twitter.api_key.as_deref(),
            self.twitter.api_secret.as_deref(),
            self.twitter.access_token.as_deref(),
            self.twitter.access_secret.as_deref(),
        ];

        let mut resolved: [Option<String>; 4] = [None, None, None, None];
        let mut missing = Vec::new();

        for ((var, file_value), slot) in ENV_VARS.iter().zip(file_values).zip(&mut resolved) {
            let value = std::env::var(var)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .or_else(|| {
                    file_value
                        .map(|v| v.trim().to_string())
                        .filter(|v| !v.is_empty())
                });

            match value {
                Some(v) => *slot = Some(v),
                None => missing.push(*var),
            }
        }

        match resolved {
            [Some(api_key), Some(api_secret), Some(access_token), Some(access_secret)] => Ok(
                Credentials::new(api_key, api_secret, access_token, access_secret),
            ),
            _ => Err(ConfigError::MissingCredentials(missing.join(", ")).into()),
        }
    }

    /// The queue document path with tilde expansion applied.
    pub fn queue_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.queue.path).to_string())
    }
}

/// Resolve the configuration file path following the XDG Base Directory
/// spec, with a `CHIRP_CONFIG` override.
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("CHIRP_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir().ok_or_else(|| {
        ConfigError::ReadError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no config directory for this platform",
        ))
    })?;

    Ok(config_dir.join("chirp").join("config.toml"))
}
