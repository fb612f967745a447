use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Tuning for the synchronization layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// How often the engine is polled for the current playtime.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// How long to wait for a seek acknowledgment before resuming polling.
    /// Defaults to twice the poll interval when unset.
    pub seek_timeout_ms: Option<u64>,
    /// Capacity of the state event channel consumed by the rendering layer.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

const fn default_poll_interval() -> u64 {
    1000
}

const fn default_event_capacity() -> usize {
    64
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            seek_timeout_ms: None,
            event_capacity: default_event_capacity(),
        }
    }
}

impl SyncConfig {
    /// The poll interval as a [`Duration`].
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// The seek acknowledgment timeout as a [`Duration`].
    #[must_use]
    pub const fn seek_timeout(&self) -> Duration {
        match self.seek_timeout_ms {
            Some(ms) => Duration::from_millis(ms),
            None => Duration::from_millis(self.poll_interval_ms * 2),
        }
    }
}

impl Config {
    /// Get the configuration directory path (~/.config/cadenza/)
    #[must_use]
    pub fn config_dir() -> PathBuf {
        crate::paths::config_dir()
    }

    /// Get the config file path (~/.config/cadenza/config.toml)
    #[must_use]
    pub fn config_path() -> PathBuf {
        crate::paths::config_path()
    }

    /// Load config from the default location, writing a commented template
    /// on first run. All fields have working defaults, so a fresh install
    /// starts with the template values rather than an error.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing config file cannot be read or parsed,
    /// or if it fails validation.
    pub fn load_or_create() -> Result<Self> {
        Self::load_or_create_at(&Self::config_path())
    }

    /// Same as [`Self::load_or_create`] for an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing config file cannot be read or parsed,
    /// or if it fails validation.
    pub fn load_or_create_at(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            if let Some(parent) = config_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(config_path, CONFIG_TEMPLATE)?;

            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path)?;
        let config: Self =
            toml::from_str(&content).map_err(|source| CoreError::ConfigParseError {
                path: config_path.to_path_buf(),
                source,
            })?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.sync.poll_interval_ms == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "sync.poll_interval_ms must be greater than zero".to_string(),
            });
        }
        if self.sync.seek_timeout_ms == Some(0) {
            return Err(CoreError::ConfigInvalid {
                message: "sync.seek_timeout_ms must be greater than zero".to_string(),
            });
        }
        if self.sync.event_capacity == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "sync.event_capacity must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

const CONFIG_TEMPLATE: &str = r"# Cadenza Configuration
# ~/.config/cadenza/config.toml

[sync]
# How often the playback engine is polled for the current playtime.
poll_interval_ms = 1000
# How long to wait for a seek acknowledgment before resuming polling.
# Defaults to twice the poll interval when left unset.
# seek_timeout_ms = 2000
# Capacity of the state event channel consumed by the rendering layer.
event_capacity = 64
";
