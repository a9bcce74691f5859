//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `thermohub.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;
use thermohub_adapter_demo::{DemoConfig, DemoError};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    /// Event bus settings.
    pub bus: BusConfig,
    /// Simulated hub settings.
    pub hub: DemoConfig,
    /// Periodic random commands, for watching the simulation move.
    pub demo: DriverConfig,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Events buffered per subscriber before it starts lagging.
    pub capacity: usize,
}

/// Demo command driver configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Seconds between two commands; `0` disables the driver.
    pub command_interval_secs: u64,
    pub min_target: i32,
    pub max_target: i32,
}

impl Config {
    /// Load configuration from `thermohub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("thermohub.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("THERMOHUB_HOST") {
            self.hub.host = val;
        }
        if let Some(val) = var("THERMOHUB_THERMOSTATS") {
            match val.parse() {
                Ok(count) => self.hub.thermostat_count = count,
                Err(_) => eprintln!("ignoring THERMOHUB_THERMOSTATS={val:?}: not a number"),
            }
        }
        if let Some(val) = var("THERMOHUB_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.hub.validate().map_err(|err| match err {
            DemoError::InvalidConfig(reason) => ConfigError::Validation(reason),
            other => ConfigError::Validation(other.to_string()),
        })?;
        if self.bus.capacity == 0 {
            return Err(ConfigError::Validation(
                "bus capacity must be non-zero".to_string(),
            ));
        }
        if self.demo.min_target > self.demo.max_target {
            return Err(ConfigError::Validation(format!(
                "demo min_target ({}) exceeds max_target ({})",
                self.demo.min_target, self.demo.max_target
            )));
        }
        Ok(())
    }
}

impl DriverConfig {
    /// Command period, or `None` when the driver is disabled.
    #[must_use]
    pub fn interval(&self) -> Option<Duration> {
        (self.command_interval_secs > 0).then_some(Duration::from_secs(self.command_interval_secs))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "thermohubd=info,thermohub=info".to_string(),
        }
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self { capacity: 256 }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            command_interval_secs: 0,
            min_target: 16,
            max_target: 26,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
