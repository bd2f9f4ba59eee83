#![deny(unsafe_code)]

//! Configuration loading and validation for verstamp.
//!
//! Loads the project's `verstamp.toml` and validates it. [`AppConfig`] is the
//! central configuration structure; [`StampConfig`] controls where and how the
//! version record is written.

use std::path::{Component, Path};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default configuration file name, looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "verstamp.toml";

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Top-level application configuration.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version record output settings.
    #[serde(default)]
    pub stamp: StampConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where and how the version record is written.
///
/// ## TOML Example
///
/// ```toml
/// [stamp]
/// public_dir = "public"
/// file_name = "version.json"
/// prefix = "v"
/// pretty = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StampConfig {
    /// Static asset directory, relative to the project root unless absolute.
    #[serde(default = "default_public_dir")]
    pub public_dir: String,

    /// File name of the record inside `public_dir`.
    #[serde(default = "default_file_name")]
    pub file_name: String,

    /// Prefix prepended to the timestamp to form the version string.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Indent the JSON output with two spaces.
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

impl Default for StampConfig {
    fn default() -> Self {
        Self {
            public_dir: default_public_dir(),
            file_name: default_file_name(),
            prefix: default_prefix(),
            pretty: default_pretty(),
        }
    }
}

fn default_public_dir() -> String {
    "public".to_string()
}

fn default_file_name() -> String {
    "version.json".to_string()
}

fn default_prefix() -> String {
    "v".to_string()
}

fn default_pretty() -> bool {
    true
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "debug", "trace").
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from a TOML file at the given path using async I/O.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        let config = Self::parse(&content)?;
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.stamp.validate()?;

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "logging.level must be one of {:?}, got {:?}",
                valid_levels, self.logging.level
            )));
        }

        Ok(())
    }
}

impl StampConfig {
    /// Validate the stamp settings on their own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.public_dir.is_empty() {
            return Err(ConfigError::Validation(
                "stamp.public_dir must not be empty".to_string(),
            ));
        }

        // The file name must name exactly one entry inside public_dir.
        let mut components = Path::new(&self.file_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => {}
            _ => {
                return Err(ConfigError::Validation(format!(
                    "stamp.file_name must be a bare file name, got {:?}",
                    self.file_name
                )));
            }
        }

        if self.prefix.is_empty() {
            return Err(ConfigError::Validation(
                "stamp.prefix must not be empty".to_string(),
            ));
        }
        if self.prefix.ends_with(|c: char| c.is_ascii_digit()) {
            return Err(ConfigError::Validation(format!(
                "stamp.prefix must not end with a digit, got {:?}",
                self.prefix
            )));
        }

        Ok(())
    }
}
