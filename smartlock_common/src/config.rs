//! Configuration loading traits and types.
//!
//! This module provides the TOML configuration of the SmartLock service and
//! a standardized loader.
//!
//! # Usage
//!
//! ```rust,no_run
//! use smartlock_common::config::{ConfigError, ConfigLoader, SmartLockConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = SmartLockConfig::load(Path::new("smartlock.toml"))?;
//!     config.validate()?;
//!     println!("Servo on GPIO {}", config.servo.pin);
//!     Ok(())
//! }
//! ```

use crate::hal::config::{SensorsConfig, ServoConfig, SimulationConfig, secs_to_duration};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(ConfigError::ParseError(format!("unknown log level '{other}'"))),
        }
    }
}

/// Logging section (`[logging]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging verbosity level.
    pub level: LogLevel,
}

/// HTTP listener (`[web]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Coordinator policies (`[features]`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeaturesConfig {
    /// Idle time after an unlock before re-locking [s]. 0 disables auto-lock.
    pub auto_lock_seconds: f64,
    /// Maximum wait for sensor confirmation after an actuation [s]. 0 disables.
    pub confirm_timeout_seconds: f64,
    /// Lock sensor polling interval during confirmation [ms].
    pub confirm_poll_ms: u64,
    /// Auto-lock loop polling interval [ms].
    pub auto_lock_poll_ms: u64,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            auto_lock_seconds: 0.0,
            confirm_timeout_seconds: 3.0,
            confirm_poll_ms: 50,
            auto_lock_poll_ms: 500,
        }
    }
}

impl FeaturesConfig {
    /// Confirmation timeout as a `Duration`.
    pub fn confirm_timeout(&self) -> Duration {
        secs_to_duration(self.confirm_timeout_seconds)
    }

    /// Confirmation polling interval as a `Duration`.
    pub fn confirm_poll_interval(&self) -> Duration {
        Duration::from_millis(self.confirm_poll_ms)
    }

    /// Auto-lock polling interval as a `Duration`.
    pub fn auto_lock_poll_interval(&self) -> Duration {
        Duration::from_millis(self.auto_lock_poll_ms)
    }
}

/// Complete service configuration loaded from `smartlock.toml`.
///
/// Every field has a default, so an empty file is a valid configuration.
///
/// # TOML Example
///
/// ```toml
/// dry_run = true
///
/// [logging]
/// level = "debug"
///
/// [servo]
/// pin = 12
///
/// [web]
/// port = 8080
///
/// [features]
/// auto_lock_seconds = 30.0
/// confirm_timeout_seconds = 3.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct SmartLockConfig {
    /// Force the simulated actuator regardless of `servo.driver`.
    pub dry_run: bool,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Servo settings.
    pub servo: ServoConfig,
    /// Reed switch settings.
    pub sensors: SensorsConfig,
    /// HTTP listener.
    pub web: WebConfig,
    /// Coordinator policies.
    pub features: FeaturesConfig,
    /// Simulated lock initial state.
    pub simulation: SimulationConfig,
}

impl SmartLockConfig {
    /// Parse a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ParseError` on invalid TOML or unknown fields.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if any section is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.servo.validate()?;
        self.sensors.validate()?;

        if self.web.host.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "web.host cannot be empty".to_string(),
            ));
        }
        if self.web.port == 0 {
            return Err(ConfigError::ValidationError(
                "web.port cannot be 0".to_string(),
            ));
        }

        let features = &self.features;
        for (name, secs) in [
            ("auto_lock_seconds", features.auto_lock_seconds),
            ("confirm_timeout_seconds", features.confirm_timeout_seconds),
        ] {
            if !secs.is_finite() || secs < 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "features.{name} must be a non-negative number, got {secs}"
                )));
            }
        }
        if features.confirm_poll_ms == 0 || features.auto_lock_poll_ms == 0 {
            return Err(ConfigError::ValidationError(
                "features poll intervals must be at least 1 ms".to_string(),
            ));
        }
        Ok(())
    }
}

/// Trait for loading configuration from TOML files.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Blanket implementation for all types that implement DeserializeOwned.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
