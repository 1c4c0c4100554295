//! Loading of the TOML files that configure the TR1 services.
//!
//! Any `Deserialize` type gets [`ConfigLoader`] for free; each file embeds a
//! `[shared]` table ([`SharedConfig`]) for the settings every service reads.
//!
//! ```rust,no_run
//! use tr1_common::config::{ConfigError, ConfigLoader};
//! use tr1_common::hal::config::HardwareConfig;
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = HardwareConfig::load(Path::new("/etc/tr1/hardware.toml"))?;
//!     config.validate()?;
//!     println!("{} joints", config.hardware_interface.joints.len());
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why a configuration could not be used.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// No file at the given path.
    #[error("Configuration file {} not found", .0.display())]
    FileNotFound(PathBuf),

    /// The file could not be read or is not valid TOML for the target type.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// The file parsed but its values are unusable.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// `shared.log_level` values, lowest threshold first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Per-cycle detail.
    Trace,
    /// Handle binding, driver writes, periodic loop statistics.
    Debug,
    /// Startup, shutdown and controller lifecycle.
    #[default]
    Info,
    /// Overruns and degraded drivers.
    Warn,
    /// Failures only.
    Error,
}

impl LogLevel {
    /// Filter directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// The `[shared]` table.
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "tr1_hal"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Default verbosity; `-v` and `RUST_LOG` take precedence.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Name this instance logs under.
    pub service_name: String,
}

impl SharedConfig {
    /// Reject an empty `service_name`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// TOML loading, blanket-implemented for every `DeserializeOwned` type.
///
/// Loading only parses; callers run the type's own `validate()` afterwards.
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Read and parse `path`.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound(path.to_path_buf()),
            _ => ConfigError::ParseError(format!("{}: {e}", path.display())),
        })?;

        tracing::debug!("Read configuration from {}", path.display());
        Self::from_toml(&content)
    }

    /// Parse an in-memory document.
    fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
