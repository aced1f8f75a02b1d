//! # Engine Configuration
//!
//! Loaded once at startup from a TOML file. Every field has a default, so an
//! empty file (or no file at all) yields a working configuration.
//!
//! ```toml
//! [frame]
//! target_fps = 60
//! max_frames = 600
//!
//! [registry]
//! initial_pool_capacity = 100
//! max_entities = 0
//!
//! [logging]
//! level = "info"
//! history_limit = 1024
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tessera_core::RegistryConfig;

use crate::error::{EngineError, EngineResult};

/// Top-level engine configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Frame pacing.
    pub frame: FrameConfig,
    /// ECS registry tunables.
    pub registry: RegistryConfig,
    /// Console logging and log history.
    pub logging: LoggingConfig,
}

/// Frame pacing settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Frames per second the driver paces to.
    pub target_fps: u32,
    /// Stop after this many frames. 0 runs until stopped.
    pub max_frames: u64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            target_fps: 60,
            max_frames: 600,
        }
    }
}

/// Logging settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
    /// Maximum number of entries kept in the log history.
    pub history_limit: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            history_limit: 1024,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ConfigParse`] for malformed TOML and
    /// [`EngineError::InvalidConfig`] for unusable values.
    pub fn from_toml_str(text: &str) -> EngineResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`] if the file cannot be read, otherwise the
    /// errors of [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Checks values serde cannot check.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] naming the offending field.
    pub fn validate(&self) -> EngineResult<()> {
        if self.frame.target_fps == 0 {
            return Err(EngineError::InvalidConfig(
                "frame.target_fps must be greater than zero".to_string(),
            ));
        }
        if self.logging.level.trim().is_empty() {
            return Err(EngineError::InvalidConfig(
                "logging.level must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
