//! # Engine Error Types
//!
//! Everything that can stop the frame driver.

use thiserror::Error;

use tessera_core::EcsError;

/// Errors that can occur while configuring or running the engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// An ECS operation failed.
    #[error(transparent)]
    Ecs(#[from] EcsError),

    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid TOML for [`EngineConfig`](crate::EngineConfig).
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The configuration parsed but holds an unusable value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The logging subscriber could not be installed.
    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
