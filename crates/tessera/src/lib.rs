//! # TESSERA
//!
//! Headless frame driver around the `tessera_core` ECS.
//!
//! ## Architecture
//!
//! ```text
//! tessera.toml ──► EngineConfig ──► Game ──► Registry (tessera_core)
//!                       │             │
//!                       ▼             ├──► FramePacer
//!                  init_logging       └──► MovementSystem
//!                  (console + LogHistory)
//! ```
//!
//! ## Modules
//!
//! - [`config`]: TOML configuration
//! - [`logging`]: subscriber installation and log history
//! - [`frame`]: frame pacing and timing stats
//! - [`game`]: the frame driver
//! - [`components`] / [`systems`]: game data and behavior

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod components;
pub mod config;
pub mod error;
pub mod frame;
pub mod game;
pub mod logging;
pub mod systems;

pub use config::{EngineConfig, FrameConfig, LoggingConfig};
pub use error::{EngineError, EngineResult};
pub use frame::{FramePacer, FrameStats};
pub use game::{Game, RunSummary};
pub use logging::{init_logging, LogEntry, LogHistory};
