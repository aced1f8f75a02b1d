//! # Game
//!
//! Owns the registry and drives it one frame at a time:
//!
//! ```text
//! wait -> begin_frame (dt) -> registry.update() -> systems -> end_frame
//! ```
//!
//! Structural changes made by systems during a frame become visible to
//! matching at the next frame's update pass.

use tessera_core::{Entity, Registry, UpdateStats};
use tracing::{debug, info};

use crate::components::{RigidBody, Transform, Vec2};
use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::frame::FramePacer;
use crate::systems::MovementSystem;

/// Summary of a finished [`Game::run`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RunSummary {
    /// Frames processed.
    pub frames: u64,
    /// Simulated seconds (sum of frame deltas).
    pub elapsed: f64,
    /// Frames whose work exceeded the frame budget.
    pub late_frames: u64,
}

/// Frame driver around a [`Registry`].
pub struct Game {
    config: EngineConfig,
    registry: Registry,
    pacer: FramePacer,
    running: bool,
    frames: u64,
    elapsed: f64,
}

impl Game {
    /// Creates a game with an empty registry built from `config.registry`.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let registry = Registry::with_config(config.registry.clone());
        let pacer = FramePacer::new(config.frame.target_fps);
        info!(
            target_fps = config.frame.target_fps,
            max_frames = config.frame.max_frames,
            "Game constructor called"
        );
        Self {
            config,
            registry,
            pacer,
            running: false,
            frames: 0,
            elapsed: 0.0,
        }
    }

    /// Registers the systems and spawns the starting entities.
    ///
    /// The tank starts at (10, 30) moving at (10, 5) units per second. The
    /// prop has a transform only and never moves. Returns `(tank, prop)`.
    ///
    /// # Errors
    ///
    /// Propagates registry failures such as a full entity limit.
    pub fn setup(&mut self) -> EngineResult<(Entity, Entity)> {
        self.registry.add_system(MovementSystem::new()?)?;

        let tank = self.registry.create_entity()?;
        self.registry.attach_component(
            tank,
            Transform {
                position: Vec2::new(10.0, 30.0),
                scale: Vec2::ONE,
                rotation: 0.0,
            },
        )?;
        self.registry
            .attach_component(tank, RigidBody::moving(Vec2::new(10.0, 5.0)))?;

        let prop = self.registry.create_entity()?;
        self.registry
            .attach_component(prop, Transform::at(Vec2::new(100.0, 100.0)))?;

        debug!(tank = tank.id(), prop = prop.id(), "setup complete");
        Ok((tank, prop))
    }

    /// Runs paced frames until [`stop`](Self::stop) is called or the
    /// configured frame limit is reached.
    ///
    /// # Errors
    ///
    /// Stops at the first failing frame and returns its error.
    pub fn run(&mut self) -> EngineResult<RunSummary> {
        self.running = true;
        let max_frames = self.config.frame.max_frames;
        info!("Game loop started");

        while self.running && (max_frames == 0 || self.frames < max_frames) {
            self.pacer.wait_for_next_frame();
            let dt = self.pacer.begin_frame();
            let result = self.process_frame(dt);
            self.pacer.end_frame();
            if let Err(e) = result {
                self.running = false;
                return Err(e);
            }
        }

        self.running = false;
        let summary = self.summary();
        info!(
            frames = summary.frames,
            late_frames = summary.late_frames,
            "Game loop finished"
        );
        Ok(summary)
    }

    /// Processes one frame: the registry's update pass, then every system's
    /// step with `dt` seconds.
    ///
    /// # Errors
    ///
    /// Propagates system failures.
    pub fn process_frame(&mut self, dt: f64) -> EngineResult<UpdateStats> {
        let stats = self.registry.update();
        MovementSystem::update(&mut self.registry, dt)?;
        self.frames += 1;
        self.elapsed += dt;
        Ok(stats)
    }

    /// Asks the loop to exit after the current frame.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// True while [`run`](Self::run) is looping.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Frames processed so far.
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frames
    }

    /// The configuration the game was built with.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The registry.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Mutable access to the registry.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Totals so far.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            frames: self.frames,
            elapsed: self.elapsed,
            late_frames: self.pacer.stats().late_frames,
        }
    }
}

impl Drop for Game {
    fn drop(&mut self) {
        info!("Game destructor called");
    }
}
