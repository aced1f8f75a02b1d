//! # Frame Pacer
//!
//! Caps the frame rate at a fixed target and measures how long each frame
//! took. Unlike a fixed-timestep loop, frames are variable length: the
//! delta time handed to systems is the real time since the previous frame.
//!
//! ## Per frame
//!
//! 1. [`FramePacer::wait_for_next_frame`] sleeps off whatever is left of the
//!    previous frame's budget.
//! 2. [`FramePacer::begin_frame`] returns the delta time in seconds.
//! 3. [`FramePacer::end_frame`] records how long the work took.

use std::time::{Duration, Instant};

/// Fixed-rate frame pacer.
#[derive(Debug)]
pub struct FramePacer {
    /// Target frame duration.
    frame_duration: Duration,
    /// Start of the previous frame.
    last_frame: Instant,
    /// Frames begun so far.
    frame_count: u64,
    /// Work-time statistics.
    stats: FrameStats,
}

/// Frame timing statistics. Durations cover the work between
/// [`FramePacer::begin_frame`] and [`FramePacer::end_frame`], not the wait.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameStats {
    /// Shortest frame observed.
    pub min_frame_us: u64,
    /// Longest frame observed.
    pub max_frame_us: u64,
    /// Rolling average frame duration.
    pub avg_frame_us: u64,
    /// Frames that blew the budget.
    pub late_frames: u64,
    /// Frames measured.
    pub total_frames: u64,
}

impl FrameStats {
    fn fresh(budget: Duration) -> Self {
        Self {
            min_frame_us: u64::MAX,
            max_frame_us: 0,
            avg_frame_us: duration_us(budget),
            late_frames: 0,
            total_frames: 0,
        }
    }
}

impl FramePacer {
    /// Creates a pacer targeting `target_fps` frames per second.
    ///
    /// A zero rate is treated as one frame per second.
    #[must_use]
    pub fn new(target_fps: u32) -> Self {
        let frame_duration = Duration::from_micros(1_000_000 / u64::from(target_fps.max(1)));
        Self {
            frame_duration,
            last_frame: Instant::now(),
            frame_count: 0,
            stats: FrameStats::fresh(frame_duration),
        }
    }

    /// Sleeps until the previous frame's budget is used up.
    ///
    /// Returns immediately if the previous frame already ran long.
    pub fn wait_for_next_frame(&self) {
        let elapsed = self.last_frame.elapsed();
        if let Some(remaining) = self
            .frame_duration
            .checked_sub(elapsed)
            .filter(|r| !r.is_zero())
        {
            std::thread::sleep(remaining);
        }
    }

    /// Starts a frame and returns the seconds elapsed since the previous one.
    pub fn begin_frame(&mut self) -> f64 {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f64();
        self.last_frame = now;
        self.frame_count += 1;
        dt
    }

    /// Records the work time of the frame begun at the last
    /// [`begin_frame`](Self::begin_frame).
    pub fn end_frame(&mut self) {
        let duration = self.last_frame.elapsed();
        let duration_us = duration_us(duration);

        self.stats.total_frames += 1;
        self.stats.min_frame_us = self.stats.min_frame_us.min(duration_us);
        self.stats.max_frame_us = self.stats.max_frame_us.max(duration_us);
        self.stats.avg_frame_us = (self.stats.avg_frame_us * 15 + duration_us) / 16;

        if duration > self.frame_duration {
            self.stats.late_frames += 1;
        }
    }

    /// Frames begun so far.
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Timing statistics.
    #[must_use]
    pub const fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Target frame duration.
    #[must_use]
    pub const fn frame_duration(&self) -> Duration {
        self.frame_duration
    }

    /// Clears statistics. The frame count is kept.
    pub fn reset_stats(&mut self) {
        self.stats = FrameStats::fresh(self.frame_duration);
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new(60)
    }
}

fn duration_us(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}
