//! # Game Systems
//!
//! Each system declares its component requirement through a
//! [`SystemBase`](tessera_core::SystemBase) and carries a processing step
//! the frame driver calls after every registry update.

mod movement;

pub use movement::MovementSystem;
