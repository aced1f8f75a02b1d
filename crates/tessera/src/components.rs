//! # Game Components
//!
//! Plain data attached to entities. No behavior beyond small math helpers;
//! systems own the logic.

use std::ops::{Add, AddAssign, Mul};

use tessera_core::Component;

/// 2D vector in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Vec2 {
    /// The zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0);
    /// Unit scale on both axes.
    pub const ONE: Self = Self::new(1.0, 1.0);

    /// Creates a new vector.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Multiplies both coordinates by `factor`.
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Euclidean length.
    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        self.scaled(rhs)
    }
}

/// Placement of an entity in the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// World position.
    pub position: Vec2,
    /// Per-axis scale.
    pub scale: Vec2,
    /// Rotation in degrees.
    pub rotation: f64,
}

impl Transform {
    /// Creates a transform at `position` with unit scale and no rotation.
    #[must_use]
    pub const fn at(position: Vec2) -> Self {
        Self {
            position,
            scale: Vec2::ONE,
            rotation: 0.0,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::at(Vec2::ZERO)
    }
}

impl Component for Transform {}

/// Linear motion of an entity, in world units per second.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RigidBody {
    /// Velocity in units per second.
    pub velocity: Vec2,
}

impl RigidBody {
    /// Creates a body moving at `velocity`.
    #[must_use]
    pub const fn moving(velocity: Vec2) -> Self {
        Self { velocity }
    }
}

impl Component for RigidBody {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_math() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(3.0, -1.0);
        assert_eq!(a + b, Vec2::new(4.0, 1.0));
        assert_eq!(a * 2.0, Vec2::new(2.0, 4.0));
        assert_eq!(Vec2::new(3.0, 4.0).length(), 5.0);

        let mut c = a;
        c += b;
        assert_eq!(c, a + b);
    }

    #[test]
    fn test_transform_defaults() {
        let t = Transform::default();
        assert_eq!(t.position, Vec2::ZERO);
        assert_eq!(t.scale, Vec2::ONE);
        assert_eq!(t.rotation, 0.0);
    }

    #[test]
    fn test_rigid_body_defaults_to_rest() {
        assert_eq!(RigidBody::default().velocity, Vec2::ZERO);
        assert_eq!(RigidBody::moving(Vec2::new(10.0, 5.0)).velocity.x, 10.0);
    }
}
