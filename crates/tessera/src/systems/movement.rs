//! Movement: integrates velocity into position.

use tessera_core::{EcsResult, Registry, System, SystemBase, SystemKind};
use tracing::trace;

use crate::components::{RigidBody, Transform};

/// Moves every entity that has both a [`Transform`] and a [`RigidBody`].
#[derive(Debug)]
pub struct MovementSystem {
    base: SystemBase,
}

impl MovementSystem {
    /// Creates the system with its `Transform + RigidBody` requirement.
    ///
    /// # Errors
    ///
    /// Fails only if the component type table is already full.
    pub fn new() -> EcsResult<Self> {
        let base = SystemBase::new()
            .require::<Transform>()?
            .require::<RigidBody>()?;
        Ok(Self { base })
    }

    /// Advances `position += velocity * dt` for every matched entity.
    ///
    /// Returns the number of entities moved.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::SystemNotRegistered`](tessera_core::EcsError::SystemNotRegistered)
    /// if the system was never added to `registry`.
    pub fn update(registry: &mut Registry, dt: f64) -> EcsResult<usize> {
        let entities = registry.system_entities::<Self>()?;
        for &entity in &entities {
            let velocity = registry.get_component::<RigidBody>(entity)?.velocity;
            let transform = registry.get_component_mut::<Transform>(entity)?;
            transform.position += velocity * dt;
            trace!(
                entity = entity.id(),
                x = transform.position.x,
                y = transform.position.y,
                speed = velocity.length(),
                "moved"
            );
        }
        Ok(entities.len())
    }
}

impl System for MovementSystem {
    const KIND: SystemKind = SystemKind::new("movement");

    fn base(&self) -> &SystemBase {
        &self.base
    }
}
