//! # ECS Error Types
//!
//! All errors that can occur while driving the registry.

use thiserror::Error;

use crate::ecs::{Entity, SystemKind};

/// Errors that can occur in the ECS runtime.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// More distinct component types were registered than a signature can hold.
    #[error("component type capacity exceeded: cannot register {type_name}, all {capacity} ids are taken")]
    ComponentCapacityExceeded {
        /// The type that could not be registered.
        type_name: &'static str,
        /// Number of assignable component ids.
        capacity: usize,
    },

    /// The entity does not currently own a component of the requested type.
    #[error("component {component} not present on entity {entity}")]
    ComponentNotPresent {
        /// The requested component type.
        component: &'static str,
        /// The entity that was queried.
        entity: Entity,
    },

    /// The entity was never created by this registry, or has been destroyed.
    #[error("unknown entity: {0}")]
    UnknownEntity(Entity),

    /// The pool stored under a component type id holds another type.
    #[error("pool for component id {id} does not hold {component}")]
    PoolTypeMismatch {
        /// The requested component type.
        component: &'static str,
        /// The component type id used to index the pool.
        id: u8,
    },

    /// The configured entity limit would be exceeded.
    #[error("entity limit reached: {limit}")]
    EntityLimitReached {
        /// The configured maximum number of entities.
        limit: u32,
    },

    /// No system is registered under the requested kind.
    #[error("system not registered: {0}")]
    SystemNotRegistered(SystemKind),

    /// A system is already registered under this kind.
    #[error("system already registered: {0}")]
    SystemAlreadyRegistered(SystemKind),

    /// The system registered under this kind has a different concrete type.
    #[error("system kind {kind} is registered to a type other than {expected}")]
    SystemKindConflict {
        /// The contested kind.
        kind: SystemKind,
        /// The type the caller asked for.
        expected: &'static str,
    },
}

/// Result type for ECS operations.
pub type EcsResult<T> = Result<T, EcsError>;
