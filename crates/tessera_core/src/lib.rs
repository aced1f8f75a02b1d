//! # TESSERA Core Engine
//!
//! In-process Entity Component System (ECS) runtime:
//! - Arbitrary typed components attached to opaque entity ids
//! - Up to 31 component types, tracked per entity in a 32-bit signature
//! - Systems declare a required signature and receive matching entities
//!
//! ## Architecture Rules
//!
//! 1. **Deferred membership** - attach, detach and destroy take effect on
//!    system membership only at the next [`Registry::update`]
//! 2. **Dense storage** - components live in arrays indexed by entity id
//! 3. **Failures are values** - capacity and access violations come back as
//!    [`EcsError`], never as garbage reads
//!
//! ## Example
//!
//! ```rust,ignore
//! use tessera_core::{Registry, SystemBase};
//!
//! let mut registry = Registry::new();
//! let entity = registry.create_entity()?;
//! registry.attach_component(entity, Position { x: 10.0, y: 30.0 })?;
//! registry.update();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod error;

pub use config::RegistryConfig;
pub use ecs::{
    Component, ComponentPool, ComponentTypeId, ComponentTypeTable, Entity, Pool, Registry,
    Signature, System, SystemBase, SystemKind, UpdateStats, COMPONENT_CAPACITY, MAX_COMPONENTS,
};
pub use error::{EcsError, EcsResult};
