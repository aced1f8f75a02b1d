//! # Entity Component System
//!
//! Typed data attached to opaque entity ids, with bitset-based matching of
//! entities to systems.
//!
//! ## Design Philosophy
//!
//! - Every component type gets a bit; signatures are plain `u32` sets
//! - Components are stored in dense arrays indexed by entity id
//! - Pools are type-erased behind [`Pool`] and downcast on access
//! - System membership only changes inside [`Registry::update`]

mod component;
mod entity;
mod registry;
mod signature;
mod storage;
mod system;

pub use component::{
    Component, ComponentTypeId, ComponentTypeTable, COMPONENT_CAPACITY, MAX_COMPONENTS,
};
pub use entity::Entity;
pub use registry::{Registry, UpdateStats};
pub use signature::Signature;
pub use storage::{ComponentPool, Pool};
pub use system::{System, SystemBase, SystemKind};

#[cfg(test)]
mod tests;
