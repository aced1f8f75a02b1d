//! # Systems
//!
//! A system is a passive registrar: it declares which component types it
//! requires, and the registry tracks which entities match it. The
//! per-entity processing logic belongs to the concrete system type and runs
//! outside the registry.
//!
//! The registry keeps its own copy of each system's [`SystemBase`], taken
//! when the system is registered. That copy is the only one matching ever
//! writes to; it is read through [`Registry::system_base`](crate::Registry::system_base).
//!
//! ## Defining a system
//!
//! ```rust,ignore
//! struct Gravity {
//!     base: SystemBase,
//! }
//!
//! impl System for Gravity {
//!     const KIND: SystemKind = SystemKind::new("gravity");
//!
//!     fn base(&self) -> &SystemBase { &self.base }
//! }
//!
//! let gravity = Gravity { base: SystemBase::new().require::<Velocity>()? };
//! registry.add_system(gravity)?;
//! ```

use std::any::{type_name, Any};
use std::fmt;

use super::component::{Component, ComponentTypeId};
use super::entity::Entity;
use super::signature::Signature;
use crate::error::EcsResult;

/// Tag a system type is registered under.
///
/// Chosen by the integrator; the registry holds at most one system per kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SystemKind(&'static str);

impl SystemKind {
    /// Creates a kind from its name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Returns the name of this kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for SystemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Where an entity stands in one system's matched list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Membership {
    #[default]
    Absent,
    Member,
    /// Struck during the current update pass, still in the list until compaction.
    Leaving,
}

/// Required signature plus the entities currently matching it.
///
/// The matched list is only written by the registry's update pass.
#[derive(Clone, Debug, Default)]
pub struct SystemBase {
    signature: Signature,
    /// Matched entities, in match order.
    entities: Vec<Entity>,
    /// Membership per entity. [index = entity id]
    membership: Vec<Membership>,
    /// Entries of `entities` currently marked `Leaving`.
    leaving: usize,
}

impl SystemBase {
    /// Creates a base with an empty requirement, which matches every entity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `C` to the required signature, builder style.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentCapacityExceeded`](crate::EcsError) if
    /// `C` cannot be given a component type id.
    pub fn require<C: Component>(mut self) -> EcsResult<Self> {
        self.require_component::<C>()?;
        Ok(self)
    }

    /// Adds `C` to the required signature.
    ///
    /// Has no effect on a system that is already registered: the registry
    /// matches against the requirement it copied at registration.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentCapacityExceeded`](crate::EcsError) if
    /// `C` cannot be given a component type id.
    pub fn require_component<C: Component>(&mut self) -> EcsResult<()> {
        let id = ComponentTypeId::of::<C>()?;
        self.signature.set(id);
        Ok(())
    }

    /// The components an entity must own to be matched.
    #[inline]
    #[must_use]
    pub const fn signature(&self) -> Signature {
        self.signature
    }

    /// Entities matched as of the last registry update, in match order.
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Checks whether an entity is in the matched list. O(1).
    #[inline]
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.membership.get(entity.index()) == Some(&Membership::Member)
    }

    /// A copy carrying the requirement only, for the registry to match into.
    pub(crate) fn registered(&self) -> Self {
        Self {
            signature: self.signature,
            ..Self::default()
        }
    }

    /// Appends an entity unless it is already matched. O(1).
    ///
    /// An entity struck earlier in the same pass rejoins at its old position.
    pub(crate) fn add_entity(&mut self, entity: Entity) -> bool {
        let index = entity.index();
        if index >= self.membership.len() {
            self.membership.resize(index + 1, Membership::Absent);
        }
        match self.membership[index] {
            Membership::Member => false,
            Membership::Leaving => {
                self.membership[index] = Membership::Member;
                self.leaving -= 1;
                true
            }
            Membership::Absent => {
                self.membership[index] = Membership::Member;
                self.entities.push(entity);
                true
            }
        }
    }

    /// Marks an entity as leaving. O(1); the list itself shrinks at
    /// [`compact`](Self::compact).
    pub(crate) fn remove_entity(&mut self, entity: Entity) -> bool {
        let Some(slot) = self.membership.get_mut(entity.index()) else {
            return false;
        };
        if *slot != Membership::Member {
            return false;
        }
        *slot = Membership::Leaving;
        self.leaving += 1;
        true
    }

    /// Drops every leaving entity from the list in one pass, keeping the
    /// order of the others.
    pub(crate) fn compact(&mut self) {
        if self.leaving == 0 {
            return;
        }
        let membership = &mut self.membership;
        self.entities.retain(|entity| {
            let slot = &mut membership[entity.index()];
            if *slot == Membership::Leaving {
                *slot = Membership::Absent;
                false
            } else {
                true
            }
        });
        self.leaving = 0;
    }
}

/// A system the registry can own and match entities to.
///
/// Membership lives in the registry, not in the system: see
/// [`Registry::system_base`](crate::Registry::system_base) and
/// [`Registry::system_entities`](crate::Registry::system_entities).
pub trait System: 'static {
    /// Key the registry files this system under.
    const KIND: SystemKind;

    /// The requirement the system was built with. Read once, by
    /// [`Registry::add_system`](crate::Registry::add_system).
    fn base(&self) -> &SystemBase;

    /// The components an entity must own to be matched.
    fn signature(&self) -> Signature {
        self.base().signature()
    }
}

/// Object-safe view of a [`System`] used for storage inside the registry.
pub(crate) trait AnySystem {
    fn type_name(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<S: System> AnySystem for S {
    fn type_name(&self) -> &'static str {
        type_name::<S>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}
