//! # Component Types
//!
//! Components are plain data records with no behavior. Each distinct
//! component type is given a small integer id the first time it is seen;
//! that id is the bit the type occupies in every [`Signature`](super::Signature).
//!
//! Ids come from a single registration table keyed by [`TypeId`]. The
//! process-wide table is reached through [`ComponentTypeId::of`]; separate
//! tables can be created for isolated use.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use parking_lot::RwLock;

use crate::error::{EcsError, EcsResult};

/// Width of a signature in bits.
pub const MAX_COMPONENTS: usize = 32;

/// Number of component types a table can assign. Id 0 is never handed out.
pub const COMPONENT_CAPACITY: usize = MAX_COMPONENTS - 1;

/// Marker trait for ECS components.
///
/// Components must be:
/// - `Default`: pool slots are pre-filled when a pool grows
/// - `'static`: the type identity keys the registration table
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone, Copy, Debug, Default)]
/// struct Position {
///     x: f32,
///     y: f32,
/// }
///
/// impl Component for Position {}
/// ```
pub trait Component: Default + 'static {}

/// Stable integer id of a component type, in `1..32`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ComponentTypeId(u8);

impl ComponentTypeId {
    /// Returns the id of `T` in the process-wide table, registering it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentCapacityExceeded`] if `T` is new and every
    /// id is already taken.
    #[inline]
    pub fn of<T: 'static>() -> EcsResult<Self> {
        ComponentTypeTable::global().register::<T>()
    }

    /// Returns the id of `T` in the process-wide table without registering it.
    #[inline]
    #[must_use]
    pub fn lookup<T: 'static>() -> Option<Self> {
        ComponentTypeTable::global().lookup::<T>()
    }

    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Returns the id as an index into per-type collections.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registration table mapping type identity to [`ComponentTypeId`].
///
/// Ids are assigned from a monotonically increasing counter starting at 1
/// and are never reassigned for the lifetime of the table.
#[derive(Debug, Default)]
pub struct ComponentTypeTable {
    ids: RwLock<HashMap<TypeId, ComponentTypeId>>,
}

impl ComponentTypeTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide table used by the registry and systems.
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<ComponentTypeTable> = OnceLock::new();
        GLOBAL.get_or_init(Self::new)
    }

    /// Returns the id of `T`, assigning the next free id the first time.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentCapacityExceeded`] if `T` is new and the
    /// table already holds [`COMPONENT_CAPACITY`] types.
    pub fn register<T: 'static>(&self) -> EcsResult<ComponentTypeId> {
        let key = TypeId::of::<T>();
        if let Some(id) = self.ids.read().get(&key) {
            return Ok(*id);
        }

        let mut ids = self.ids.write();
        // Another thread may have won the race between the two locks.
        if let Some(id) = ids.get(&key) {
            return Ok(*id);
        }

        let next = ids.len() + 1;
        let raw = match u8::try_from(next) {
            Ok(raw) if next < MAX_COMPONENTS => raw,
            _ => {
                return Err(EcsError::ComponentCapacityExceeded {
                    type_name: type_name::<T>(),
                    capacity: COMPONENT_CAPACITY,
                })
            }
        };

        let id = ComponentTypeId(raw);
        ids.insert(key, id);
        tracing::debug!("Component type {} registered with id = {}", type_name::<T>(), id);
        Ok(id)
    }

    /// Returns the id of `T` if it has been registered.
    #[must_use]
    pub fn lookup<T: 'static>(&self) -> Option<ComponentTypeId> {
        self.ids.read().get(&TypeId::of::<T>()).copied()
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.read().len()
    }

    /// Checks if no type has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
