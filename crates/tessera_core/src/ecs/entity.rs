//! # Entity Management
//!
//! Entities are opaque numeric handles. They carry no data; everything an
//! entity "has" lives in the registry's pools and signature table.

use std::fmt;

/// Handle to one logical object in the registry.
///
/// Identity and ordering are defined by the id alone. Ids are handed out by
/// the registry starting at 1 and are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Entity(u32);

impl Entity {
    /// Creates an entity handle from a raw id.
    #[inline]
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the id of this entity.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }

    /// Returns the id as an index into per-entity storage.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where an entity id is in its lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum EntityState {
    /// Never handed out (slot 0, or beyond the entity count).
    #[default]
    Vacant,
    /// Created, waiting for the next update to be matched.
    Pending,
    /// Matched and visible to systems.
    Active,
    /// Removed by an update; the id is retired.
    Destroyed,
}

impl EntityState {
    /// Whether components may be attached to or read from the entity.
    #[inline]
    pub(crate) const fn is_live(self) -> bool {
        matches!(self, Self::Pending | Self::Active)
    }
}
