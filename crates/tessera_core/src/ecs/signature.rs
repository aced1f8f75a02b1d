//! # Signatures
//!
//! A signature is a 32-bit set of component type ids. Entities carry one
//! describing the components they own; systems carry one describing the
//! components they require.

use std::fmt;
use std::ops::{BitAnd, BitOr};

use super::component::{ComponentTypeId, MAX_COMPONENTS};

/// Fixed-width bitset of component type ids.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Signature(u32);

impl Signature {
    /// The empty signature.
    pub const EMPTY: Self = Self(0);

    /// Creates a signature from raw bits.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Sets the bit for a component type.
    #[inline]
    pub fn set(&mut self, id: ComponentTypeId) {
        self.0 |= 1 << id.get();
    }

    /// Clears the bit for a component type.
    #[inline]
    pub fn clear(&mut self, id: ComponentTypeId) {
        self.0 &= !(1 << id.get());
    }

    /// Checks whether the bit for a component type is set.
    #[inline]
    #[must_use]
    pub const fn test(self, id: ComponentTypeId) -> bool {
        (self.0 & (1 << id.get())) != 0
    }

    /// Clears every bit.
    #[inline]
    pub fn reset(&mut self) {
        self.0 = 0;
    }

    /// Checks whether every bit of `required` is also set in `self`.
    ///
    /// This is the matching rule: an entity qualifies for a system iff
    /// `entity & required == required`.
    #[inline]
    #[must_use]
    pub const fn contains_all(self, required: Self) -> bool {
        self.0 & required.0 == required.0
    }

    /// Number of set bits.
    #[inline]
    #[must_use]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Checks if no bit is set.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitAnd for Signature {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitOr for Signature {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({:0width$b})", self.0, width = MAX_COMPONENTS)
    }
}
