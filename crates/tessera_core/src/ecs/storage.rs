//! # Component Pools
//!
//! Dense, growable component storage indexed by entity id.
//!
//! The storage uses a dense array strategy:
//! - Slot `i` belongs to entity `i`; nothing is ever compacted
//! - Access is O(1) via entity index
//! - Growing never moves a slot to another index
//!
//! A slot only holds meaningful data while the owning entity's signature has
//! the pool's bit set. The pool itself does not know about signatures.

use std::any::Any;

use super::component::Component;

/// Type-erased view of a component pool.
///
/// The registry keeps one of these per component type id and recovers the
/// concrete [`ComponentPool`] through [`Pool::as_any`].
pub trait Pool: Any {
    /// Number of slots.
    fn len(&self) -> usize;

    /// Checks if the pool has no slots.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resizes the pool to exactly `len` slots.
    fn resize(&mut self, len: usize);

    /// Removes every slot.
    fn clear(&mut self);

    /// Upcast for checked downcasting to the concrete pool.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for checked downcasting to the concrete pool.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Dense storage for a single component type.
///
/// # Type Parameters
///
/// * `C` - The component type to store
///
/// # Example
///
/// ```rust,ignore
/// let mut pool: ComponentPool<Position> = ComponentPool::new(100);
/// pool.set(3, Position { x: 1.0, y: 2.0 });
/// ```
#[derive(Debug, Clone)]
pub struct ComponentPool<C: Component> {
    data: Vec<C>,
}

impl<C: Component> ComponentPool<C> {
    /// Creates a pool with `len` default-filled slots.
    #[must_use]
    pub fn new(len: usize) -> Self {
        let mut data = Vec::with_capacity(len);
        data.resize_with(len, C::default);
        Self { data }
    }

    /// Grows the pool so that indices `0..len` are valid.
    ///
    /// Never shrinks; existing slots keep their index and contents.
    #[inline]
    pub fn ensure_capacity(&mut self, len: usize) {
        if len > self.data.len() {
            self.data.resize_with(len, C::default);
        }
    }

    /// Overwrites the slot at `index`, growing the pool first if needed.
    #[inline]
    pub fn set(&mut self, index: usize, component: C) {
        self.ensure_capacity(index + 1);
        self.data[index] = component;
    }

    /// Gets the slot at `index`.
    ///
    /// # Returns
    ///
    /// Reference to the slot, or None if index is out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&C> {
        self.data.get(index)
    }

    /// Gets the slot at `index` mutably.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut C> {
        self.data.get_mut(index)
    }

    /// Returns a slice of all slots, live or not.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[C] {
        &self.data
    }
}

impl<C: Component> Default for ComponentPool<C> {
    fn default() -> Self {
        Self { data: Vec::new() }
    }
}

impl<C: Component> Pool for ComponentPool<C> {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn resize(&mut self, len: usize) {
        self.data.resize_with(len, C::default);
    }

    fn clear(&mut self) {
        self.data.clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
