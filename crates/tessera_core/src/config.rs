//! # Registry Configuration
//!
//! Tunables for a [`Registry`](crate::Registry). Loaded once at startup as
//! part of the application config, so every field has a default.

use serde::{Deserialize, Serialize};

/// Default number of slots a component pool starts with.
pub const DEFAULT_POOL_CAPACITY: usize = 100;

/// Registry tunables.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Slots pre-allocated when a component type's pool is first created.
    pub initial_pool_capacity: usize,
    /// Maximum number of entities ever created. 0 means unbounded.
    pub max_entities: u32,
}

impl RegistryConfig {
    /// Returns the configured entity limit, if any.
    #[inline]
    #[must_use]
    pub const fn entity_limit(&self) -> Option<u32> {
        if self.max_entities == 0 {
            None
        } else {
            Some(self.max_entities)
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            initial_pool_capacity: DEFAULT_POOL_CAPACITY,
            max_entities: 0,
        }
    }
}
