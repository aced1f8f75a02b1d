//! # Registry
//!
//! The single owner of entities, component pools, signatures and systems.
//!
//! Mutations happen immediately: creating an entity, attaching or detaching
//! a component, destroying an entity. System membership does not. It is
//! materialized by [`Registry::update`], which the frame driver calls once
//! per tick before any system processes its entities. A system's matched
//! list therefore never changes while it is being iterated.
//!
//! ## Update pass
//!
//! 1. Newly created entities are matched against every system.
//! 2. Active entities whose signature changed (or that predate a newly
//!    added system) are re-matched: they join systems they now qualify for
//!    and leave systems they no longer qualify for.
//! 3. Destroyed entities are struck from every system and their signature
//!    is zeroed.

use std::any::type_name;
use std::collections::{BTreeMap, BTreeSet};

use super::component::{Component, ComponentTypeId};
use super::entity::{Entity, EntityState};
use super::signature::Signature;
use super::storage::{ComponentPool, Pool};
use super::system::{AnySystem, System, SystemBase, SystemKind};
use crate::config::RegistryConfig;
use crate::error::{EcsError, EcsResult};

/// Counts of what one [`Registry::update`] call processed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateStats {
    /// Entities matched for the first time.
    pub added: usize,
    /// Active entities re-matched after a signature or system change.
    pub rematched: usize,
    /// Entities removed from every system.
    pub removed: usize,
}

impl UpdateStats {
    /// Checks whether the update had nothing to do.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.added == 0 && self.rematched == 0 && self.removed == 0
    }
}

/// The ECS registry.
///
/// # Example
///
/// ```rust,ignore
/// let mut registry = Registry::new();
/// registry.add_system(Movement::new()?)?;
///
/// let tank = registry.create_entity()?;
/// registry.attach_component(tank, Transform::default())?;
/// registry.attach_component(tank, RigidBody::default())?;
///
/// registry.update();
/// assert_eq!(registry.system_base::<Movement>()?.entities(), &[tank]);
/// ```
pub struct Registry {
    config: RegistryConfig,
    /// Highest entity id handed out so far.
    entity_count: u32,
    /// Lifecycle per entity. [index = entity id]
    entity_states: Vec<EntityState>,
    /// Which components each entity owns. [index = entity id]
    entity_signatures: Vec<Signature>,
    /// Created since the last update.
    pending_add: BTreeSet<Entity>,
    /// Flagged for destruction at the next update.
    pending_remove: BTreeSet<Entity>,
    /// Active entities whose membership must be recomputed.
    pending_rematch: BTreeSet<Entity>,
    /// One pool per component type. [index = component type id]
    component_pools: Vec<Option<Box<dyn Pool>>>,
    systems: BTreeMap<SystemKind, SystemEntry>,
}

/// A registered system and the membership the registry keeps for it.
struct SystemEntry {
    system: Box<dyn AnySystem>,
    /// Requirement copied at registration, plus the matched list.
    base: SystemBase,
}

impl Registry {
    /// Creates a registry with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Creates a registry with the given configuration.
    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        tracing::debug!("Registry created");
        Self {
            config,
            entity_count: 0,
            // Slot 0 is never a valid entity.
            entity_states: vec![EntityState::Vacant],
            entity_signatures: vec![Signature::EMPTY],
            pending_add: BTreeSet::new(),
            pending_remove: BTreeSet::new(),
            pending_rematch: BTreeSet::new(),
            component_pools: Vec::new(),
            systems: BTreeMap::new(),
        }
    }

    /// Returns the configuration this registry was built with.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Number of entity ids handed out so far, destroyed ones included.
    #[inline]
    #[must_use]
    pub const fn entity_count(&self) -> u32 {
        self.entity_count
    }

    /// Number of entities waiting to be matched by the next update.
    #[inline]
    #[must_use]
    pub fn pending_additions(&self) -> usize {
        self.pending_add.len()
    }

    /// Number of entities waiting to be removed by the next update.
    #[inline]
    #[must_use]
    pub fn pending_removals(&self) -> usize {
        self.pending_remove.len()
    }

    /// Checks whether an entity has been created and not yet destroyed.
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.state(entity).is_live()
    }

    /// Returns the signature of a live entity.
    #[must_use]
    pub fn signature(&self, entity: Entity) -> Option<Signature> {
        if self.is_alive(entity) {
            self.entity_signatures.get(entity.index()).copied()
        } else {
            None
        }
    }

    // =========================================================================
    // Entity lifecycle
    // =========================================================================

    /// Creates a new entity.
    ///
    /// The entity is queued for matching and is not visible to any system
    /// until the next [`update`](Self::update).
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityLimitReached`] if the configured maximum
    /// (or the id space) is exhausted.
    pub fn create_entity(&mut self) -> EcsResult<Entity> {
        let limit = self.config.entity_limit().unwrap_or(u32::MAX);
        if self.entity_count >= limit {
            tracing::warn!("Entity limit of {} reached", limit);
            return Err(EcsError::EntityLimitReached { limit });
        }

        self.entity_count += 1;
        let entity = Entity::new(self.entity_count);

        let len = entity.index() + 1;
        if self.entity_signatures.len() < len {
            self.entity_signatures.resize(len, Signature::EMPTY);
            self.entity_states.resize(len, EntityState::Vacant);
        }
        self.entity_states[entity.index()] = EntityState::Pending;
        self.pending_add.insert(entity);

        tracing::info!("Entity created with id = {}", entity);
        Ok(entity)
    }

    /// Flags an entity for destruction at the next update.
    ///
    /// Until then the entity keeps its components and its system memberships.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownEntity`] if the entity is not alive.
    pub fn destroy_entity(&mut self, entity: Entity) -> EcsResult<()> {
        self.live_state(entity)?;
        if self.pending_remove.insert(entity) {
            tracing::debug!("Entity id = {} flagged for removal", entity);
        }
        Ok(())
    }

    // =========================================================================
    // Component management
    // =========================================================================

    /// Attaches a component to an entity, overwriting any previous value.
    ///
    /// If the entity is already active it is re-matched at the next update.
    ///
    /// # Errors
    ///
    /// - [`EcsError::UnknownEntity`] if the entity is not alive
    /// - [`EcsError::ComponentCapacityExceeded`] if `C` is a new type and no
    ///   component type id is left
    pub fn attach_component<C: Component>(&mut self, entity: Entity, component: C) -> EcsResult<()> {
        let state = self.live_state(entity)?;
        let id = ComponentTypeId::of::<C>()?;

        let needed = self.entity_count as usize + 1;
        let pool = self.pool_or_insert::<C>(id)?;
        pool.ensure_capacity(needed);
        pool.set(entity.index(), component);

        self.entity_signatures[entity.index()].set(id);
        if state == EntityState::Active {
            self.pending_rematch.insert(entity);
        }

        tracing::info!("Component id = {} added to entity id = {}", id, entity);
        Ok(())
    }

    /// Detaches a component from an entity.
    ///
    /// Only the signature bit is cleared; the pool slot is left as is. A
    /// no-op if the entity does not own the component. If the entity is
    /// active it keeps its memberships until the next update re-matches it.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownEntity`] if the entity is not alive.
    pub fn detach_component<C: Component>(&mut self, entity: Entity) -> EcsResult<()> {
        let state = self.live_state(entity)?;
        let Some(id) = ComponentTypeId::lookup::<C>() else {
            return Ok(());
        };

        let signature = &mut self.entity_signatures[entity.index()];
        if !signature.test(id) {
            return Ok(());
        }
        signature.clear(id);
        if state == EntityState::Active {
            self.pending_rematch.insert(entity);
        }

        tracing::debug!("Component id = {} removed from entity id = {}", id, entity);
        Ok(())
    }

    /// Checks whether a live entity owns a component of type `C`.
    #[must_use]
    pub fn has_component<C: Component>(&self, entity: Entity) -> bool {
        match (self.signature(entity), ComponentTypeId::lookup::<C>()) {
            (Some(signature), Some(id)) => signature.test(id),
            _ => false,
        }
    }

    /// Gets the component of type `C` owned by an entity.
    ///
    /// # Errors
    ///
    /// - [`EcsError::UnknownEntity`] if the entity is not alive
    /// - [`EcsError::ComponentNotPresent`] if the entity does not own a `C`
    pub fn get_component<C: Component>(&self, entity: Entity) -> EcsResult<&C> {
        let id = self.owned_component_id::<C>(entity)?;
        self.component_pools
            .get(id.index())
            .and_then(Option::as_ref)
            .and_then(|pool| pool.as_any().downcast_ref::<ComponentPool<C>>())
            .and_then(|pool| pool.get(entity.index()))
            .ok_or_else(|| not_present::<C>(entity))
    }

    /// Gets the component of type `C` owned by an entity, mutably.
    ///
    /// # Errors
    ///
    /// - [`EcsError::UnknownEntity`] if the entity is not alive
    /// - [`EcsError::ComponentNotPresent`] if the entity does not own a `C`
    pub fn get_component_mut<C: Component>(&mut self, entity: Entity) -> EcsResult<&mut C> {
        let id = self.owned_component_id::<C>(entity)?;
        self.component_pools
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .and_then(|pool| pool.as_any_mut().downcast_mut::<ComponentPool<C>>())
            .and_then(|pool| pool.get_mut(entity.index()))
            .ok_or_else(|| not_present::<C>(entity))
    }

    /// Returns the pool holding every `C`, if one has been created.
    ///
    /// Slots of entities that do not own a `C` hold stale or default data.
    #[must_use]
    pub fn pool<C: Component>(&self) -> Option<&ComponentPool<C>> {
        let id = ComponentTypeId::lookup::<C>()?;
        self.component_pools
            .get(id.index())
            .and_then(Option::as_ref)
            .and_then(|pool| pool.as_any().downcast_ref::<ComponentPool<C>>())
    }

    // =========================================================================
    // System management
    // =========================================================================

    /// Registers a system under `S::KIND`.
    ///
    /// Entities that are already active are matched against it (and every
    /// other system) at the next update.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::SystemAlreadyRegistered`] if a system with the same
    /// kind is registered.
    pub fn add_system<S: System>(&mut self, system: S) -> EcsResult<()> {
        if self.systems.contains_key(&S::KIND) {
            tracing::warn!("System {} is already registered", S::KIND);
            return Err(EcsError::SystemAlreadyRegistered(S::KIND));
        }

        let base = system.base().registered();
        self.systems.insert(
            S::KIND,
            SystemEntry {
                system: Box::new(system),
                base,
            },
        );
        let active = self
            .entity_states
            .iter()
            .enumerate()
            .filter(|(_, state)| **state == EntityState::Active)
            .filter_map(|(index, _)| u32::try_from(index).ok().map(Entity::new));
        self.pending_rematch.extend(active);

        tracing::debug!("System {} registered", S::KIND);
        Ok(())
    }

    /// Unregisters the system of type `S` and hands it back.
    ///
    /// # Errors
    ///
    /// - [`EcsError::SystemNotRegistered`] if nothing is registered under `S::KIND`
    /// - [`EcsError::SystemKindConflict`] if the kind belongs to another type
    pub fn remove_system<S: System>(&mut self) -> EcsResult<S> {
        self.entry::<S>()?;
        let entry = self
            .systems
            .remove(&S::KIND)
            .ok_or(EcsError::SystemNotRegistered(S::KIND))?;

        tracing::debug!("System {} removed", S::KIND);
        entry
            .system
            .into_any()
            .downcast::<S>()
            .map(|system| *system)
            .map_err(|_| kind_conflict::<S>())
    }

    /// Checks whether a system of type `S` is registered.
    #[must_use]
    pub fn has_system<S: System>(&self) -> bool {
        self.systems
            .get(&S::KIND)
            .is_some_and(|entry| entry.system.as_any().is::<S>())
    }

    /// Gets the registered system of type `S`.
    ///
    /// # Errors
    ///
    /// - [`EcsError::SystemNotRegistered`] if nothing is registered under `S::KIND`
    /// - [`EcsError::SystemKindConflict`] if the kind belongs to another type
    pub fn get_system<S: System>(&self) -> EcsResult<&S> {
        self.entry::<S>()?
            .system
            .as_any()
            .downcast_ref::<S>()
            .ok_or_else(kind_conflict::<S>)
    }

    /// Gets the registered system of type `S`, mutably.
    ///
    /// Changing the system's own [`SystemBase`] afterwards does not affect
    /// matching; the registry keeps the copy taken at registration.
    ///
    /// # Errors
    ///
    /// - [`EcsError::SystemNotRegistered`] if nothing is registered under `S::KIND`
    /// - [`EcsError::SystemKindConflict`] if the kind belongs to another type
    pub fn get_system_mut<S: System>(&mut self) -> EcsResult<&mut S> {
        self.systems
            .get_mut(&S::KIND)
            .ok_or(EcsError::SystemNotRegistered(S::KIND))?
            .system
            .as_any_mut()
            .downcast_mut::<S>()
            .ok_or_else(kind_conflict::<S>)
    }

    /// Snapshot of the entities matched to system `S`.
    ///
    /// Processing steps iterate this copy while mutating components through
    /// the registry.
    ///
    /// # Errors
    ///
    /// Same as [`get_system`](Self::get_system).
    pub fn system_entities<S: System>(&self) -> EcsResult<Vec<Entity>> {
        Ok(self.system_base::<S>()?.entities().to_vec())
    }

    /// The requirement and matched list the registry maintains for `S`.
    ///
    /// This is the only copy matching writes to, and it changes only inside
    /// [`update`](Self::update).
    ///
    /// # Errors
    ///
    /// Same as [`get_system`](Self::get_system).
    pub fn system_base<S: System>(&self) -> EcsResult<&SystemBase> {
        Ok(&self.entry::<S>()?.base)
    }

    /// Kinds of every system an entity is currently matched to.
    #[must_use]
    pub fn systems_of(&self, entity: Entity) -> Vec<SystemKind> {
        self.systems
            .iter()
            .filter(|(_, entry)| entry.base.contains(entity))
            .map(|(kind, _)| *kind)
            .collect()
    }

    /// Number of registered systems.
    #[inline]
    #[must_use]
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    // =========================================================================
    // Update
    // =========================================================================

    /// Materializes system membership for everything queued since the last call.
    pub fn update(&mut self) -> UpdateStats {
        let mut stats = UpdateStats::default();

        let added = std::mem::take(&mut self.pending_add);
        for &entity in &added {
            if self.state(entity) == EntityState::Pending {
                self.entity_states[entity.index()] = EntityState::Active;
                self.match_entity(entity);
                stats.added += 1;
            }
        }

        let rematch = std::mem::take(&mut self.pending_rematch);
        for entity in rematch {
            if self.state(entity) == EntityState::Active && !added.contains(&entity) {
                self.match_entity(entity);
                stats.rematched += 1;
            }
        }

        let removed = std::mem::take(&mut self.pending_remove);
        for entity in removed {
            if self.state(entity).is_live() {
                self.unmatch_entity(entity);
                self.entity_signatures[entity.index()].reset();
                self.entity_states[entity.index()] = EntityState::Destroyed;
                tracing::debug!("Entity id = {} destroyed", entity);
                stats.removed += 1;
            }
        }

        for entry in self.systems.values_mut() {
            entry.base.compact();
        }

        if !stats.is_idle() {
            tracing::debug!(
                "Registry update: {} added, {} re-matched, {} removed",
                stats.added,
                stats.rematched,
                stats.removed
            );
        }
        stats
    }

    /// Brings an entity's memberships in line with its signature.
    fn match_entity(&mut self, entity: Entity) {
        let signature = self.entity_signatures[entity.index()];
        for (kind, entry) in &mut self.systems {
            let base = &mut entry.base;
            if signature.contains_all(base.signature()) {
                if base.add_entity(entity) {
                    tracing::debug!("Entity id = {} added to system {}", entity, kind);
                }
            } else if base.remove_entity(entity) {
                tracing::debug!("Entity id = {} left system {}", entity, kind);
            }
        }
    }

    /// Strikes an entity from every system.
    fn unmatch_entity(&mut self, entity: Entity) {
        for (kind, entry) in &mut self.systems {
            if entry.base.remove_entity(entity) {
                tracing::debug!("Entity id = {} removed from system {}", entity, kind);
            }
        }
    }

    /// Looks up the entry for `S`, checking the kind belongs to `S`.
    fn entry<S: System>(&self) -> EcsResult<&SystemEntry> {
        let entry = self
            .systems
            .get(&S::KIND)
            .ok_or(EcsError::SystemNotRegistered(S::KIND))?;
        if entry.system.as_any().is::<S>() {
            Ok(entry)
        } else {
            tracing::warn!(
                "System kind {} belongs to {}, not {}",
                S::KIND,
                entry.system.type_name(),
                type_name::<S>()
            );
            Err(kind_conflict::<S>())
        }
    }

    fn state(&self, entity: Entity) -> EntityState {
        self.entity_states
            .get(entity.index())
            .copied()
            .unwrap_or_default()
    }

    fn live_state(&self, entity: Entity) -> EcsResult<EntityState> {
        let state = self.state(entity);
        if state.is_live() {
            Ok(state)
        } else {
            Err(EcsError::UnknownEntity(entity))
        }
    }

    fn owned_component_id<C: Component>(&self, entity: Entity) -> EcsResult<ComponentTypeId> {
        self.live_state(entity)?;
        ComponentTypeId::lookup::<C>()
            .filter(|id| self.entity_signatures[entity.index()].test(*id))
            .ok_or_else(|| not_present::<C>(entity))
    }

    fn pool_or_insert<C: Component>(&mut self, id: ComponentTypeId) -> EcsResult<&mut ComponentPool<C>> {
        if id.index() >= self.component_pools.len() {
            self.component_pools.resize_with(id.index() + 1, || None);
        }

        let initial = self.config.initial_pool_capacity;
        self.component_pools[id.index()]
            .get_or_insert_with(|| Box::new(ComponentPool::<C>::new(initial)))
            .as_any_mut()
            .downcast_mut::<ComponentPool<C>>()
            .ok_or(EcsError::PoolTypeMismatch {
                component: type_name::<C>(),
                id: id.get(),
            })
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        tracing::debug!("Registry destroyed");
    }
}

fn not_present<C>(entity: Entity) -> EcsError {
    EcsError::ComponentNotPresent {
        component: type_name::<C>(),
        entity,
    }
}

fn kind_conflict<S: System>() -> EcsError {
    EcsError::SystemKindConflict {
        kind: S::KIND,
        expected: type_name::<S>(),
    }
}
