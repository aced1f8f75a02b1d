//! Registry behavior tests: matching, deferral, re-matching and removal.

use super::*;
use crate::config::RegistryConfig;
use crate::error::EcsError;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Position {
    x: f32,
    y: f32,
}
impl Component for Position {}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Velocity {
    dx: f32,
    dy: f32,
}
impl Component for Velocity {}

#[derive(Default)]
struct A;
impl Component for A {}
#[derive(Default)]
struct B;
impl Component for B {}
#[derive(Default)]
struct C;
impl Component for C {}
#[derive(Default)]
struct D;
impl Component for D {}
#[derive(Default)]
struct E;
impl Component for E {}

/// Requires `Position` only.
struct Locator {
    base: SystemBase,
}

impl Locator {
    fn new() -> Self {
        Self {
            base: SystemBase::new().require::<Position>().unwrap(),
        }
    }
}

impl System for Locator {
    const KIND: SystemKind = SystemKind::new("locator");

    fn base(&self) -> &SystemBase {
        &self.base
    }
}

/// Requires `Position` and `Velocity`.
struct Mover {
    base: SystemBase,
}

impl Mover {
    fn new() -> Self {
        Self {
            base: SystemBase::new()
                .require::<Position>()
                .and_then(SystemBase::require::<Velocity>)
                .unwrap(),
        }
    }

    fn step(registry: &mut Registry, dt: f32) -> crate::EcsResult<()> {
        for entity in registry.system_entities::<Self>()? {
            let velocity = *registry.get_component::<Velocity>(entity)?;
            let position = registry.get_component_mut::<Position>(entity)?;
            position.x += velocity.dx * dt;
            position.y += velocity.dy * dt;
        }
        Ok(())
    }
}

impl System for Mover {
    const KIND: SystemKind = SystemKind::new("mover");

    fn base(&self) -> &SystemBase {
        &self.base
    }
}

/// Built with an arbitrary requirement at runtime.
struct Probe {
    base: SystemBase,
}

impl System for Probe {
    const KIND: SystemKind = SystemKind::new("probe");

    fn base(&self) -> &SystemBase {
        &self.base
    }
}

/// Shares its kind with `Locator`.
struct Impostor {
    base: SystemBase,
}

impl System for Impostor {
    const KIND: SystemKind = SystemKind::new("locator");

    fn base(&self) -> &SystemBase {
        &self.base
    }
}

fn attach_by_mask(registry: &mut Registry, entity: Entity, mask: u32) {
    if mask & 0b00001 != 0 {
        registry.attach_component(entity, A).unwrap();
    }
    if mask & 0b00010 != 0 {
        registry.attach_component(entity, B).unwrap();
    }
    if mask & 0b00100 != 0 {
        registry.attach_component(entity, C).unwrap();
    }
    if mask & 0b01000 != 0 {
        registry.attach_component(entity, D).unwrap();
    }
    if mask & 0b10000 != 0 {
        registry.attach_component(entity, E).unwrap();
    }
}

fn require_by_mask(mask: u32) -> SystemBase {
    let mut base = SystemBase::new();
    if mask & 0b00001 != 0 {
        base.require_component::<A>().unwrap();
    }
    if mask & 0b00010 != 0 {
        base.require_component::<B>().unwrap();
    }
    if mask & 0b00100 != 0 {
        base.require_component::<C>().unwrap();
    }
    if mask & 0b01000 != 0 {
        base.require_component::<D>().unwrap();
    }
    if mask & 0b10000 != 0 {
        base.require_component::<E>().unwrap();
    }
    base
}

#[test]
fn test_end_to_end_scenario() {
    let mut registry = Registry::new();

    let e1 = registry.create_entity().unwrap();
    registry
        .attach_component(e1, Position { x: 10.0, y: 30.0 })
        .unwrap();
    registry.add_system(Locator::new()).unwrap();

    registry.update();
    assert_eq!(registry.system_base::<Locator>().unwrap().entities(), &[e1]);

    let e2 = registry.create_entity().unwrap();
    registry.update();
    assert_eq!(registry.system_base::<Locator>().unwrap().entities(), &[e1]);
    assert!(registry.is_alive(e2));

    let position = registry.get_component::<Position>(e1).unwrap();
    assert!((position.x - 10.0).abs() < f32::EPSILON);
    assert!((position.y - 30.0).abs() < f32::EPSILON);
}

#[test]
fn test_entity_ids_start_at_one() {
    let mut registry = Registry::new();
    let first = registry.create_entity().unwrap();
    let second = registry.create_entity().unwrap();
    assert_eq!(first.id(), 1);
    assert_eq!(second.id(), 2);
    assert_eq!(registry.entity_count(), 2);
    assert_eq!(registry.pending_additions(), 2);
}

#[test]
fn test_deferred_visibility() {
    let mut registry = Registry::new();
    registry.add_system(Locator::new()).unwrap();
    registry.add_system(Mover::new()).unwrap();

    let entity = registry.create_entity().unwrap();
    registry.attach_component(entity, Position::default()).unwrap();
    registry.attach_component(entity, Velocity::default()).unwrap();

    assert!(registry.system_base::<Locator>().unwrap().entities().is_empty());
    assert!(registry.system_base::<Mover>().unwrap().entities().is_empty());

    let stats = registry.update();
    assert_eq!(stats.added, 1);
    assert_eq!(registry.pending_additions(), 0);
    assert_eq!(registry.system_base::<Locator>().unwrap().entities(), &[entity]);
    assert_eq!(registry.system_base::<Mover>().unwrap().entities(), &[entity]);

    // A second update must not duplicate anything.
    assert!(registry.update().is_idle());
    assert_eq!(registry.system_base::<Locator>().unwrap().entities(), &[entity]);
}

#[test]
fn test_matching_is_subset_law() {
    for required in 0..32u32 {
        let mut registry = Registry::new();
        registry
            .add_system(Probe {
                base: require_by_mask(required),
            })
            .unwrap();

        let mut expected = Vec::new();
        for owned in 0..32u32 {
            let entity = registry.create_entity().unwrap();
            attach_by_mask(&mut registry, entity, owned);
            if owned & required == required {
                expected.push(entity);
            }
        }
        registry.update();

        let matched = registry.system_base::<Probe>().unwrap().entities();
        assert_eq!(matched, expected.as_slice(), "required mask {required:05b}");
        match required {
            0 => assert_eq!(matched.len(), 32),
            0b1_1111 => assert_eq!(matched.len(), 1),
            _ => {}
        }
    }
}

#[test]
fn test_pool_growth_keeps_other_entities() {
    let mut registry = Registry::with_config(RegistryConfig {
        initial_pool_capacity: 1,
        ..RegistryConfig::default()
    });

    let first = registry.create_entity().unwrap();
    registry
        .attach_component(first, Position { x: 1.0, y: 2.0 })
        .unwrap();

    let mut last = first;
    for _ in 0..500 {
        last = registry.create_entity().unwrap();
    }
    registry
        .attach_component(last, Position { x: 3.0, y: 4.0 })
        .unwrap();

    assert!(registry.pool::<Position>().unwrap().as_slice().len() > last.index());
    assert_eq!(
        registry.get_component::<Position>(first).unwrap(),
        &Position { x: 1.0, y: 2.0 }
    );
    assert_eq!(
        registry.get_component::<Position>(last).unwrap(),
        &Position { x: 3.0, y: 4.0 }
    );
}

#[test]
fn test_detach_keeps_membership_until_update() {
    let mut registry = Registry::new();
    registry.add_system(Mover::new()).unwrap();

    let entity = registry.create_entity().unwrap();
    registry.attach_component(entity, Position::default()).unwrap();
    registry.attach_component(entity, Velocity::default()).unwrap();
    registry.update();

    registry.detach_component::<Velocity>(entity).unwrap();
    assert!(!registry.has_component::<Velocity>(entity));
    assert_eq!(registry.system_base::<Mover>().unwrap().entities(), &[entity]);

    let stats = registry.update();
    assert_eq!(stats.rematched, 1);
    assert!(registry.system_base::<Mover>().unwrap().entities().is_empty());
}

#[test]
fn test_detach_then_reattach_within_one_cycle() {
    let mut registry = Registry::new();
    registry.add_system(Mover::new()).unwrap();

    let entity = registry.create_entity().unwrap();
    registry.attach_component(entity, Position::default()).unwrap();
    registry.attach_component(entity, Velocity::default()).unwrap();
    registry.update();

    registry.detach_component::<Velocity>(entity).unwrap();
    registry
        .attach_component(entity, Velocity { dx: 3.0, dy: 0.0 })
        .unwrap();

    let stats = registry.update();
    assert_eq!(stats.rematched, 1);
    assert_eq!(registry.system_base::<Mover>().unwrap().entities(), &[entity]);
    assert_eq!(registry.systems_of(entity), vec![Mover::KIND]);

    // Same cycle again, but starting from a detached state.
    registry.detach_component::<Velocity>(entity).unwrap();
    registry.update();
    assert!(registry.system_base::<Mover>().unwrap().entities().is_empty());

    registry.attach_component(entity, Velocity::default()).unwrap();
    registry.detach_component::<Velocity>(entity).unwrap();
    registry.attach_component(entity, Velocity::default()).unwrap();
    registry.update();
    assert_eq!(registry.system_base::<Mover>().unwrap().entities(), &[entity]);
}

#[test]
fn test_attach_on_active_entity_rematches() {
    let mut registry = Registry::new();
    registry.add_system(Locator::new()).unwrap();
    registry.add_system(Mover::new()).unwrap();

    let entity = registry.create_entity().unwrap();
    registry.attach_component(entity, Position::default()).unwrap();
    registry.update();
    assert_eq!(registry.systems_of(entity), vec![Locator::KIND]);

    registry.attach_component(entity, Velocity::default()).unwrap();
    assert!(registry.system_base::<Mover>().unwrap().entities().is_empty());

    registry.update();
    assert_eq!(registry.system_base::<Mover>().unwrap().entities(), &[entity]);
    assert_eq!(registry.system_base::<Locator>().unwrap().entities(), &[entity]);
    assert_eq!(registry.systems_of(entity), vec![Locator::KIND, Mover::KIND]);
}

#[test]
fn test_deferred_removal() {
    let mut registry = Registry::new();
    registry.add_system(Locator::new()).unwrap();

    let keep = registry.create_entity().unwrap();
    let doomed = registry.create_entity().unwrap();
    registry.attach_component(keep, Position::default()).unwrap();
    registry.attach_component(doomed, Position::default()).unwrap();
    registry.update();

    registry.destroy_entity(doomed).unwrap();
    registry.destroy_entity(doomed).unwrap();
    assert_eq!(registry.pending_removals(), 1);
    assert_eq!(
        registry.system_base::<Locator>().unwrap().entities(),
        &[keep, doomed]
    );
    assert!(registry.has_component::<Position>(doomed));

    let stats = registry.update();
    assert_eq!(stats.removed, 1);
    assert_eq!(registry.system_base::<Locator>().unwrap().entities(), &[keep]);
    assert!(!registry.is_alive(doomed));
    assert_eq!(registry.signature(doomed), None);
    assert!(!registry.has_component::<Position>(doomed));
    assert_eq!(
        registry.attach_component(doomed, Position::default()),
        Err(EcsError::UnknownEntity(doomed))
    );
    assert_eq!(
        registry.destroy_entity(doomed),
        Err(EcsError::UnknownEntity(doomed))
    );
}

#[test]
fn test_create_and_destroy_before_update() {
    let mut registry = Registry::new();
    registry.add_system(Locator::new()).unwrap();

    let entity = registry.create_entity().unwrap();
    registry.attach_component(entity, Position::default()).unwrap();
    registry.destroy_entity(entity).unwrap();

    let stats = registry.update();
    assert_eq!(stats.added, 1);
    assert_eq!(stats.removed, 1);
    assert!(registry.system_base::<Locator>().unwrap().entities().is_empty());
}

#[test]
fn test_system_added_later_is_backfilled() {
    let mut registry = Registry::new();
    let entity = registry.create_entity().unwrap();
    registry.attach_component(entity, Position::default()).unwrap();
    registry.update();

    registry.add_system(Locator::new()).unwrap();
    assert!(registry.system_base::<Locator>().unwrap().entities().is_empty());

    registry.update();
    assert_eq!(registry.system_base::<Locator>().unwrap().entities(), &[entity]);
}

#[test]
fn test_component_access_errors() {
    let mut registry = Registry::new();
    let entity = registry.create_entity().unwrap();

    assert!(matches!(
        registry.get_component::<Velocity>(entity),
        Err(EcsError::ComponentNotPresent { entity: e, .. }) if e == entity
    ));

    registry.attach_component(entity, Velocity { dx: 1.0, dy: 0.0 }).unwrap();
    registry.detach_component::<Velocity>(entity).unwrap();
    // The slot still holds the old value, but it is no longer readable.
    assert!(registry.get_component::<Velocity>(entity).is_err());
    assert!(registry.get_component_mut::<Velocity>(entity).is_err());

    // Detaching again, or detaching a type never attached, is a no-op.
    registry.detach_component::<Velocity>(entity).unwrap();
    registry.detach_component::<Position>(entity).unwrap();

    let ghost = Entity::new(99);
    assert_eq!(
        registry.get_component::<Velocity>(ghost),
        Err(EcsError::UnknownEntity(ghost))
    );
    assert!(!registry.has_component::<Velocity>(ghost));
    assert_eq!(
        registry.attach_component(Entity::new(0), Velocity::default()),
        Err(EcsError::UnknownEntity(Entity::new(0)))
    );
}

#[test]
fn test_reattach_overwrites() {
    let mut registry = Registry::new();
    let entity = registry.create_entity().unwrap();
    registry
        .attach_component(entity, Position { x: 1.0, y: 1.0 })
        .unwrap();
    registry
        .attach_component(entity, Position { x: 5.0, y: 6.0 })
        .unwrap();

    let position = registry.get_component::<Position>(entity).unwrap();
    assert!((position.x - 5.0).abs() < f32::EPSILON);
    assert!((position.y - 6.0).abs() < f32::EPSILON);
}

#[test]
fn test_processing_step_mutates_components() {
    let mut registry = Registry::new();
    registry.add_system(Mover::new()).unwrap();

    let entity = registry.create_entity().unwrap();
    registry.attach_component(entity, Position::default()).unwrap();
    registry
        .attach_component(entity, Velocity { dx: 2.0, dy: -1.0 })
        .unwrap();
    registry.update();

    Mover::step(&mut registry, 0.5).unwrap();
    Mover::step(&mut registry, 0.5).unwrap();

    let position = registry.get_component::<Position>(entity).unwrap();
    assert!((position.x - 2.0).abs() < f32::EPSILON);
    assert!((position.y + 1.0).abs() < f32::EPSILON);
}

#[test]
fn test_system_lifecycle() {
    let mut registry = Registry::new();
    assert!(!registry.has_system::<Locator>());
    assert_eq!(
        registry.get_system::<Locator>().err(),
        Some(EcsError::SystemNotRegistered(Locator::KIND))
    );

    registry.add_system(Locator::new()).unwrap();
    assert!(registry.has_system::<Locator>());
    assert_eq!(registry.system_count(), 1);
    assert_eq!(
        registry.add_system(Locator::new()),
        Err(EcsError::SystemAlreadyRegistered(Locator::KIND))
    );

    let entity = registry.create_entity().unwrap();
    registry.attach_component(entity, Position::default()).unwrap();
    registry.update();

    assert_eq!(registry.system_entities::<Locator>().unwrap(), vec![entity]);
    let removed = registry.remove_system::<Locator>().unwrap();
    assert_eq!(removed.signature(), Locator::new().signature());
    assert!(registry.systems_of(entity).is_empty());
    assert!(!registry.has_system::<Locator>());
    assert!(registry.remove_system::<Locator>().is_err());
    assert_eq!(registry.system_count(), 0);
}

#[test]
fn test_system_kind_conflict() {
    let mut registry = Registry::new();
    registry.add_system(Locator::new()).unwrap();

    assert!(!registry.has_system::<Impostor>());
    assert!(matches!(
        registry.get_system::<Impostor>(),
        Err(EcsError::SystemKindConflict { .. })
    ));
    assert!(matches!(
        registry.get_system_mut::<Impostor>(),
        Err(EcsError::SystemKindConflict { .. })
    ));
    assert!(registry.remove_system::<Impostor>().is_err());
    assert!(registry.has_system::<Locator>());

    assert_eq!(
        registry.add_system(Impostor {
            base: SystemBase::new()
        }),
        Err(EcsError::SystemAlreadyRegistered(Locator::KIND))
    );
}

#[test]
fn test_entity_limit() {
    let mut registry = Registry::with_config(RegistryConfig {
        max_entities: 2,
        ..RegistryConfig::default()
    });
    registry.create_entity().unwrap();
    registry.create_entity().unwrap();
    assert_eq!(
        registry.create_entity(),
        Err(EcsError::EntityLimitReached { limit: 2 })
    );
    assert_eq!(registry.entity_count(), 2);
}

#[test]
fn test_large_batch_update_matches_each_entity_once() {
    const COUNT: u32 = 20_000;
    let mut registry = Registry::new();
    registry.add_system(Locator::new()).unwrap();

    let entities: Vec<Entity> = (0..COUNT)
        .map(|_| {
            let entity = registry.create_entity().unwrap();
            registry.attach_component(entity, Position::default()).unwrap();
            entity
        })
        .collect();
    assert_eq!(registry.update().added, COUNT as usize);

    // Re-queue every entity for matching; nothing may be appended twice.
    for &entity in &entities {
        registry.attach_component(entity, Position::default()).unwrap();
    }
    assert_eq!(registry.update().rematched, COUNT as usize);
    assert_eq!(registry.system_base::<Locator>().unwrap().entities(), entities.as_slice());

    // Drop every other entity in one pass; order of the rest is kept.
    for entity in entities.iter().step_by(2) {
        registry.destroy_entity(*entity).unwrap();
    }
    assert_eq!(registry.update().removed, (COUNT / 2) as usize);
    let survivors: Vec<Entity> = entities.iter().skip(1).step_by(2).copied().collect();
    assert_eq!(registry.system_entities::<Locator>().unwrap(), survivors);
}

#[test]
fn test_membership_changes_only_inside_update() {
    let mut registry = Registry::new();
    registry.add_system(Locator::new()).unwrap();

    let entity = registry.create_entity().unwrap();
    registry.attach_component(entity, Position::default()).unwrap();
    registry.update();

    // Tightening the system's own requirement after registration does not
    // change what the registry matches against.
    let locator = registry.get_system_mut::<Locator>().unwrap();
    locator.base.require_component::<Velocity>().unwrap();
    locator.base = SystemBase::new().require::<A>().unwrap();
    assert_eq!(registry.system_base::<Locator>().unwrap().entities(), &[entity]);

    registry.update();
    let base = registry.system_base::<Locator>().unwrap();
    assert_eq!(base.entities(), &[entity]);
    assert_eq!(base.signature(), Locator::new().signature());
    assert!(registry
        .signature(entity)
        .unwrap()
        .contains_all(base.signature()));
}
