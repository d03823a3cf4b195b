//! Fixed-capacity entity pools.
//!
//! A pool pre-spawns `capacity` entities at startup with every component the
//! kind needs already attached. Liveness is the presence of the [`Active`]
//! tag: activating a slot adds the tag, deactivating removes it, and any
//! untagged member is free for reuse. Members are never despawned, so their
//! handles stay valid for the lifetime of the world.
//!
//! Because a handle outlives any single use of its slot, each member also
//! carries an [`Activation`] serial that changes on every activation. Code
//! that remembers a target across frames keeps the serial with the handle.

use crate::define_component;
use crate::ecs::{Entity, World, WorldError};

/// Liveness tag. Every gameplay query includes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Active;
define_component!(Active, 1, "Active");

/// Counts how many times a pool member has been activated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Activation(pub u32);
define_component!(Activation, 2, "Activation");

/// Activation serial of `entity`, if it is a pool member.
pub fn activation_of(world: &World, entity: Entity) -> Option<u32> {
    world.get::<Activation>(entity).map(|a| a.0)
}

/// A named, fixed set of pre-spawned entities.
#[derive(Debug, Clone)]
pub struct EntityPool {
    label: &'static str,
    // Sorted by entity index for membership lookups.
    members: Vec<Entity>,
}

impl EntityPool {
    /// Spawn `capacity` entities and let `init` attach their components.
    ///
    /// Members start inactive. A zero capacity or a failing `init` is a
    /// startup error.
    pub fn build<F>(
        world: &mut World,
        label: &'static str,
        capacity: usize,
        mut init: F,
    ) -> Result<Self, WorldError>
    where
        F: FnMut(&mut World, Entity) -> Result<(), WorldError>,
    {
        if capacity == 0 {
            return Err(WorldError::ZeroCapacity { pool: label });
        }

        let mut members = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            let entity = world.spawn();
            init(world, entity)?;
            world.set(entity, Activation::default())?;
            members.push(entity);
        }
        members.sort_unstable();

        tracing::debug!(pool = label, capacity, "entity pool allocated");
        Ok(Self { label, members })
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn capacity(&self) -> usize {
        self.members.len()
    }

    pub fn members(&self) -> &[Entity] {
        &self.members
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.members.binary_search(&entity).is_ok()
    }

    /// Tag the first inactive member as [`Active`], bump its [`Activation`]
    /// serial and return it.
    ///
    /// Returns `None` when every member is live; the caller drops the request.
    pub fn activate(&self, world: &mut World) -> Option<Entity> {
        let entity = self
            .members
            .iter()
            .copied()
            .find(|&e| !world.has::<Active>(e))?;
        world.set(entity, Active).ok()?;
        if let Some(serial) = world.get_mut::<Activation>(entity) {
            serial.0 = serial.0.wrapping_add(1);
        }
        Some(entity)
    }

    /// Remove the [`Active`] tag. Returns false for foreign or already-free entities.
    pub fn deactivate(&self, world: &mut World, entity: Entity) -> bool {
        self.contains(entity) && world.remove::<Active>(entity).is_some()
    }

    pub fn active_count(&self, world: &World) -> usize {
        self.members
            .iter()
            .filter(|&&e| world.has::<Active>(e))
            .count()
    }

    /// Return every member to the free set.
    pub fn deactivate_all(&self, world: &mut World) {
        for &entity in &self.members {
            world.remove::<Active>(entity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, Default, PartialEq)]
    struct Slot(u8);
    define_component!(Slot, 200, "Slot");

    fn pool(world: &mut World, capacity: usize) -> EntityPool {
        EntityPool::build(world, "slots", capacity, |w, e| w.set(e, Slot(0))).unwrap()
    }

    #[test]
    fn activation_beyond_capacity_returns_none() {
        let mut world = World::new();
        let pool = pool(&mut world, 3);

        let live: Vec<_> = (0..3).filter_map(|_| pool.activate(&mut world)).collect();
        assert_eq!(live.len(), 3);
        assert!(pool.activate(&mut world).is_none());
        assert_eq!(pool.active_count(&world), 3);
    }

    #[test]
    fn deactivated_slots_are_reused_with_same_handle() {
        let mut world = World::new();
        let pool = pool(&mut world, 2);
        let a = pool.activate(&mut world).unwrap();
        let _b = pool.activate(&mut world).unwrap();

        assert!(pool.deactivate(&mut world, a));
        assert!(!pool.deactivate(&mut world, a));
        assert_eq!(pool.activate(&mut world), Some(a));
        assert!(world.get::<Slot>(a).is_some());
    }

    #[test]
    fn reuse_changes_the_activation_serial() {
        let mut world = World::new();
        let pool = pool(&mut world, 1);
        let a = pool.activate(&mut world).unwrap();
        let first = activation_of(&world, a).unwrap();

        pool.deactivate(&mut world, a);
        assert_eq!(activation_of(&world, a), Some(first));
        assert_eq!(pool.activate(&mut world), Some(a));
        assert_ne!(activation_of(&world, a), Some(first));

        let stranger = world.spawn();
        assert_eq!(activation_of(&world, stranger), None);
    }

    #[test]
    fn foreign_entities_are_not_members() {
        let mut world = World::new();
        let pool = pool(&mut world, 2);
        let stranger = world.spawn();
        world.set(stranger, Active).unwrap();

        assert!(!pool.contains(stranger));
        assert!(!pool.deactivate(&mut world, stranger));
        assert!(world.has::<Active>(stranger));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let mut world = World::new();
        let err = EntityPool::build(&mut world, "empty", 0, |_, _| Ok(())).unwrap_err();
        assert_eq!(err, WorldError::ZeroCapacity { pool: "empty" });
    }

    #[test]
    fn deactivate_all_frees_everything() {
        let mut world = World::new();
        let pool = pool(&mut world, 4);
        while pool.activate(&mut world).is_some() {}
        pool.deactivate_all(&mut world);
        assert_eq!(pool.active_count(&world), 0);
        assert_eq!(world.count::<(Slot, Active)>(), 0);
    }
}
