// world.rs - ECS World with entity management and typed component access

use crate::ecs::storage::{ErasedStorage, SparseSet};
use crate::ecs::{Component, ComponentId, ComponentSet, Entity, QueryIter};
use std::collections::HashMap;
use thiserror::Error;

/// Errors surfaced by structural world operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    #[error("entity {entity} is not alive")]
    DeadEntity { entity: Entity },

    #[error("component id {id} is registered as '{existing}', cannot reuse it for '{requested}'")]
    ComponentIdClash {
        id: ComponentId,
        existing: &'static str,
        requested: &'static str,
    },

    #[error("pool '{pool}' must have a capacity of at least one entity")]
    ZeroCapacity { pool: &'static str },
}

/// The main ECS world: an entity table plus one sparse set per component type.
///
/// There are no archetypes; an entity's "kind" is just the union of the
/// components currently attached to it.
pub struct World {
    generations: Vec<u32>,
    alive: Vec<bool>,
    free: Vec<u32>,
    live: usize,
    storages: HashMap<ComponentId, Box<dyn ErasedStorage>>,
}

impl World {
    /// Create a new empty world.
    pub fn new() -> Self {
        Self {
            generations: Vec::new(),
            alive: Vec::new(),
            free: Vec::new(),
            live: 0,
            storages: HashMap::new(),
        }
    }

    /// Allocate a fresh entity handle with no components.
    ///
    /// Despawned slots are reused with a bumped generation.
    pub fn spawn(&mut self) -> Entity {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = index as usize;
            self.alive[slot] = true;
            return Entity::new(index, self.generations[slot]);
        }

        let index = self.generations.len() as u32;
        self.generations.push(0);
        self.alive.push(true);
        Entity::new(index, 0)
    }

    /// Despawn an entity, dropping all of its components.
    ///
    /// The slot's generation is incremented, invalidating stale handles.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        for storage in self.storages.values_mut() {
            storage.remove_entity(entity);
        }
        let slot = entity.index() as usize;
        self.alive[slot] = false;
        self.generations[slot] = self.generations[slot].wrapping_add(1);
        self.free.push(entity.index());
        self.live -= 1;
        true
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        let slot = entity.index() as usize;
        slot < self.alive.len() && self.alive[slot] && self.generations[slot] == entity.generation()
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.live
    }

    /// Whether the entity currently carries `T`.
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.storages
            .get(&T::ID)
            .is_some_and(|s| s.contains(entity))
    }

    /// Get an immutable reference to a component.
    ///
    /// Returns None if the entity is dead or doesn't have the component;
    /// callers treat that as "skip".
    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.storage::<T>()?.get(entity)
    }

    /// Get a mutable reference to a component.
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.storage_mut::<T>()?.get_mut(entity)
    }

    /// Insert or overwrite a component value.
    pub fn set<T: Component>(&mut self, entity: Entity, value: T) -> Result<(), WorldError> {
        if !self.is_alive(entity) {
            return Err(WorldError::DeadEntity { entity });
        }
        self.storage_or_insert::<T>()?.insert(entity, value);
        Ok(())
    }

    /// Attach `T::default()` unless the entity already carries `T`.
    pub fn add<T: Component + Default>(&mut self, entity: Entity) -> Result<(), WorldError> {
        if self.has::<T>(entity) {
            return Ok(());
        }
        self.set(entity, T::default())
    }

    /// Detach a component, returning its last value.
    pub fn remove<T: Component>(&mut self, entity: Entity) -> Option<T> {
        self.storage_mut::<T>()?.remove(entity)
    }

    /// Iterate handles carrying every component in `Q`.
    pub fn query<Q: ComponentSet>(&self) -> QueryIter<'_, Q> {
        QueryIter::new(self)
    }

    /// Collect matching handles into a caller-owned buffer (cleared first).
    ///
    /// Systems keep one scratch `Vec` per frame driver so steady-state
    /// queries do not allocate.
    pub fn query_into<Q: ComponentSet>(&self, out: &mut Vec<Entity>) {
        out.clear();
        out.extend(self.query::<Q>());
    }

    /// Count handles carrying every component in `Q`.
    pub fn count<Q: ComponentSet>(&self) -> usize {
        self.query::<Q>().count()
    }

    pub(crate) fn storage<T: Component>(&self) -> Option<&SparseSet<T>> {
        self.storages.get(&T::ID)?.as_any().downcast_ref()
    }

    fn storage_mut<T: Component>(&mut self) -> Option<&mut SparseSet<T>> {
        self.storages.get_mut(&T::ID)?.as_any_mut().downcast_mut()
    }

    fn storage_or_insert<T: Component>(&mut self) -> Result<&mut SparseSet<T>, WorldError> {
        let storage = self
            .storages
            .entry(T::ID)
            .or_insert_with(|| Box::new(SparseSet::<T>::new()));
        let existing = storage.name();
        storage
            .as_any_mut()
            .downcast_mut()
            .ok_or(WorldError::ComponentIdClash {
                id: T::ID,
                existing,
                requested: T::NAME,
            })
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
