// storage.rs - Sparse-set component storage
//
// Each component type owns one sparse set: a sparse array indexed by entity
// slot pointing into a dense array of values. Lookups are O(1), iteration
// walks the dense array, and removal swaps the last dense element into the
// hole so the dense arrays stay packed.

use crate::ecs::{Component, Entity};
use std::any::Any;

const EMPTY: u32 = u32::MAX;

/// Storage for every instance of a single component type.
pub struct SparseSet<T> {
    sparse: Vec<u32>,
    dense: Vec<T>,
    entities: Vec<Entity>,
}

impl<T> SparseSet<T> {
    pub fn new() -> Self {
        Self {
            sparse: Vec::new(),
            dense: Vec::new(),
            entities: Vec::new(),
        }
    }

    #[inline]
    fn dense_index(&self, entity: Entity) -> Option<usize> {
        let slot = *self.sparse.get(entity.index() as usize)?;
        if slot == EMPTY {
            return None;
        }
        let slot = slot as usize;
        // Generation check: a recycled slot must not answer for an old handle.
        (self.entities[slot] == entity).then_some(slot)
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.dense_index(entity).is_some()
    }

    /// Insert or overwrite. Returns the previous value if there was one.
    pub fn insert(&mut self, entity: Entity, value: T) -> Option<T> {
        if let Some(slot) = self.dense_index(entity) {
            return Some(std::mem::replace(&mut self.dense[slot], value));
        }

        let idx = entity.index() as usize;
        if idx >= self.sparse.len() {
            self.sparse.resize(idx + 1, EMPTY);
        }
        self.sparse[idx] = self.dense.len() as u32;
        self.dense.push(value);
        self.entities.push(entity);
        None
    }

    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let slot = self.dense_index(entity)?;
        let last = self.dense.len() - 1;
        if slot != last {
            let moved = self.entities[last];
            self.sparse[moved.index() as usize] = slot as u32;
        }
        self.sparse[entity.index() as usize] = EMPTY;
        self.entities.swap_remove(slot);
        Some(self.dense.swap_remove(slot))
    }

    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.dense_index(entity).map(|slot| &self.dense[slot])
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.dense_index(entity).map(move |slot| &mut self.dense[slot])
    }

    /// Entities in dense order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.entities.iter().copied().zip(self.dense.iter())
    }

    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }
}

impl<T> Default for SparseSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased view the world keeps in its storage map.
pub(crate) trait ErasedStorage: Any {
    fn name(&self) -> &'static str;
    fn entities(&self) -> &[Entity];
    fn contains(&self, entity: Entity) -> bool;
    fn remove_entity(&mut self, entity: Entity) -> bool;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ErasedStorage for SparseSet<T> {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn entities(&self) -> &[Entity] {
        SparseSet::entities(self)
    }

    fn contains(&self, entity: Entity) -> bool {
        SparseSet::contains(self, entity)
    }

    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.remove(entity).is_some()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_swaps_last_into_hole() {
        let mut set = SparseSet::new();
        let a = Entity::new(0, 0);
        let b = Entity::new(1, 0);
        let c = Entity::new(5, 0);
        set.insert(a, 'a');
        set.insert(b, 'b');
        set.insert(c, 'c');

        assert_eq!(set.remove(a), Some('a'));
        assert_eq!(set.entities(), &[c, b]);
        assert_eq!(set.get(c), Some(&'c'));
        assert_eq!(set.get(b), Some(&'b'));
        assert!(!set.contains(a));
    }

    #[test]
    fn stale_generation_is_not_found() {
        let mut set = SparseSet::new();
        set.insert(Entity::new(3, 0), 1.0_f32);
        assert!(set.get(Entity::new(3, 1)).is_none());
        assert!(set.remove(Entity::new(3, 1)).is_none());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn insert_overwrites_in_place() {
        let mut set = SparseSet::new();
        let e = Entity::new(2, 0);
        assert_eq!(set.insert(e, 1), None);
        assert_eq!(set.insert(e, 2), Some(1));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(e), Some(&2));
    }
}
