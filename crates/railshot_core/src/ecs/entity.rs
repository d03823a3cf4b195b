//! Generational entity handles
//!
//! A handle is a slot index plus the generation the slot had when the handle
//! was issued. Despawning bumps the generation, so old handles stop resolving
//! instead of aliasing whatever reuses the slot.

use std::fmt;

/// Copyable reference to an entity in a [`World`](super::World).
///
/// Pooled gameplay entities are never despawned, so their handles stay valid
/// for the lifetime of the world; only the `Active` tag changes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot in the world's entity table and in every sparse array.
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_by_slot_then_generation() {
        let a = Entity::new(3, 9);
        let b = Entity::new(4, 0);
        assert!(a < b);
        assert!(Entity::new(3, 1) < a);
        assert_eq!(a.to_string(), "3v9");
    }
}
