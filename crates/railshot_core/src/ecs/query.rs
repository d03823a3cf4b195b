// query.rs - Component-set queries
//
// A query walks the dense entity list of its FIRST component and keeps the
// entities that also carry every other listed component. Iteration order is
// therefore the dense order of the lead component, which is stable within a
// frame as long as nobody adds or removes that component mid-iteration.

use crate::ecs::{Component, Entity, World};

/// A tuple of component types that an entity must carry to match a query.
pub trait ComponentSet {
    /// Dense entity list of the lead component, or `None` if no entity has it yet.
    fn lead(world: &World) -> Option<&[Entity]>;

    /// Whether `entity` carries every component in the set.
    fn matches(world: &World, entity: Entity) -> bool;
}

macro_rules! impl_component_set {
    ($lead:ident $(, $rest:ident)*) => {
        impl<$lead: Component $(, $rest: Component)*> ComponentSet for ($lead, $($rest,)*) {
            #[inline]
            fn lead(world: &World) -> Option<&[Entity]> {
                world.storage::<$lead>().map(|s| s.entities())
            }

            #[inline]
            fn matches(world: &World, entity: Entity) -> bool {
                world.has::<$lead>(entity) $(&& world.has::<$rest>(entity))*
            }
        }
    };
}

impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
impl_component_set!(A, B, C, D, E);
impl_component_set!(A, B, C, D, E, F);

/// Iterator over the handles matching a [`ComponentSet`].
pub struct QueryIter<'w, Q> {
    world: &'w World,
    lead: std::slice::Iter<'w, Entity>,
    _set: std::marker::PhantomData<Q>,
}

impl<'w, Q: ComponentSet> QueryIter<'w, Q> {
    pub(crate) fn new(world: &'w World) -> Self {
        Self {
            world,
            lead: Q::lead(world).unwrap_or(&[]).iter(),
            _set: std::marker::PhantomData,
        }
    }
}

impl<'w, Q: ComponentSet> Iterator for QueryIter<'w, Q> {
    type Item = Entity;

    fn next(&mut self) -> Option<Entity> {
        let world = self.world;
        self.lead.by_ref().copied().find(|&e| Q::matches(world, e))
    }
}
