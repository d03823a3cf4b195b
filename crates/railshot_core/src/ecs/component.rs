// component.rs - Component identity
//
// Components are identified by u32 IDs, not Rust TypeIds, so storage lookup
// and log output stay stable across builds.

use std::any::Any;

pub type ComponentId = u32;

/// Trait for plain-data components stored in the world.
///
/// Implementors should be small `Copy` structs (or unit tags). Systems copy a
/// component out, compute, and write it back; nothing holds a borrow across
/// system boundaries.
pub trait Component: Any + Sized {
    /// Globally unique component ID.
    const ID: ComponentId;

    /// Human-readable name for debugging.
    const NAME: &'static str;
}

/// Helper macro to implement Component trait.
///
/// # Example
/// ```ignore
/// #[derive(Clone, Copy)]
/// struct Position { x: f32, y: f32 }
///
/// define_component!(Position, 1, "Position");
/// ```
#[macro_export]
macro_rules! define_component {
    ($ty:ty, $id:expr, $name:expr) => {
        impl $crate::ecs::Component for $ty {
            const ID: $crate::ecs::ComponentId = $id;
            const NAME: &'static str = $name;
        }
    };
}
