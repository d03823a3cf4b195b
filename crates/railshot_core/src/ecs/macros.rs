//! Convenience macros for entity spawning

/// Spawn an entity with components attached in order.
///
/// Evaluates to `Result<Entity, WorldError>`; the only failure is a
/// component-id clash, which is a programming error surfaced at startup.
///
/// # Examples
///
/// ```ignore
/// // Single component
/// let entity = spawn!(world, Position { x: 0.0, y: 0.0 })?;
///
/// // Multiple components
/// let entity = spawn!(world,
///     Position { x: 0.0, y: 0.0 },
///     Velocity { x: 1.0, y: 1.0 },
/// )?;
/// ```
#[macro_export]
macro_rules! spawn {
    ($world:expr $(, $component:expr)+ $(,)?) => {{
        let world: &mut $crate::ecs::World = &mut $world;
        let entity = world.spawn();
        (|| -> ::core::result::Result<$crate::ecs::Entity, $crate::ecs::WorldError> {
            $(
                world.set(entity, $component)?;
            )+
            Ok(entity)
        })()
    }};
}
