use super::SystemContext;
use crate::components::{Enemy, Position};
use railshot_core::pool::Active;
use tracing::trace;

/// Pool enemies that have fallen more than `distance` behind the player.
///
/// Runs before lock-on so a passed enemy never stays a lock candidate.
pub fn despawn_system(ctx: &mut SystemContext, player_z: f32, distance: f32) -> usize {
    ctx.world.query_into::<(Position, Enemy, Active)>(ctx.scratch);
    let mut pooled = 0;
    for &entity in ctx.scratch.iter() {
        let behind = ctx
            .world
            .get::<Position>(entity)
            .is_some_and(|p| p.0.z > player_z + distance);
        if behind && ctx.pools.deactivate(ctx.world, entity) {
            trace!(%entity, "enemy passed the player");
            pooled += 1;
        }
    }
    pooled
}
