//! Enemy return fire.

use super::SystemContext;
use crate::components::{CanShoot, Enemy, EnemyProjectile, Position};
use crate::session::GameEvent;
use railshot_core::math::Vec3;
use railshot_core::pool::Active;
use tracing::trace;

/// Damage every enemy shot carries.
pub const ENEMY_SHOT_DAMAGE: u32 = 10;
/// Fraction of the path covered per second per unit of speed.
const FLIGHT_RATE: f32 = 0.02;
/// Aim lead along z as a fraction of the firing distance.
const LEAD: f32 = 0.02;

/// Let shooters that are ahead of the player, in range and off cooldown
/// roll for a shot. Returns how many shots were fired.
pub fn enemy_shoot_system(
    ctx: &mut SystemContext,
    player: Vec3,
    shoot_range: f32,
    projectile_speed: f32,
) -> usize {
    let now = ctx.now;
    ctx.world.query_into::<(Position, Enemy, Active, CanShoot)>(ctx.scratch);
    let mut fired = 0;

    for &entity in ctx.scratch.iter() {
        let Some(&Position(pos)) = ctx.world.get::<Position>(entity) else {
            continue;
        };
        let distance = pos.distance(player);
        if distance > shoot_range || pos.z > player.z {
            continue;
        }
        let Some(gun) = ctx.world.get_mut::<CanShoot>(entity) else {
            continue;
        };
        if now - gun.last_shot_time < gun.cooldown {
            continue;
        }
        if !ctx.rng.chance(gun.chance) {
            continue;
        }
        // The cooldown restarts even if the pool has no shot to give.
        gun.last_shot_time = now;

        let Some(shot) = ctx.pools.enemy_projectiles.activate(ctx.world) else {
            trace!(%entity, "enemy projectile pool exhausted");
            continue;
        };
        let target = Vec3::new(
            player.x + ctx.rng.signed(1.0),
            player.y + ctx.rng.signed(1.0),
            player.z + distance * LEAD,
        );
        let projectile = EnemyProjectile {
            start: pos,
            target,
            progress: 0.0,
            speed: projectile_speed,
            damage: ENEMY_SHOT_DAMAGE,
        };
        let launched = ctx
            .world
            .set(shot, projectile)
            .and_then(|_| ctx.world.set(shot, Position(pos)));
        if launched.is_ok() {
            fired += 1;
        }
    }
    fired
}

/// Fly enemy shots toward their aim point. A shot that passes within
/// `hit_radius` of the player reports a hit; one that reaches its aim point
/// without doing so simply disappears.
pub fn enemy_projectile_system(ctx: &mut SystemContext, player: Vec3, hit_radius: f32) -> usize {
    let delta = ctx.delta;
    ctx.world.query_into::<(EnemyProjectile, Position, Active)>(ctx.scratch);
    let mut hits = 0;

    for &entity in ctx.scratch.iter() {
        let Some(shot) = ctx.world.get_mut::<EnemyProjectile>(entity) else {
            continue;
        };
        shot.progress += delta * shot.speed * FLIGHT_RATE;
        if shot.progress >= 1.0 {
            ctx.pools.deactivate(ctx.world, entity);
            continue;
        }
        let (at, damage) = (shot.start.lerp(shot.target, shot.progress), shot.damage);

        if at.distance(player) < hit_radius {
            ctx.outbox.push(GameEvent::PlayerHit { damage });
            ctx.pools.deactivate(ctx.world, entity);
            hits += 1;
        } else if let Some(pos) = ctx.world.get_mut::<Position>(entity) {
            pos.0 = at;
        }
    }
    hits
}
