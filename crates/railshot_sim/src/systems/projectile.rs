//! Player shots: volley launch and flight resolution.

use super::explosion::spawn_explosion;
use super::SystemContext;
use crate::beat::BeatSignal;
use crate::components::{Enemy, Position, Projectile};
use crate::session::GameEvent;
use railshot_core::ecs::Entity;
use railshot_core::math::Vec3;
use railshot_core::pool::{activation_of, Active};
use tracing::{debug, trace};

/// Distances below this are treated as this for the progress step.
const MIN_FLIGHT: f32 = 0.1;

/// Launch one projectile per live target from `origin`.
///
/// Each shot aims at where its target is right now and does not track it.
/// Dead targets are skipped; an exhausted pool drops the rest of the volley.
pub fn fire_projectiles(
    ctx: &mut SystemContext,
    origin: Vec3,
    targets: &[Entity],
    speed: f32,
) -> usize {
    let mut fired = 0;
    for &target in targets {
        if !ctx.world.has::<Active>(target) {
            continue;
        }
        let Some(&Position(aim)) = ctx.world.get::<Position>(target) else {
            continue;
        };
        let Some(serial) = activation_of(ctx.world, target) else {
            continue;
        };
        let Some(shot) = ctx.pools.projectiles.activate(ctx.world) else {
            debug!(dropped = targets.len() - fired, "projectile pool exhausted");
            break;
        };
        let projectile = Projectile {
            start: origin,
            target: aim,
            target_entity: Some(target),
            target_activation: serial,
            progress: 0.0,
            speed,
        };
        let launched = ctx
            .world
            .set(shot, projectile)
            .and_then(|_| ctx.world.set(shot, Position(origin)));
        if launched.is_err() {
            break;
        }
        fired += 1;
    }
    fired
}

/// Advance every live projectile and resolve the ones that arrive.
///
/// An arrival on the enemy the shot was fired at costs it one health and
/// reports a hit; at zero health the enemy bursts and returns to its pool.
/// If that enemy has since been pooled, even if its slot now holds a fresh
/// enemy, the arrival does nothing beyond freeing the shot.
/// Returns the number of enemies destroyed.
pub fn projectile_system(
    ctx: &mut SystemContext,
    beat: &mut dyn BeatSignal,
    burst_size: usize,
) -> usize {
    let delta = ctx.delta;
    ctx.world.query_into::<(Projectile, Position, Active)>(ctx.scratch);

    // Fly everything, keeping only the arrivals in the scratch list. Hits
    // spawn particles, which needs the context again.
    let world = &mut *ctx.world;
    ctx.scratch.retain(|&entity| {
        let Some(shot) = world.get_mut::<Projectile>(entity) else {
            return false;
        };
        let distance = shot.start.distance(shot.target).max(MIN_FLIGHT);
        shot.progress = (shot.progress + shot.speed * delta / distance).min(1.0);
        let (progress, at) = (shot.progress, shot.start.lerp(shot.target, shot.progress));
        if let Some(pos) = world.get_mut::<Position>(entity) {
            pos.0 = at;
        }
        progress >= 1.0
    });

    let mut kills = 0;
    for i in 0..ctx.scratch.len() {
        let shot = ctx.scratch[i];
        let aimed_at = ctx
            .world
            .get::<Projectile>(shot)
            .and_then(|p| p.target_entity.map(|t| (t, p.target_activation)));
        if let Some((target, serial)) = aimed_at {
            if resolve_hit(ctx, beat, target, serial, burst_size) {
                kills += 1;
            }
        }
        ctx.pools.deactivate(ctx.world, shot);
    }
    kills
}

fn resolve_hit(
    ctx: &mut SystemContext,
    beat: &mut dyn BeatSignal,
    target: Entity,
    serial: u32,
    burst_size: usize,
) -> bool {
    if !ctx.world.has::<Active>(target) || activation_of(ctx.world, target) != Some(serial) {
        trace!(%target, "projectile arrived on a pooled target");
        return false;
    }
    let Some(enemy) = ctx.world.get_mut::<Enemy>(target) else {
        return false;
    };
    enemy.health -= 1;
    let (health, kind) = (enemy.health, enemy.kind);

    let on_beat = beat.on_beat(ctx.now);
    ctx.outbox.push(GameEvent::Hit {
        entity: target,
        on_beat,
    });

    if health <= 0 {
        let at = ctx
            .world
            .get::<Position>(target)
            .map(|p| p.0)
            .unwrap_or_default();
        spawn_explosion(ctx, at, kind.profile().color, burst_size);
        ctx.pools.deactivate(ctx.world, target);
        debug!(%target, kind = kind.name(), "enemy destroyed");
    }
    health <= 0
}
