//! Cosmetic particle bursts.

use super::SystemContext;
use crate::components::{ExplosionParticle, Position, Rgb};
use railshot_core::math::Vec3;
use railshot_core::pool::Active;

/// Per-tick velocity retention.
const DRAG: f32 = 0.95;

/// Activate up to `count` particles at `at`. Stops quietly when the particle
/// pool runs dry and returns how many were placed.
pub fn spawn_explosion(ctx: &mut SystemContext, at: Vec3, color: Rgb, count: usize) -> usize {
    let mut placed = 0;
    for _ in 0..count {
        let Some(entity) = ctx.pools.particles.activate(ctx.world) else {
            break;
        };
        let speed = ctx.rng.range(5.0, 15.0);
        let particle = ExplosionParticle {
            start_time: ctx.now,
            lifetime: ctx.rng.range(0.4, 0.6),
            velocity: ctx.rng.unit_sphere() * speed,
            color,
            scale: ctx.rng.range(0.2, 0.4),
        };
        let placed_ok = ctx
            .world
            .set(entity, particle)
            .and_then(|_| ctx.world.set(entity, Position(at)));
        if placed_ok.is_err() {
            break;
        }
        placed += 1;
    }
    placed
}

/// Age particles, move them and bleed off speed; pool expired ones.
pub fn explosion_system(ctx: &mut SystemContext) {
    let (now, delta) = (ctx.now, ctx.delta);
    ctx.world.query_into::<(ExplosionParticle, Position, Active)>(ctx.scratch);
    for &entity in ctx.scratch.iter() {
        let Some(particle) = ctx.world.get_mut::<ExplosionParticle>(entity) else {
            continue;
        };
        if now - particle.start_time >= particle.lifetime {
            ctx.pools.deactivate(ctx.world, entity);
            continue;
        }
        let step = particle.velocity * delta;
        particle.velocity *= DRAG;
        if let Some(pos) = ctx.world.get_mut::<Position>(entity) {
            pos.0 += step;
        }
    }
}

/// Normalized age in `[0, 1]`.
pub fn particle_progress(particle: &ExplosionParticle, now: f32) -> f32 {
    if particle.lifetime <= 0.0 {
        return 1.0;
    }
    ((now - particle.start_time) / particle.lifetime).clamp(0.0, 1.0)
}
