//! Power-up spawning, magnet pull and pickup.

use super::SystemContext;
use crate::components::{Position, PowerUp, PowerUpKind};
use crate::session::GameEvent;
use railshot_core::ecs::Entity;
use railshot_core::math::{SimRng, Vec3};
use railshot_core::pool::Active;
use tracing::{debug, info};

pub const SPAWN_INTERVAL_MIN: f32 = 15.0;
pub const SPAWN_INTERVAL_MAX: f32 = 30.0;
pub const MAGNET_RANGE: f32 = 8.0;
pub const MAGNET_SPEED: f32 = 20.0;
pub const COLLECTION_RANGE: f32 = 3.0;
/// Uncollected power-ups this far behind the player are pooled.
pub const DESPAWN_BEHIND: f32 = 30.0;

const KIND_WEIGHTS: [(PowerUpKind, f32); 3] = [
    (PowerUpKind::Shield, 0.4),
    (PowerUpKind::Overdrive, 0.3),
    (PowerUpKind::Multilock, 0.3),
];

/// Timer that drops one power-up ahead of the player every 15 to 30 seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerUpSpawner {
    last_spawn_time: f32,
    next_interval: f32,
}

impl Default for PowerUpSpawner {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerUpSpawner {
    pub fn new() -> Self {
        Self {
            last_spawn_time: 0.0,
            next_interval: SPAWN_INTERVAL_MIN,
        }
    }

    /// Restart the timer at `now` with a fresh random interval.
    pub fn reset(&mut self, now: f32, rng: &mut SimRng) {
        self.last_spawn_time = now;
        self.next_interval = rng.range(SPAWN_INTERVAL_MIN, SPAWN_INTERVAL_MAX);
    }

    pub fn next_spawn_at(&self) -> f32 {
        self.last_spawn_time + self.next_interval
    }

    /// Spawn a power-up if the interval has elapsed. The timer restarts even
    /// when the pool is exhausted.
    pub fn update(
        &mut self,
        ctx: &mut SystemContext,
        player: Vec3,
    ) -> Option<(Entity, PowerUpKind)> {
        if ctx.now - self.last_spawn_time < self.next_interval {
            return None;
        }
        self.reset(ctx.now, ctx.rng);

        let at = Vec3::new(
            player.x + ctx.rng.signed(7.5),
            2.0 + ctx.rng.next_f32() * 6.0,
            player.z - ctx.rng.range(40.0, 70.0),
        );
        let kind = ctx.rng.weighted(&KIND_WEIGHTS)?;
        let entity = spawn_power_up(ctx, at, kind)?;
        debug!(%entity, kind = kind.name(), z = at.z, "power-up spawned");
        Some((entity, kind))
    }
}

/// Activate a power-up of `kind` at `at`.
pub fn spawn_power_up(ctx: &mut SystemContext, at: Vec3, kind: PowerUpKind) -> Option<Entity> {
    let Some(entity) = ctx.pools.power_ups.activate(ctx.world) else {
        debug!(kind = kind.name(), "power-up pool exhausted");
        return None;
    };
    let power_up = PowerUp {
        kind,
        spawn_time: ctx.now,
        collected: false,
        magnetizing: false,
    };
    ctx.world.set(entity, power_up).ok()?;
    ctx.world.set(entity, Position(at)).ok()?;
    Some(entity)
}

/// Collect, pull or hover every live power-up. Returns how many were
/// collected; each pickup is reported as `CollectPowerUp`.
pub fn power_up_system(ctx: &mut SystemContext, player: Vec3) -> usize {
    let (now, delta) = (ctx.now, ctx.delta);
    ctx.world.query_into::<(Position, PowerUp, Active)>(ctx.scratch);
    let mut collected = 0;

    for &entity in ctx.scratch.iter() {
        let Some(&Position(pos)) = ctx.world.get::<Position>(entity) else {
            continue;
        };
        let Some(power_up) = ctx.world.get_mut::<PowerUp>(entity) else {
            continue;
        };
        let to_player = player - pos;
        let distance = to_player.length();

        if distance < COLLECTION_RANGE {
            power_up.collected = true;
            let kind = power_up.kind;
            info!(kind = kind.name(), distance, "power-up collected");
            ctx.outbox.push(GameEvent::CollectPowerUp(kind));
            ctx.pools.deactivate(ctx.world, entity);
            collected += 1;
            continue;
        }

        let moved = if distance < MAGNET_RANGE {
            power_up.magnetizing = true;
            let speed = MAGNET_SPEED * (1.0 - distance / MAGNET_RANGE) + 5.0;
            pos + to_player / distance * speed * delta
        } else {
            power_up.magnetizing = false;
            let hover = (now * 2.0 + pos.x).sin() * 0.5;
            pos + Vec3::Y * hover * delta
        };

        if moved.z > player.z + DESPAWN_BEHIND {
            ctx.pools.deactivate(ctx.world, entity);
        } else if let Some(p) = ctx.world.get_mut::<Position>(entity) {
            p.0 = moved;
        }
    }
    collected
}
