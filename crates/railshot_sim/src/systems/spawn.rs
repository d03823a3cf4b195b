//! Wave director: time-gated enemy creation with escalating waves.

use super::movement::assign_pattern;
use super::SystemContext;
use crate::components::{CanShoot, Enemy, EnemyKind, Lockable, Position, Velocity};
use railshot_core::ecs::Entity;
use railshot_core::math::Vec3;
use tracing::{debug, info, trace};

/// Idle time between the last spawn of a wave and the next wave.
pub const WAVE_DELAY: f32 = 3.0;

/// Derived numbers for one wave.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveConfig {
    pub enemy_count: u32,
    /// Seconds between spawns before the difficulty spawn rate is applied.
    pub spawn_interval: f32,
    pub armored_chance: f32,
    pub fast_chance: f32,
    pub speed_multiplier: f32,
    pub lateral_spread: f32,
}

impl WaveConfig {
    pub fn for_wave(wave: u32) -> Self {
        let w = wave as f32;
        let past_first = wave.saturating_sub(1) as f32;
        Self {
            enemy_count: 5 + (w * 1.5).floor() as u32,
            spawn_interval: (1.0 - w * 0.05).max(0.3),
            armored_chance: (0.1 + w * 0.05).min(0.4),
            fast_chance: (0.05 + w * 0.03).min(0.3),
            speed_multiplier: (1.0 + 0.05 * past_first).min(1.5),
            lateral_spread: (30.0 + 2.0 * past_first).min(50.0),
        }
    }
}

/// Difficulty inputs to the director.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnConfig {
    /// Divides the wave's spawn interval.
    pub spawn_rate: f32,
    pub enemy_speed: f32,
    /// Spawn distance ahead of the player, sampled in `[min, max)`.
    pub spawn_distance: (f32, f32),
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            spawn_rate: 1.0,
            enemy_speed: 1.0,
            spawn_distance: (30.0, 50.0),
        }
    }
}

/// What one director step did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnOutcome {
    Waiting,
    WaveStarted(u32),
    WaveCleared(u32),
    Spawned { entity: Entity, kind: EnemyKind },
    /// The enemy pool had no free slot; the spawn is not retried.
    Dropped(EnemyKind),
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaveDirector {
    current_wave: u32,
    wave: WaveConfig,
    enemies_spawned: u32,
    wave_start_time: f32,
    last_spawn_time: f32,
    between_waves: bool,
    wave_delay: f32,
}

impl WaveDirector {
    pub fn new() -> Self {
        let mut director = Self {
            current_wave: 1,
            wave: WaveConfig::for_wave(1),
            enemies_spawned: 0,
            wave_start_time: 0.0,
            last_spawn_time: 0.0,
            between_waves: false,
            wave_delay: WAVE_DELAY,
        };
        director.reset(0.0);
        director
    }

    /// Back to wave one, timed from `now`.
    pub fn reset(&mut self, now: f32) {
        self.current_wave = 1;
        self.wave = WaveConfig::for_wave(1);
        self.enemies_spawned = 0;
        self.wave_start_time = now;
        self.last_spawn_time = now;
        self.between_waves = false;
    }

    pub fn current_wave(&self) -> u32 {
        self.current_wave
    }

    pub fn wave_config(&self) -> WaveConfig {
        self.wave
    }

    pub fn is_between_waves(&self) -> bool {
        self.between_waves
    }

    pub fn enemies_spawned(&self) -> u32 {
        self.enemies_spawned
    }

    /// Advance the wave state machine by one frame.
    pub fn update(
        &mut self,
        ctx: &mut SystemContext,
        player: Vec3,
        config: &SpawnConfig,
    ) -> SpawnOutcome {
        let elapsed = ctx.now;

        if self.between_waves {
            if elapsed - self.wave_start_time < self.wave_delay {
                return SpawnOutcome::Waiting;
            }
            self.current_wave += 1;
            self.wave = WaveConfig::for_wave(self.current_wave);
            self.enemies_spawned = 0;
            self.between_waves = false;
            self.wave_start_time = elapsed;
            self.last_spawn_time = elapsed;
            info!(wave = self.current_wave, enemies = self.wave.enemy_count, "wave started");
            return SpawnOutcome::WaveStarted(self.current_wave);
        }

        if self.enemies_spawned >= self.wave.enemy_count {
            self.between_waves = true;
            self.wave_start_time = elapsed;
            debug!(wave = self.current_wave, "wave fully spawned");
            return SpawnOutcome::WaveCleared(self.current_wave);
        }

        let interval = self.wave.spawn_interval / config.spawn_rate.max(f32::EPSILON);
        if elapsed - self.last_spawn_time < interval {
            return SpawnOutcome::Waiting;
        }
        self.last_spawn_time = elapsed;
        self.enemies_spawned += 1;

        let kind = self.pick_kind(ctx);
        let (near, far) = config.spawn_distance;
        let spawn_at = Vec3::new(
            player.x + ctx.rng.signed(self.wave.lateral_spread / 2.0),
            ctx.rng.signed(7.5) + 3.0,
            player.z - ctx.rng.range(near, far),
        );
        let velocity = Vec3::new(
            ctx.rng.signed(2.5),
            ctx.rng.signed(1.0),
            kind.profile().base_speed * config.enemy_speed * self.wave.speed_multiplier,
        );

        match activate_enemy(ctx, kind, spawn_at, velocity) {
            Some(entity) => {
                trace!(%entity, kind = kind.name(), wave = self.current_wave, "enemy spawned");
                SpawnOutcome::Spawned { entity, kind }
            }
            None => {
                debug!(kind = kind.name(), "enemy pool exhausted, spawn dropped");
                SpawnOutcome::Dropped(kind)
            }
        }
    }

    fn pick_kind(&self, ctx: &mut SystemContext) -> EnemyKind {
        let roll = ctx.rng.next_f32();
        if roll < self.wave.armored_chance {
            EnemyKind::Armored
        } else if roll < self.wave.armored_chance + self.wave.fast_chance {
            EnemyKind::Fast
        } else {
            EnemyKind::Basic
        }
    }
}

impl Default for WaveDirector {
    fn default() -> Self {
        Self::new()
    }
}

/// Take a free enemy slot and fill it for `kind`.
pub fn activate_enemy(
    ctx: &mut SystemContext,
    kind: EnemyKind,
    position: Vec3,
    velocity: Vec3,
) -> Option<Entity> {
    let entity = ctx.pools.enemies.activate(ctx.world)?;
    let profile = kind.profile();
    let pattern = assign_pattern(ctx.rng, kind);
    let shooter = profile.shooter_chance > 0.0 && ctx.rng.next_f32() < profile.shooter_chance;

    let world = &mut *ctx.world;
    world.set(entity, Position(position)).ok()?;
    world.set(entity, Velocity(velocity)).ok()?;
    world
        .set(
            entity,
            Enemy {
                kind,
                health: profile.health,
                max_health: profile.health,
                spawn_time: ctx.now,
            },
        )
        .ok()?;
    world.set(entity, Lockable::default()).ok()?;
    world.set(entity, pattern).ok()?;
    if shooter {
        world
            .set(
                entity,
                CanShoot {
                    last_shot_time: 0.0,
                    cooldown: profile.shot_cooldown,
                    chance: profile.shot_chance,
                },
            )
            .ok()?;
    } else {
        world.remove::<CanShoot>(entity);
    }
    Some(entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::testing::Harness;
    use approx::assert_relative_eq;
    use railshot_core::pool::Active;
    use railshot_services::settings::PoolSettings;

    const DT: f32 = 1.0 / 60.0;

    fn run(h: &mut Harness, director: &mut WaveDirector, seconds: f32) -> Vec<SpawnOutcome> {
        let config = SpawnConfig::default();
        let mut outcomes = Vec::new();
        let frames = (seconds / DT).round() as usize;
        for _ in 0..frames {
            h.now += DT;
            let outcome = director.update(&mut h.ctx(DT), Vec3::ZERO, &config);
            if outcome != SpawnOutcome::Waiting {
                outcomes.push(outcome);
            }
        }
        outcomes
    }

    #[test]
    fn wave_config_escalates_and_saturates() {
        let first = WaveConfig::for_wave(1);
        assert_eq!(first.enemy_count, 6);
        assert_relative_eq!(first.spawn_interval, 0.95);
        assert_relative_eq!(first.armored_chance, 0.15);
        assert_relative_eq!(first.fast_chance, 0.08);
        assert_relative_eq!(first.speed_multiplier, 1.0);
        assert_relative_eq!(first.lateral_spread, 30.0);

        let late = WaveConfig::for_wave(30);
        assert_eq!(late.enemy_count, 50);
        assert_relative_eq!(late.spawn_interval, 0.3);
        assert_relative_eq!(late.armored_chance, 0.4);
        assert_relative_eq!(late.fast_chance, 0.3);
        assert_relative_eq!(late.speed_multiplier, 1.5);
        assert_relative_eq!(late.lateral_spread, 50.0);
    }

    #[test]
    fn first_wave_spawns_then_rests_then_advances() {
        let mut h = Harness::new();
        let mut director = WaveDirector::new();
        let outcomes = run(&mut h, &mut director, 12.0);

        let spawned_before_clear = outcomes
            .iter()
            .take_while(|o| !matches!(o, SpawnOutcome::WaveCleared(_)))
            .filter(|o| matches!(o, SpawnOutcome::Spawned { .. }))
            .count();
        assert_eq!(spawned_before_clear, 6);
        assert!(outcomes.contains(&SpawnOutcome::WaveCleared(1)));
        assert!(outcomes.contains(&SpawnOutcome::WaveStarted(2)));
        assert_eq!(director.current_wave(), 2);
    }

    #[test]
    fn rests_between_waves_with_the_config_of_the_last_wave() {
        let mut h = Harness::new();
        let mut director = WaveDirector::new();
        assert!(!director.is_between_waves());

        run(&mut h, &mut director, 7.0);
        assert!(director.is_between_waves());
        assert_eq!(director.current_wave(), 1);
        assert_eq!(director.enemies_spawned(), director.wave_config().enemy_count);
    }

    #[test]
    fn spawned_enemies_are_placed_ahead_and_move_toward_player() {
        let mut h = Harness::new();
        let mut director = WaveDirector::new();
        run(&mut h, &mut director, 3.0);

        let mut live = Vec::new();
        h.world.query_into::<(Enemy, Active)>(&mut live);
        assert!(!live.is_empty());
        for e in live {
            let pos = h.world.get::<Position>(e).unwrap().0;
            let vel = h.world.get::<Velocity>(e).unwrap().0;
            let enemy = h.world.get::<Enemy>(e).unwrap();
            assert!((-50.0..=-30.0).contains(&pos.z));
            assert!(pos.x.abs() <= 15.0);
            assert!(vel.z > 0.0);
            assert_eq!(enemy.health, enemy.max_health);
            if enemy.kind == EnemyKind::Fast {
                assert!(!h.world.has::<CanShoot>(e));
            }
            if enemy.kind == EnemyKind::Armored {
                assert!(h.world.has::<CanShoot>(e));
            }
        }
    }

    #[test]
    fn exhausted_pool_drops_spawns() {
        let mut h = Harness::with_pools(PoolSettings {
            enemies: 2,
            ..PoolSettings::default()
        });
        let mut director = WaveDirector::new();
        let outcomes = run(&mut h, &mut director, 5.0);
        let dropped = outcomes
            .iter()
            .filter(|o| matches!(o, SpawnOutcome::Dropped(_)))
            .count();
        assert!(dropped >= 1);
        assert_eq!(h.pools.enemies.active_count(&h.world), 2);
    }

    #[test]
    fn reset_with_same_seed_reproduces_kind_sequence() {
        fn kinds(h: &mut Harness) -> Vec<EnemyKind> {
            let mut director = WaveDirector::new();
            director.reset(0.0);
            h.now = 0.0;
            run(h, &mut director, 30.0)
                .into_iter()
                .filter_map(|o| match o {
                    SpawnOutcome::Spawned { kind, .. } | SpawnOutcome::Dropped(kind) => Some(kind),
                    _ => None,
                })
                .collect()
        }

        let mut a = Harness::new();
        let mut b = Harness::new();
        let first = kinds(&mut a);
        let second = kinds(&mut b);
        assert!(first.len() > 20);
        assert_eq!(first, second);
    }
}
