//! The frame driver.
//!
//! [`Simulation`] owns the entity store, the pools, every timer and the game
//! session, and runs the systems in a fixed order once per
//! [`tick`](Simulation::tick). Systems report outcomes through the event
//! outbox; the driver forwards them to the session before the end-of-frame
//! `Tick` so buff expiry sees this frame's hits and pickups.

use crate::beat::{BeatSignal, NeverOnBeat};
use crate::components::EnemyKind;
use crate::error::SimulationError;
use crate::pools::Pools;
use crate::rail::{CatmullRomRail, RailPath, RailRider};
use crate::session::{CombatPhase, GameEvent, GameSession, GameState, PauseScreen};
use crate::systems::despawn::despawn_system;
use crate::systems::enemy_shoot::{enemy_projectile_system, enemy_shoot_system};
use crate::systems::explosion::explosion_system;
use crate::systems::lock_on::{
    acquire_targets, auto_lock_targets, clear_all_locks, LockCandidate, LockOnConfig,
};
use crate::systems::movement::movement_system;
use crate::systems::power_up::{power_up_system, PowerUpSpawner};
use crate::systems::projectile::{fire_projectiles, projectile_system};
use crate::systems::snapshot::RenderSnapshot;
use crate::systems::spawn::{SpawnConfig, SpawnOutcome, WaveDirector};
use crate::systems::SystemContext;
use railshot_core::ecs::{Entity, World};
use railshot_core::math::{SimRng, Vec2, Vec3};
use railshot_core::time::SimulationClock;
use railshot_metrics::{time_scope, Counter, FrameTimer, SystemProfiler};
use railshot_services::{InputSnapshot, Settings};
use tracing::{debug, info};

/// Seconds between overdrive volleys.
pub const OVERDRIVE_FIRE_INTERVAL: f32 = 0.2;

/// What one call to [`Simulation::tick`] did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// False when the session was not playing and no time passed.
    pub simulated: bool,
    /// Clamped delta actually applied.
    pub delta: f32,
    pub now: f32,
    pub state: Option<GameState>,
    pub wave: u32,
    pub wave_started: Option<u32>,
    pub spawned: Option<EnemyKind>,
    pub shots_fired: usize,
    pub hits: usize,
    pub kills: usize,
    pub player_hits: usize,
    pub power_ups_collected: usize,
    /// Events the session accepted this frame, input and system events alike.
    pub events_handled: usize,
}

pub struct Simulation {
    settings: Settings,
    world: World,
    pools: Pools,
    rng: SimRng,
    clock: SimulationClock,
    rail: Box<dyn RailPath>,
    rider: RailRider,
    beat: Box<dyn BeatSignal>,
    director: WaveDirector,
    power_ups: PowerUpSpawner,
    session: GameSession,

    outbox: Vec<GameEvent>,
    scratch: Vec<Entity>,
    candidates: Vec<LockCandidate>,
    locks: Vec<Entity>,
    held: Vec<Entity>,
    volley: Vec<Entity>,
    seen_run: u64,
    last_overdrive_volley: Option<f32>,

    profiler: SystemProfiler,
    counter: Counter,
    frame_timer: FrameTimer,
}

impl Simulation {
    /// Validate settings and pre-allocate every pool.
    pub fn new(settings: Settings) -> Result<Self, SimulationError> {
        settings.validate()?;
        let mut world = World::new();
        let pools = Pools::allocate(&mut world, &settings.pools)?;
        let preset = settings.preset();
        info!(
            entities = world.entity_count(),
            difficulty = ?settings.difficulty,
            seed = settings.seed,
            "simulation ready"
        );

        Ok(Self {
            rng: SimRng::new(settings.seed),
            session: GameSession::new(preset.max_multiplier, settings.lock_on.max_locks),
            world,
            pools,
            clock: SimulationClock::new(),
            rail: Box::new(CatmullRomRail::level_one()),
            rider: RailRider::new(),
            beat: Box::new(NeverOnBeat),
            director: WaveDirector::new(),
            power_ups: PowerUpSpawner::new(),
            outbox: Vec::new(),
            scratch: Vec::new(),
            candidates: Vec::new(),
            locks: Vec::new(),
            held: Vec::new(),
            volley: Vec::new(),
            seen_run: 0,
            last_overdrive_volley: None,
            profiler: SystemProfiler::new(),
            counter: Counter::new(),
            frame_timer: FrameTimer::new(120),
            settings,
        })
    }

    pub fn with_rail(mut self, rail: impl RailPath + 'static) -> Self {
        self.rail = Box::new(rail);
        self
    }

    pub fn with_beat(mut self, beat: impl BeatSignal + 'static) -> Self {
        self.beat = Box::new(beat);
        self
    }

    /// Forward a host event (menus, start, restart) to the session.
    pub fn send(&mut self, event: GameEvent) -> bool {
        self.session.set_time(self.clock.elapsed());
        self.session.send(event)
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn state(&self) -> GameState {
        self.session.state()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn pools(&self) -> &Pools {
        &self.pools
    }

    pub fn director(&self) -> &WaveDirector {
        &self.director
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn rider(&self) -> &RailRider {
        &self.rider
    }

    pub fn player_position(&self) -> Vec3 {
        self.rider.player_position()
    }

    /// Refill `snapshot` with this frame's renderable state.
    pub fn snapshot(&self, snapshot: &mut RenderSnapshot) {
        snapshot.capture(&self.world, self.clock.elapsed());
    }

    pub fn counter(&self) -> &Counter {
        &self.counter
    }

    pub fn profiler(&self) -> &SystemProfiler {
        &self.profiler
    }

    pub fn frame_timer(&self) -> &FrameTimer {
        &self.frame_timer
    }

    /// Run one frame.
    ///
    /// `delta` is clamped to `0.0..=0.1` seconds, so a longer host frame
    /// advances the simulation by only 0.1 s.
    pub fn tick(&mut self, input: &InputSnapshot, delta: f32) -> FrameReport {
        let input = input.normalized();
        let mut report = FrameReport::default();

        self.session.set_time(self.clock.elapsed());
        report.events_handled += self.apply_input(&input);

        if !self.session.state().is_playing() {
            report.state = Some(self.session.state());
            report.now = self.clock.elapsed();
            report.wave = self.director.current_wave();
            return report;
        }

        if self.session.run() != self.seen_run {
            self.begin_run();
        }

        self.frame_timer.begin();
        let delta = self.clock.advance(delta);
        let now = self.clock.elapsed();
        self.session.set_time(now);
        report.simulated = true;
        report.delta = delta;
        report.now = now;

        let movement = Vec2::new(input.move_x, input.move_y);
        let aim = Vec2::new(input.aim_x, input.aim_y);
        let player = self
            .rider
            .advance(self.rail.as_ref(), self.settings.rail.speed, movement, delta);

        let preset = self.settings.preset();
        let spawn_config = SpawnConfig {
            spawn_rate: preset.enemy_spawn_rate,
            enemy_speed: preset.enemy_speed,
            ..SpawnConfig::default()
        };
        let combat = self.settings.combat.clone();

        let mut ctx = SystemContext {
            world: &mut self.world,
            pools: &self.pools,
            rng: &mut self.rng,
            scratch: &mut self.scratch,
            outbox: &mut self.outbox,
            now,
            delta,
        };

        time_scope!(self.profiler, "movement", { movement_system(&mut ctx) });

        let outcome = time_scope!(self.profiler, "spawn", {
            self.director.update(&mut ctx, player, &spawn_config)
        });
        match outcome {
            SpawnOutcome::WaveStarted(wave) => report.wave_started = Some(wave),
            SpawnOutcome::Spawned { kind, .. } => {
                report.spawned = Some(kind);
                self.counter.increment("enemies_spawned", 1);
            }
            SpawnOutcome::Dropped(_) => self.counter.increment("spawns_dropped", 1),
            SpawnOutcome::Waiting | SpawnOutcome::WaveCleared(_) => {}
        }

        time_scope!(self.profiler, "despawn", {
            despawn_system(&mut ctx, player.z, combat.despawn_distance)
        });

        // Lock-on, reconciled with the session's lock list.
        let lock_config = LockOnConfig {
            max_locks: self.session.context().max_lock_slots,
            lock_range: self.settings.lock_on.lock_range,
            lock_box_size: self.settings.lock_on.lock_box_size,
        };
        if self.session.context().is_locking {
            self.held.clear();
            self.held
                .extend_from_slice(&self.session.context().locked_target_ids);
            time_scope!(self.profiler, "lock_on", {
                auto_lock_targets(
                    &mut ctx,
                    player,
                    aim,
                    &self.held,
                    &lock_config,
                    &mut self.candidates,
                    &mut self.locks,
                )
            });
            let released = self.held.iter().filter(|e| !self.locks.contains(e));
            for &gone in released {
                report.events_handled +=
                    usize::from(self.session.send(GameEvent::UnlockTarget(gone)));
            }
            let acquired = self.locks.iter().filter(|e| !self.held.contains(e));
            for &fresh in acquired {
                report.events_handled +=
                    usize::from(self.session.send(GameEvent::LockTarget(fresh)));
            }
        } else if !self.locks.is_empty() {
            clear_all_locks(&mut ctx);
            self.locks.clear();
        }

        let locking = self.session.state() == GameState::Playing(CombatPhase::Locking);
        if input.fire_released && locking {
            self.volley.clear();
            self.volley
                .extend_from_slice(&self.session.context().locked_target_ids);
            let fired =
                fire_projectiles(&mut ctx, player, &self.volley, combat.projectile_speed);
            report.shots_fired += fired;
            self.counter.increment("shots_fired", fired as u64);
            debug!(targets = self.volley.len(), fired, "volley released");
            report.events_handled += usize::from(self.session.send(GameEvent::FireRelease));
            clear_all_locks(&mut ctx);
            self.locks.clear();
        }

        report.kills = time_scope!(self.profiler, "projectile", {
            projectile_system(&mut ctx, self.beat.as_mut(), combat.explosion_particles)
        });
        self.counter.increment("enemies_destroyed", report.kills as u64);

        time_scope!(self.profiler, "enemy_shoot", {
            enemy_shoot_system(
                &mut ctx,
                player,
                combat.shoot_range,
                combat.enemy_projectile_speed,
            )
        });
        report.player_hits = time_scope!(self.profiler, "enemy_projectile", {
            enemy_projectile_system(&mut ctx, player, combat.hit_radius)
        });

        time_scope!(self.profiler, "explosion", { explosion_system(&mut ctx) });

        report.power_ups_collected = time_scope!(self.profiler, "power_up", {
            self.power_ups.update(&mut ctx, player);
            power_up_system(&mut ctx, player)
        });

        // Hand system outcomes to the session, then let it run its timers.
        for event in ctx.outbox.drain(..) {
            if matches!(event, GameEvent::Hit { .. }) {
                report.hits += 1;
            }
            report.events_handled += usize::from(self.session.send(event));
        }
        self.session.send(GameEvent::Tick { now });

        // Overdrive auto-fire, only if the session is still live.
        if self.session.context().overdrive_active && self.session.state().is_playing() {
            let due = self
                .last_overdrive_volley
                .map_or(true, |last| now - last >= OVERDRIVE_FIRE_INTERVAL);
            if due {
                self.last_overdrive_volley = Some(now);
                acquire_targets(
                    &mut ctx,
                    player,
                    aim,
                    &lock_config,
                    &mut self.candidates,
                    &mut self.volley,
                );
                let fired =
                    fire_projectiles(&mut ctx, player, &self.volley, combat.projectile_speed);
                report.shots_fired += fired;
                self.counter.increment("shots_fired", fired as u64);
            }
        } else {
            self.last_overdrive_volley = None;
        }

        self.frame_timer.end();
        report.state = Some(self.session.state());
        report.wave = self.director.current_wave();
        report
    }

    /// Translate one frame of input into session events.
    fn apply_input(&mut self, input: &InputSnapshot) -> usize {
        let mut handled = 0;
        if input.pause {
            let event = match self.session.state() {
                GameState::Playing(_) => Some(GameEvent::Pause),
                GameState::Paused(PauseScreen::Overlay) => Some(GameEvent::Resume),
                _ => None,
            };
            if let Some(event) = event {
                handled += usize::from(self.session.send(event));
            }
        }
        if !self.session.state().is_playing() {
            return handled;
        }
        if input.overdrive {
            handled += usize::from(self.session.send(GameEvent::ActivateOverdrive));
        }
        if input.shield {
            handled += usize::from(self.session.send(GameEvent::ActivateShield));
        }
        if input.fire_pressed {
            handled += usize::from(self.session.send(GameEvent::FireStart));
        }
        handled
    }

    /// Fresh run: everything back in its pool, wave one, timers from now.
    fn begin_run(&mut self) {
        let now = self.clock.elapsed();
        self.pools.deactivate_all(&mut self.world);
        self.director.reset(now);
        self.power_ups.reset(now, &mut self.rng);
        self.rider.reset();
        self.outbox.clear();
        self.locks.clear();
        self.last_overdrive_volley = None;
        self.seen_run = self.session.run();
        info!(run = self.seen_run, level = self.session.context().level, "run started");
    }
}
