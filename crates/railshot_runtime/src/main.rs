//! Railshot Runtime
//!
//! Headless driver: loads settings, plays a scripted session at 60 Hz and
//! logs how it went.
//!
//! ```text
//! railshot [settings.json] [frames]
//! ```

use anyhow::{Context, Result};
use railshot_core::time::TICK_DELTA;
use railshot_services::{FireEdges, InputSnapshot, Settings};
use railshot_sim::{GameEvent, GameState, RenderSnapshot, Simulation, TempoGrid};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_FRAMES: u64 = 60 * 90;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Railshot v{}", railshot_core::VERSION);

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => {
            Settings::load(&path).with_context(|| format!("loading settings from {path}"))?
        }
        None => Settings::default(),
    };
    let frames = match args.next() {
        Some(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("frame count must be a whole number, got {raw:?}"))?,
        None => DEFAULT_FRAMES,
    };

    let beat = TempoGrid::new(120.0, settings.preset().beat_window_ms);
    let mut sim = Simulation::new(settings)
        .context("building the simulation")?
        .with_beat(beat);
    sim.send(GameEvent::Start);

    let mut edges = FireEdges::new();
    let mut snapshot = RenderSnapshot::new();
    let mut wave = 0;
    let mut kills = 0;
    let mut shots = 0;

    for frame in 0..frames {
        let input = scripted_input(&sim, &mut edges, frame);
        let report = sim.tick(&input, TICK_DELTA);
        kills += report.kills;
        shots += report.shots_fired;

        if report.wave != wave {
            wave = report.wave;
            info!(wave, frame, "wave reached");
        }
        if report.player_hits > 0 {
            info!(health = sim.session().context().health, "player hit");
        }
        if matches!(sim.state(), GameState::GameOver) {
            info!(frame, "game over");
            break;
        }
    }

    sim.snapshot(&mut snapshot);
    let context = sim.session().context();
    info!(
        state = %sim.state(),
        score = context.score,
        health = context.health,
        multiplier = context.multiplier,
        wave = sim.director().current_wave(),
        kills,
        shots,
        enemies_on_screen = snapshot.enemies.len(),
        "session finished"
    );

    let timer = sim.frame_timer();
    let (fastest_ms, slowest_ms) = timer.frame_time_range_ms();
    info!(
        frames = timer.frames(),
        fps = timer.fps(),
        frame_ms = timer.frame_time_ms(),
        fastest_ms,
        slowest_ms,
        "frame stats"
    );
    for (name, count) in sim.counter().iter() {
        info!(counter = name, count, "event count");
    }
    for (system, time) in sim.profiler().hottest().into_iter().take(3) {
        info!(system, micros = time.as_micros() as u64, "system cost");
    }

    Ok(())
}

/// Sweep the reticle, steer gently, and hold fire for most of each second.
fn scripted_input(sim: &Simulation, edges: &mut FireEdges, frame: u64) -> InputSnapshot {
    let t = frame as f32 * TICK_DELTA;
    let context = sim.session().context();
    let input = InputSnapshot {
        move_x: (t * 0.3).sin() * 0.5,
        move_y: (t * 0.2).cos() * 0.3,
        aim_x: (t * 0.7).sin() * 0.2,
        aim_y: (t * 0.5).cos() * 0.1,
        overdrive: context.overdrive >= railshot_sim::session::MAX_OVERDRIVE,
        shield: context.has_stored_shield && context.health < context.max_health / 2,
        ..Default::default()
    };
    edges.apply(input, frame % 60 < 48)
}
