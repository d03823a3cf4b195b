//! Velocity integration plus per-enemy secondary motion patterns.

use super::SystemContext;
use crate::components::{
    Enemy, EnemyKind, MovementPattern, PatternKind, Position, Velocity,
};
use railshot_core::math::SimRng;
use railshot_core::pool::Active;
use std::f32::consts::TAU;

/// `position += velocity * delta` for every live mover, then layer the
/// enemy's pattern offset on top.
pub fn movement_system(ctx: &mut SystemContext) {
    let SystemContext {
        world,
        scratch,
        now,
        delta,
        ..
    } = ctx;
    let (now, delta) = (*now, *delta);

    world.query_into::<(Position, Velocity, Active)>(scratch);
    for &entity in scratch.iter() {
        let Some(&Velocity(vel)) = world.get::<Velocity>(entity) else {
            continue;
        };
        let pattern = world
            .has::<Enemy>(entity)
            .then(|| world.get::<MovementPattern>(entity).copied())
            .flatten();

        if let Some(Position(pos)) = world.get_mut::<Position>(entity) {
            *pos += vel * delta;
            if let Some(pattern) = pattern {
                let (dx, dy) = pattern_offset(&pattern, now, delta);
                pos.x += dx;
                pos.y += dy;
            }
        }
    }
}

/// Secondary displacement for one tick.
pub fn pattern_offset(pattern: &MovementPattern, elapsed: f32, delta: f32) -> (f32, f32) {
    let t = elapsed * pattern.frequency + pattern.phase;
    let amp = pattern.amplitude;
    match pattern.kind {
        PatternKind::Linear => (0.0, 0.0),
        PatternKind::Sine => (t.sin() * amp * delta * 2.0, 0.0),
        PatternKind::Zigzag => {
            let s = (t * 2.0).sin();
            let sign = if s > 0.0 {
                1.0
            } else if s < 0.0 {
                -1.0
            } else {
                0.0
            };
            (sign * amp * delta * 3.0, 0.0)
        }
        PatternKind::Circular => (t.cos() * amp * delta, t.sin() * amp * delta),
        PatternKind::Spiral => {
            let envelope = (t * 0.3).sin();
            (
                t.cos() * amp * delta * envelope,
                t.sin() * amp * delta * envelope,
            )
        }
    }
}

fn pattern_weights(kind: EnemyKind) -> &'static [(PatternKind, f32)] {
    match kind {
        EnemyKind::Basic => &[
            (PatternKind::Linear, 0.4),
            (PatternKind::Sine, 0.3),
            (PatternKind::Zigzag, 0.3),
        ],
        EnemyKind::Armored => &[
            (PatternKind::Circular, 0.5),
            (PatternKind::Spiral, 0.3),
            (PatternKind::Linear, 0.2),
        ],
        EnemyKind::Fast => &[
            (PatternKind::Zigzag, 0.4),
            (PatternKind::Sine, 0.3),
            (PatternKind::Spiral, 0.3),
        ],
    }
}

/// Weighted pattern pick made once when an enemy activates.
pub fn assign_pattern(rng: &mut SimRng, kind: EnemyKind) -> MovementPattern {
    let kind = rng
        .weighted(pattern_weights(kind))
        .unwrap_or(PatternKind::Linear);
    MovementPattern {
        kind,
        amplitude: rng.range(2.0, 5.0),
        frequency: rng.range(1.0, 3.0),
        phase: rng.range(0.0, TAU),
    }
}
