//! Where a hit's "on beat" flag comes from.
//!
//! Audio analysis is outside the simulation. The host plugs in whatever
//! source it has; the default reports every hit as off-beat.

/// Answers whether a hit at simulation time `now` landed on the beat.
pub trait BeatSignal {
    fn on_beat(&mut self, now: f32) -> bool;
}

/// Never on beat. Multiplier growth stays unreachable through projectile hits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverOnBeat;

impl BeatSignal for NeverOnBeat {
    fn on_beat(&mut self, _now: f32) -> bool {
        false
    }
}

/// Fixed-tempo grid: on beat within `window_ms` of a beat boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoGrid {
    pub bpm: f32,
    pub window_ms: f32,
    /// Time of the first beat.
    pub offset: f32,
}

impl TempoGrid {
    pub fn new(bpm: f32, window_ms: f32) -> Self {
        Self {
            bpm,
            window_ms,
            offset: 0.0,
        }
    }
}

impl BeatSignal for TempoGrid {
    fn on_beat(&mut self, now: f32) -> bool {
        if self.bpm <= 0.0 {
            return false;
        }
        let period = 60.0 / self.bpm;
        let phase = (now - self.offset).rem_euclid(period);
        let distance = phase.min(period - phase);
        distance * 1000.0 <= self.window_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tempo_grid_accepts_both_sides_of_a_beat() {
        let mut grid = TempoGrid::new(120.0, 100.0);
        assert!(grid.on_beat(0.5));
        assert!(grid.on_beat(0.45));
        assert!(grid.on_beat(1.08));
        assert!(!grid.on_beat(0.75));
        assert!(!grid.on_beat(0.62));
    }

    #[test]
    fn degenerate_tempo_is_never_on_beat() {
        let mut grid = TempoGrid::new(0.0, 100.0);
        assert!(!grid.on_beat(1.0));
        assert!(!NeverOnBeat.on_beat(1.0));
    }
}
