//! Simulation time
//!
//! The clock only moves when the frame driver advances it; every timestamp
//! a system stores (cooldowns, wave timers, particle birth) is read from it.

/// Nominal host frame rate used by headless drivers and tests.
pub const TICK_RATE_HZ: u32 = 60;
pub const TICK_DELTA: f32 = 1.0 / TICK_RATE_HZ as f32;

/// Upper bound for a single step; a stalled host must not tunnel projectiles.
pub const MAX_DELTA: f32 = 0.1;

/// Simulation time tracker
#[derive(Debug, Clone, Default)]
pub struct SimulationClock {
    tick_count: u64,
    elapsed: f64,
}

impl SimulationClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Seconds of simulated time.
    pub fn elapsed(&self) -> f32 {
        self.elapsed as f32
    }

    /// Advance by `delta` seconds, clamped to `[0, MAX_DELTA]`. Returns the applied delta.
    pub fn advance(&mut self, delta: f32) -> f32 {
        let delta = clamp_delta(delta);
        self.tick_count += 1;
        self.elapsed += f64::from(delta);
        delta
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Negative or NaN deltas become zero; long stalls are capped.
pub fn clamp_delta(delta: f32) -> f32 {
    if delta.is_nan() {
        0.0
    } else {
        delta.clamp(0.0, MAX_DELTA)
    }
}
