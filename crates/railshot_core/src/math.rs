//! Deterministic math utilities
//!
//! Re-exports glam plus the seeded random source every system draws from.

pub use glam::*;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seeded random source owned by the simulation state.
///
/// Two instances built from the same seed yield identical sequences, which
/// is what makes wave spawning and particle bursts reproducible in tests.
#[derive(Debug, Clone)]
pub struct SimRng {
    seed: u64,
    inner: StdRng,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: StdRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Rewind to the initial seed.
    pub fn reseed(&mut self) {
        self.inner = StdRng::seed_from_u64(self.seed);
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        self.inner.gen::<f32>()
    }

    /// Uniform in `[lo, hi)`. Returns `lo` for an empty range.
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            return lo;
        }
        self.inner.gen_range(lo..hi)
    }

    /// Uniform in `[-half, half)`.
    pub fn signed(&mut self, half: f32) -> f32 {
        (self.next_f32() - 0.5) * 2.0 * half
    }

    /// True with probability `p` (inclusive comparison, so `p = 1` always passes).
    pub fn chance(&mut self, p: f32) -> bool {
        self.next_f32() <= p
    }

    /// Uniformly distributed unit vector.
    pub fn unit_sphere(&mut self) -> Vec3 {
        let theta = self.next_f32() * std::f32::consts::TAU;
        let phi = (2.0 * self.next_f32() - 1.0).acos();
        Vec3::new(
            phi.sin() * theta.cos(),
            phi.sin() * theta.sin(),
            phi.cos(),
        )
    }

    /// Pick from `(item, weight)` pairs by cumulative weight.
    ///
    /// The last entry absorbs rounding so a non-empty table always yields.
    pub fn weighted<T: Copy>(&mut self, table: &[(T, f32)]) -> Option<T> {
        let total: f32 = table.iter().map(|&(_, w)| w).sum();
        let mut roll = self.next_f32() * total;
        for &(item, weight) in table {
            if roll < weight {
                return Some(item);
            }
            roll -= weight;
        }
        table.last().map(|&(item, _)| item)
    }
}

/// Frame-rate independent exponential smoothing toward `target`.
pub fn damp(current: f32, target: f32, lambda: f32, delta: f32) -> f32 {
    current + (target - current) * (1.0 - (-lambda * delta).exp())
}

/// [`damp`] applied per component.
pub fn damp_vec3(current: Vec3, target: Vec3, lambda: f32, delta: f32) -> Vec3 {
    current.lerp(target, 1.0 - (-lambda * delta).exp())
}
