//! Railshot Core
//!
//! Contains the building blocks every gameplay system runs on:
//! - Entity Component System (sparse-set store, queries)
//! - Fixed-capacity entity pools
//! - Simulation clock
//! - Math re-exports and the seeded RNG

pub mod ecs;
pub mod math;
pub mod pool;
pub mod time;

pub use glam;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
