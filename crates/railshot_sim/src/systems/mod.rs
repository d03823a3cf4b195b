//! Per-frame systems.
//!
//! Each system is a plain function over a [`SystemContext`]. Systems never
//! touch the session directly; outcomes the session cares about are pushed
//! onto the context's outbox and drained by the frame driver at the end of
//! the tick.

pub mod despawn;
pub mod enemy_shoot;
pub mod explosion;
pub mod lock_on;
pub mod movement;
pub mod power_up;
pub mod projectile;
pub mod snapshot;
pub mod spawn;

use crate::pools::Pools;
use crate::session::GameEvent;
use railshot_core::ecs::{Entity, World};
use railshot_core::math::SimRng;

/// Mutable state shared by every system for one tick.
pub struct SystemContext<'a> {
    pub world: &'a mut World,
    pub pools: &'a Pools,
    pub rng: &'a mut SimRng,
    /// Reused query buffer.
    pub scratch: &'a mut Vec<Entity>,
    pub outbox: &'a mut Vec<GameEvent>,
    /// Simulation seconds at the end of this tick.
    pub now: f32,
    pub delta: f32,
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use railshot_services::settings::PoolSettings;

    /// Owns everything a [`SystemContext`] borrows.
    pub struct Harness {
        pub world: World,
        pub pools: Pools,
        pub rng: SimRng,
        pub scratch: Vec<Entity>,
        pub outbox: Vec<GameEvent>,
        pub now: f32,
    }

    impl Harness {
        pub fn new() -> Self {
            Self::with_pools(PoolSettings::default())
        }

        pub fn with_pools(sizes: PoolSettings) -> Self {
            let mut world = World::new();
            let pools = Pools::allocate(&mut world, &sizes).unwrap();
            Self {
                world,
                pools,
                rng: SimRng::new(0x5EED),
                scratch: Vec::new(),
                outbox: Vec::new(),
                now: 0.0,
            }
        }

        pub fn ctx(&mut self, delta: f32) -> SystemContext<'_> {
            SystemContext {
                world: &mut self.world,
                pools: &self.pools,
                rng: &mut self.rng,
                scratch: &mut self.scratch,
                outbox: &mut self.outbox,
                now: self.now,
                delta,
            }
        }
    }
}
