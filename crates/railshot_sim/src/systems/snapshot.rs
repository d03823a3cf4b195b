//! Read-only frame views for the renderer.
//!
//! The snapshot owns its buffers; `capture` clears and refills them so a
//! host that keeps one snapshot around does not allocate per frame.

use super::explosion::particle_progress;
use crate::components::*;
use railshot_core::ecs::{Entity, World};
use railshot_core::math::Vec3;
use railshot_core::pool::Active;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyView {
    pub entity: Entity,
    pub position: Vec3,
    pub kind: EnemyKind,
    pub scale: f32,
    pub color: Rgb,
    pub locked: bool,
}

/// Position plus flight progress, used for both player and enemy shots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotView {
    pub position: Vec3,
    pub progress: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleView {
    pub position: Vec3,
    pub color: Rgb,
    /// Shrinks to half size over the particle's life.
    pub scale: f32,
    pub alpha: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerUpView {
    pub position: Vec3,
    pub kind: PowerUpKind,
    pub magnetizing: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RenderSnapshot {
    pub enemies: Vec<EnemyView>,
    pub projectiles: Vec<ShotView>,
    pub enemy_projectiles: Vec<ShotView>,
    pub particles: Vec<ParticleView>,
    pub power_ups: Vec<PowerUpView>,
    pub locked: Vec<(Entity, Vec3)>,
}

impl RenderSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refill every view from the live entities in `world`.
    pub fn capture(&mut self, world: &World, now: f32) {
        self.enemies.clear();
        self.projectiles.clear();
        self.enemy_projectiles.clear();
        self.particles.clear();
        self.power_ups.clear();
        self.locked.clear();

        for e in world.query::<(Position, Enemy, Active)>() {
            let (Some(pos), Some(enemy)) = (world.get::<Position>(e), world.get::<Enemy>(e)) else {
                continue;
            };
            let locked = world.get::<Lockable>(e).is_some_and(|l| l.locked);
            let profile = enemy.kind.profile();
            self.enemies.push(EnemyView {
                entity: e,
                position: pos.0,
                kind: enemy.kind,
                scale: profile.scale,
                color: profile.color,
                locked,
            });
            if locked {
                self.locked.push((e, pos.0));
            }
        }

        for e in world.query::<(Position, Projectile, Active)>() {
            if let (Some(pos), Some(p)) = (world.get::<Position>(e), world.get::<Projectile>(e)) {
                self.projectiles.push(ShotView {
                    position: pos.0,
                    progress: p.progress,
                });
            }
        }

        for e in world.query::<(Position, EnemyProjectile, Active)>() {
            if let (Some(pos), Some(p)) =
                (world.get::<Position>(e), world.get::<EnemyProjectile>(e))
            {
                self.enemy_projectiles.push(ShotView {
                    position: pos.0,
                    progress: p.progress,
                });
            }
        }

        for e in world.query::<(Position, ExplosionParticle, Active)>() {
            if let (Some(pos), Some(p)) =
                (world.get::<Position>(e), world.get::<ExplosionParticle>(e))
            {
                let progress = particle_progress(p, now);
                self.particles.push(ParticleView {
                    position: pos.0,
                    color: p.color,
                    scale: p.scale * (1.0 - 0.5 * progress),
                    alpha: 1.0 - progress,
                });
            }
        }

        for e in world.query::<(Position, PowerUp, Active)>() {
            if let (Some(pos), Some(p)) = (world.get::<Position>(e), world.get::<PowerUp>(e)) {
                self.power_ups.push(PowerUpView {
                    position: pos.0,
                    kind: p.kind,
                    magnetizing: p.magnetizing,
                });
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
            && self.projectiles.is_empty()
            && self.enemy_projectiles.is_empty()
            && self.particles.is_empty()
            && self.power_ups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::explosion::spawn_explosion;
    use crate::systems::testing::Harness;
    use approx::assert_relative_eq;

    #[test]
    fn parked_entities_are_invisible() {
        let h = Harness::new();
        let mut snap = RenderSnapshot::new();
        snap.capture(&h.world, 0.0);
        assert!(snap.is_empty());
        assert!(snap.locked.is_empty());
    }

    #[test]
    fn enemy_view_carries_profile_and_lock() {
        let mut h = Harness::new();
        let e = h.pools.enemies.activate(&mut h.world).unwrap();
        h.world
            .set(
                e,
                Enemy {
                    kind: EnemyKind::Armored,
                    health: 3,
                    max_health: 3,
                    spawn_time: 0.0,
                },
            )
            .unwrap();
        h.world.set(e, Position(Vec3::new(1.0, 2.0, -30.0))).unwrap();
        h.world.get_mut::<Lockable>(e).unwrap().locked = true;

        let mut snap = RenderSnapshot::new();
        snap.capture(&h.world, 0.0);

        assert_eq!(snap.enemies.len(), 1);
        let view = snap.enemies[0];
        assert_eq!(view.color, Rgb(0xffaa00));
        assert_eq!(view.scale, 0.8);
        assert!(view.locked);
        assert_eq!(snap.locked, vec![(e, Vec3::new(1.0, 2.0, -30.0))]);
    }

    #[test]
    fn particles_fade_and_shrink() {
        let mut h = Harness::new();
        spawn_explosion(&mut h.ctx(0.016), Vec3::ZERO, Rgb(0xffffff), 1);
        let e = h.pools.particles.members()[0];
        let particle = *h.world.get::<ExplosionParticle>(e).unwrap();

        let mut snap = RenderSnapshot::new();
        snap.capture(&h.world, particle.lifetime / 2.0);

        let view = snap.particles[0];
        assert_relative_eq!(view.alpha, 0.5, epsilon = 1e-5);
        assert_relative_eq!(view.scale, particle.scale * 0.75, epsilon = 1e-5);
    }
}
