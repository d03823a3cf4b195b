//! The five gameplay pools and their activate/deactivate routines.

use crate::components::*;
use railshot_core::ecs::{Entity, World, WorldError};
use railshot_core::pool::EntityPool;
use railshot_services::settings::PoolSettings;

/// Pre-spawned entity sets, one per gameplay kind.
#[derive(Debug, Clone)]
pub struct Pools {
    pub enemies: EntityPool,
    pub projectiles: EntityPool,
    pub enemy_projectiles: EntityPool,
    pub particles: EntityPool,
    pub power_ups: EntityPool,
}

fn park(world: &mut World, entity: Entity, pool: PoolKind) -> Result<(), WorldError> {
    world.set(entity, Position(OFFSCREEN))?;
    world.set(entity, Pooled { pool })
}

impl Pools {
    /// Allocate every pool up front. Sizes come from settings.
    pub fn allocate(world: &mut World, sizes: &PoolSettings) -> Result<Self, WorldError> {
        let enemies = EntityPool::build(world, "enemies", sizes.enemies, |w, e| {
            park(w, e, PoolKind::Enemy)?;
            w.set(e, Velocity::default())?;
            w.set(e, Enemy::default())?;
            w.set(e, Lockable::default())?;
            w.set(e, MovementPattern::default())
        })?;
        let projectiles = EntityPool::build(world, "projectiles", sizes.projectiles, |w, e| {
            park(w, e, PoolKind::Projectile)?;
            w.set(e, Projectile::default())
        })?;
        let enemy_projectiles =
            EntityPool::build(world, "enemy_projectiles", sizes.enemy_projectiles, |w, e| {
                park(w, e, PoolKind::EnemyProjectile)?;
                w.set(e, EnemyProjectile::default())
            })?;
        let particles = EntityPool::build(world, "particles", sizes.particles, |w, e| {
            park(w, e, PoolKind::Particle)?;
            w.set(e, ExplosionParticle::default())
        })?;
        let power_ups = EntityPool::build(world, "power_ups", sizes.power_ups, |w, e| {
            park(w, e, PoolKind::PowerUp)?;
            w.set(e, PowerUp::default())
        })?;

        Ok(Self {
            enemies,
            projectiles,
            enemy_projectiles,
            particles,
            power_ups,
        })
    }

    pub fn get(&self, kind: PoolKind) -> &EntityPool {
        match kind {
            PoolKind::Enemy => &self.enemies,
            PoolKind::Projectile => &self.projectiles,
            PoolKind::EnemyProjectile => &self.enemy_projectiles,
            PoolKind::Particle => &self.particles,
            PoolKind::PowerUp => &self.power_ups,
        }
    }

    pub fn all(&self) -> [&EntityPool; 5] {
        [
            &self.enemies,
            &self.projectiles,
            &self.enemy_projectiles,
            &self.particles,
            &self.power_ups,
        ]
    }

    /// Return a live entity to its pool: park it offscreen and drop `Active`.
    ///
    /// Enemies also lose their lock state and the shooting capability.
    pub fn deactivate(&self, world: &mut World, entity: Entity) -> bool {
        let Some(kind) = world.get::<Pooled>(entity).map(|p| p.pool) else {
            return false;
        };
        if !self.get(kind).deactivate(world, entity) {
            return false;
        }
        if let Some(pos) = world.get_mut::<Position>(entity) {
            pos.0 = OFFSCREEN;
        }
        if kind == PoolKind::Enemy {
            if let Some(lockable) = world.get_mut::<Lockable>(entity) {
                *lockable = Lockable::default();
            }
            world.remove::<CanShoot>(entity);
        }
        true
    }

    /// Pool everything, e.g. when a new session starts.
    pub fn deactivate_all(&self, world: &mut World) {
        for pool in self.all() {
            for &entity in pool.members() {
                self.deactivate(world, entity);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use railshot_core::pool::Active;

    fn small() -> PoolSettings {
        PoolSettings {
            enemies: 2,
            projectiles: 2,
            enemy_projectiles: 1,
            particles: 3,
            power_ups: 1,
        }
    }

    #[test]
    fn allocation_parks_everything_offscreen() {
        let mut world = World::new();
        let pools = Pools::allocate(&mut world, &small()).unwrap();
        assert_eq!(world.entity_count(), 9);
        assert_eq!(world.count::<(Position, Active)>(), 0);
        for pool in pools.all() {
            for &e in pool.members() {
                assert_eq!(world.get::<Position>(e), Some(&Position(OFFSCREEN)));
            }
        }
    }

    #[test]
    fn deactivating_enemy_clears_lock_and_capability() {
        let mut world = World::new();
        let pools = Pools::allocate(&mut world, &small()).unwrap();
        let e = pools.enemies.activate(&mut world).unwrap();
        world.set(e, CanShoot::default()).unwrap();
        world.get_mut::<Lockable>(e).unwrap().locked = true;

        assert!(pools.deactivate(&mut world, e));
        assert!(!world.has::<Active>(e));
        assert!(!world.has::<CanShoot>(e));
        assert!(!world.get::<Lockable>(e).unwrap().locked);
        assert!(!pools.deactivate(&mut world, e));
    }

    #[test]
    fn zero_sized_pool_fails_allocation() {
        let mut world = World::new();
        let sizes = PoolSettings {
            power_ups: 0,
            ..small()
        };
        assert!(matches!(
            Pools::allocate(&mut world, &sizes),
            Err(WorldError::ZeroCapacity { pool: "power_ups" })
        ));
    }
}
