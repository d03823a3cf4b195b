//! Target acquisition under the aim reticle.
//!
//! Pass one marks which enemies are eligible (in range, ahead of the
//! player, inside the lock box around the aim point). Pass two ranks them
//! and keeps existing locks before filling free slots.

use super::SystemContext;
use crate::components::{Enemy, Lockable, Position};
use railshot_core::ecs::{Entity, World};
use railshot_core::math::{Vec2, Vec3};
use railshot_core::pool::Active;

/// Minimum depth used for the pseudo perspective divide.
const MIN_DEPTH: f32 = 10.0;
const DISTANCE_WEIGHT: f32 = 0.7;
const AIM_WEIGHT: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LockOnConfig {
    pub max_locks: usize,
    pub lock_range: f32,
    /// Full width of the square lock box in normalized screen units.
    pub lock_box_size: f32,
}

impl Default for LockOnConfig {
    fn default() -> Self {
        Self {
            max_locks: 8,
            lock_range: 80.0,
            lock_box_size: 0.3,
        }
    }
}

/// An eligible enemy and its ranking inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LockCandidate {
    pub entity: Entity,
    pub distance: f32,
    /// Screen-space distance from the aim point.
    pub aim_score: f32,
}

impl LockCandidate {
    pub fn score(&self) -> f32 {
        self.distance * DISTANCE_WEIGHT + self.aim_score * AIM_WEIGHT
    }
}

/// Pass one. Refreshes every live enemy's `Lockable.in_range` and fills
/// `out` with eligible candidates in query order.
pub fn lock_on_system(
    ctx: &mut SystemContext,
    player: Vec3,
    aim: Vec2,
    config: &LockOnConfig,
    out: &mut Vec<LockCandidate>,
) {
    out.clear();
    let half_box = config.lock_box_size / 2.0;

    ctx.world.query_into::<(Position, Enemy, Active, Lockable)>(ctx.scratch);
    for &entity in ctx.scratch.iter() {
        let Some(&Position(pos)) = ctx.world.get::<Position>(entity) else {
            continue;
        };
        let offset = pos - player;
        let distance = offset.length();

        let eligible = (distance <= config.lock_range && offset.z <= 0.0)
            .then(|| {
                let depth = offset.z.abs().max(MIN_DEPTH);
                let screen = Vec2::new(offset.x / depth, offset.y / depth);
                let diff = (screen - aim).abs();
                (diff.x <= half_box && diff.y <= half_box).then(|| diff.length())
            })
            .flatten();

        if let Some(lockable) = ctx.world.get_mut::<Lockable>(entity) {
            lockable.in_range = eligible.is_some();
            if eligible.is_some() {
                lockable.priority = distance;
            }
        }
        if let Some(aim_score) = eligible {
            out.push(LockCandidate {
                entity,
                distance,
                aim_score,
            });
        }
    }
}

/// Stable ascending sort by weighted score; equal scores keep query order.
pub fn rank(candidates: &mut [LockCandidate]) {
    candidates.sort_by(|a, b| a.score().total_cmp(&b.score()));
}

/// Pass two. Writes the new lock list into `locks` (at most `max_locks`)
/// and updates every live `Lockable.locked` flag to match.
pub fn auto_lock_targets(
    ctx: &mut SystemContext,
    player: Vec3,
    aim: Vec2,
    current: &[Entity],
    config: &LockOnConfig,
    candidates: &mut Vec<LockCandidate>,
    locks: &mut Vec<Entity>,
) {
    lock_on_system(ctx, player, aim, config, candidates);
    rank(candidates);

    // Retained locks keep the order they were acquired in.
    locks.clear();
    for &held in current {
        if locks.len() >= config.max_locks {
            break;
        }
        if candidates.iter().any(|c| c.entity == held) && !locks.contains(&held) {
            locks.push(held);
        }
    }
    for candidate in candidates.iter() {
        if locks.len() >= config.max_locks {
            break;
        }
        if !locks.contains(&candidate.entity) {
            locks.push(candidate.entity);
        }
    }

    sync_lock_flags(ctx.world, ctx.scratch, locks);
}

/// Best-ranked eligible targets, ignoring any existing lock list.
pub fn acquire_targets(
    ctx: &mut SystemContext,
    player: Vec3,
    aim: Vec2,
    config: &LockOnConfig,
    candidates: &mut Vec<LockCandidate>,
    out: &mut Vec<Entity>,
) {
    lock_on_system(ctx, player, aim, config, candidates);
    rank(candidates);
    out.clear();
    out.extend(candidates.iter().take(config.max_locks).map(|c| c.entity));
}

fn sync_lock_flags(world: &mut World, scratch: &mut Vec<Entity>, locks: &[Entity]) {
    world.query_into::<(Lockable, Active)>(scratch);
    for &entity in scratch.iter() {
        if let Some(lockable) = world.get_mut::<Lockable>(entity) {
            lockable.locked = locks.contains(&entity);
        }
    }
}

pub fn clear_all_locks(ctx: &mut SystemContext) {
    sync_lock_flags(ctx.world, ctx.scratch, &[]);
}

/// Live entities currently flagged as locked, in query order.
pub fn locked_entities(world: &World, out: &mut Vec<Entity>) {
    out.clear();
    out.extend(
        world
            .query::<(Lockable, Active)>()
            .filter(|&e| world.get::<Lockable>(e).is_some_and(|l| l.locked)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::testing::Harness;

    fn enemy_at(h: &mut Harness, pos: Vec3) -> Entity {
        let e = h.pools.enemies.activate(&mut h.world).unwrap();
        h.world.set(e, Position(pos)).unwrap();
        e
    }

    fn lock(h: &mut Harness, current: &[Entity], config: &LockOnConfig) -> Vec<Entity> {
        let mut candidates = Vec::new();
        let mut locks = Vec::new();
        auto_lock_targets(
            &mut h.ctx(0.016),
            Vec3::ZERO,
            Vec2::ZERO,
            current,
            config,
            &mut candidates,
            &mut locks,
        );
        locks
    }

    #[test]
    fn rejects_out_of_range_behind_and_outside_box() {
        let mut h = Harness::new();
        let good = enemy_at(&mut h, Vec3::new(0.0, 0.0, -20.0));
        let far = enemy_at(&mut h, Vec3::new(0.0, 0.0, -81.0));
        let behind = enemy_at(&mut h, Vec3::new(0.0, 0.0, 5.0));
        let wide = enemy_at(&mut h, Vec3::new(4.0, 0.0, -20.0));

        let locks = lock(&mut h, &[], &LockOnConfig::default());

        assert_eq!(locks, vec![good]);
        assert!(h.world.get::<Lockable>(good).unwrap().in_range);
        for e in [far, behind, wide] {
            let l = h.world.get::<Lockable>(e).unwrap();
            assert!(!l.in_range && !l.locked);
        }
    }

    #[test]
    fn near_depth_is_clamped_for_projection() {
        let mut h = Harness::new();
        // |dz| = 2 would put x = 1 far outside the box; the clamp to 10 keeps it at 0.1.
        let e = enemy_at(&mut h, Vec3::new(1.0, 0.0, -2.0));
        assert_eq!(lock(&mut h, &[], &LockOnConfig::default()), vec![e]);
    }

    #[test]
    fn never_exceeds_max_locks() {
        let mut h = Harness::new();
        for i in 0..20 {
            enemy_at(&mut h, Vec3::new(0.0, 0.0, -15.0 - i as f32));
        }
        let config = LockOnConfig {
            max_locks: 5,
            ..Default::default()
        };
        let locks = lock(&mut h, &[], &config);
        assert_eq!(locks.len(), 5);

        let mut flagged = Vec::new();
        locked_entities(&h.world, &mut flagged);
        assert_eq!(flagged.len(), 5);
    }

    #[test]
    fn closest_targets_win_free_slots() {
        let mut h = Harness::new();
        let far = enemy_at(&mut h, Vec3::new(0.0, 0.0, -30.0));
        let near = enemy_at(&mut h, Vec3::new(0.0, 0.0, -10.0));
        let mid = enemy_at(&mut h, Vec3::new(0.0, 0.0, -20.0));

        let locks = lock(
            &mut h,
            &[],
            &LockOnConfig {
                max_locks: 2,
                ..Default::default()
            },
        );
        assert_eq!(locks, vec![near, mid]);
        assert!(!h.world.get::<Lockable>(far).unwrap().locked);
    }

    #[test]
    fn existing_locks_are_retained_and_stable() {
        let mut h = Harness::new();
        let a = enemy_at(&mut h, Vec3::new(0.0, 0.0, -10.0));
        let b = enemy_at(&mut h, Vec3::new(0.0, 0.0, -20.0));
        let c = enemy_at(&mut h, Vec3::new(0.0, 0.0, -30.0));
        let config = LockOnConfig {
            max_locks: 2,
            ..Default::default()
        };

        // c was locked earlier and is still eligible, so it keeps its slot.
        let first = lock(&mut h, &[c], &config);
        assert_eq!(first, vec![c, a]);
        let second = lock(&mut h, &first, &config);
        assert_eq!(second, first);
        assert!(!h.world.get::<Lockable>(b).unwrap().locked);

        // Held locks come back in held order, not rank order.
        assert_eq!(lock(&mut h, &[b, a], &config), vec![b, a]);

        let all = LockOnConfig::default();
        let x = lock(&mut h, &[], &all);
        let y = lock(&mut h, &x, &all);
        assert_eq!(x, y);
        assert_eq!(x.len(), 3);
    }

    #[test]
    fn ties_keep_query_order() {
        let mut h = Harness::new();
        let left = enemy_at(&mut h, Vec3::new(-0.5, 0.0, -20.0));
        let right = enemy_at(&mut h, Vec3::new(0.5, 0.0, -20.0));
        let config = LockOnConfig {
            max_locks: 1,
            ..Default::default()
        };
        assert_eq!(lock(&mut h, &[], &config), vec![left]);
        assert_ne!(left, right);
    }

    #[test]
    fn ineligible_previous_locks_are_released() {
        let mut h = Harness::new();
        let a = enemy_at(&mut h, Vec3::new(0.0, 0.0, -10.0));
        let locks = lock(&mut h, &[], &LockOnConfig::default());
        assert_eq!(locks, vec![a]);

        h.world.set(a, Position(Vec3::new(0.0, 0.0, 10.0))).unwrap();
        let locks = lock(&mut h, &[a], &LockOnConfig::default());
        assert!(locks.is_empty());
        assert!(!h.world.get::<Lockable>(a).unwrap().locked);
    }

    #[test]
    fn acquire_ignores_lock_history() {
        let mut h = Harness::new();
        let near = enemy_at(&mut h, Vec3::new(0.0, 0.0, -10.0));
        let _far = enemy_at(&mut h, Vec3::new(0.0, 0.0, -40.0));
        let mut candidates = Vec::new();
        let mut out = Vec::new();
        acquire_targets(
            &mut h.ctx(0.016),
            Vec3::ZERO,
            Vec2::ZERO,
            &LockOnConfig {
                max_locks: 1,
                ..Default::default()
            },
            &mut candidates,
            &mut out,
        );
        assert_eq!(out, vec![near]);
    }
}
