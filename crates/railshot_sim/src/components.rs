//! Gameplay components
//!
//! Every pooled entity is pre-built with the full component set of its kind;
//! activation only rewrites values and adds `Active`. The single exception
//! is [`CanShoot`], whose presence is the capability and is toggled per spawn.

use railshot_core::define_component;
use railshot_core::ecs::Entity;
use railshot_core::math::Vec3;
use std::fmt;

/// Where pooled entities wait while inactive.
pub const OFFSCREEN: Vec3 = Vec3::new(0.0, 0.0, -1000.0);

/// Packed `0xRRGGBB` color handed through to the renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rgb(pub u32);

impl Rgb {
    pub fn channels(self) -> [f32; 3] {
        let [_, r, g, b] = self.0.to_be_bytes();
        [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position(pub Vec3);
define_component!(Position, 10, "Position");

/// Per-second displacement, consumed by the movement system only.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Velocity(pub Vec3);
define_component!(Velocity, 11, "Velocity");

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    #[default]
    Basic,
    Armored,
    Fast,
}

/// Fixed per-kind numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyProfile {
    pub base_speed: f32,
    pub health: i32,
    pub scale: f32,
    pub color: Rgb,
    /// Probability that a fresh spawn gets [`CanShoot`].
    pub shooter_chance: f32,
    pub shot_cooldown: f32,
    pub shot_chance: f32,
}

impl EnemyKind {
    pub const fn profile(self) -> EnemyProfile {
        match self {
            EnemyKind::Basic => EnemyProfile {
                base_speed: 15.0,
                health: 1,
                scale: 0.5,
                color: Rgb(0xff0044),
                shooter_chance: 0.3,
                shot_cooldown: 2.5,
                shot_chance: 0.3,
            },
            EnemyKind::Armored => EnemyProfile {
                base_speed: 8.0,
                health: 3,
                scale: 0.8,
                color: Rgb(0xffaa00),
                shooter_chance: 1.0,
                shot_cooldown: 1.5,
                shot_chance: 0.5,
            },
            EnemyKind::Fast => EnemyProfile {
                base_speed: 25.0,
                health: 1,
                scale: 0.3,
                color: Rgb(0x00ffaa),
                shooter_chance: 0.0,
                shot_cooldown: 0.0,
                shot_chance: 0.0,
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EnemyKind::Basic => "basic",
            EnemyKind::Armored => "armored",
            EnemyKind::Fast => "fast",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub health: i32,
    pub max_health: i32,
    pub spawn_time: f32,
}
define_component!(Enemy, 12, "Enemy");

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Lockable {
    pub in_range: bool,
    pub locked: bool,
    /// Distance to the player when last evaluated.
    pub priority: f32,
}
define_component!(Lockable, 13, "Lockable");

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CanShoot {
    pub last_shot_time: f32,
    pub cooldown: f32,
    pub chance: f32,
}
define_component!(CanShoot, 14, "CanShoot");

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PatternKind {
    #[default]
    Linear,
    Sine,
    Zigzag,
    Circular,
    Spiral,
}

/// Secondary motion layered over an enemy's velocity.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MovementPattern {
    pub kind: PatternKind,
    pub amplitude: f32,
    pub frequency: f32,
    pub phase: f32,
}
define_component!(MovementPattern, 15, "MovementPattern");

/// Player shot flying toward the position its target had at fire time.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Projectile {
    pub start: Vec3,
    pub target: Vec3,
    pub target_entity: Option<Entity>,
    /// Activation serial the target had at fire time. A pooled and reused
    /// target no longer matches it.
    pub target_activation: u32,
    pub progress: f32,
    pub speed: f32,
}
define_component!(Projectile, 16, "Projectile");

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnemyProjectile {
    pub start: Vec3,
    pub target: Vec3,
    pub progress: f32,
    pub speed: f32,
    pub damage: u32,
}
define_component!(EnemyProjectile, 17, "EnemyProjectile");

/// Cosmetic burst fragment. Moves itself; it carries no [`Velocity`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExplosionParticle {
    pub start_time: f32,
    pub lifetime: f32,
    pub velocity: Vec3,
    pub color: Rgb,
    pub scale: f32,
}
define_component!(ExplosionParticle, 18, "ExplosionParticle");

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PowerUpKind {
    #[default]
    Shield,
    Overdrive,
    Multilock,
}

impl PowerUpKind {
    pub fn color(self) -> Rgb {
        match self {
            PowerUpKind::Shield => Rgb(0x00ffff),
            PowerUpKind::Overdrive => Rgb(0xff00ff),
            PowerUpKind::Multilock => Rgb(0xffff00),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PowerUpKind::Shield => "shield",
            PowerUpKind::Overdrive => "overdrive",
            PowerUpKind::Multilock => "multilock",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub spawn_time: f32,
    pub collected: bool,
    pub magnetizing: bool,
}
define_component!(PowerUp, 19, "PowerUp");

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PoolKind {
    #[default]
    Enemy,
    Projectile,
    EnemyProjectile,
    Particle,
    PowerUp,
}

/// Records which pool pre-spawned an entity.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pooled {
    pub pool: PoolKind,
}
define_component!(Pooled, 20, "Pooled");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_match_kind_table() {
        let armored = EnemyKind::Armored.profile();
        assert_eq!(armored.health, 3);
        assert_eq!(armored.shooter_chance, 1.0);
        assert_eq!(EnemyKind::Fast.profile().shooter_chance, 0.0);
        assert_eq!(EnemyKind::Basic.profile().color.to_string(), "#ff0044");
    }

    #[test]
    fn rgb_channels_unpack() {
        assert_eq!(Rgb(0xff0000).channels(), [1.0, 0.0, 0.0]);
        assert_eq!(Rgb(0x00ffaa).to_string(), "#00ffaa");
    }
}
