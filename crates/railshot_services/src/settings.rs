//! Settings management
//!
//! A single JSON document tunes a session. Every field has a default, so a
//! file only needs to name what it overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("settings are not valid JSON")]
    Json(#[from] serde_json::Error),

    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// Numbers a difficulty level implies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyPreset {
    /// Multiplies the wave spawn frequency.
    pub enemy_spawn_rate: f32,
    /// Multiplies enemy base speed.
    pub enemy_speed: f32,
    pub max_multiplier: u32,
    pub beat_window_ms: f32,
}

impl Difficulty {
    pub fn preset(self) -> DifficultyPreset {
        match self {
            Difficulty::Easy => DifficultyPreset {
                enemy_spawn_rate: 1.0,
                enemy_speed: 0.7,
                max_multiplier: 50,
                beat_window_ms: 150.0,
            },
            Difficulty::Medium => DifficultyPreset {
                enemy_spawn_rate: 2.0,
                enemy_speed: 1.0,
                max_multiplier: 100,
                beat_window_ms: 100.0,
            },
            Difficulty::Hard => DifficultyPreset {
                enemy_spawn_rate: 4.0,
                enemy_speed: 1.5,
                max_multiplier: 200,
                beat_window_ms: 50.0,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockOnSettings {
    pub max_locks: usize,
    pub lock_range: f32,
    /// Full width of the square lock box in normalized screen units.
    pub lock_box_size: f32,
}

impl Default for LockOnSettings {
    fn default() -> Self {
        Self {
            max_locks: 8,
            lock_range: 80.0,
            lock_box_size: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    pub enemies: usize,
    pub projectiles: usize,
    pub enemy_projectiles: usize,
    pub particles: usize,
    pub power_ups: usize,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            enemies: 100,
            projectiles: 50,
            enemy_projectiles: 50,
            particles: 200,
            power_ups: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RailSettings {
    /// Rail progress gained per second (the whole track is `1.0`).
    pub speed: f32,
}

impl Default for RailSettings {
    fn default() -> Self {
        Self { speed: 0.01 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatSettings {
    pub projectile_speed: f32,
    pub enemy_projectile_speed: f32,
    pub shoot_range: f32,
    pub hit_radius: f32,
    /// Enemies further than this behind the player are pooled.
    pub despawn_distance: f32,
    pub explosion_particles: usize,
}

impl Default for CombatSettings {
    fn default() -> Self {
        Self {
            projectile_speed: 50.0,
            enemy_projectile_speed: 30.0,
            shoot_range: 60.0,
            hit_radius: 1.5,
            despawn_distance: 20.0,
            explosion_particles: 10,
        }
    }
}

/// Session settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub difficulty: Difficulty,
    pub lock_on: LockOnSettings,
    pub pools: PoolSettings,
    pub rail: RailSettings,
    pub combat: CombatSettings,
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            lock_on: LockOnSettings::default(),
            pools: PoolSettings::default(),
            rail: RailSettings::default(),
            combat: CombatSettings::default(),
            seed: 0x5EED,
        }
    }
}

impl Settings {
    /// Read, parse and validate a settings file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let settings = Self::from_json(&text)?;
        tracing::info!(
            path = %path.display(),
            difficulty = ?settings.difficulty,
            "settings loaded"
        );
        Ok(settings)
    }

    pub fn from_json(text: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn preset(&self) -> DifficultyPreset {
        self.difficulty.preset()
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        fn positive(field: &'static str, value: f32) -> Result<(), SettingsError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(SettingsError::Invalid {
                    field,
                    reason: format!("must be a positive number, got {value}"),
                })
            }
        }

        fn nonzero(field: &'static str, value: usize) -> Result<(), SettingsError> {
            if value > 0 {
                Ok(())
            } else {
                Err(SettingsError::Invalid {
                    field,
                    reason: "must be at least 1".into(),
                })
            }
        }

        nonzero("lock_on.max_locks", self.lock_on.max_locks)?;
        positive("lock_on.lock_range", self.lock_on.lock_range)?;
        positive("lock_on.lock_box_size", self.lock_on.lock_box_size)?;

        nonzero("pools.enemies", self.pools.enemies)?;
        nonzero("pools.projectiles", self.pools.projectiles)?;
        nonzero("pools.enemy_projectiles", self.pools.enemy_projectiles)?;
        nonzero("pools.particles", self.pools.particles)?;
        nonzero("pools.power_ups", self.pools.power_ups)?;

        if !(self.rail.speed.is_finite() && self.rail.speed >= 0.0) {
            return Err(SettingsError::Invalid {
                field: "rail.speed",
                reason: format!("must be zero or positive, got {}", self.rail.speed),
            });
        }

        positive("combat.projectile_speed", self.combat.projectile_speed)?;
        positive("combat.enemy_projectile_speed", self.combat.enemy_projectile_speed)?;
        positive("combat.shoot_range", self.combat.shoot_range)?;
        positive("combat.hit_radius", self.combat.hit_radius)?;
        positive("combat.despawn_distance", self.combat.despawn_distance)?;
        Ok(())
    }
}
