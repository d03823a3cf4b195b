//! Railshot Services Layer
//!
//! Host-facing collaborators the simulation consumes: the normalized input
//! snapshot and the session settings document.

pub mod input;
pub mod settings;

pub use input::{FireEdges, InputSnapshot};
pub use settings::{Difficulty, DifficultyPreset, Settings, SettingsError};
