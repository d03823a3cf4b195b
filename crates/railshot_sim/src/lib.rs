//! Railshot Simulation
//!
//! The on-rails combat core:
//! - Gameplay components and their pre-allocated pools
//! - Per-frame systems (movement, waves, lock-on, projectiles, return fire,
//!   explosions, power-ups) and render snapshots
//! - The game session state machine
//! - Rail and beat collaborators
//! - [`Simulation`], the frame driver that ties them together

pub mod beat;
pub mod components;
mod error;
pub mod pools;
pub mod rail;
pub mod session;
mod simulation;
pub mod systems;

pub use beat::{BeatSignal, NeverOnBeat, TempoGrid};
pub use error::SimulationError;
pub use rail::{CatmullRomRail, LinearRail, RailPath, RailPose};
pub use session::{GameEvent, GameSession, GameState};
pub use simulation::{FrameReport, Simulation, OVERDRIVE_FIRE_INTERVAL};
pub use systems::snapshot::RenderSnapshot;
