use railshot_core::ecs::WorldError;
use railshot_services::SettingsError;
use thiserror::Error;

/// Startup failures. Once a [`Simulation`](crate::Simulation) exists, frame
/// work does not fail.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("invalid settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("entity pool allocation failed: {0}")]
    World(#[from] WorldError),
}
