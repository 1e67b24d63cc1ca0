//! Error types for the ad-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates
/// behind one interface for the CLI.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Scenario error: {0}")]
    Project(#[from] ad_project::ProjectError),

    #[error("Failed to write {path}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Species error: {0}")]
    Species(#[from] ad_species::SpeciesError),

    #[error("Kinetics error: {0}")]
    Kinetics(#[from] ad_kinetics::KineticsError),

    #[error("Simulation error: {0}")]
    Simulation(#[from] ad_sim::SimError),

    #[error("Run produced no records")]
    NoRecords,

    #[error("Unknown output column: {0}")]
    UnknownColumn(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for ad-app operations.
pub type AppResult<T> = Result<T, AppError>;
