//! Error types for simulation operations.

use ad_chem::ChemError;
use ad_core::CoreError;
use ad_kinetics::KineticsError;
use ad_species::SpeciesError;
use thiserror::Error;

use crate::sim::SimRecord;

/// Errors encountered during a reactor simulation.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("Species error: {0}")]
    Species(#[from] SpeciesError),

    #[error("Chemistry error: {0}")]
    Chem(#[from] ChemError),

    #[error("Kinetics error: {0}")]
    Kinetics(#[from] KineticsError),

    #[error("Newton iteration did not converge in {iterations} iterations (scaled update {norm:e})")]
    ConvergenceFailed { iterations: usize, norm: f64 },

    #[error("Newton iterate went negative: entry {index} = {value:e}")]
    NegativeIterate { index: usize, value: f64 },

    #[error("Integrator diverged at t = {t} d: step {dt:e} d below minimum ({what})")]
    IntegratorDivergence { t: f64, dt: f64, what: String },

    #[error("Step limit of {steps} reached")]
    StepLimit { steps: usize },

    /// A run stopped early. `partial` ends with the last valid state.
    #[error("Run aborted at t = {t} d: {source}")]
    Aborted {
        t: f64,
        source: Box<SimError>,
        partial: Box<SimRecord>,
    },
}

pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    /// A negative or non-finite state reached the derivative.
    pub fn is_non_physical(&self) -> bool {
        matches!(
            self,
            SimError::Species(SpeciesError::NonPhysicalState { .. })
                | SimError::Chem(ChemError::Species(SpeciesError::NonPhysicalState { .. }))
        )
    }

    /// Failures the adaptive integrator answers with a smaller step.
    pub(crate) fn rejects_step(&self) -> bool {
        self.is_non_physical()
            || matches!(
                self,
                SimError::ConvergenceFailed { .. } | SimError::NegativeIterate { .. }
            )
    }

    /// The innermost cause of an aborted run.
    pub fn root_cause(&self) -> &SimError {
        match self {
            SimError::Aborted { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
