//! Chemistry errors.

use ad_species::SpeciesError;
use thiserror::Error;

pub type ChemResult<T> = Result<T, ChemError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChemError {
    /// The charge balance does not change sign over the pH search range.
    #[error(
        "No equilibrium bracket on pH [{ph_low}, {ph_high}]: residuals {residual_low:e} and {residual_high:e} share a sign"
    )]
    NoEquilibriumBracket {
        ph_low: f64,
        ph_high: f64,
        residual_low: f64,
        residual_high: f64,
    },

    #[error("Root finding did not converge within {iterations} iterations")]
    ConvergenceFailed { iterations: usize },

    #[error("Non-finite value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Species error: {0}")]
    Species(#[from] SpeciesError),
}
