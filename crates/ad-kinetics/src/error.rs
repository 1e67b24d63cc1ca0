//! Kinetics errors.

use ad_species::SpeciesError;
use thiserror::Error;

pub type KineticsResult<T> = Result<T, KineticsError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum KineticsError {
    /// A stoichiometric row does not close for one element or for COD.
    #[error("Process {process} does not conserve {quantity}: imbalance {imbalance:e}")]
    ImbalancedStoichiometry {
        process: String,
        quantity: String,
        imbalance: f64,
    },

    #[error("Process {process} produced a non-finite rate: {value}")]
    NonFiniteRate { process: String, value: f64 },

    #[error("Invalid process {process}: {what}")]
    InvalidProcess { process: String, what: String },

    #[error("Invalid kinetic parameters: {what}")]
    InvalidParams { what: String },

    #[error("Species error: {0}")]
    Species(#[from] SpeciesError),
}

impl KineticsError {
    pub(crate) fn invalid(process: &str, what: impl Into<String>) -> Self {
        KineticsError::InvalidProcess {
            process: process.to_string(),
            what: what.into(),
        }
    }
}
