//! Registry errors.

use thiserror::Error;

pub type SpeciesResult<T> = Result<T, SpeciesError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpeciesError {
    /// A name lookup failed. Never defaulted.
    #[error("Unknown species: {name}")]
    UnknownSpecies { name: String },

    #[error("Duplicate species identifier: {name}")]
    DuplicateSpecies { name: String },

    #[error("Invalid species record {species}: {what}")]
    InvalidSpecies { species: String, what: &'static str },

    #[error("Species list is empty")]
    Empty,

    /// Negative or non-finite concentration in an incoming state.
    #[error("Non-physical state: {species} = {value}")]
    NonPhysicalState { species: String, value: f64 },

    #[error("State length {found} does not match registry size {expected}")]
    DimensionMismatch { expected: usize, found: usize },
}
