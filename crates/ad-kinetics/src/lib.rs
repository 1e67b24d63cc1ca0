//! ad-kinetics: stoichiometry and rate laws.
//!
//! Processes are declared by species name ([`ProcessDef`]), then resolved,
//! closed and validated once by [`ProcessSet::register`]. The default set
//! comes from [`build_processes`].

pub mod error;
pub mod library;
pub mod params;
pub mod process;
pub mod terms;

pub use error::{KineticsError, KineticsResult};
pub use library::{
    KineticIndex, ProcessGroup, build_processes, build_processes_with, default_process_defs,
};
pub use params::KineticParams;
pub use process::{Process, ProcessDef, ProcessSet, RateContext, RateDef, TermDef};
