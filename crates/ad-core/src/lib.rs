//! ad-core: stable foundation for the digester engine.
//!
//! Contains:
//! - units (uom SI types + constructors + physical constants)
//! - numeric (finite/positive argument checks)
//! - ids (compact species identifiers)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
