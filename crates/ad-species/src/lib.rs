//! ad-species: component registry for the digester model.
//!
//! Provides:
//! - Species metadata (basis, COD factor, charge, elemental content)
//! - The [`Registry`]: name lookup, molar conversion, state validation
//! - The default extended catalog (62 liquid species + 4 headspace gases)
//!
//! # Example
//!
//! ```
//! use ad_species::{catalog::{self, names}, Registry};
//!
//! let registry: Registry = catalog::default_registry().unwrap();
//! let ac = registry.lookup(names::S_AC).unwrap();
//! let state = registry.state_from_named([(names::S_AC, 0.64)]).unwrap();
//! // 0.64 kg COD/m³ of acetate is 10 mmol/L
//! assert!((registry.molar(&state, ac) - 0.01).abs() < 1e-12);
//! ```

pub mod catalog;
pub mod error;
pub mod registry;
pub mod species;

pub use error::{SpeciesError, SpeciesResult};
pub use registry::Registry;
pub use species::{Basis, Category, Element, ElementalContent, Measure, Phase, Species};
