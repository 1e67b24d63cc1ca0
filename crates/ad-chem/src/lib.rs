//! ad-chem: equilibrium chemistry for the digester model.
//!
//! - van't Hoff correction and the acid-base constant table
//! - charge-balance pH solver (Brent in pH space on [0, 14])
//! - Henry's-law gas transfer and headspace pressure
//! - mineral saturation interface

pub mod brent;
pub mod error;
pub mod gas;
pub mod pcm;
pub mod saturation;
pub mod vant_hoff;

pub use brent::{BrentConfig, BrentResult, brent};
pub use error::{ChemError, ChemResult};
pub use gas::{DissolvedForm, GasComponent, GasSpec, GasTable, GasTransfer, Headspace, TransferRate};
pub use pcm::{PcmResult, PcmSolver};
pub use saturation::{MineralRatio, SolubilityProduct, SolubilityTable, saturation_index};
pub use vant_hoff::{EquilibriumConstant, EquilibriumSet, EquilibriumTable, vant_hoff};
