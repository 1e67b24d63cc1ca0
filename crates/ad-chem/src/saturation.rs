//! Mineral saturation interface.
//!
//! Precipitation kinetics are not modelled. [`saturation_index`] keeps the
//! shape of the calculation (activities in, one ratio per mineral out) and
//! reports every mineral as exactly saturated.

use ad_core::{MolarEnergy, j_per_mol};
use ad_species::catalog::names;

use crate::error::ChemResult;
use crate::vant_hoff::{check_temperature, vant_hoff};

#[derive(Debug, Clone, PartialEq)]
pub struct SolubilityEntry {
    /// Registry id of the precipitate
    pub mineral: &'static str,
    /// Solubility product at the reference temperature
    pub ksp_ref: f64,
    pub delta_h: MolarEnergy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolubilityTable {
    pub entries: Vec<SolubilityEntry>,
}

impl Default for SolubilityTable {
    fn default() -> Self {
        let e = |mineral, log_ksp: f64, dh| SolubilityEntry {
            mineral,
            ksp_ref: 10f64.powf(log_ksp),
            delta_h: j_per_mol(dh),
        };
        Self {
            entries: vec![
                e(names::X_CCM, -8.48, -8_000.0),
                e(names::X_ACC, -8.34, -10_830.0),
                e(names::X_ACP, -25.46, 0.0),
                e(names::X_HAP, -44.33, 0.0),
                e(names::X_DCPD, -6.59, 31_000.0),
                e(names::X_OCP, -48.2, 0.0),
                e(names::X_STRUV, -13.26, -22_600.0),
                e(names::X_NEWB, -5.8, 0.0),
                e(names::X_MAGN, -7.46, -20_000.0),
                e(names::X_KSTRUV, -10.6, 0.0),
                e(names::X_FES, -3.64, 0.0),
                e(names::X_FE3PO42, -36.0, 0.0),
                e(names::X_ALPO4, -18.24, 0.0),
            ],
        }
    }
}

impl SolubilityTable {
    /// Solubility products at the operating temperature, in table order.
    pub fn resolve(&self, t_op_k: f64, t_ref_k: f64) -> ChemResult<Vec<SolubilityProduct>> {
        let t_op = check_temperature(t_op_k)?;
        let t_ref = check_temperature(t_ref_k)?;
        Ok(self
            .entries
            .iter()
            .map(|e| SolubilityProduct {
                mineral: e.mineral,
                ksp: vant_hoff(e.ksp_ref, e.delta_h, t_ref, t_op),
            })
            .collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolubilityProduct {
    pub mineral: &'static str,
    pub ksp: f64,
}

/// Ion-activity product over Ksp for one mineral.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MineralRatio {
    pub mineral: &'static str,
    pub ratio: f64,
}

/// Saturation ratio per mineral. Always 1.0.
pub fn saturation_index(
    _activities: &[f64],
    solubility_products: &[SolubilityProduct],
) -> Vec<MineralRatio> {
    solubility_products
        .iter()
        .map(|k| MineralRatio {
            mineral: k.mineral,
            ratio: 1.0,
        })
        .collect()
}
