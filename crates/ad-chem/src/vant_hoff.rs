//! Temperature correction of equilibrium constants.
//!
//! K(T_op) = K(T_ref) · exp((ΔH/R) · (1/T_ref − 1/T_op))
//!
//! ΔH is carried as a uom [`MolarEnergy`] and read out in J/mol; R is the
//! J/(mol·K) constant. No other unit pairing is possible through this API.

use ad_core::constants::R_J_PER_MOL_K;
use ad_core::{MolarEnergy, j_per_mol, j_per_mol_of};

use crate::error::{ChemError, ChemResult};

/// Correct `k_ref` from `t_ref_k` to `t_op_k`.
///
/// Exact at `t_op_k == t_ref_k`: the exponent is an exact zero.
pub fn vant_hoff(k_ref: f64, delta_h: MolarEnergy, t_ref_k: f64, t_op_k: f64) -> f64 {
    let dh_over_r = j_per_mol_of(delta_h) / R_J_PER_MOL_K;
    k_ref * (dh_over_r * (1.0 / t_ref_k - 1.0 / t_op_k)).exp()
}

pub(crate) fn check_temperature(t_k: f64) -> ChemResult<f64> {
    if !t_k.is_finite() {
        return Err(ChemError::NonFinite {
            what: "temperature",
            value: t_k,
        });
    }
    if t_k <= 0.0 {
        return Err(ChemError::InvalidArg {
            what: "temperature must be positive (K)",
        });
    }
    Ok(t_k)
}

/// One tabulated equilibrium constant.
#[derive(Debug, Clone, PartialEq)]
pub struct EquilibriumConstant {
    pub name: &'static str,
    /// Value at the table reference temperature
    pub k_ref: f64,
    /// Reaction enthalpy
    pub delta_h: MolarEnergy,
    /// Conjugate pair (acid form, base form)
    pub pair: (&'static str, &'static str),
}

impl EquilibriumConstant {
    pub fn new(
        name: &'static str,
        k_ref: f64,
        delta_h_j_per_mol: f64,
        pair: (&'static str, &'static str),
    ) -> Self {
        Self {
            name,
            k_ref,
            delta_h: j_per_mol(delta_h_j_per_mol),
            pair,
        }
    }

    pub fn at(&self, t_ref_k: f64, t_op_k: f64) -> f64 {
        vant_hoff(self.k_ref, self.delta_h, t_ref_k, t_op_k)
    }
}

/// Acid-base constants used by the charge balance.
#[derive(Debug, Clone, PartialEq)]
/// Values are tabulated at 298.15 K.
pub struct EquilibriumTable {
    pub kw: EquilibriumConstant,
    pub ka_nh4: EquilibriumConstant,
    pub ka_co2: EquilibriumConstant,
    pub ka_hco3: EquilibriumConstant,
    pub ka_h2s: EquilibriumConstant,
    pub ka_h3po4: EquilibriumConstant,
    pub ka_h2po4: EquilibriumConstant,
    pub ka_hpo4: EquilibriumConstant,
    pub ka_ac: EquilibriumConstant,
    pub ka_pro: EquilibriumConstant,
    pub ka_bu: EquilibriumConstant,
    pub ka_va: EquilibriumConstant,
}

impl Default for EquilibriumTable {
    fn default() -> Self {
        Self {
            kw: EquilibriumConstant::new("Kw", 1.0e-14, 55_900.0, ("H2O", "OH-")),
            ka_nh4: EquilibriumConstant::new("Ka_NH4", 5.62e-10, 51_965.0, ("NH4+", "NH3")),
            ka_co2: EquilibriumConstant::new("Ka_CO2", 4.47e-7, 7_646.0, ("CO2", "HCO3-")),
            ka_hco3: EquilibriumConstant::new("Ka_HCO3", 4.68e-11, 14_850.0, ("HCO3-", "CO3--")),
            ka_h2s: EquilibriumConstant::new("Ka_H2S", 1.0e-7, 14_300.0, ("H2S", "HS-")),
            ka_h3po4: EquilibriumConstant::new("Ka_H3PO4", 7.11e-3, -8_000.0, ("H3PO4", "H2PO4-")),
            ka_h2po4: EquilibriumConstant::new("Ka_H2PO4", 6.23e-8, 4_200.0, ("H2PO4-", "HPO4--")),
            ka_hpo4: EquilibriumConstant::new("Ka_HPO4", 4.79e-13, 14_700.0, ("HPO4--", "PO4---")),
            ka_ac: EquilibriumConstant::new("Ka_ac", 1.74e-5, 0.0, ("HAc", "Ac-")),
            ka_pro: EquilibriumConstant::new("Ka_pro", 1.32e-5, 0.0, ("HPr", "Pr-")),
            ka_bu: EquilibriumConstant::new("Ka_bu", 1.5e-5, 0.0, ("HBu", "Bu-")),
            ka_va: EquilibriumConstant::new("Ka_va", 1.38e-5, 0.0, ("HVa", "Va-")),
        }
    }
}

impl EquilibriumTable {
    pub fn entries(&self) -> [&EquilibriumConstant; 12] {
        [
            &self.kw,
            &self.ka_nh4,
            &self.ka_co2,
            &self.ka_hco3,
            &self.ka_h2s,
            &self.ka_h3po4,
            &self.ka_h2po4,
            &self.ka_hpo4,
            &self.ka_ac,
            &self.ka_pro,
            &self.ka_bu,
            &self.ka_va,
        ]
    }

    /// Evaluate every constant at the operating temperature.
    pub fn resolve(&self, t_op_k: f64, t_ref_k: f64) -> ChemResult<EquilibriumSet> {
        let t_op = check_temperature(t_op_k)?;
        let t_ref = check_temperature(t_ref_k)?;
        let at = |c: &EquilibriumConstant| c.at(t_ref, t_op);
        Ok(EquilibriumSet {
            temperature_k: t_op,
            kw: at(&self.kw),
            ka_nh4: at(&self.ka_nh4),
            ka_co2: at(&self.ka_co2),
            ka_hco3: at(&self.ka_hco3),
            ka_h2s: at(&self.ka_h2s),
            ka_h3po4: at(&self.ka_h3po4),
            ka_h2po4: at(&self.ka_h2po4),
            ka_hpo4: at(&self.ka_hpo4),
            ka_ac: at(&self.ka_ac),
            ka_pro: at(&self.ka_pro),
            ka_bu: at(&self.ka_bu),
            ka_va: at(&self.ka_va),
        })
    }
}

/// Constants resolved at one operating temperature, reused for a whole run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquilibriumSet {
    pub temperature_k: f64,
    pub kw: f64,
    pub ka_nh4: f64,
    pub ka_co2: f64,
    pub ka_hco3: f64,
    pub ka_h2s: f64,
    pub ka_h3po4: f64,
    pub ka_h2po4: f64,
    pub ka_hpo4: f64,
    pub ka_ac: f64,
    pub ka_pro: f64,
    pub ka_bu: f64,
    pub ka_va: f64,
}
