//! Gas-liquid transfer and headspace pressure.
//!
//! Henry's constants are kmol/(m³·bar); headspace concentrations become
//! partial pressures through p = c·R·T with R in bar·m³/(kmol·K). Bar is the
//! only pressure unit used here.

use std::sync::Arc;

use ad_core::constants::{R_BAR_M3_PER_KMOL_K, R_J_PER_MOL_K};
use ad_core::{MolarEnergy, SpeciesId, j_per_mol};
use ad_species::catalog::names;
use ad_species::Registry;
use nalgebra::DVector;

use crate::error::{ChemError, ChemResult};
use crate::pcm::PcmResult;
use crate::vant_hoff::{check_temperature, vant_hoff};

/// Which dissolved concentration drives transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DissolvedForm {
    /// The liquid species itself
    Total,
    /// Free CO₂ from the equilibrium solve
    FreeCo2,
    /// Free H₂S from the equilibrium solve
    FreeH2s,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GasSpec {
    pub name: &'static str,
    pub liquid: &'static str,
    pub headspace: &'static str,
    pub dissolved: DissolvedForm,
    /// Henry's constant at the reference temperature [kmol/(m³·bar)]
    pub kh_ref: f64,
    pub delta_h: MolarEnergy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GasTable {
    pub gases: Vec<GasSpec>,
    /// Water vapour pressure at the reference temperature [bar]
    pub p_h2o_ref: f64,
    pub p_h2o_delta_h: MolarEnergy,
}

impl Default for GasTable {
    fn default() -> Self {
        let gas = |name, liquid, headspace, dissolved, kh_ref, dh| GasSpec {
            name,
            liquid,
            headspace,
            dissolved,
            kh_ref,
            delta_h: j_per_mol(dh),
        };
        Self {
            gases: vec![
                gas("H2", names::S_H2, names::G_H2, DissolvedForm::Total, 7.8e-4, -4_180.0),
                gas("CH4", names::S_CH4, names::G_CH4, DissolvedForm::Total, 1.4e-3, -14_240.0),
                gas("CO2", names::S_IC, names::G_CO2, DissolvedForm::FreeCo2, 3.5e-2, -19_410.0),
                gas("H2S", names::S_IS, names::G_H2S, DissolvedForm::FreeH2s, 1.05e-1, -19_180.0),
            ],
            p_h2o_ref: 0.0313,
            p_h2o_delta_h: j_per_mol(5_290.0 * R_J_PER_MOL_K),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ResolvedGas {
    name: &'static str,
    liquid: SpeciesId,
    headspace: SpeciesId,
    dissolved: DissolvedForm,
    /// Henry's constant at the operating temperature
    kh: f64,
}

/// Transfer of one gas, positive from liquid to headspace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferRate {
    pub gas: &'static str,
    pub liquid: SpeciesId,
    pub headspace: SpeciesId,
    /// kmol per m³ liquid per day
    pub molar: f64,
    /// kg basis per m³ liquid per day
    pub basis: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasComponent {
    pub gas: &'static str,
    pub headspace: SpeciesId,
    /// bar
    pub partial_pressure: f64,
    /// Fraction of total headspace pressure, water vapour included
    pub mole_fraction: f64,
    /// Share of the outflow [m³/d]
    pub flow: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Headspace {
    /// bar
    pub total_pressure: f64,
    /// bar
    pub water_pressure: f64,
    /// Gas outflow at headspace conditions [m³/d]
    pub q_gas: f64,
    pub gases: Vec<GasComponent>,
}

impl Headspace {
    pub fn component(&self, gas: &str) -> Option<&GasComponent> {
        self.gases.iter().find(|g| g.gas == gas)
    }
}

/// Henry's-law transfer bound to one registry and one temperature.
#[derive(Debug, Clone)]
pub struct GasTransfer {
    registry: Arc<Registry>,
    gases: Vec<ResolvedGas>,
    t_op_k: f64,
    kla: f64,
    p_h2o: f64,
}

impl GasTransfer {
    pub fn new(
        registry: Arc<Registry>,
        table: &GasTable,
        t_op_k: f64,
        t_ref_k: f64,
        kla: f64,
    ) -> ChemResult<Self> {
        let t_op = check_temperature(t_op_k)?;
        let t_ref = check_temperature(t_ref_k)?;
        if !(kla.is_finite() && kla >= 0.0) {
            return Err(ChemError::InvalidArg {
                what: "kLa must be finite and non-negative",
            });
        }

        let gases = table
            .gases
            .iter()
            .map(|g| -> ChemResult<ResolvedGas> {
                Ok(ResolvedGas {
                    name: g.name,
                    liquid: registry.lookup(g.liquid)?,
                    headspace: registry.lookup(g.headspace)?,
                    dissolved: g.dissolved,
                    kh: vant_hoff(g.kh_ref, g.delta_h, t_ref, t_op),
                })
            })
            .collect::<ChemResult<Vec<_>>>()?;

        Ok(Self {
            registry,
            gases,
            t_op_k: t_op,
            kla,
            p_h2o: vant_hoff(table.p_h2o_ref, table.p_h2o_delta_h, t_ref, t_op),
        })
    }

    pub fn kla(&self) -> f64 {
        self.kla
    }

    pub fn water_pressure(&self) -> f64 {
        self.p_h2o
    }

    /// Henry's constant of one gas at the operating temperature.
    pub fn henry(&self, gas: &str) -> Option<f64> {
        self.gases.iter().find(|g| g.name == gas).map(|g| g.kh)
    }

    /// Partial pressure [bar] of a headspace species.
    #[inline]
    pub fn partial_pressure(&self, state: &DVector<f64>, headspace: SpeciesId) -> f64 {
        self.registry.molar(state, headspace) * R_BAR_M3_PER_KMOL_K * self.t_op_k
    }

    /// kLa·(C − KH·p) for every gas.
    pub fn transfer_rates(
        &self,
        state: &DVector<f64>,
        pcm: &PcmResult,
    ) -> ChemResult<Vec<TransferRate>> {
        self.registry.check_dimension(state)?;
        self.gases
            .iter()
            .map(|g| {
                let c_liq = match g.dissolved {
                    DissolvedForm::Total => self.registry.molar(state, g.liquid),
                    DissolvedForm::FreeCo2 => pcm.co2,
                    DissolvedForm::FreeH2s => pcm.h2s,
                };
                let p = self.partial_pressure(state, g.headspace);
                let molar = self.kla * (c_liq - g.kh * p);
                if !molar.is_finite() {
                    return Err(ChemError::NonFinite {
                        what: "gas transfer rate",
                        value: molar,
                    });
                }
                Ok(TransferRate {
                    gas: g.name,
                    liquid: g.liquid,
                    headspace: g.headspace,
                    molar,
                    basis: self.registry.species(g.liquid).from_molar(molar),
                })
            })
            .collect()
    }

    /// Headspace pressure and outflow, q = max(0, k_p·(P − P_atm))·P/P_atm.
    pub fn headspace(&self, state: &DVector<f64>, k_p: f64, p_atm: f64) -> ChemResult<Headspace> {
        self.registry.check_dimension(state)?;
        if !(p_atm.is_finite() && p_atm > 0.0) {
            return Err(ChemError::InvalidArg {
                what: "atmospheric pressure must be positive",
            });
        }

        let partials: Vec<(&ResolvedGas, f64)> = self
            .gases
            .iter()
            .map(|g| (g, self.partial_pressure(state, g.headspace)))
            .collect();
        let total = self.p_h2o + partials.iter().map(|(_, p)| p).sum::<f64>();
        let q_gas = (k_p * (total - p_atm)).max(0.0) * total / p_atm;

        let gases = partials
            .into_iter()
            .map(|(g, p)| {
                let fraction = if total > 0.0 { p / total } else { 0.0 };
                GasComponent {
                    gas: g.name,
                    headspace: g.headspace,
                    partial_pressure: p,
                    mole_fraction: fraction,
                    flow: q_gas * fraction,
                }
            })
            .collect();

        Ok(Headspace {
            total_pressure: total,
            water_pressure: self.p_h2o,
            q_gas,
            gases,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pcm::PcmSolver;
    use crate::vant_hoff::EquilibriumTable;
    use ad_core::constants::{P_ATM_BAR, T_STANDARD_K};
    use ad_species::catalog;

    const T_OP: f64 = 308.15;

    fn setup() -> (Arc<Registry>, GasTransfer, PcmSolver) {
        let reg = Arc::new(catalog::default_registry().unwrap());
        let gas = GasTransfer::new(reg.clone(), &GasTable::default(), T_OP, T_STANDARD_K, 200.0)
            .unwrap();
        let set = EquilibriumTable::default().resolve(T_OP, T_STANDARD_K).unwrap();
        let pcm = PcmSolver::new(reg.clone(), set).unwrap();
        (reg, gas, pcm)
    }

    #[test]
    fn henry_constants_fall_with_temperature() {
        let (_, gas, _) = setup();
        assert!(gas.henry("CH4").unwrap() < 1.4e-3);
        assert!(gas.henry("CO2").unwrap() < 3.5e-2);
        // BSM2 at 35 °C: KH_co2 ≈ 0.0271
        assert!((gas.henry("CO2").unwrap() - 0.0271).abs() < 5e-4);
    }

    #[test]
    fn reference_temperature_returns_tabulated_constants() {
        let reg = Arc::new(catalog::default_registry().unwrap());
        let table = GasTable::default();
        let gas = GasTransfer::new(reg, &table, T_STANDARD_K, T_STANDARD_K, 200.0).unwrap();
        for g in &table.gases {
            let kh = gas.henry(g.name).unwrap();
            assert!((kh - g.kh_ref).abs() <= 1e-15 * g.kh_ref, "{}: {kh}", g.name);
        }
        assert!((gas.water_pressure() - table.p_h2o_ref).abs() <= 1e-15);
    }

    #[test]
    fn water_vapour_matches_bsm2() {
        let (_, gas, _) = setup();
        // 0.0313·exp(5290·(1/298.15 − 1/308.15)) ≈ 0.0557 bar
        assert!((gas.water_pressure() - 0.0557).abs() < 5e-4);
    }

    #[test]
    fn methane_leaves_supersaturated_liquid() {
        let (reg, gas, pcm) = setup();
        let state = reg.state_from_named([(names::S_CH4, 0.1)]).unwrap();
        let eq = pcm.solve_ph(&state).unwrap();
        let rates = gas.transfer_rates(&state, &eq).unwrap();
        let ch4 = rates.iter().find(|r| r.gas == "CH4").unwrap();
        // 0.1 kg COD/m³ at 64 kg COD/kmol, empty headspace
        assert!((ch4.molar - 200.0 * 0.1 / 64.0).abs() < 1e-9);
        assert!((ch4.basis - 200.0 * 0.1).abs() < 1e-9);
    }

    #[test]
    fn equilibrium_gives_zero_transfer() {
        let (reg, gas, pcm) = setup();
        let kh = gas.henry("CH4").unwrap();
        let c_gas = 0.5 / (R_BAR_M3_PER_KMOL_K * T_OP) * 64.0;
        let c_liq = kh * 0.5 * 64.0;
        let state = reg
            .state_from_named([(names::S_CH4, c_liq), (names::G_CH4, c_gas)])
            .unwrap();
        let eq = pcm.solve_ph(&state).unwrap();
        let rates = gas.transfer_rates(&state, &eq).unwrap();
        let ch4 = rates.iter().find(|r| r.gas == "CH4").unwrap();
        assert!(ch4.molar.abs() < 1e-12);
    }

    #[test]
    fn headspace_pressure_and_outflow() {
        let (reg, gas, _) = setup();
        // 0.6 bar methane, 0.4 bar CO2
        let rt = R_BAR_M3_PER_KMOL_K * T_OP;
        let state = reg
            .state_from_named([
                (names::G_CH4, 0.6 / rt * 64.0),
                (names::G_CO2, 0.4 / rt * 12.011),
            ])
            .unwrap();
        let hs = gas.headspace(&state, 5e4, P_ATM_BAR).unwrap();
        let expected_p = 1.0 + gas.water_pressure();
        assert!((hs.total_pressure - expected_p).abs() < 1e-9);
        let q = 5e4 * (expected_p - P_ATM_BAR) * expected_p / P_ATM_BAR;
        assert!((hs.q_gas - q).abs() < 1e-6 * q);
        let ch4 = hs.component("CH4").unwrap();
        assert!((ch4.partial_pressure - 0.6).abs() < 1e-9);
        assert!((ch4.flow - q * 0.6 / expected_p).abs() < 1e-6 * q);
    }

    #[test]
    fn no_outflow_below_atmospheric() {
        let (reg, gas, _) = setup();
        let hs = gas.headspace(&reg.zeros(), 5e4, P_ATM_BAR).unwrap();
        assert_eq!(hs.q_gas, 0.0);
    }
}
