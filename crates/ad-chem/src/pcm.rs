//! Charge-balance pH solver and acid-base speciation.
//!
//! All concentrations in this module are molar [kmol/m³ = mol/L], obtained
//! through [`Registry::molar`]. The charge residual
//!
//! ```text
//! r(h) = h + [NH4+] + Σ z·c(strong ions)
//!        − [OH-] − [HCO3-] − 2[CO3--] − [HS-]
//!        − [H2PO4-] − 2[HPO4--] − 3[PO4---]
//!        − [Ac-] − [Pr-] − [Bu-] − [Va-]
//! ```
//!
//! is strictly decreasing in pH, so a sign change on [0, 14] brackets exactly
//! one root.

use std::sync::Arc;

use ad_core::SpeciesId;
use ad_species::catalog::names;
use ad_species::{Basis, Category, Phase, Registry};
use nalgebra::DVector;
use tracing::debug;

use crate::brent::{BrentConfig, brent};
use crate::error::{ChemError, ChemResult};
use crate::vant_hoff::EquilibriumSet;

pub const PH_MIN: f64 = 0.0;
pub const PH_MAX: f64 = 14.0;

/// Half-width of the pH window tried around a hint.
pub const HINT_WINDOW: f64 = 1.0;

#[inline]
fn h_of(ph: f64) -> f64 {
    10f64.powf(-ph)
}

/// Positions the solver needs, resolved once.
#[derive(Debug, Clone, Copy)]
struct PcmIds {
    s_in: SpeciesId,
    s_ic: SpeciesId,
    s_is: SpeciesId,
    s_ip: SpeciesId,
    s_ac: SpeciesId,
    s_pro: SpeciesId,
    s_bu: SpeciesId,
    s_va: SpeciesId,
}

/// Molar totals entering the charge balance.
#[derive(Debug, Clone, Copy, Default)]
struct Totals {
    n: f64,
    c: f64,
    s: f64,
    p: f64,
    ac: f64,
    pro: f64,
    bu: f64,
    va: f64,
    /// Σ z·c over strong ions [keq/m³]
    strong: f64,
}

/// Outcome of one equilibrium solve.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmResult {
    pub ph: f64,
    /// Hydrogen-ion concentration [kmol/m³]
    pub h: f64,
    /// Charge residual at the root [keq/m³]
    pub residual: f64,
    pub iterations: usize,
    pub oh: f64,
    pub nh4: f64,
    /// Free ammonia
    pub nh3: f64,
    /// Free (dissolved) CO₂
    pub co2: f64,
    pub hco3: f64,
    pub co3: f64,
    /// Free H₂S
    pub h2s: f64,
    pub hs: f64,
    pub h3po4: f64,
    pub h2po4: f64,
    pub hpo4: f64,
    pub po4: f64,
    pub ac: f64,
    pub pro: f64,
    pub bu: f64,
    pub va: f64,
    /// One entry per precipitate in [`PcmSolver::minerals`]; unity activities.
    pub mineral_activities: Vec<f64>,
}

/// Charge-balance solver bound to one registry and one temperature.
#[derive(Debug, Clone)]
pub struct PcmSolver {
    registry: Arc<Registry>,
    set: EquilibriumSet,
    config: BrentConfig,
    ids: PcmIds,
    strong_ions: Vec<(SpeciesId, f64)>,
    minerals: Vec<SpeciesId>,
}

impl PcmSolver {
    pub fn new(registry: Arc<Registry>, set: EquilibriumSet) -> ChemResult<Self> {
        let ids = PcmIds {
            s_in: registry.lookup(names::S_IN)?,
            s_ic: registry.lookup(names::S_IC)?,
            s_is: registry.lookup(names::S_IS)?,
            s_ip: registry.lookup(names::S_IP)?,
            s_ac: registry.lookup(names::S_AC)?,
            s_pro: registry.lookup(names::S_PRO)?,
            s_bu: registry.lookup(names::S_BU)?,
            s_va: registry.lookup(names::S_VA)?,
        };
        let strong_ions = registry
            .iter()
            .filter(|(_, sp)| sp.phase == Phase::Liquid && sp.charge != 0.0)
            .map(|(id, sp)| (id, sp.charge))
            .collect();
        let minerals = registry
            .iter()
            .filter(|(_, sp)| sp.category == Category::MineralPrecipitate && sp.basis == Basis::Mass)
            .map(|(id, _)| id)
            .collect();
        Ok(Self {
            registry,
            set,
            config: BrentConfig::default(),
            ids,
            strong_ions,
            minerals,
        })
    }

    pub fn with_config(mut self, config: BrentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn equilibrium(&self) -> &EquilibriumSet {
        &self.set
    }

    /// Precipitates the activity vector refers to, in registry order.
    pub fn minerals(&self) -> &[SpeciesId] {
        &self.minerals
    }

    /// Solve on the full [0, 14] bracket.
    pub fn solve_ph(&self, state: &DVector<f64>) -> ChemResult<PcmResult> {
        let totals = self.totals(state)?;
        self.solve_on(&totals, PH_MIN, PH_MAX)
    }

    /// Try a ±1 window around `ph_hint` first, then the full bracket.
    pub fn solve_ph_with_hint(&self, state: &DVector<f64>, ph_hint: f64) -> ChemResult<PcmResult> {
        let totals = self.totals(state)?;
        if ph_hint.is_finite() {
            let lo = (ph_hint - HINT_WINDOW).max(PH_MIN);
            let hi = (ph_hint + HINT_WINDOW).min(PH_MAX);
            if lo < hi {
                match self.solve_on(&totals, lo, hi) {
                    Ok(result) => return Ok(result),
                    Err(ChemError::NoEquilibriumBracket { .. }) => {
                        debug!(ph_hint, "pH hint window missed the root; using full bracket");
                    }
                    Err(e) => return Err(e),
                }
            }
        }
        self.solve_on(&totals, PH_MIN, PH_MAX)
    }

    /// Charge residual [keq/m³] of `state` at hydrogen-ion concentration `h`.
    pub fn charge_residual(&self, state: &DVector<f64>, h: f64) -> ChemResult<f64> {
        if !(h.is_finite() && h > 0.0) {
            return Err(ChemError::InvalidArg {
                what: "hydrogen-ion concentration must be positive",
            });
        }
        let totals = self.totals(state)?;
        Ok(self.residual(&totals, h))
    }

    fn totals(&self, state: &DVector<f64>) -> ChemResult<Totals> {
        let reg = &*self.registry;
        reg.check_state(state)?;
        let ids = &self.ids;
        let strong = self
            .strong_ions
            .iter()
            .map(|&(id, z)| z * reg.molar(state, id))
            .sum();
        Ok(Totals {
            n: reg.molar(state, ids.s_in),
            c: reg.molar(state, ids.s_ic),
            s: reg.molar(state, ids.s_is),
            p: reg.molar(state, ids.s_ip),
            ac: reg.molar(state, ids.s_ac),
            pro: reg.molar(state, ids.s_pro),
            bu: reg.molar(state, ids.s_bu),
            va: reg.molar(state, ids.s_va),
            strong,
        })
    }

    fn solve_on(&self, totals: &Totals, ph_lo: f64, ph_hi: f64) -> ChemResult<PcmResult> {
        let f = |ph: f64| self.residual(totals, h_of(ph));
        let r_lo = f(ph_lo);
        let r_hi = f(ph_hi);
        if !(r_lo.is_finite() && r_hi.is_finite()) {
            return Err(ChemError::NonFinite {
                what: "charge residual",
                value: if r_lo.is_finite() { r_hi } else { r_lo },
            });
        }
        if r_lo.signum() == r_hi.signum() && r_lo != 0.0 && r_hi != 0.0 {
            return Err(ChemError::NoEquilibriumBracket {
                ph_low: ph_lo,
                ph_high: ph_hi,
                residual_low: r_lo,
                residual_high: r_hi,
            });
        }

        let root = brent(f, ph_lo, ph_hi, r_lo, r_hi, &self.config)?;
        debug!(ph = root.root, iterations = root.iterations, "pcm solve");
        Ok(self.speciate(totals, root.root, root.value, root.iterations))
    }

    fn residual(&self, t: &Totals, h: f64) -> f64 {
        let s = self.speciation(t, h);
        h + s.nh4 + t.strong
            - s.oh
            - s.hco3
            - 2.0 * s.co3
            - s.hs
            - s.h2po4
            - 2.0 * s.hpo4
            - 3.0 * s.po4
            - s.ac
            - s.pro
            - s.bu
            - s.va
    }

    fn speciation(&self, t: &Totals, h: f64) -> Forms {
        let k = &self.set;

        let carb_d = h * h + k.ka_co2 * h + k.ka_co2 * k.ka_hco3;
        let k12 = k.ka_h3po4 * k.ka_h2po4;
        let k123 = k12 * k.ka_hpo4;
        let phos_d = h * h * h + k.ka_h3po4 * h * h + k12 * h + k123;
        let anion = |total: f64, ka: f64| total * ka / (ka + h);

        Forms {
            oh: k.kw / h,
            nh4: t.n * h / (k.ka_nh4 + h),
            nh3: anion(t.n, k.ka_nh4),
            co2: t.c * h * h / carb_d,
            hco3: t.c * k.ka_co2 * h / carb_d,
            co3: t.c * k.ka_co2 * k.ka_hco3 / carb_d,
            h2s: t.s * h / (k.ka_h2s + h),
            hs: anion(t.s, k.ka_h2s),
            h3po4: t.p * h * h * h / phos_d,
            h2po4: t.p * k.ka_h3po4 * h * h / phos_d,
            hpo4: t.p * k12 * h / phos_d,
            po4: t.p * k123 / phos_d,
            ac: anion(t.ac, k.ka_ac),
            pro: anion(t.pro, k.ka_pro),
            bu: anion(t.bu, k.ka_bu),
            va: anion(t.va, k.ka_va),
        }
    }

    fn speciate(&self, t: &Totals, ph: f64, residual: f64, iterations: usize) -> PcmResult {
        let h = h_of(ph);
        let s = self.speciation(t, h);
        PcmResult {
            ph,
            h,
            residual,
            iterations,
            oh: s.oh,
            nh4: s.nh4,
            nh3: s.nh3,
            co2: s.co2,
            hco3: s.hco3,
            co3: s.co3,
            h2s: s.h2s,
            hs: s.hs,
            h3po4: s.h3po4,
            h2po4: s.h2po4,
            hpo4: s.hpo4,
            po4: s.po4,
            ac: s.ac,
            pro: s.pro,
            bu: s.bu,
            va: s.va,
            mineral_activities: vec![1.0; self.minerals.len()],
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Forms {
    oh: f64,
    nh4: f64,
    nh3: f64,
    co2: f64,
    hco3: f64,
    co3: f64,
    h2s: f64,
    hs: f64,
    h3po4: f64,
    h2po4: f64,
    hpo4: f64,
    po4: f64,
    ac: f64,
    pro: f64,
    bu: f64,
    va: f64,
}
