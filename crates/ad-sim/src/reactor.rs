//! Single-stage CSTR with a headspace: the pure state derivative.

use std::sync::Arc;

use ad_chem::{
    BrentConfig, EquilibriumSet, EquilibriumTable, GasComponent, GasTable, GasTransfer, MineralRatio, PcmResult,
    PcmSolver, SolubilityProduct, SolubilityTable, saturation_index,
};
use ad_core::{
    CoreError, Pressure, SpeciesId, Temperature, Volume, VolumeRate, bar, bar_of, celsius, ensure_finite,
    ensure_positive, k, kelvin_of, m3, m3_of, m3_per_day, m3_per_day_of,
};
use ad_core::constants::{P_ATM_BAR, T_STANDARD_K};
use ad_kinetics::{KineticIndex, ProcessSet, RateContext};
use ad_species::{Phase, Registry, SpeciesError};
use nalgebra::DVector;
use tracing::debug;

use crate::error::{SimError, SimResult};
use crate::model::TransientModel;

/// pH tolerance of the solve inside every derivative evaluation. Tight enough
/// that finite-difference Jacobians and Newton updates see no root noise.
pub const DERIVATIVE_PH_TOLERANCE: f64 = 1e-14;

/// Operating point in unit-carrying quantities.
#[derive(Debug, Clone, PartialEq)]
pub struct ReactorConfig {
    pub temperature: Temperature,
    /// Temperature the equilibrium and Henry's tables are quoted at
    pub reference_temperature: Temperature,
    pub liquid_volume: Volume,
    pub headspace_volume: Volume,
    pub flow: VolumeRate,
    /// Gas-liquid transfer coefficient [1/d]
    pub kla: f64,
    /// Gas outlet coefficient [m³/(d·bar)]
    pub k_p: f64,
    pub atmospheric_pressure: Pressure,
    /// Influent concentrations by species name; missing species are zero
    pub influent: Vec<(String, f64)>,
}

impl Default for ReactorConfig {
    fn default() -> Self {
        Self {
            temperature: celsius(35.0),
            reference_temperature: k(T_STANDARD_K),
            liquid_volume: m3(3_400.0),
            headspace_volume: m3(300.0),
            flow: m3_per_day(170.0),
            kla: 200.0,
            k_p: 5e4,
            atmospheric_pressure: bar(P_ATM_BAR),
            influent: Vec::new(),
        }
    }
}

impl ReactorConfig {
    /// A closed vessel: no liquid flow, no influent.
    pub fn batch(temperature: Temperature, liquid_volume: Volume, headspace_volume: Volume) -> Self {
        Self {
            temperature,
            liquid_volume,
            headspace_volume,
            flow: m3_per_day(0.0),
            ..Self::default()
        }
    }
}

/// Resolved run parameters. Immutable once a run begins.
#[derive(Debug, Clone, PartialEq)]
pub struct ReactorParams {
    pub t_op_k: f64,
    pub t_ref_k: f64,
    /// [m³]
    pub v_liq: f64,
    /// [m³]
    pub v_gas: f64,
    /// [m³/d]
    pub q_liq: f64,
    pub kla: f64,
    pub k_p: f64,
    /// [bar]
    pub p_atm: f64,
    pub influent: DVector<f64>,
    pub equilibrium: EquilibriumSet,
    /// Reference-temperature gas table; [`GasTransfer`] corrects it to T_op
    pub gases: GasTable,
    /// Mineral solubility products at T_op
    pub solubility: Vec<SolubilityProduct>,
}

impl ReactorParams {
    pub fn new(
        registry: &Registry,
        config: &ReactorConfig,
        equilibria: &EquilibriumTable,
        gases: &GasTable,
    ) -> SimResult<Self> {
        let t_op_k = ensure_positive(kelvin_of(config.temperature), "operating temperature")?;
        let t_ref_k = ensure_positive(kelvin_of(config.reference_temperature), "reference temperature")?;
        let v_liq = ensure_positive(m3_of(config.liquid_volume), "liquid volume")?;
        let v_gas = ensure_positive(m3_of(config.headspace_volume), "headspace volume")?;
        let q_liq = ensure_finite(m3_per_day_of(config.flow), "liquid flow")?;
        let kla = ensure_finite(config.kla, "kLa")?;
        let k_p = ensure_finite(config.k_p, "k_p")?;
        let p_atm = ensure_positive(bar_of(config.atmospheric_pressure), "atmospheric pressure")?;
        if q_liq < 0.0 {
            return Err(SimError::InvalidArg {
                what: "liquid flow must be non-negative",
            });
        }
        if kla < 0.0 || k_p < 0.0 {
            return Err(SimError::InvalidArg {
                what: "kLa and k_p must be non-negative",
            });
        }

        let influent = registry.state_from_named(config.influent.iter().map(|(n, v)| (n, *v)))?;
        for (id, sp) in registry.iter() {
            let c = influent[id.index()];
            if c != 0.0 && sp.phase != Phase::Liquid {
                return Err(SimError::InvalidArg {
                    what: "influent may only carry liquid species",
                });
            }
            if !c.is_finite() || c < 0.0 {
                return Err(SpeciesError::NonPhysicalState {
                    species: sp.id.clone(),
                    value: c,
                }
                .into());
            }
        }

        let equilibrium = equilibria.resolve(t_op_k, t_ref_k)?;
        let solubility = SolubilityTable::default().resolve(t_op_k, t_ref_k)?;

        Ok(Self {
            t_op_k,
            t_ref_k,
            v_liq,
            v_gas,
            q_liq,
            kla,
            k_p,
            p_atm,
            influent,
            equilibrium,
            gases: gases.clone(),
            solubility,
        })
    }

    /// V/Q [d]; infinite for a batch reactor.
    pub fn hydraulic_retention_time(&self) -> f64 {
        if self.q_liq > 0.0 {
            self.v_liq / self.q_liq
        } else {
            f64::INFINITY
        }
    }

    /// Dilution rate Q/V [1/d].
    #[inline]
    pub fn dilution_rate(&self) -> f64 {
        self.q_liq / self.v_liq
    }
}

/// Derived scalars at one state.
#[derive(Debug, Clone, PartialEq)]
pub struct StepDiagnostics {
    pub ph: f64,
    /// Headspace pressure including water vapour [bar]
    pub pressure: f64,
    /// Gas outflow at headspace conditions [m³/d]
    pub q_gas: f64,
    pub gases: Vec<GasComponent>,
    /// Net biological methane formation [kg COD/(m³·d)]
    pub methane_production: f64,
    /// Net sulfate reduced [kg S/(m³·d)]
    pub sulfate_reduction: f64,
    /// Saturation ratio per mineral, from the equilibrium speciation
    pub saturation: Vec<MineralRatio>,
}

impl StepDiagnostics {
    pub fn gas(&self, name: &str) -> Option<&GasComponent> {
        self.gases.iter().find(|g| g.gas == name)
    }

    pub fn saturation(&self, mineral: &str) -> Option<f64> {
        self.saturation.iter().find(|m| m.mineral == mineral).map(|m| m.ratio)
    }
}

/// Boundary fluxes of one state [kg basis/d per species].
#[derive(Debug, Clone, PartialEq)]
pub struct Transport {
    pub inflow: DVector<f64>,
    pub outflow: DVector<f64>,
}

/// The reactor as a [`TransientModel`].
#[derive(Debug, Clone)]
pub struct ReactorModel {
    registry: Arc<Registry>,
    processes: Arc<ProcessSet>,
    index: KineticIndex,
    pcm: PcmSolver,
    gas: GasTransfer,
    params: ReactorParams,
    liquid: Vec<SpeciesId>,
    headspace: Vec<SpeciesId>,
    initial: DVector<f64>,
}

impl ReactorModel {
    pub fn new(
        registry: Arc<Registry>,
        processes: Arc<ProcessSet>,
        index: KineticIndex,
        params: ReactorParams,
        initial: DVector<f64>,
    ) -> SimResult<Self> {
        registry.check_state(&initial)?;
        registry.check_dimension(&params.influent)?;
        let pcm = PcmSolver::new(registry.clone(), params.equilibrium)?.with_config(BrentConfig {
            x_tol: DERIVATIVE_PH_TOLERANCE,
            ..BrentConfig::default()
        });
        let gas = GasTransfer::new(
            registry.clone(),
            &params.gases,
            params.t_op_k,
            params.t_ref_k,
            params.kla,
        )?;
        let liquid = registry.in_phase(Phase::Liquid);
        let headspace = registry.in_phase(Phase::Headspace);
        debug!(
            species = registry.len(),
            processes = processes.len(),
            hrt = params.hydraulic_retention_time(),
            "reactor model ready"
        );
        Ok(Self {
            registry,
            processes,
            index,
            pcm,
            gas,
            params,
            liquid,
            headspace,
            initial,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn processes(&self) -> &ProcessSet {
        &self.processes
    }

    pub fn index(&self) -> &KineticIndex {
        &self.index
    }

    pub fn params(&self) -> &ReactorParams {
        &self.params
    }

    pub fn pcm(&self) -> &PcmSolver {
        &self.pcm
    }

    pub fn gas_transfer(&self) -> &GasTransfer {
        &self.gas
    }

    fn context(pcm: &PcmResult) -> RateContext {
        RateContext {
            ph: pcm.ph,
            free_ammonia: pcm.nh3,
            free_sulfide: pcm.h2s,
        }
    }

    /// dC/dt at (t, state). Same inputs give bit-identical output.
    pub fn derivative(&self, _t: f64, state: &DVector<f64>) -> SimResult<DVector<f64>> {
        self.registry.check_state(state)?;
        let pcm = self.pcm.solve_ph(state)?;

        let mut dx = DVector::zeros(state.len());
        let rates = self.processes.rates(state, &Self::context(&pcm))?;
        self.processes.accumulate(&rates, &mut dx);

        let volume_ratio = self.params.v_liq / self.params.v_gas;
        for tr in self.gas.transfer_rates(state, &pcm)? {
            dx[tr.liquid.index()] -= tr.basis;
            dx[tr.headspace.index()] += tr.basis * volume_ratio;
        }

        let headspace = self.gas.headspace(state, self.params.k_p, self.params.p_atm)?;
        let purge = headspace.q_gas / self.params.v_gas;
        for id in &self.headspace {
            dx[id.index()] -= purge * state[id.index()];
        }

        dx += self.convective_terms(state);

        if let Some((i, v)) = dx.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            debug!(species = self.registry.name(SpeciesId::from_index(i)), "non-finite derivative");
            return Err(CoreError::NonFinite {
                what: "state derivative",
                value: *v,
            }
            .into());
        }
        Ok(dx)
    }

    /// (Q/V)(C_in − C) for liquid species; zero for headspace entries.
    pub fn convective_terms(&self, state: &DVector<f64>) -> DVector<f64> {
        let d = self.params.dilution_rate();
        let mut out = DVector::zeros(state.len());
        if d == 0.0 {
            return out;
        }
        for id in &self.liquid {
            let i = id.index();
            out[i] = d * (self.params.influent[i] - state[i]);
        }
        out
    }

    /// pH, headspace and production figures at one state.
    pub fn diagnostics(&self, state: &DVector<f64>, ph_hint: Option<f64>) -> SimResult<StepDiagnostics> {
        self.registry.check_state(state)?;
        let pcm = match ph_hint {
            Some(hint) => self.pcm.solve_ph_with_hint(state, hint)?,
            None => self.pcm.solve_ph(state)?,
        };
        let headspace = self.gas.headspace(state, self.params.k_p, self.params.p_atm)?;
        let rates = self.processes.rates(state, &Self::context(&pcm))?;

        let mut net = DVector::zeros(state.len());
        self.processes.accumulate(&rates, &mut net);

        Ok(StepDiagnostics {
            ph: pcm.ph,
            pressure: headspace.total_pressure,
            q_gas: headspace.q_gas,
            gases: headspace.gases,
            methane_production: net[self.index.s_ch4.index()],
            sulfate_reduction: -net[self.index.s_so4.index()],
            saturation: saturation_index(&pcm.mineral_activities, &self.params.solubility),
        })
    }

    /// Inflow and outflow across the reactor boundary.
    pub fn transport(&self, state: &DVector<f64>) -> SimResult<Transport> {
        let n = state.len();
        let mut inflow = DVector::zeros(n);
        let mut outflow = DVector::zeros(n);
        let q = self.params.q_liq;
        for id in &self.liquid {
            let i = id.index();
            inflow[i] = q * self.params.influent[i];
            outflow[i] = q * state[i];
        }
        let q_gas = self.gas.headspace(state, self.params.k_p, self.params.p_atm)?.q_gas;
        for id in &self.headspace {
            let i = id.index();
            outflow[i] = q_gas * state[i];
        }
        Ok(Transport { inflow, outflow })
    }

    /// Mass held in the vessel [kg basis per species].
    pub fn inventory(&self, state: &DVector<f64>) -> DVector<f64> {
        let mut out = DVector::zeros(state.len());
        for id in &self.liquid {
            out[id.index()] = self.params.v_liq * state[id.index()];
        }
        for id in &self.headspace {
            out[id.index()] = self.params.v_gas * state[id.index()];
        }
        out
    }
}

impl TransientModel for ReactorModel {
    fn dim(&self) -> usize {
        self.registry.len()
    }

    fn initial_state(&self) -> DVector<f64> {
        self.initial.clone()
    }

    fn rhs(&self, t: f64, x: &DVector<f64>) -> SimResult<DVector<f64>> {
        self.derivative(t, x)
    }
}
