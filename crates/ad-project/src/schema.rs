//! Scenario file schema.

use std::collections::BTreeMap;

use ad_core::constants::{P_ATM_BAR, T_STANDARD_K};
use ad_kinetics::{KineticParams, ProcessDef};
use ad_species::Species;
use serde::{Deserialize, Serialize};

/// One digester run: vessel, initial liquor, feed, kinetics and solver settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    #[serde(default = "default_version")]
    pub version: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub reactor: ReactorDef,
    /// Initial concentrations by species id [kg basis/m³]; missing species start at zero
    #[serde(default)]
    pub initial_state: BTreeMap<String, f64>,
    /// Influent concentrations by species id [kg basis/m³]
    #[serde(default)]
    pub influent: BTreeMap<String, f64>,
    /// Overrides of the default kinetic parameters
    #[serde(default)]
    pub kinetics: KineticParams,
    /// Species registered after the built-in catalog
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub species: Vec<Species>,
    /// Processes registered after the default process set
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub processes: Vec<ProcessDef>,
    #[serde(default)]
    pub simulation: SimulationDef,
}

fn default_version() -> u32 {
    crate::LATEST_VERSION
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReactorDef {
    pub temperature: TemperatureDef,
    #[serde(default = "default_reference_temperature")]
    pub reference_temperature: TemperatureDef,
    pub liquid_volume_m3: f64,
    pub headspace_volume_m3: f64,
    #[serde(default)]
    pub flow_m3_per_day: f64,
    #[serde(default = "default_kla")]
    pub kla_per_day: f64,
    /// Gas outlet coefficient [m³/(d·bar)]
    #[serde(default = "default_k_p")]
    pub k_p: f64,
    #[serde(default = "default_atmospheric_pressure")]
    pub atmospheric_pressure_bar: f64,
}

fn default_reference_temperature() -> TemperatureDef {
    TemperatureDef::Kelvin {
        value: T_STANDARD_K,
    }
}

fn default_kla() -> f64 {
    200.0
}

fn default_k_p() -> f64 {
    5.0e4
}

fn default_atmospheric_pressure() -> f64 {
    P_ATM_BAR
}

/// Temperature in either scale.
///
/// ```yaml
/// temperature:
///   unit: celsius
///   value: 35.0
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "unit", rename_all = "snake_case")]
pub enum TemperatureDef {
    Celsius { value: f64 },
    Kelvin { value: f64 },
}

impl TemperatureDef {
    pub fn kelvin(&self) -> f64 {
        match *self {
            TemperatureDef::Celsius { value } => value + 273.15,
            TemperatureDef::Kelvin { value } => value,
        }
    }
}

/// Solver settings, all times in days.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationDef {
    pub t_end_days: f64,
    pub record_interval_days: f64,
    /// Initial (adaptive) or fixed step
    pub dt_days: f64,
    pub dt_min_days: f64,
    pub dt_max_days: f64,
    pub rtol: f64,
    pub atol: f64,
    pub max_steps: usize,
    pub integrator: IntegratorDef,
}

impl Default for SimulationDef {
    fn default() -> Self {
        Self {
            t_end_days: 50.0,
            record_interval_days: 1.0,
            dt_days: 1e-3,
            dt_min_days: 1e-10,
            dt_max_days: 0.5,
            rtol: 1e-4,
            atol: 1e-8,
            max_steps: 100_000,
            integrator: IntegratorDef::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum IntegratorDef {
    #[default]
    BackwardEuler,
    Rk4,
    ForwardEuler,
}
