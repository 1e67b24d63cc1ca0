//! Shared reactor fixtures.

#![allow(dead_code)]

use std::sync::Arc;

use ad_chem::{EquilibriumTable, GasTable};
use ad_core::{celsius, m3, m3_per_day};
use ad_kinetics::{KineticIndex, KineticParams, ProcessSet, build_processes};
use ad_sim::{ReactorConfig, ReactorModel, ReactorParams};
use ad_species::Registry;
use ad_species::catalog::{self, names::*};
use nalgebra::DVector;

pub const V_LIQ: f64 = 1.0;
pub const V_GAS: f64 = 0.2;

pub struct Fixture {
    pub registry: Arc<Registry>,
    pub processes: Arc<ProcessSet>,
    pub index: KineticIndex,
}

pub fn fixture() -> Fixture {
    let registry = catalog::default_registry().unwrap();
    let (processes, index) = build_processes(&registry, &KineticParams::default()).unwrap();
    Fixture {
        registry: Arc::new(registry),
        processes: Arc::new(processes),
        index,
    }
}

/// Buffered background liquor: ~0.12 kmol/m³ inorganic carbon, nutrients,
/// sodium in kmol/m³ as given.
pub fn liquor(na_kmol: f64) -> Vec<(&'static str, f64)> {
    vec![
        (S_IC, 0.12 * 12.011),
        (S_IN, 0.01 * 14.007),
        (S_IP, 0.002 * 30.974),
        (S_NA, na_kmol * 22.99),
    ]
}

/// Closed 1 m³ vessel with a 0.2 m³ headspace and no gas outlet.
pub fn closed_vessel() -> ReactorConfig {
    ReactorConfig {
        k_p: 0.0,
        ..ReactorConfig::batch(celsius(35.0), m3(V_LIQ), m3(V_GAS))
    }
}

/// The closed vessel fed at `q` m³/d with a vented headspace.
pub fn cstr(q: f64, influent: Vec<(&'static str, f64)>) -> ReactorConfig {
    ReactorConfig {
        flow: m3_per_day(q),
        k_p: 5.0,
        influent: influent.into_iter().map(|(n, v)| (n.to_string(), v)).collect(),
        ..closed_vessel()
    }
}

impl Fixture {
    pub fn state(&self, extra: &[(&'static str, f64)], na_kmol: f64) -> DVector<f64> {
        let mut entries = liquor(na_kmol);
        entries.extend_from_slice(extra);
        self.registry.state_from_named(entries).unwrap()
    }

    pub fn model(&self, config: &ReactorConfig, initial: DVector<f64>) -> ReactorModel {
        let params = ReactorParams::new(
            &self.registry,
            config,
            &EquilibriumTable::default(),
            &GasTable::default(),
        )
        .unwrap();
        ReactorModel::new(
            self.registry.clone(),
            self.processes.clone(),
            self.index.clone(),
            params,
            initial,
        )
        .unwrap()
    }

    pub fn get(&self, state: &DVector<f64>, name: &str) -> f64 {
        self.registry.get_named(state, name).unwrap()
    }
}
