//! Charge-balance solver properties on the default registry.

use std::sync::Arc;

use ad_chem::{ChemError, DissolvedForm, EquilibriumTable, GasTable, PcmSolver};
use ad_core::constants::T_STANDARD_K;
use ad_species::catalog::{self, names};
use nalgebra::DVector;
use proptest::prelude::*;

const T_OP: f64 = 308.15;

fn solver() -> PcmSolver {
    let reg = Arc::new(catalog::default_registry().unwrap());
    let set = EquilibriumTable::default().resolve(T_OP, T_STANDARD_K).unwrap();
    PcmSolver::new(reg, set).unwrap()
}

/// Mesophilic digester liquor, roughly BSM2 steady state.
fn digester_state(pcm: &PcmSolver, na: f64) -> DVector<f64> {
    pcm.registry()
        .state_from_named([
            (names::S_AC, 0.2),
            (names::S_PRO, 0.016),
            (names::S_BU, 0.014),
            (names::S_VA, 0.012),
            (names::S_IC, 0.15 * 12.011),
            (names::S_IN, 0.13 * 14.007),
            (names::S_IP, 0.005 * 30.974),
            (names::S_IS, 0.001 * 32.06),
            (names::S_K, 0.01 * 39.098),
            (names::S_MG, 0.001 * 24.305),
            (names::S_CA, 0.001 * 40.078),
            (names::S_CL, 0.02 * 35.45),
            (names::S_NA, na),
        ])
        .unwrap()
}

#[test]
fn root_satisfies_charge_balance() {
    let pcm = solver();
    let state = digester_state(&pcm, 0.5);
    let res = pcm.solve_ph(&state).unwrap();
    let r = pcm.charge_residual(&state, res.h).unwrap();
    assert!(r.abs() < 1e-10, "residual = {r:e}");
    assert!(res.ph > 6.5 && res.ph < 8.5, "ph = {}", res.ph);
}

#[test]
fn speciation_conserves_totals() {
    let pcm = solver();
    let state = digester_state(&pcm, 0.5);
    let res = pcm.solve_ph(&state).unwrap();
    let carbon = res.co2 + res.hco3 + res.co3;
    let phosphate = res.h3po4 + res.h2po4 + res.hpo4 + res.po4;
    assert!((carbon - 0.15).abs() < 1e-12);
    assert!((phosphate - 0.005).abs() < 1e-12);
    assert!((res.nh3 + res.nh4 - 0.13).abs() < 1e-12);
    assert!((res.h2s + res.hs - 0.001).abs() < 1e-12);
}

#[test]
fn excess_chloride_has_no_bracket() {
    let pcm = solver();
    let state = pcm
        .registry()
        .state_from_named([(names::S_CL, 200.0)])
        .unwrap();
    match pcm.solve_ph(&state) {
        Err(ChemError::NoEquilibriumBracket {
            residual_low,
            residual_high,
            ..
        }) => {
            assert!(residual_low < 0.0);
            assert!(residual_high < 0.0);
        }
        other => panic!("expected NoEquilibriumBracket, got {other:?}"),
    }
}

#[test]
fn excess_sodium_has_no_bracket() {
    let pcm = solver();
    let state = pcm
        .registry()
        .state_from_named([(names::S_NA, 200.0)])
        .unwrap();
    assert!(matches!(
        pcm.solve_ph(&state),
        Err(ChemError::NoEquilibriumBracket { .. })
    ));
}

#[test]
fn solve_is_deterministic() {
    let pcm = solver();
    let state = digester_state(&pcm, 0.3);
    let a = pcm.solve_ph(&state).unwrap();
    let b = pcm.solve_ph(&state).unwrap();
    assert_eq!(a, b);
}

proptest! {
    #[test]
    fn ph_rises_with_strong_cations(na in 0.0_f64..2.0, extra in 1e-3_f64..1.0) {
        let pcm = solver();
        let low = pcm.solve_ph(&digester_state(&pcm, na)).unwrap();
        let high = pcm.solve_ph(&digester_state(&pcm, na + extra)).unwrap();
        prop_assert!(high.ph >= low.ph - 1e-9, "{} < {}", high.ph, low.ph);
    }

    #[test]
    fn residual_decreases_in_ph(ph in 1.0_f64..13.0, step in 0.01_f64..1.0) {
        let pcm = solver();
        let state = digester_state(&pcm, 0.5);
        let r1 = pcm.charge_residual(&state, 10f64.powf(-ph)).unwrap();
        let r2 = pcm.charge_residual(&state, 10f64.powf(-(ph + step))).unwrap();
        prop_assert!(r2 < r1);
    }
}

#[test]
fn acid_gases_transfer_from_their_free_form() {
    let table = GasTable::default();
    let form = |name: &str| table.gases.iter().find(|g| g.name == name).map(|g| g.dissolved);
    assert_eq!(form("CO2"), Some(DissolvedForm::FreeCo2));
    assert_eq!(form("H2S"), Some(DissolvedForm::FreeH2s));
    assert_eq!(form("CH4"), Some(DissolvedForm::Total));
    assert_eq!(form("H2"), Some(DissolvedForm::Total));
}
