//! Purity of the derivative and closure of the run's mass balance.

mod common;

use ad_sim::{
    BALANCE_MEASURES, IntegratorType, SimError, SimOptions, SimResult, TransientModel, run_reactor, run_sim,
};
use ad_species::catalog::names::*;
use ad_species::SpeciesError;
use nalgebra::DVector;
use proptest::prelude::*;

/// Zero-order sink: dx/dt = −k until, and past, empty.
struct Sink {
    k: f64,
}

impl TransientModel for Sink {
    fn dim(&self) -> usize {
        1
    }

    fn initial_state(&self) -> DVector<f64> {
        DVector::from_element(1, 1.0)
    }

    fn rhs(&self, _t: f64, _x: &DVector<f64>) -> SimResult<DVector<f64>> {
        Ok(DVector::from_element(1, -self.k))
    }
}

#[test]
fn derivative_is_bit_for_bit_repeatable() {
    let fx = common::fixture();
    let state = fx.state(
        &[
            (S_AC, 0.8),
            (S_PRO, 0.1),
            (S_H2, 1e-6),
            (X_AC, 1.0),
            (X_H2, 0.5),
            (X_PRO, 0.3),
            (S_SO4, 0.1),
            (X_ASRB, 0.05),
            (G_CH4, 0.5),
            (G_CO2, 0.2),
        ],
        0.13,
    );
    let model = fx.model(&common::closed_vessel(), state.clone());
    let a = model.derivative(1.5, &state).unwrap();
    let b = model.derivative(1.5, &state).unwrap();
    assert_eq!(a, b);
    assert_eq!(model.rhs(1.5, &state).unwrap(), a);
    assert!(a.iter().all(|v| v.is_finite()));
}

#[test]
fn negative_state_is_rejected() {
    let fx = common::fixture();
    let state = fx.state(&[(S_AC, 0.5)], 0.13);
    let model = fx.model(&common::closed_vessel(), state.clone());
    let mut bad = state;
    bad[fx.registry.lookup(S_AC).unwrap().index()] = -1e-3;
    let err = model.derivative(0.0, &bad).unwrap_err();
    assert!(err.is_non_physical());
    assert!(matches!(
        err,
        SimError::Species(SpeciesError::NonPhysicalState { ref species, .. }) if species == S_AC
    ));
}

#[test]
fn overshooting_sink_cuts_back_then_aborts() {
    let opts = SimOptions {
        t_end: 1.0,
        dt: 0.5,
        dt_min: 1e-6,
        record_interval: 0.5,
        ..SimOptions::default()
    };
    let err = run_sim(&Sink { k: 10.0 }, &opts).unwrap_err();
    assert!(
        matches!(err.root_cause(), SimError::IntegratorDivergence { .. }),
        "{err:?}"
    );
    let SimError::Aborted { t, partial, .. } = err else {
        panic!("expected Aborted");
    };
    // The sink empties at t = 0.1; every accepted state stays at or above zero
    assert!(t > 0.09 && t <= 0.1 + 1e-8, "stopped at {t}");
    assert!(partial.len() >= 2);
    assert!(partial.x.iter().all(|x| x[0] >= 0.0));
}

#[test]
fn fed_reactor_mass_balance_closes() {
    let fx = common::fixture();
    let influent = vec![
        (S_AC, 4.0),
        (S_IC, 0.12 * 12.011),
        (S_IN, 0.01 * 14.007),
        (S_IP, 0.002 * 30.974),
        (S_NA, 0.13 * 22.99),
        (S_SO4, 0.002 * 32.06),
    ];
    let initial = fx.state(&[(S_AC, 0.5), (X_AC, 1.0), (X_ASRB, 0.1)], 0.13);
    let model = fx.model(&common::cstr(0.05, influent), initial);

    let opts = SimOptions {
        t_end: 5.0,
        record_interval: 1.0,
        ..SimOptions::default()
    };
    let out = run_reactor(&model, &opts).unwrap();
    assert_eq!(out.record.t.last().copied(), Some(5.0));
    assert_eq!(out.diagnostics.len(), out.record.len());

    for m in BALANCE_MEASURES {
        let b = out.balance.get(m).unwrap();
        assert!(
            b.relative_gap().abs() < 1e-5,
            "{m}: gap {:e} (in {}, out {}, inventory {} -> {})",
            b.gap(),
            b.inflow,
            b.outflow,
            b.initial,
            b.inventory
        );
    }
    let cod = out.balance.get(ad_species::Measure::Cod).unwrap();
    assert!(cod.inflow > 0.0 && cod.outflow > 0.0);
    // Biogas leaves once the headspace is above atmospheric pressure
    assert!(out.final_diagnostics().unwrap().q_gas > 0.0);
}

#[test]
fn explicit_run_reports_diagnostics_every_record() {
    let fx = common::fixture();
    let state = fx.state(&[(S_AC, 0.2), (X_AC, 0.2)], 0.13);
    let model = fx.model(&common::closed_vessel(), state);
    let opts = SimOptions {
        t_end: 0.01,
        dt: 1e-5,
        record_interval: 0.005,
        integrator: IntegratorType::RK4,
        ..SimOptions::default()
    };
    let out = run_reactor(&model, &opts).unwrap();
    assert_eq!(out.record.len(), 3);
    assert_eq!(out.diagnostics.len(), 3);
    assert!(out.diagnostics.iter().all(|d| d.ph > 6.0 && d.ph < 9.0));
    assert!(out.diagnostics.iter().all(|d| d.saturation.len() == 13));
}

#[test]
fn diagnostics_report_mineral_saturation() {
    let fx = common::fixture();
    let state = fx.state(&[(S_AC, 0.5)], 0.13);
    let model = fx.model(&common::closed_vessel(), state.clone());
    let d = model.diagnostics(&state, None).unwrap();
    assert_eq!(d.saturation.len(), model.pcm().minerals().len());
    assert!(d.saturation.iter().all(|m| m.ratio == 1.0));
    assert_eq!(d.saturation(X_STRUV), Some(1.0));
    assert_eq!(d.saturation("nope"), None);
}

#[test]
fn gas_transfer_uses_the_params_temperature() {
    let fx = common::fixture();
    let state = fx.state(&[], 0.13);
    let model = fx.model(&common::closed_vessel(), state);
    let params = model.params();
    for g in &params.gases.gases {
        let expected = ad_chem::vant_hoff(g.kh_ref, g.delta_h, params.t_ref_k, params.t_op_k);
        let kh = model.gas_transfer().henry(g.name).unwrap();
        assert!((kh - expected).abs() <= 1e-15 * expected, "{}: {kh} vs {expected}", g.name);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn derivative_is_pure_over_states(
        acetate in 0.0..5.0f64,
        biomass in 0.0..2.0f64,
        methane in 0.0..1.0f64,
        na in 0.05..0.2f64,
    ) {
        let fx = common::fixture();
        let state = fx.state(&[(S_AC, acetate), (X_AC, biomass), (G_CH4, methane)], na);
        let model = fx.model(&common::closed_vessel(), state.clone());
        let a = model.derivative(0.0, &state).unwrap();
        let b = model.derivative(0.0, &state).unwrap();
        prop_assert_eq!(&a, &b);
        prop_assert!(a.iter().all(|v| v.is_finite()));
    }
}
