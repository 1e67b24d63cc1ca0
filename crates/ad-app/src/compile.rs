//! Scenario compilation: schema records to runtime objects.

use std::sync::Arc;

use ad_chem::{EquilibriumTable, GasTable};
use ad_core::{bar, k, m3, m3_per_day};
use ad_kinetics::build_processes_with;
use ad_project::{IntegratorDef, Scenario, SimulationDef};
use ad_sim::{IntegratorType, ReactorConfig, ReactorModel, ReactorParams, SimOptions};
use ad_species::{Registry, catalog};
use tracing::debug;

use crate::error::AppResult;

/// A scenario ready to run.
#[derive(Debug, Clone)]
pub struct CompiledScenario {
    pub name: String,
    pub model: ReactorModel,
    pub options: SimOptions,
}

/// Built-in catalog followed by the scenario's own species.
pub fn build_registry(scenario: &Scenario) -> AppResult<Registry> {
    let mut species = catalog::default_species();
    species.extend(scenario.species.iter().cloned());
    Ok(Registry::register(species)?)
}

pub fn reactor_config(scenario: &Scenario) -> ReactorConfig {
    let r = &scenario.reactor;
    ReactorConfig {
        temperature: k(r.temperature.kelvin()),
        reference_temperature: k(r.reference_temperature.kelvin()),
        liquid_volume: m3(r.liquid_volume_m3),
        headspace_volume: m3(r.headspace_volume_m3),
        flow: m3_per_day(r.flow_m3_per_day),
        kla: r.kla_per_day,
        k_p: r.k_p,
        atmospheric_pressure: bar(r.atmospheric_pressure_bar),
        influent: scenario
            .influent
            .iter()
            .map(|(name, value)| (name.clone(), *value))
            .collect(),
    }
}

pub fn sim_options(sim: &SimulationDef) -> SimOptions {
    SimOptions {
        t_end: sim.t_end_days,
        dt: sim.dt_days,
        dt_min: sim.dt_min_days,
        dt_max: sim.dt_max_days,
        record_interval: sim.record_interval_days,
        max_steps: sim.max_steps,
        rtol: sim.rtol,
        atol: sim.atol,
        integrator: match sim.integrator {
            IntegratorDef::BackwardEuler => IntegratorType::BackwardEuler,
            IntegratorDef::Rk4 => IntegratorType::RK4,
            IntegratorDef::ForwardEuler => IntegratorType::ForwardEuler,
        },
    }
}

/// Resolve species and processes, build parameters and the initial state.
///
/// The scenario is expected to have passed validation; everything checked
/// here is what needs the resolved registry (closure, dimensions).
pub fn compile(scenario: &Scenario) -> AppResult<CompiledScenario> {
    let registry = Arc::new(build_registry(scenario)?);
    let (processes, index) =
        build_processes_with(&registry, &scenario.kinetics, scenario.processes.clone())?;

    let params = ReactorParams::new(
        &registry,
        &reactor_config(scenario),
        &EquilibriumTable::default(),
        &GasTable::default(),
    )?;
    let initial = registry.state_from_named(
        scenario
            .initial_state
            .iter()
            .map(|(name, value)| (name.as_str(), *value)),
    )?;

    let options = sim_options(&scenario.simulation);
    options.validate()?;

    let model = ReactorModel::new(registry, Arc::new(processes), index, params, initial)?;
    debug!(scenario = %scenario.name, t_end = options.t_end, "compiled scenario");
    Ok(CompiledScenario {
        name: scenario.name.clone(),
        model,
        options,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ad_core::{kelvin_of, m3_per_day_of};
    use ad_project::TemperatureDef;

    fn scenario() -> Scenario {
        ad_project::parse_yaml(
            r#"
name: Compile
reactor:
  temperature:
    unit: celsius
    value: 35.0
  liquid_volume_m3: 10.0
  headspace_volume_m3: 1.0
  flow_m3_per_day: 0.5
influent:
  S_ac: 2.0
initial_state:
  S_ac: 0.5
simulation:
  integrator: rk4
  t_end_days: 2.0
"#,
        )
        .unwrap()
    }

    #[test]
    fn reactor_config_carries_units() {
        let mut s = scenario();
        let cfg = reactor_config(&s);
        assert!((kelvin_of(cfg.temperature) - 308.15).abs() < 1e-9);
        assert!((m3_per_day_of(cfg.flow) - 0.5).abs() < 1e-12);
        assert_eq!(cfg.influent, vec![("S_ac".to_string(), 2.0)]);

        s.reactor.temperature = TemperatureDef::Kelvin { value: 310.0 };
        assert!((kelvin_of(reactor_config(&s).temperature) - 310.0).abs() < 1e-9);
    }

    #[test]
    fn integrator_choice_is_mapped() {
        let opts = sim_options(&scenario().simulation);
        assert_eq!(opts.integrator, IntegratorType::RK4);
        assert_eq!(opts.t_end, 2.0);
    }

    #[test]
    fn compiled_model_sees_initial_state_and_flow() {
        let compiled = compile(&scenario()).unwrap();
        let model = &compiled.model;
        let ac = model.registry().get_named(&ad_sim::TransientModel::initial_state(model), "S_ac");
        assert_eq!(ac.unwrap(), 0.5);
        assert!((model.params().hydraulic_retention_time() - 20.0).abs() < 1e-9);
    }
}
