//! Run execution service.

use std::path::Path;
use std::time::Instant;

use ad_project::Scenario;
use ad_sim::{RunOutput, run_reactor};
use rayon::prelude::*;
use tracing::info;

use crate::compile::{CompiledScenario, compile};
use crate::error::AppResult;
use crate::project_service;

/// A finished run together with the runtime it came from.
#[derive(Debug, Clone)]
pub struct ScenarioRun {
    pub compiled: CompiledScenario,
    pub output: RunOutput,
    pub timing: RunTimingSummary,
}

impl ScenarioRun {
    pub fn name(&self) -> &str {
        &self.compiled.name
    }
}

/// Wall-clock timing of a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunTimingSummary {
    pub compile_time_s: f64,
    pub solve_time_s: f64,
    pub total_time_s: f64,
}

/// Compile and run one scenario.
pub fn run(scenario: &Scenario) -> AppResult<ScenarioRun> {
    let start = Instant::now();
    let compiled = compile(scenario)?;
    let compile_time_s = start.elapsed().as_secs_f64();

    let solve_start = Instant::now();
    let output = run_reactor(&compiled.model, &compiled.options)?;
    let timing = RunTimingSummary {
        compile_time_s,
        solve_time_s: solve_start.elapsed().as_secs_f64(),
        total_time_s: start.elapsed().as_secs_f64(),
    };
    info!(
        scenario = %compiled.name,
        points = output.record.len(),
        solve_s = timing.solve_time_s,
        "scenario finished"
    );

    Ok(ScenarioRun {
        compiled,
        output,
        timing,
    })
}

/// Load a scenario file and run it.
pub fn run_file(path: &Path) -> AppResult<ScenarioRun> {
    run(&project_service::load_scenario(path)?)
}

/// Run independent scenarios in parallel, results in input order.
pub fn run_batch(scenarios: &[Scenario]) -> Vec<AppResult<ScenarioRun>> {
    info!(
        scenarios = scenarios.len(),
        threads = rayon::current_num_threads(),
        "running batch"
    );
    scenarios.par_iter().map(run).collect()
}
