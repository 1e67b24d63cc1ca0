//! Application service layer for digester scenarios.
//!
//! Turns scenario files into compiled reactor runtimes, runs them one at a
//! time or as a parallel batch, and extracts tables and summaries for the CLI.

pub mod compile;
pub mod error;
pub mod project_service;
pub mod query;
pub mod run_service;

pub use compile::{CompiledScenario, build_registry, compile, reactor_config, sim_options};
pub use error::{AppError, AppResult};
pub use project_service::{load_scenario, save_scenario, validate_scenario};
pub use query::{
    RunSummary, extract_species_series, get_run_summary, list_species_ids, run_table, write_csv,
};
pub use run_service::{RunTimingSummary, ScenarioRun, run, run_batch, run_file};
