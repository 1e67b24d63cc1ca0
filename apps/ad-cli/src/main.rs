use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use ad_app::{AppError, AppResult, ScenarioRun, project_service, query, run_service};
use ad_kinetics::{KineticParams, build_processes};
use ad_species::{Phase, Registry, catalog};
use tracing::warn;

#[derive(Parser)]
#[command(name = "ad-cli")]
#[command(about = "Anaerobic digester simulation CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate scenario file syntax and references
    Validate {
        /// Path to the scenario file (.yaml or .json)
        scenario_path: PathBuf,
    },
    /// List species in the registry
    Species {
        /// Scenario whose declared species are appended to the catalog
        scenario_path: Option<PathBuf>,
    },
    /// List registered processes
    Processes {
        /// Scenario whose kinetics and declared processes are used
        scenario_path: Option<PathBuf>,
    },
    /// Run one scenario and write its time series as CSV
    Run {
        /// Path to the scenario file (.yaml or .json)
        scenario_path: PathBuf,
        /// Species columns to include, comma separated
        #[arg(long, value_delimiter = ',', default_value = "S_ac,S_IC,S_ch4,G_ch4,G_co2")]
        species: Vec<String>,
        /// Override the end time [d]
        #[arg(long)]
        t_end: Option<f64>,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run several scenarios in parallel and print a summary of each
    Batch {
        /// Scenario files
        #[arg(required = true)]
        scenario_paths: Vec<PathBuf>,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { scenario_path } => cmd_validate(&scenario_path),
        Commands::Species { scenario_path } => cmd_species(scenario_path.as_deref()),
        Commands::Processes { scenario_path } => cmd_processes(scenario_path.as_deref()),
        Commands::Run {
            scenario_path,
            species,
            t_end,
            output,
        } => cmd_run(&scenario_path, &species, t_end, output.as_deref()),
        Commands::Batch { scenario_paths } => cmd_batch(&scenario_paths),
    }
}

fn cmd_validate(scenario_path: &Path) -> AppResult<()> {
    println!("Validating scenario: {}", scenario_path.display());
    let scenario = project_service::load_scenario(scenario_path)?;
    // Closure and dimension checks need the resolved registry
    ad_app::compile(&scenario)?;
    println!("✓ Scenario '{}' is valid", scenario.name);
    Ok(())
}

fn registry_for(scenario_path: Option<&Path>) -> AppResult<Registry> {
    match scenario_path {
        Some(path) => ad_app::build_registry(&project_service::load_scenario(path)?),
        None => Ok(catalog::default_registry()?),
    }
}

fn cmd_species(scenario_path: Option<&Path>) -> AppResult<()> {
    let registry = registry_for(scenario_path)?;
    println!("{} species:", registry.len());
    for (_, sp) in registry.iter() {
        let phase = match sp.phase {
            Phase::Liquid => "liquid",
            Phase::Headspace => "gas",
        };
        let cod = sp.cod.map(|c| format!("{c:.4}")).unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<14} {:<6} {:<10} cod {:<8} {}",
            sp.id,
            phase,
            sp.basis.to_string(),
            cod,
            sp.name
        );
    }
    Ok(())
}

fn cmd_processes(scenario_path: Option<&Path>) -> AppResult<()> {
    let processes = match scenario_path {
        Some(path) => {
            let scenario = project_service::load_scenario(path)?;
            ad_app::compile(&scenario)?.model.processes().clone()
        }
        None => {
            let registry = catalog::default_registry()?;
            build_processes(&registry, &KineticParams::default())?.0
        }
    };
    println!("{} processes:", processes.len());
    for p in processes.iter() {
        println!("  {:<28} {} species", p.id(), p.stoichiometry().len());
    }
    Ok(())
}

fn cmd_run(
    scenario_path: &Path,
    species: &[String],
    t_end: Option<f64>,
    output: Option<&Path>,
) -> AppResult<()> {
    let mut scenario = project_service::load_scenario(scenario_path)?;
    if let Some(t_end) = t_end {
        scenario.simulation.t_end_days = t_end;
    }

    let run = run_service::run(&scenario)?;
    match output {
        Some(path) => {
            let file = File::create(path).map_err(|source| AppError::Write {
                path: path.to_path_buf(),
                source,
            })?;
            query::write_csv(BufWriter::new(file), &run, species)?;
            print_summary(&run)?;
            println!("✓ Wrote {} records to {}", run.output.record.len(), path.display());
        }
        None => query::write_csv(io::stdout().lock(), &run, species)?,
    }
    Ok(())
}

fn cmd_batch(scenario_paths: &[PathBuf]) -> AppResult<()> {
    let scenarios = scenario_paths
        .iter()
        .map(|p| project_service::load_scenario(p))
        .collect::<AppResult<Vec<_>>>()?;

    let mut failures = 0;
    for (path, result) in scenario_paths.iter().zip(run_service::run_batch(&scenarios)) {
        println!("{}", path.display());
        match result {
            Ok(run) => print_summary(&run)?,
            Err(e) => {
                failures += 1;
                warn!(scenario = %path.display(), error = %e, "scenario failed");
                println!("  ✗ {e}");
            }
        }
    }
    println!(
        "✓ {} of {} scenarios completed",
        scenarios.len() - failures,
        scenarios.len()
    );
    Ok(())
}

fn print_summary(run: &ScenarioRun) -> AppResult<()> {
    let summary = query::get_run_summary(run)?;
    println!("  Scenario: {}", run.name());
    println!(
        "  Time: {:.3} to {:.3} d ({} records, solved in {:.2} s)",
        summary.time_range.0, summary.time_range.1, summary.record_count, run.timing.solve_time_s
    );
    println!("  Final pH: {:.3}", summary.final_ph);
    println!(
        "  Headspace: {:.4} bar, gas flow {:.4} m³/d",
        summary.final_pressure, summary.final_q_gas
    );
    for (gas, y) in &summary.gas_fractions {
        println!("    {gas:<4} {:.2} %", 100.0 * y);
    }
    for (measure, gap) in &summary.balance_gaps {
        println!("  Balance {measure:<4} relative gap {gap:.2e}");
    }
    Ok(())
}
