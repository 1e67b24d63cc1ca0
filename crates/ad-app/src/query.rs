//! Query helpers for extracting data from finished runs.

use std::io::Write;

use ad_sim::TransientModel;

use crate::error::{AppError, AppResult};
use crate::run_service::ScenarioRun;

/// Headline figures of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub time_range: (f64, f64),
    pub record_count: usize,
    pub final_ph: f64,
    /// bar
    pub final_pressure: f64,
    /// m³/d
    pub final_q_gas: f64,
    /// Mole fraction of each gas in the final headspace, water vapour included
    pub gas_fractions: Vec<(&'static str, f64)>,
    /// Relative closure gap per measure
    pub balance_gaps: Vec<(String, f64)>,
}

pub fn get_run_summary(run: &ScenarioRun) -> AppResult<RunSummary> {
    let out = &run.output;
    let (Some(t_min), Some(t_max), Some(last)) = (
        out.record.t.first().copied(),
        out.record.t.last().copied(),
        out.final_diagnostics(),
    ) else {
        return Err(AppError::NoRecords);
    };

    Ok(RunSummary {
        time_range: (t_min, t_max),
        record_count: out.record.len(),
        final_ph: last.ph,
        final_pressure: last.pressure,
        final_q_gas: last.q_gas,
        gas_fractions: last.gases.iter().map(|g| (g.gas, g.mole_fraction)).collect(),
        balance_gaps: out
            .balance
            .measures
            .iter()
            .map(|b| (b.measure.to_string(), b.relative_gap()))
            .collect(),
    })
}

/// Concentration of one species at every recorded point.
pub fn extract_species_series(run: &ScenarioRun, species: &str) -> AppResult<Vec<f64>> {
    let registry = run.compiled.model.registry();
    let id = registry
        .lookup(species)
        .map_err(|_| AppError::UnknownColumn(species.to_string()))?;
    Ok(run.output.record.x.iter().map(|x| registry.get(x, id)).collect())
}

/// Ids of every species in the run's state vector.
pub fn list_species_ids(run: &ScenarioRun) -> Vec<String> {
    let model = &run.compiled.model;
    model
        .registry()
        .named(&model.initial_state())
        .into_iter()
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Column headers and rows of a run table.
///
/// Fixed columns come first (time, pH, pressure, gas flow, then mole
/// fraction and flow per gas), followed by one column per requested species.
pub fn run_table(run: &ScenarioRun, species: &[String]) -> AppResult<(Vec<String>, Vec<Vec<f64>>)> {
    let out = &run.output;
    let gases: Vec<&'static str> = out
        .diagnostics
        .first()
        .map(|d| d.gases.iter().map(|g| g.gas).collect())
        .unwrap_or_default();

    let mut headers = vec![
        "t_d".to_string(),
        "ph".to_string(),
        "pressure_bar".to_string(),
        "q_gas_m3_per_d".to_string(),
    ];
    for gas in &gases {
        headers.push(format!("y_{gas}"));
        headers.push(format!("q_{gas}_m3_per_d"));
    }
    headers.extend(species.iter().cloned());

    let series = species
        .iter()
        .map(|s| extract_species_series(run, s))
        .collect::<AppResult<Vec<_>>>()?;

    let rows = out
        .record
        .t
        .iter()
        .zip(&out.diagnostics)
        .enumerate()
        .map(|(i, (t, d))| {
            let mut row = vec![*t, d.ph, d.pressure, d.q_gas];
            for g in &d.gases {
                row.push(g.mole_fraction);
                row.push(g.flow);
            }
            row.extend(series.iter().map(|s| s[i]));
            row
        })
        .collect();

    Ok((headers, rows))
}

pub fn write_csv<W: Write>(mut w: W, run: &ScenarioRun, species: &[String]) -> AppResult<()> {
    let (headers, rows) = run_table(run, species)?;
    writeln!(w, "{}", headers.join(","))?;
    for row in rows {
        let line: Vec<String> = row.iter().map(|v| format!("{v:.6e}")).collect();
        writeln!(w, "{}", line.join(","))?;
    }
    w.flush()?;
    Ok(())
}
