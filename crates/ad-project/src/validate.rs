//! Scenario validation logic.
//!
//! Checks what can be checked from the file alone: ranges, duplicate ids and
//! species references against the built-in catalog plus declared species.
//! Stoichiometric closure is checked when the scenario is compiled.

use std::collections::{HashMap, HashSet};

use ad_kinetics::{TermDef, default_process_defs};
use ad_species::Phase;
use ad_species::catalog::default_species;

use crate::schema::{ReactorDef, Scenario, SimulationDef};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_scenario(scenario: &Scenario) -> Result<(), ValidationError> {
    if scenario.version > crate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: scenario.version,
        });
    }
    if scenario.name.trim().is_empty() {
        return Err(invalid("name", &scenario.name, "must not be empty"));
    }

    validate_reactor(&scenario.reactor)?;
    validate_simulation(&scenario.simulation)?;

    if let Err(e) = scenario.kinetics.check() {
        return Err(invalid("kinetics", "", &e.to_string()));
    }

    let phases = species_phases(scenario)?;

    for (id, value) in &scenario.initial_state {
        if !phases.contains_key(id.as_str()) {
            return Err(missing(id, "initial_state"));
        }
        non_negative(&format!("initial_state {id}"), *value)?;
    }

    for (id, value) in &scenario.influent {
        match phases.get(id.as_str()) {
            None => return Err(missing(id, "influent")),
            Some(Phase::Headspace) => {
                return Err(invalid(
                    &format!("influent {id}"),
                    &value.to_string(),
                    "headspace species cannot be fed",
                ));
            }
            Some(Phase::Liquid) => {}
        }
        non_negative(&format!("influent {id}"), *value)?;
    }

    validate_processes(scenario, &phases)
}

/// Ids of every species the scenario can refer to, with their phase.
fn species_phases(scenario: &Scenario) -> Result<HashMap<String, Phase>, ValidationError> {
    let mut phases: HashMap<String, Phase> = default_species()
        .into_iter()
        .map(|s| (s.id, s.phase))
        .collect();

    for species in &scenario.species {
        if phases.insert(species.id.clone(), species.phase).is_some() {
            return Err(ValidationError::DuplicateId {
                id: species.id.clone(),
                context: "species".to_string(),
            });
        }
        let field = |what: &str| format!("species '{}' {what}", species.id);
        positive(&field("molar_mass"), species.molar_mass)?;
        positive(&field("basis_per_kmol"), species.basis_per_kmol)?;
        if let Some(cod) = species.cod {
            finite(&field("cod"), cod)?;
        }
        finite(&field("charge"), species.charge)?;
        for (element, amount) in species.content.iter() {
            non_negative(&field(&format!("content {element}")), amount)?;
        }
    }

    Ok(phases)
}

fn validate_processes(
    scenario: &Scenario,
    phases: &HashMap<String, Phase>,
) -> Result<(), ValidationError> {
    let mut ids: HashSet<String> = default_process_defs(&scenario.kinetics)
        .into_iter()
        .map(|p| p.id)
        .collect();

    for process in &scenario.processes {
        if !ids.insert(process.id.clone()) {
            return Err(ValidationError::DuplicateId {
                id: process.id.clone(),
                context: "processes".to_string(),
            });
        }
        let context = format!("process '{}'", process.id);

        if process.stoichiometry.is_empty() {
            return Err(invalid(
                &format!("{context} stoichiometry"),
                "{}",
                "must name at least one species",
            ));
        }
        for (species, coefficient) in &process.stoichiometry {
            if !phases.contains_key(species) {
                return Err(missing(species, &context));
            }
            finite(&format!("{context} coefficient {species}"), *coefficient)?;
        }
        for species in process.balance.values() {
            if !phases.contains_key(species) {
                return Err(missing(species, &format!("{context} balance")));
            }
        }

        non_negative(&format!("{context} rate k"), process.rate.k)?;
        for term in &process.rate.terms {
            for species in term_species(term) {
                if !phases.contains_key(species) {
                    return Err(missing(species, &format!("{context} rate")));
                }
            }
        }
    }

    Ok(())
}

fn term_species(term: &TermDef) -> Vec<&str> {
    match term {
        TermDef::Concentration { species }
        | TermDef::Monod { species, .. }
        | TermDef::MolarMonod { species, .. }
        | TermDef::Inhibition { species, .. } => vec![species.as_str()],
        TermDef::SecondOrder { first, second } => vec![first.as_str(), second.as_str()],
        TermDef::RatioMonod {
            numerator,
            denominator,
            ..
        } => vec![numerator.as_str(), denominator.as_str()],
        TermDef::Share { species, others } => std::iter::once(species.as_str())
            .chain(others.iter().map(String::as_str))
            .collect(),
        TermDef::FreeAmmonia { .. } | TermDef::FreeSulfide { .. } | TermDef::PhInhibition { .. } => {
            Vec::new()
        }
    }
}

fn validate_reactor(reactor: &ReactorDef) -> Result<(), ValidationError> {
    positive("reactor temperature [K]", reactor.temperature.kelvin())?;
    positive(
        "reactor reference_temperature [K]",
        reactor.reference_temperature.kelvin(),
    )?;
    positive("reactor liquid_volume_m3", reactor.liquid_volume_m3)?;
    positive("reactor headspace_volume_m3", reactor.headspace_volume_m3)?;
    non_negative("reactor flow_m3_per_day", reactor.flow_m3_per_day)?;
    non_negative("reactor kla_per_day", reactor.kla_per_day)?;
    non_negative("reactor k_p", reactor.k_p)?;
    positive(
        "reactor atmospheric_pressure_bar",
        reactor.atmospheric_pressure_bar,
    )?;
    Ok(())
}

fn validate_simulation(sim: &SimulationDef) -> Result<(), ValidationError> {
    positive("simulation t_end_days", sim.t_end_days)?;
    positive("simulation record_interval_days", sim.record_interval_days)?;
    positive("simulation dt_days", sim.dt_days)?;
    positive("simulation dt_min_days", sim.dt_min_days)?;
    positive("simulation dt_max_days", sim.dt_max_days)?;
    if !(sim.dt_min_days <= sim.dt_days && sim.dt_days <= sim.dt_max_days) {
        return Err(invalid(
            "simulation dt_days",
            &sim.dt_days.to_string(),
            "must lie within [dt_min_days, dt_max_days]",
        ));
    }
    positive("simulation rtol", sim.rtol)?;
    positive("simulation atol", sim.atol)?;
    if sim.max_steps == 0 {
        return Err(invalid("simulation max_steps", "0", "must be at least 1"));
    }
    Ok(())
}

fn invalid(field: &str, value: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn missing(id: &str, context: &str) -> ValidationError {
    ValidationError::MissingReference {
        id: id.to_string(),
        context: context.to_string(),
    }
}

fn finite(field: &str, v: f64) -> Result<(), ValidationError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, &v.to_string(), "must be finite"))
    }
}

fn positive(field: &str, v: f64) -> Result<(), ValidationError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, &v.to_string(), "must be positive and finite"))
    }
}

fn non_negative(field: &str, v: f64) -> Result<(), ValidationError> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, &v.to_string(), "must be non-negative and finite"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TemperatureDef;

    #[test]
    fn term_species_lists_every_reference() {
        let term = TermDef::Share {
            species: "S_va".into(),
            others: vec!["S_bu".into()],
        };
        assert_eq!(term_species(&term), vec!["S_va", "S_bu"]);
        assert!(term_species(&TermDef::FreeAmmonia { k_i: 0.0018 }).is_empty());
    }

    #[test]
    fn zero_temperature_is_rejected() {
        let reactor = ReactorDef {
            temperature: TemperatureDef::Celsius { value: -273.15 },
            reference_temperature: TemperatureDef::Kelvin { value: 298.15 },
            liquid_volume_m3: 1.0,
            headspace_volume_m3: 0.1,
            flow_m3_per_day: 0.0,
            kla_per_day: 200.0,
            k_p: 5e4,
            atmospheric_pressure_bar: 1.01325,
        };
        assert!(matches!(
            validate_reactor(&reactor),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn inverted_step_bounds_are_rejected() {
        let sim = SimulationDef {
            dt_min_days: 1.0,
            dt_max_days: 0.1,
            ..SimulationDef::default()
        };
        assert!(validate_simulation(&sim).is_err());
        assert!(validate_simulation(&SimulationDef::default()).is_ok());
    }
}
