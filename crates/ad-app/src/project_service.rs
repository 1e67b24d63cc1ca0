//! Scenario loading and saving.

use std::path::Path;

use ad_project::Scenario;

use crate::error::AppResult;

pub fn load_scenario(path: &Path) -> AppResult<Scenario> {
    Ok(ad_project::load(path)?)
}

pub fn save_scenario(path: &Path, scenario: &Scenario) -> AppResult<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => ad_project::save_json(path, scenario)?,
        _ => ad_project::save_yaml(path, scenario)?,
    }
    Ok(())
}

pub fn validate_scenario(scenario: &Scenario) -> AppResult<()> {
    ad_project::validate_scenario(scenario).map_err(ad_project::ProjectError::from)?;
    Ok(())
}
