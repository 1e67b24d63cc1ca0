use ad_project::{ProjectError, ValidationError, parse_json, parse_yaml};

const REACTOR: &str = r#"
reactor:
  temperature:
    unit: celsius
    value: 35.0
  liquid_volume_m3: 1.0
  headspace_volume_m3: 0.2
"#;

fn scenario(extra: &str) -> String {
    format!("name: Test\n{REACTOR}{extra}")
}

#[test]
fn unknown_species_is_a_missing_reference() {
    let err = parse_yaml(&scenario("initial_state:\n  S_unobtainium: 1.0\n")).unwrap_err();
    assert!(matches!(
        err,
        ProjectError::Validation(ValidationError::MissingReference { ref id, .. }) if id == "S_unobtainium"
    ));
}

#[test]
fn negative_concentration_is_rejected() {
    let err = parse_yaml(&scenario("initial_state:\n  S_ac: -0.1\n")).unwrap_err();
    assert!(matches!(
        err,
        ProjectError::Validation(ValidationError::InvalidValue { .. })
    ));
}

#[test]
fn headspace_species_cannot_be_fed() {
    let err = parse_yaml(&scenario("influent:\n  G_ch4: 0.1\n")).unwrap_err();
    assert!(matches!(
        err,
        ProjectError::Validation(ValidationError::InvalidValue { ref field, .. }) if field.contains("G_ch4")
    ));
}

#[test]
fn catalog_species_cannot_be_redeclared() {
    let extra = r#"
species:
  - id: S_ac
    name: Acetate again
    category: SolubleSubstrate
    basis: Cod
    molar_mass: 59.04
    basis_per_kmol: 64.0
    cod: 1.0
"#;
    let err = parse_yaml(&scenario(extra)).unwrap_err();
    assert!(matches!(
        err,
        ProjectError::Validation(ValidationError::DuplicateId { ref id, .. }) if id == "S_ac"
    ));
}

#[test]
fn process_ids_must_not_shadow_defaults() {
    let extra = r#"
processes:
  - id: uptake_ac
    stoichiometry:
      S_ac: -1.0
      S_ch4: 1.0
    rate:
      k: 1.0
"#;
    let err = parse_yaml(&scenario(extra)).unwrap_err();
    assert!(matches!(
        err,
        ProjectError::Validation(ValidationError::DuplicateId { .. })
    ));
}

#[test]
fn rate_terms_must_reference_known_species() {
    let extra = r#"
processes:
  - id: custom
    stoichiometry:
      S_ac: -1.0
      S_ch4: 1.0
    rate:
      k: 1.0
      terms:
        - kind: monod
          species: S_missing
          k: 0.1
"#;
    let err = parse_yaml(&scenario(extra)).unwrap_err();
    assert!(matches!(
        err,
        ProjectError::Validation(ValidationError::MissingReference { ref id, .. }) if id == "S_missing"
    ));
}

#[test]
fn out_of_range_yield_is_rejected() {
    let err = parse_yaml(&scenario("kinetics:\n  y_ac: 1.5\n")).unwrap_err();
    assert!(matches!(
        err,
        ProjectError::Validation(ValidationError::InvalidValue { ref field, .. }) if field == "kinetics"
    ));
}

#[test]
fn newer_versions_are_refused() {
    let json = r#"{
        "version": 99,
        "name": "Future",
        "reactor": {
            "temperature": { "unit": "celsius", "value": 35.0 },
            "liquid_volume_m3": 1.0,
            "headspace_volume_m3": 0.2
        }
    }"#;
    let err = parse_json(json).unwrap_err();
    assert!(matches!(
        err,
        ProjectError::Validation(ValidationError::UnsupportedVersion { version: 99 })
    ));
}

#[test]
fn malformed_yaml_is_a_parse_error() {
    let err = parse_yaml("name: [unclosed").unwrap_err();
    assert!(matches!(err, ProjectError::Yaml(_)));
}
