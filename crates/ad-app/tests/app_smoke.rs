//! Smoke tests for the ad-app service layer on the shipped demos.

use std::path::PathBuf;

use ad_app::{
    extract_species_series, get_run_summary, list_species_ids, load_scenario, run, run_file,
    write_csv,
};

fn demo(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.pop(); // crates
    path.pop(); // repo root
    path.push("demos");
    path.push(name);
    path
}

#[test]
fn batch_acetate_demo_produces_methane() {
    let run = run_file(&demo("batch_acetate.yaml")).expect("demo should run");
    assert_eq!(run.name(), "Batch acetate digestion");

    let summary = get_run_summary(&run).unwrap();
    assert_eq!(summary.time_range, (0.0, 10.0));
    assert_eq!(summary.record_count, 11);
    assert!(summary.final_ph > 6.0 && summary.final_ph < 9.0);
    let ch4 = summary
        .gas_fractions
        .iter()
        .find(|(g, _)| *g == "CH4")
        .map(|(_, y)| *y)
        .unwrap();
    assert!(ch4 > 0.3, "methane fraction {ch4}");
    for (measure, gap) in &summary.balance_gaps {
        assert!(gap.abs() < 1e-5, "{measure} gap {gap}");
    }

    let acetate = extract_species_series(&run, "S_ac").unwrap();
    assert_eq!(acetate[0], 2.0);
    assert!(*acetate.last().unwrap() < 0.02);
}

#[test]
fn csv_has_header_and_one_row_per_record() {
    let mut scenario = load_scenario(&demo("batch_acetate.yaml")).unwrap();
    scenario.simulation.t_end_days = 1.0;
    scenario.simulation.record_interval_days = 0.25;
    let run = run(&scenario).unwrap();

    let mut buf = Vec::new();
    write_csv(&mut buf, &run, &["S_ac".to_string(), "G_ch4".to_string()]).unwrap();
    let text = String::from_utf8(buf).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 1 + 5);
    let header: Vec<&str> = lines[0].split(',').collect();
    assert_eq!(&header[..4], &["t_d", "ph", "pressure_bar", "q_gas_m3_per_d"]);
    assert!(header.contains(&"y_CH4"));
    assert_eq!(header.last(), Some(&"G_ch4"));
    assert!(lines[1..].iter().all(|l| l.split(',').count() == header.len()));
}

#[test]
fn unknown_csv_column_is_reported() {
    let mut scenario = load_scenario(&demo("batch_acetate.yaml")).unwrap();
    scenario.simulation.t_end_days = 0.1;
    scenario.simulation.record_interval_days = 0.1;
    let run = run(&scenario).unwrap();
    let err = write_csv(Vec::new(), &run, &["S_nothing".to_string()]).unwrap_err();
    assert!(matches!(err, ad_app::AppError::UnknownColumn(ref c) if c == "S_nothing"));
    assert_eq!(list_species_ids(&run).len(), 66);
}

#[test]
fn declared_species_and_process_take_part_in_the_run() {
    let run = run_file(&demo("methanol_feed.json")).expect("demo should run");
    let registry = run.compiled.model.registry();
    assert!(registry.contains("S_meoh"));
    assert!(run.compiled.model.processes().get("methanol_methanogenesis").is_some());

    let methanol = extract_species_series(&run, "S_meoh").unwrap();
    assert!(methanol.last().unwrap() < &methanol[0]);
    let methane = extract_species_series(&run, "G_ch4").unwrap();
    assert!(methane.last().unwrap() > &methane[0]);
}
