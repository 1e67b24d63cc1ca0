//! Integration tests for the default registry and name-keyed access.

use ad_species::catalog::{self, names};
use ad_species::{Category, Element, Measure, Phase, SpeciesError};
use proptest::prelude::*;

#[test]
fn every_catalog_name_resolves_to_a_distinct_position() {
    let reg = catalog::default_registry().unwrap();
    let mut seen = std::collections::HashSet::new();
    for (id, sp) in reg.iter() {
        assert_eq!(reg.lookup(&sp.id).unwrap(), id);
        assert!(seen.insert(id.index()));
    }
    assert_eq!(seen.len(), reg.len());
}

#[test]
fn vectorized_accessors_follow_requested_order() {
    let reg = catalog::default_registry().unwrap();
    let ids = reg
        .lookup_all(&[names::S_NA, names::S_CL, names::S_MG, names::S_FE3])
        .unwrap();
    assert_eq!(reg.charges(&ids), vec![1.0, -1.0, 2.0, 3.0]);

    let cods = reg.cod_factors(&reg.lookup_all(&[names::S_AC, names::S_IN]).unwrap());
    assert_eq!(cods, vec![Some(1.0), None]);

    let n = reg.contents(&reg.lookup_all(&[names::S_IN, names::X_AC]).unwrap(), Element::N);
    assert_eq!(n[0], 1.0);
    assert!((n[1] - 14.007 / 160.0).abs() < 1e-12);
}

#[test]
fn lookup_all_fails_on_first_unknown() {
    let reg = catalog::default_registry().unwrap();
    let err = reg.lookup_all(&[names::S_AC, "S_unknown"]).unwrap_err();
    assert_eq!(
        err,
        SpeciesError::UnknownSpecies {
            name: "S_unknown".into()
        }
    );
}

#[test]
fn named_round_trip_preserves_values() {
    let reg = catalog::default_registry().unwrap();
    let state = reg
        .state_from_named([(names::S_AC, 1.5), (names::G_CH4, 0.8)])
        .unwrap();
    let named = reg.named(&state);
    let ac = named.iter().find(|(n, _)| *n == names::S_AC).unwrap().1;
    let ch4 = named.iter().find(|(n, _)| *n == names::G_CH4).unwrap().1;
    assert_eq!(ac, 1.5);
    assert_eq!(ch4, 0.8);
    assert_eq!(reg.get_named(&state, names::S_PRO).unwrap(), 0.0);
}

#[test]
fn phase_totals_are_separate() {
    let reg = catalog::default_registry().unwrap();
    let state = reg
        .state_from_named([(names::S_CH4, 0.1), (names::G_CH4, 0.3)])
        .unwrap();
    assert!((reg.total(&state, Measure::Cod, Phase::Liquid) - 0.1).abs() < 1e-12);
    assert!((reg.total(&state, Measure::Cod, Phase::Headspace) - 0.3).abs() < 1e-12);
}

#[test]
fn categories_cover_minerals_and_biomass() {
    let reg = catalog::default_registry().unwrap();
    let minerals = reg
        .iter()
        .filter(|(_, s)| s.category == Category::MineralPrecipitate)
        .count();
    let biomass = reg
        .iter()
        .filter(|(_, s)| s.category == Category::Biomass)
        .count();
    // 13 precipitates + 7 HFO forms
    assert_eq!(minerals, 20);
    // 7 ADM1 groups + PAO + 4 SRB
    assert_eq!(biomass, 12);
}

proptest! {
    #[test]
    fn molar_conversion_round_trips(index in 0usize..66, c in 0.0..50.0f64) {
        let reg = catalog::default_registry().unwrap();
        let (id, sp) = reg.iter().nth(index).unwrap();
        let state = reg.state_from_named([(sp.id.as_str(), c)]).unwrap();
        let molar = reg.molar(&state, id);
        prop_assert!((molar * reg.molar_factor(id) - c).abs() <= 1e-12 * (1.0 + c));
        prop_assert!((sp.from_molar(molar) - c).abs() <= 1e-12 * (1.0 + c));
        prop_assert_eq!(reg.get(&state, id), c);
    }

    #[test]
    fn named_state_is_read_back_by_name(index in 0usize..66, c in 0.0..50.0f64) {
        let reg = catalog::default_registry().unwrap();
        let (id, _) = reg.iter().nth(index).unwrap();
        let name = reg.name(id).to_string();
        let state = reg.state_from_named([(name.as_str(), c)]).unwrap();
        prop_assert_eq!(reg.get_named(&state, &name).unwrap(), c);
        reg.check_state(&state).unwrap();
    }
}
