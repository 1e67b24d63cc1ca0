//! Component registry: the only way to map a species name to a state position.

use std::collections::HashMap;

use ad_core::SpeciesId;
use nalgebra::DVector;

use crate::error::{SpeciesError, SpeciesResult};
use crate::species::{Basis, Element, Measure, Phase, Species};

/// Immutable catalog of registered species.
///
/// Declared order defines array positions. Callers never see a raw offset;
/// they hold [`SpeciesId`]s obtained from [`Registry::lookup`].
#[derive(Debug, Clone)]
pub struct Registry {
    species: Vec<Species>,
    by_name: HashMap<String, SpeciesId>,
}

impl Registry {
    /// Validate and register a species list.
    pub fn register(list: Vec<Species>) -> SpeciesResult<Self> {
        if list.is_empty() {
            return Err(SpeciesError::Empty);
        }

        let mut by_name = HashMap::with_capacity(list.len());
        for (index, sp) in list.iter().enumerate() {
            validate_record(sp)?;
            if by_name
                .insert(sp.id.clone(), SpeciesId::from_index(index))
                .is_some()
            {
                return Err(SpeciesError::DuplicateSpecies {
                    name: sp.id.clone(),
                });
            }
        }

        Ok(Self {
            species: list,
            by_name,
        })
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    pub fn lookup(&self, name: &str) -> SpeciesResult<SpeciesId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| SpeciesError::UnknownSpecies {
                name: name.to_string(),
            })
    }

    pub fn lookup_all(&self, names: &[&str]) -> SpeciesResult<Vec<SpeciesId>> {
        names.iter().map(|n| self.lookup(n)).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn species(&self, id: SpeciesId) -> &Species {
        &self.species[id.index()]
    }

    pub fn name(&self, id: SpeciesId) -> &str {
        &self.species[id.index()].id
    }

    pub fn iter(&self) -> impl Iterator<Item = (SpeciesId, &Species)> + '_ {
        self.species
            .iter()
            .enumerate()
            .map(|(i, sp)| (SpeciesId::from_index(i), sp))
    }

    /// Ids of every species in one phase, in declared order.
    pub fn in_phase(&self, phase: Phase) -> Vec<SpeciesId> {
        self.iter()
            .filter(|(_, sp)| sp.phase == phase)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn molar_masses(&self, ids: &[SpeciesId]) -> Vec<f64> {
        ids.iter().map(|&id| self.species(id).molar_mass).collect()
    }

    pub fn cod_factors(&self, ids: &[SpeciesId]) -> Vec<Option<f64>> {
        ids.iter().map(|&id| self.species(id).cod).collect()
    }

    pub fn bases(&self, ids: &[SpeciesId]) -> Vec<Basis> {
        ids.iter().map(|&id| self.species(id).basis).collect()
    }

    pub fn charges(&self, ids: &[SpeciesId]) -> Vec<f64> {
        ids.iter().map(|&id| self.species(id).charge).collect()
    }

    pub fn contents(&self, ids: &[SpeciesId], element: Element) -> Vec<f64> {
        ids.iter()
            .map(|&id| self.species(id).content.get(element))
            .collect()
    }

    /// Basis mass per kmol for one species.
    pub fn molar_factor(&self, id: SpeciesId) -> f64 {
        self.species(id).basis_per_kmol
    }

    /// Molar concentration [kmol/m³] of one species in a state.
    #[inline]
    pub fn molar(&self, state: &DVector<f64>, id: SpeciesId) -> f64 {
        self.species(id).to_molar(state[id.index()])
    }

    /// Concentration of one species in a state.
    #[inline]
    pub fn get(&self, state: &DVector<f64>, id: SpeciesId) -> f64 {
        state[id.index()]
    }

    /// Concentration of one species by name.
    pub fn get_named(&self, state: &DVector<f64>, name: &str) -> SpeciesResult<f64> {
        let id = self.lookup(name)?;
        self.check_dimension(state)?;
        Ok(state[id.index()])
    }

    /// Total of a conserved quantity over one phase: Σ cᵢ·amountᵢ [kg/m³ of that phase].
    pub fn total(&self, state: &DVector<f64>, measure: Measure, phase: Phase) -> f64 {
        self.iter()
            .filter(|(_, sp)| sp.phase == phase)
            .map(|(id, sp)| state[id.index()] * sp.amount_of(measure))
            .sum()
    }

    pub fn zeros(&self) -> DVector<f64> {
        DVector::zeros(self.len())
    }

    /// Build a state vector from name-keyed entries; missing species are zero.
    pub fn state_from_named<I, S>(&self, entries: I) -> SpeciesResult<DVector<f64>>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut state = self.zeros();
        for (name, value) in entries {
            let id = self.lookup(name.as_ref())?;
            state[id.index()] = value;
        }
        Ok(state)
    }

    /// Name-keyed view of a state, in declared order.
    pub fn named<'a>(&'a self, state: &DVector<f64>) -> Vec<(&'a str, f64)> {
        self.species
            .iter()
            .zip(state.iter())
            .map(|(sp, &v)| (sp.id.as_str(), v))
            .collect()
    }

    pub fn check_dimension(&self, state: &DVector<f64>) -> SpeciesResult<()> {
        if state.len() != self.len() {
            return Err(SpeciesError::DimensionMismatch {
                expected: self.len(),
                found: state.len(),
            });
        }
        Ok(())
    }

    /// Reject states with negative or non-finite entries.
    pub fn check_state(&self, state: &DVector<f64>) -> SpeciesResult<()> {
        self.check_dimension(state)?;
        for (sp, &value) in self.species.iter().zip(state.iter()) {
            if !value.is_finite() || value < 0.0 {
                return Err(SpeciesError::NonPhysicalState {
                    species: sp.id.clone(),
                    value,
                });
            }
        }
        Ok(())
    }
}

fn validate_record(sp: &Species) -> SpeciesResult<()> {
    let invalid = |what| SpeciesError::InvalidSpecies {
        species: sp.id.clone(),
        what,
    };

    if sp.id.trim().is_empty() {
        return Err(invalid("empty identifier"));
    }
    if !(sp.basis_per_kmol.is_finite() && sp.basis_per_kmol > 0.0) {
        return Err(invalid("basis_per_kmol must be positive"));
    }
    if !(sp.molar_mass.is_finite() && sp.molar_mass > 0.0) {
        return Err(invalid("molar_mass must be positive"));
    }
    if let Some(cod) = sp.cod {
        if !cod.is_finite() {
            return Err(invalid("non-finite COD factor"));
        }
    }
    if !sp.charge.is_finite() {
        return Err(invalid("non-finite charge"));
    }
    if sp.content.iter().any(|(_, v)| !v.is_finite() || v < 0.0) {
        return Err(invalid("elemental content must be finite and non-negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::{Category, ElementalContent};

    fn sp(id: &str) -> Species {
        Species {
            id: id.to_string(),
            name: id.to_string(),
            category: Category::SolubleSubstrate,
            phase: Phase::Liquid,
            basis: Basis::Cod,
            molar_mass: 60.05,
            basis_per_kmol: 64.0,
            cod: Some(1.0),
            charge: 0.0,
            content: ElementalContent::default().with(Element::C, 0.375),
        }
    }

    #[test]
    fn lookup_resolves_declared_positions() {
        let reg = Registry::register(vec![sp("a"), sp("b"), sp("c")]).unwrap();
        assert_eq!(reg.lookup("b").unwrap().index(), 1);
        assert!(matches!(
            reg.lookup("zzz"),
            Err(SpeciesError::UnknownSpecies { .. })
        ));
    }

    #[test]
    fn duplicate_rejected() {
        let err = Registry::register(vec![sp("a"), sp("a")]).unwrap_err();
        assert_eq!(err, SpeciesError::DuplicateSpecies { name: "a".into() });
    }

    #[test]
    fn empty_rejected() {
        assert_eq!(Registry::register(vec![]).unwrap_err(), SpeciesError::Empty);
    }

    #[test]
    fn invalid_molar_factor_rejected() {
        let mut bad = sp("a");
        bad.basis_per_kmol = 0.0;
        assert!(matches!(
            Registry::register(vec![bad]),
            Err(SpeciesError::InvalidSpecies { .. })
        ));
    }

    #[test]
    fn molar_conversion_uses_basis_factor() {
        let reg = Registry::register(vec![sp("a")]).unwrap();
        let id = reg.lookup("a").unwrap();
        let state = reg.state_from_named([("a", 6.4)]).unwrap();
        assert!((reg.molar(&state, id) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn check_state_reports_offender() {
        let reg = Registry::register(vec![sp("a"), sp("b")]).unwrap();
        let state = reg.state_from_named([("b", -0.5)]).unwrap();
        let err = reg.check_state(&state).unwrap_err();
        assert_eq!(
            err,
            SpeciesError::NonPhysicalState {
                species: "b".into(),
                value: -0.5
            }
        );

        let nan = reg.state_from_named([("a", f64::NAN)]).unwrap();
        assert!(reg.check_state(&nan).is_err());

        let short = DVector::zeros(1);
        assert!(matches!(
            reg.check_state(&short),
            Err(SpeciesError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn unknown_name_in_named_state_fails() {
        let reg = Registry::register(vec![sp("a")]).unwrap();
        assert!(reg.state_from_named([("nope", 1.0)]).is_err());
    }

    #[test]
    fn totals_weight_by_content() {
        let reg = Registry::register(vec![sp("a"), sp("b")]).unwrap();
        let state = reg.state_from_named([("a", 2.0), ("b", 1.0)]).unwrap();
        let c = reg.total(&state, Measure::Element(Element::C), Phase::Liquid);
        assert!((c - 3.0 * 0.375).abs() < 1e-12);
        let cod = reg.total(&state, Measure::Cod, Phase::Liquid);
        assert!((cod - 3.0).abs() < 1e-12);
        assert_eq!(reg.total(&state, Measure::Cod, Phase::Headspace), 0.0);
    }
}
