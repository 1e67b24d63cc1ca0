//! Stoichiometric processes: declaration, closure at registration, evaluation.

use std::collections::{BTreeMap, HashMap};

use ad_core::SpeciesId;
use ad_species::{Element, Measure, Phase, Registry};
use nalgebra::DVector;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{KineticsError, KineticsResult};
use crate::terms::{monod, non_competitive, ph_inhibition, share};

/// Closure tolerance, relative to the summed magnitude of a row.
const CLOSURE_REL_TOL: f64 = 1e-9;
const CLOSURE_ABS_TOL: f64 = 1e-12;

/// One multiplicative factor of a rate law, by species name.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum TermDef {
    /// The concentration itself (first order)
    Concentration { species: String },
    /// Product of two concentrations
    SecondOrder { first: String, second: String },
    /// c/(k + c), k in the species' basis
    Monod { species: String, k: f64 },
    /// Monod on the molar concentration, k in kmol/m³
    MolarMonod { species: String, k: f64 },
    /// (a/b)/(k + a/b); zero when b is zero
    RatioMonod {
        numerator: String,
        denominator: String,
        k: f64,
    },
    /// k_i/(k_i + c), k_i in the species' basis
    Inhibition { species: String, k_i: f64 },
    /// Non-competitive inhibition by equilibrium free NH₃, k_i in kmol/m³
    FreeAmmonia { k_i: f64 },
    /// Non-competitive inhibition by equilibrium free H₂S, k_i in kmol/m³
    FreeSulfide { k_i: f64 },
    PhInhibition { lower: f64, upper: f64 },
    /// c/(c + Σ others)
    Share { species: String, others: Vec<String> },
}

/// k · Π terms.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RateDef {
    pub k: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub terms: Vec<TermDef>,
}

/// A process as declared, before names are resolved.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProcessDef {
    pub id: String,
    /// Coefficient per unit of rate, in each species' basis
    pub stoichiometry: BTreeMap<String, f64>,
    /// Species whose coefficient closes each element
    #[cfg_attr(feature = "serde", serde(default))]
    pub balance: BTreeMap<Element, String>,
    #[cfg_attr(feature = "serde", serde(default = "default_true"))]
    pub conserves_cod: bool,
    pub rate: RateDef,
}

#[cfg(feature = "serde")]
fn default_true() -> bool {
    true
}

impl ProcessDef {
    pub fn new(id: impl Into<String>, rate: RateDef) -> Self {
        Self {
            id: id.into(),
            stoichiometry: BTreeMap::new(),
            balance: BTreeMap::new(),
            conserves_cod: true,
            rate,
        }
    }

    /// Add to the coefficient of one species.
    pub fn with(mut self, species: &str, coefficient: f64) -> Self {
        *self.stoichiometry.entry(species.to_string()).or_insert(0.0) += coefficient;
        self
    }

    pub fn balanced_by(mut self, element: Element, species: &str) -> Self {
        self.balance.insert(element, species.to_string());
        self
    }

    pub fn no_cod_balance(mut self) -> Self {
        self.conserves_cod = false;
        self
    }
}

impl RateDef {
    pub fn new(k: f64) -> Self {
        Self {
            k,
            terms: Vec::new(),
        }
    }

    pub fn term(mut self, term: TermDef) -> Self {
        self.terms.push(term);
        self
    }

    pub fn first_order(self, species: &str) -> Self {
        self.term(TermDef::Concentration {
            species: species.to_string(),
        })
    }

    pub fn monod(self, species: &str, k: f64) -> Self {
        self.term(TermDef::Monod {
            species: species.to_string(),
            k,
        })
    }

    pub fn molar_monod(self, species: &str, k: f64) -> Self {
        self.term(TermDef::MolarMonod {
            species: species.to_string(),
            k,
        })
    }

    pub fn inhibited_by(self, species: &str, k_i: f64) -> Self {
        self.term(TermDef::Inhibition {
            species: species.to_string(),
            k_i,
        })
    }

    pub fn ph(self, lower: f64, upper: f64) -> Self {
        self.term(TermDef::PhInhibition { lower, upper })
    }
}

/// Equilibrium quantities a rate law may read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateContext {
    pub ph: f64,
    /// Free NH₃ [kmol/m³]
    pub free_ammonia: f64,
    /// Free H₂S [kmol/m³]
    pub free_sulfide: f64,
}

#[derive(Debug, Clone, PartialEq)]
enum Term {
    Concentration(SpeciesId),
    SecondOrder(SpeciesId, SpeciesId),
    Monod(SpeciesId, f64),
    /// (species, basis per kmol, k)
    MolarMonod(SpeciesId, f64, f64),
    RatioMonod(SpeciesId, SpeciesId, f64),
    Inhibition(SpeciesId, f64),
    FreeAmmonia(f64),
    FreeSulfide(f64),
    Ph(f64, f64),
    Share(SpeciesId, Vec<SpeciesId>),
}

impl Term {
    #[inline]
    fn eval(&self, state: &DVector<f64>, ctx: &RateContext) -> f64 {
        let c = |id: &SpeciesId| state[id.index()];
        match self {
            Term::Concentration(id) => c(id),
            Term::SecondOrder(a, b) => c(a) * c(b),
            Term::Monod(id, k) => monod(c(id), *k),
            Term::MolarMonod(id, factor, k) => monod(c(id) / factor, *k),
            Term::RatioMonod(num, den, k) => {
                let d = c(den);
                if d <= 0.0 { 0.0 } else { monod(c(num) / d, *k) }
            }
            Term::Inhibition(id, k_i) => non_competitive(c(id), *k_i),
            Term::FreeAmmonia(k_i) => non_competitive(ctx.free_ammonia, *k_i),
            Term::FreeSulfide(k_i) => non_competitive(ctx.free_sulfide, *k_i),
            Term::Ph(lower, upper) => ph_inhibition(ctx.ph, *lower, *upper),
            Term::Share(id, others) => share(c(id), others.iter().map(c).sum()),
        }
    }
}

/// A registered, closed process. Immutable.
#[derive(Debug, Clone, PartialEq)]
pub struct Process {
    id: String,
    stoichiometry: Vec<(SpeciesId, f64)>,
    balance: Vec<(Element, SpeciesId)>,
    conserves_cod: bool,
    k: f64,
    terms: Vec<Term>,
}

impl Process {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Sparse row, balancing coefficients included.
    pub fn stoichiometry(&self) -> &[(SpeciesId, f64)] {
        &self.stoichiometry
    }

    pub fn coefficient(&self, species: SpeciesId) -> f64 {
        self.stoichiometry
            .iter()
            .find(|(id, _)| *id == species)
            .map_or(0.0, |(_, v)| *v)
    }

    pub fn balance(&self) -> &[(Element, SpeciesId)] {
        &self.balance
    }

    pub fn conserves_cod(&self) -> bool {
        self.conserves_cod
    }

    /// Rate [basis/m³/d] at one state.
    pub fn rate(&self, state: &DVector<f64>, ctx: &RateContext) -> f64 {
        self.terms
            .iter()
            .fold(self.k, |acc, t| acc * t.eval(state, ctx))
    }

    /// Σ ν·amount for one conserved quantity.
    pub fn imbalance(&self, registry: &Registry, measure: Measure) -> f64 {
        row_sum(registry, &self.stoichiometry, measure).0
    }
}

/// The immutable set of registered processes.
#[derive(Debug, Clone, Default)]
pub struct ProcessSet {
    processes: Vec<Process>,
    by_id: HashMap<String, usize>,
}

impl ProcessSet {
    /// Resolve, close and validate a list of process declarations.
    pub fn register(registry: &Registry, defs: Vec<ProcessDef>) -> KineticsResult<Self> {
        let mut set = ProcessSet::default();
        for def in defs {
            let process = resolve(registry, def)?;
            if set.by_id.contains_key(&process.id) {
                return Err(KineticsError::invalid(&process.id, "duplicate process id"));
            }
            set.by_id.insert(process.id.clone(), set.processes.len());
            set.processes.push(process);
        }
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Process> + '_ {
        self.processes.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Process> {
        self.by_id.get(id).map(|&i| &self.processes[i])
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    /// Every process rate, in registration order.
    pub fn rates(&self, state: &DVector<f64>, ctx: &RateContext) -> KineticsResult<Vec<f64>> {
        self.processes
            .iter()
            .map(|p| {
                let r = p.rate(state, ctx);
                if r.is_finite() {
                    Ok(r)
                } else {
                    Err(KineticsError::NonFiniteRate {
                        process: p.id.clone(),
                        value: r,
                    })
                }
            })
            .collect()
    }

    /// out += Σ ν·r
    pub fn accumulate(&self, rates: &[f64], out: &mut DVector<f64>) {
        for (p, &r) in self.processes.iter().zip(rates) {
            if r == 0.0 {
                continue;
            }
            for &(id, nu) in &p.stoichiometry {
                out[id.index()] += nu * r;
            }
        }
    }
}

/// (Σ ν·amount, Σ |ν·amount|)
fn row_sum(registry: &Registry, row: &[(SpeciesId, f64)], measure: Measure) -> (f64, f64) {
    row.iter().fold((0.0, 0.0), |(sum, mag), &(id, nu)| {
        let v = nu * registry.species(id).amount_of(measure);
        (sum + v, mag + v.abs())
    })
}

fn lookup_liquid(registry: &Registry, process: &str, name: &str) -> KineticsResult<SpeciesId> {
    let id = registry.lookup(name)?;
    if registry.species(id).phase != Phase::Liquid {
        return Err(KineticsError::invalid(
            process,
            format!("{name} is not a liquid-phase species"),
        ));
    }
    Ok(id)
}

fn resolve(registry: &Registry, def: ProcessDef) -> KineticsResult<Process> {
    let pid = def.id.as_str();
    if pid.trim().is_empty() {
        return Err(KineticsError::invalid(pid, "empty process id"));
    }
    if !(def.rate.k.is_finite() && def.rate.k >= 0.0) {
        return Err(KineticsError::invalid(pid, "rate constant must be finite and non-negative"));
    }

    let mut row: Vec<(SpeciesId, f64)> = Vec::with_capacity(def.stoichiometry.len() + 2);
    for (name, &nu) in &def.stoichiometry {
        if !nu.is_finite() {
            return Err(KineticsError::invalid(pid, format!("non-finite coefficient for {name}")));
        }
        row.push((lookup_liquid(registry, pid, name)?, nu));
    }
    if row.is_empty() {
        return Err(KineticsError::invalid(pid, "empty stoichiometry"));
    }

    // Fill balancing coefficients, in element order.
    let mut balance = Vec::with_capacity(def.balance.len());
    for (&element, name) in &def.balance {
        let id = lookup_liquid(registry, pid, name)?;
        let content = registry.species(id).content.get(element);
        if content <= 0.0 {
            return Err(KineticsError::invalid(
                pid,
                format!("{name} carries no {element} and cannot balance it"),
            ));
        }
        let (imbalance, _) = row_sum(registry, &row, Measure::Element(element));
        let correction = -imbalance / content;
        match row.iter_mut().find(|(sid, _)| *sid == id) {
            Some((_, nu)) => *nu += correction,
            None if correction != 0.0 => row.push((id, correction)),
            None => {}
        }
        balance.push((element, id));
    }

    let check = |measure: Measure| -> KineticsResult<()> {
        let (sum, magnitude) = row_sum(registry, &row, measure);
        if sum.abs() > CLOSURE_ABS_TOL + CLOSURE_REL_TOL * magnitude {
            return Err(KineticsError::ImbalancedStoichiometry {
                process: def.id.clone(),
                quantity: measure.to_string(),
                imbalance: sum,
            });
        }
        Ok(())
    };
    for element in Element::ALL {
        check(Measure::Element(element))?;
    }
    if def.conserves_cod {
        check(Measure::Cod)?;
    }

    let terms = def
        .rate
        .terms
        .iter()
        .map(|t| resolve_term(registry, pid, t))
        .collect::<KineticsResult<Vec<_>>>()?;

    Ok(Process {
        id: def.id,
        stoichiometry: row,
        balance,
        conserves_cod: def.conserves_cod,
        k: def.rate.k,
        terms,
    })
}

fn resolve_term(registry: &Registry, pid: &str, term: &TermDef) -> KineticsResult<Term> {
    let id = |name: &str| lookup_liquid(registry, pid, name);
    let positive = |v: f64, what: &str| -> KineticsResult<f64> {
        if v.is_finite() && v > 0.0 {
            Ok(v)
        } else {
            Err(KineticsError::invalid(pid, format!("{what} must be positive, got {v}")))
        }
    };

    Ok(match term {
        TermDef::Concentration { species } => Term::Concentration(id(species)?),
        TermDef::SecondOrder { first, second } => Term::SecondOrder(id(first)?, id(second)?),
        TermDef::Monod { species, k } => Term::Monod(id(species)?, positive(*k, "half-saturation")?),
        TermDef::MolarMonod { species, k } => {
            let sid = id(species)?;
            Term::MolarMonod(sid, registry.molar_factor(sid), positive(*k, "half-saturation")?)
        }
        TermDef::RatioMonod {
            numerator,
            denominator,
            k,
        } => Term::RatioMonod(id(numerator)?, id(denominator)?, positive(*k, "half-saturation")?),
        TermDef::Inhibition { species, k_i } => {
            Term::Inhibition(id(species)?, positive(*k_i, "inhibition constant")?)
        }
        TermDef::FreeAmmonia { k_i } => Term::FreeAmmonia(positive(*k_i, "inhibition constant")?),
        TermDef::FreeSulfide { k_i } => Term::FreeSulfide(positive(*k_i, "inhibition constant")?),
        TermDef::PhInhibition { lower, upper } => {
            if !(lower.is_finite() && upper.is_finite() && lower < upper) {
                return Err(KineticsError::invalid(pid, "pH limits must satisfy lower < upper"));
            }
            Term::Ph(*lower, *upper)
        }
        TermDef::Share { species, others } => Term::Share(
            id(species)?,
            others.iter().map(|o| id(o)).collect::<KineticsResult<Vec<_>>>()?,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ad_species::catalog::{self, names};

    fn ctx() -> RateContext {
        RateContext {
            ph: 7.2,
            free_ammonia: 0.0,
            free_sulfide: 0.0,
        }
    }

    fn acetate_uptake(y: f64) -> ProcessDef {
        ProcessDef::new(
            "uptake_ac",
            RateDef::new(8.0).monod(names::S_AC, 0.15).first_order(names::X_AC),
        )
        .with(names::S_AC, -1.0)
        .with(names::X_AC, y)
        .with(names::S_CH4, 1.0 - y)
        .balanced_by(Element::C, names::S_IC)
        .balanced_by(Element::N, names::S_IN)
        .balanced_by(Element::P, names::S_IP)
    }

    #[test]
    fn balancing_fills_carbon_and_nitrogen() {
        let reg = catalog::default_registry().unwrap();
        let set = ProcessSet::register(&reg, vec![acetate_uptake(0.05)]).unwrap();
        let p = set.get("uptake_ac").unwrap();
        let s_ic = reg.lookup(names::S_IC).unwrap();
        let s_in = reg.lookup(names::S_IN).unwrap();
        // methanogenesis releases CO2 and takes up ammonium for growth
        assert!(p.coefficient(s_ic) > 0.0);
        assert!(p.coefficient(s_in) < 0.0);
        for m in Measure::all() {
            assert!(p.imbalance(&reg, m).abs() < 1e-12, "{m}");
        }
    }

    #[test]
    fn cod_imbalance_is_reported() {
        let reg = catalog::default_registry().unwrap();
        let def = ProcessDef::new("leaky", RateDef::new(1.0))
            .with(names::S_AC, -1.0)
            .with(names::S_CH4, 0.5)
            .balanced_by(Element::C, names::S_IC);
        match ProcessSet::register(&reg, vec![def]) {
            Err(KineticsError::ImbalancedStoichiometry {
                process,
                quantity,
                imbalance,
            }) => {
                assert_eq!(process, "leaky");
                assert_eq!(quantity, "COD");
                assert!((imbalance + 0.5).abs() < 1e-12);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unbalanced_element_is_reported() {
        let reg = catalog::default_registry().unwrap();
        let def = ProcessDef::new("no_carbon_sink", RateDef::new(1.0))
            .with(names::S_AC, -1.0)
            .with(names::S_CH4, 1.0);
        let err = ProcessSet::register(&reg, vec![def]).unwrap_err();
        assert!(matches!(
            err,
            KineticsError::ImbalancedStoichiometry { ref quantity, .. } if quantity == "C"
        ));
    }

    #[test]
    fn unknown_species_fails_registration() {
        let reg = catalog::default_registry().unwrap();
        let def = ProcessDef::new("p", RateDef::new(1.0)).with("S_nope", -1.0);
        assert!(matches!(
            ProcessSet::register(&reg, vec![def]),
            Err(KineticsError::Species(_))
        ));
    }

    #[test]
    fn headspace_species_rejected() {
        let reg = catalog::default_registry().unwrap();
        let def = ProcessDef::new("p", RateDef::new(1.0)).with(names::G_CH4, 1.0);
        assert!(matches!(
            ProcessSet::register(&reg, vec![def]),
            Err(KineticsError::InvalidProcess { .. })
        ));
    }

    #[test]
    fn duplicate_process_rejected() {
        let reg = catalog::default_registry().unwrap();
        let err =
            ProcessSet::register(&reg, vec![acetate_uptake(0.05), acetate_uptake(0.05)]).unwrap_err();
        assert!(matches!(err, KineticsError::InvalidProcess { .. }));
    }

    #[test]
    fn rate_and_accumulate() {
        let reg = catalog::default_registry().unwrap();
        let set = ProcessSet::register(&reg, vec![acetate_uptake(0.05)]).unwrap();
        let state = reg
            .state_from_named([(names::S_AC, 0.15), (names::X_AC, 2.0)])
            .unwrap();
        let rates = set.rates(&state, &ctx()).unwrap();
        assert!((rates[0] - 8.0 * 0.5 * 2.0).abs() < 1e-12);

        let mut out = reg.zeros();
        set.accumulate(&rates, &mut out);
        let ac = reg.lookup(names::S_AC).unwrap();
        let ch4 = reg.lookup(names::S_CH4).unwrap();
        assert!((out[ac.index()] + 8.0).abs() < 1e-12);
        assert!((out[ch4.index()] - 8.0 * 0.95).abs() < 1e-12);
    }

    #[test]
    fn ratio_monod_is_zero_without_denominator() {
        let reg = catalog::default_registry().unwrap();
        let def = ProcessDef::new(
            "pp",
            RateDef::new(1.0).term(TermDef::RatioMonod {
                numerator: names::X_PP.into(),
                denominator: names::X_PAO.into(),
                k: 0.01,
            }),
        )
        .with(names::X_PHA, 0.0)
        .with(names::S_AC, 0.0);
        let set = ProcessSet::register(&reg, vec![def]).unwrap();
        let state = reg.state_from_named([(names::X_PP, 1.0)]).unwrap();
        assert_eq!(set.rates(&state, &ctx()).unwrap()[0], 0.0);
    }
}
