//! Species metadata records.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Conserved elements tracked across stoichiometric rows and mass balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Element {
    C,
    N,
    P,
    S,
    Fe,
    K,
    Mg,
    Ca,
    Al,
}

impl Element {
    pub const ALL: [Element; 9] = [
        Element::C,
        Element::N,
        Element::P,
        Element::S,
        Element::Fe,
        Element::K,
        Element::Mg,
        Element::Ca,
        Element::Al,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Element::C => "C",
            Element::N => "N",
            Element::P => "P",
            Element::S => "S",
            Element::Fe => "Fe",
            Element::K => "K",
            Element::Mg => "Mg",
            Element::Ca => "Ca",
            Element::Al => "Al",
        }
    }

    /// Standard atomic mass [kg/kmol].
    pub fn atomic_mass(&self) -> f64 {
        match self {
            Element::C => 12.011,
            Element::N => 14.007,
            Element::P => 30.974,
            Element::S => 32.06,
            Element::Fe => 55.845,
            Element::K => 39.098,
            Element::Mg => 24.305,
            Element::Ca => 40.078,
            Element::Al => 26.982,
        }
    }
}

impl std::str::FromStr for Element {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Element::ALL
            .iter()
            .copied()
            .find(|e| e.symbol().eq_ignore_ascii_case(s.trim()))
            .ok_or("unknown element")
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A conserved quantity: COD or one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Measure {
    Cod,
    Element(Element),
}

impl Measure {
    /// COD followed by every tracked element.
    pub fn all() -> impl Iterator<Item = Measure> {
        std::iter::once(Measure::Cod).chain(Element::ALL.iter().copied().map(Measure::Element))
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measure::Cod => f.write_str("COD"),
            Measure::Element(e) => write!(f, "{e}"),
        }
    }
}

/// What one unit of a species' concentration is measured as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Basis {
    /// kg COD
    Cod,
    /// kg of one element
    Element(Element),
    /// kg Na
    Sodium,
    /// kg Cl
    Chloride,
    /// kg of the compound itself
    Mass,
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Basis::Cod => f.write_str("kg COD"),
            Basis::Element(e) => write!(f, "kg {e}"),
            Basis::Sodium => f.write_str("kg Na"),
            Basis::Chloride => f.write_str("kg Cl"),
            Basis::Mass => f.write_str("kg"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Category {
    SolubleSubstrate,
    SolubleInorganic,
    ParticulateSubstrate,
    Biomass,
    MineralPrecipitate,
    Gas,
    Inert,
}

/// Which volume a concentration refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Phase {
    #[default]
    Liquid,
    Headspace,
}

/// Elemental content per unit of the species' basis (kg element / kg basis).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ElementalContent {
    pub c: f64,
    pub n: f64,
    pub p: f64,
    pub s: f64,
    pub fe: f64,
    pub k: f64,
    pub mg: f64,
    pub ca: f64,
    pub al: f64,
}

impl ElementalContent {
    pub fn get(&self, element: Element) -> f64 {
        match element {
            Element::C => self.c,
            Element::N => self.n,
            Element::P => self.p,
            Element::S => self.s,
            Element::Fe => self.fe,
            Element::K => self.k,
            Element::Mg => self.mg,
            Element::Ca => self.ca,
            Element::Al => self.al,
        }
    }

    pub fn set(&mut self, element: Element, value: f64) {
        let slot = match element {
            Element::C => &mut self.c,
            Element::N => &mut self.n,
            Element::P => &mut self.p,
            Element::S => &mut self.s,
            Element::Fe => &mut self.fe,
            Element::K => &mut self.k,
            Element::Mg => &mut self.mg,
            Element::Ca => &mut self.ca,
            Element::Al => &mut self.al,
        };
        *slot = value;
    }

    pub fn with(mut self, element: Element, value: f64) -> Self {
        self.set(element, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Element, f64)> + '_ {
        Element::ALL.iter().map(move |&e| (e, self.get(e)))
    }
}

/// One registered chemical or biological species.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Species {
    /// Unique identifier (e.g. `S_ac`)
    pub id: String,
    /// Human-readable name
    pub name: String,
    pub category: Category,
    #[cfg_attr(feature = "serde", serde(default))]
    pub phase: Phase,
    pub basis: Basis,
    /// Molar mass of the nominal formula [kg/kmol]
    pub molar_mass: f64,
    /// Basis mass carried by one kmol of species [kg basis/kmol].
    ///
    /// This is the only factor used to turn a concentration into kmol/m³.
    pub basis_per_kmol: f64,
    /// COD per unit of basis, `None` if not oxidizable in this model
    #[cfg_attr(feature = "serde", serde(default))]
    pub cod: Option<f64>,
    /// Ionic charge per kmol, for strong ions only
    #[cfg_attr(feature = "serde", serde(default))]
    pub charge: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub content: ElementalContent,
}

impl Species {
    /// Amount of a conserved quantity per unit of basis.
    pub fn amount_of(&self, measure: Measure) -> f64 {
        match measure {
            Measure::Cod => self.cod.unwrap_or(0.0),
            Measure::Element(e) => self.content.get(e),
        }
    }

    /// Convert a basis concentration [kg basis/m³] to [kmol/m³].
    #[inline]
    pub fn to_molar(&self, concentration: f64) -> f64 {
        concentration / self.basis_per_kmol
    }

    /// Convert [kmol/m³] back to the basis concentration.
    #[inline]
    pub fn from_molar(&self, molar: f64) -> f64 {
        molar * self.basis_per_kmol
    }
}
