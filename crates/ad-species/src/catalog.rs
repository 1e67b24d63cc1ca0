//! Default extended species catalog.
//!
//! 62 liquid-phase species (ADM1 core, biological phosphorus, sulfur, iron,
//! strong ions and mineral precipitates) plus 4 headspace gases. Organic
//! species are measured as COD, inorganic nutrients as their element,
//! minerals as raw mass. COD and elemental content derive from nominal
//! formulas where one exists.

use crate::error::SpeciesResult;
use crate::registry::Registry;
use crate::species::{Basis, Category, Element, ElementalContent, Phase, Species};

use ad_core::constants::COD_PER_ELECTRON;

/// Species identifiers of the default catalog.
pub mod names {
    pub const S_SU: &str = "S_su";
    pub const S_AA: &str = "S_aa";
    pub const S_FA: &str = "S_fa";
    pub const S_VA: &str = "S_va";
    pub const S_BU: &str = "S_bu";
    pub const S_PRO: &str = "S_pro";
    pub const S_AC: &str = "S_ac";
    pub const S_H2: &str = "S_h2";
    pub const S_CH4: &str = "S_ch4";
    pub const S_IC: &str = "S_IC";
    pub const S_IN: &str = "S_IN";
    pub const S_IP: &str = "S_IP";
    pub const S_I: &str = "S_I";
    pub const X_CH: &str = "X_ch";
    pub const X_PR: &str = "X_pr";
    pub const X_LI: &str = "X_li";
    pub const X_SU: &str = "X_su";
    pub const X_AA: &str = "X_aa";
    pub const X_FA: &str = "X_fa";
    pub const X_C4: &str = "X_c4";
    pub const X_PRO: &str = "X_pro";
    pub const X_AC: &str = "X_ac";
    pub const X_H2: &str = "X_h2";
    pub const X_I: &str = "X_I";
    pub const X_PHA: &str = "X_PHA";
    pub const X_PP: &str = "X_PP";
    pub const X_PAO: &str = "X_PAO";
    pub const S_K: &str = "S_K";
    pub const S_MG: &str = "S_Mg";
    pub const S_SO4: &str = "S_SO4";
    pub const S_IS: &str = "S_IS";
    pub const X_HSRB: &str = "X_hSRB";
    pub const X_ASRB: &str = "X_aSRB";
    pub const X_PSRB: &str = "X_pSRB";
    pub const X_C4SRB: &str = "X_c4SRB";
    pub const S_S0: &str = "S_S0";
    pub const S_FE3: &str = "S_Fe3";
    pub const S_FE2: &str = "S_Fe2";
    pub const X_HFO_H: &str = "X_HFO_H";
    pub const X_HFO_L: &str = "X_HFO_L";
    pub const X_HFO_OLD: &str = "X_HFO_old";
    pub const X_HFO_HP: &str = "X_HFO_HP";
    pub const X_HFO_LP: &str = "X_HFO_LP";
    pub const X_HFO_HP_OLD: &str = "X_HFO_HP_old";
    pub const X_HFO_LP_OLD: &str = "X_HFO_LP_old";
    pub const S_CA: &str = "S_Ca";
    pub const S_AL: &str = "S_Al";
    pub const X_CCM: &str = "X_CCM";
    pub const X_ACC: &str = "X_ACC";
    pub const X_ACP: &str = "X_ACP";
    pub const X_HAP: &str = "X_HAP";
    pub const X_DCPD: &str = "X_DCPD";
    pub const X_OCP: &str = "X_OCP";
    pub const X_STRUV: &str = "X_struv";
    pub const X_NEWB: &str = "X_newb";
    pub const X_MAGN: &str = "X_magn";
    pub const X_KSTRUV: &str = "X_kstruv";
    pub const X_FES: &str = "X_FeS";
    pub const X_FE3PO42: &str = "X_Fe3PO42";
    pub const X_ALPO4: &str = "X_AlPO4";
    pub const S_NA: &str = "S_Na";
    pub const S_CL: &str = "S_Cl";
    pub const G_H2: &str = "G_h2";
    pub const G_CH4: &str = "G_ch4";
    pub const G_CO2: &str = "G_co2";
    pub const G_H2S: &str = "G_h2s";
}

use names::*;

/// COD of sulfide sulfur (S²⁻ → SO₄²⁻), kg COD per kg S.
pub const COD_PER_SULFIDE_S: f64 = 2.0;
/// COD of elemental sulfur (S⁰ → SO₄²⁻), kg COD per kg S.
pub const COD_PER_ELEMENTAL_S: f64 = 1.5;
/// Phosphorus bound per iron in high-capacity HFO, kmol P / kmol Fe.
pub const HFO_H_P_PER_FE: f64 = 0.2;
/// Phosphorus bound per iron in low-capacity HFO, kmol P / kmol Fe.
pub const HFO_L_P_PER_FE: f64 = 0.1;
/// Potassium and magnesium per phosphorus in polyphosphate (K₀.₃₃Mg₀.₃₃PO₃), kmol/kmol.
pub const PP_K_PER_P: f64 = 0.33;
pub const PP_MG_PER_P: f64 = 0.33;
/// Phosphorus content of active biomass, kg P / kg COD.
pub const BIOMASS_P: f64 = 0.02;

const H: f64 = 1.008;
const O: f64 = 15.999;
const NA: f64 = 22.990;
const CL: f64 = 35.45;

/// Empirical organic formula CcHhOoNn.
#[derive(Clone, Copy)]
struct Organic {
    c: f64,
    h: f64,
    o: f64,
    n: f64,
}

impl Organic {
    const fn new(c: f64, h: f64, o: f64, n: f64) -> Self {
        Self { c, h, o, n }
    }

    fn molar_mass(&self) -> f64 {
        self.c * Element::C.atomic_mass()
            + self.h * H
            + self.o * O
            + self.n * Element::N.atomic_mass()
    }

    /// Oxygen demand per kmol with nitrogen leaving as NH₃.
    fn cod_per_kmol(&self) -> f64 {
        COD_PER_ELECTRON * (4.0 * self.c + self.h - 2.0 * self.o - 3.0 * self.n)
    }
}

fn organic(
    id: &str,
    name: &str,
    category: Category,
    formula: Organic,
    p_per_cod: f64,
) -> Species {
    let cod_per_kmol = formula.cod_per_kmol();
    Species {
        id: id.to_string(),
        name: name.to_string(),
        category,
        phase: Phase::Liquid,
        basis: Basis::Cod,
        molar_mass: formula.molar_mass(),
        basis_per_kmol: cod_per_kmol,
        cod: Some(1.0),
        charge: 0.0,
        content: ElementalContent::default()
            .with(
                Element::C,
                formula.c * Element::C.atomic_mass() / cod_per_kmol,
            )
            .with(
                Element::N,
                formula.n * Element::N.atomic_mass() / cod_per_kmol,
            )
            .with(Element::P, p_per_cod),
    }
}

/// Lumped inert organics with literature content per kg COD.
fn lumped_inert(id: &str, name: &str, c: f64, n: f64, p: f64) -> Species {
    // nominal: biomass-like C5H7NO2
    let nominal = Organic::new(5.0, 7.0, 2.0, 1.0);
    Species {
        id: id.to_string(),
        name: name.to_string(),
        category: Category::Inert,
        phase: Phase::Liquid,
        basis: Basis::Cod,
        molar_mass: nominal.molar_mass(),
        basis_per_kmol: nominal.cod_per_kmol(),
        cod: Some(1.0),
        charge: 0.0,
        content: ElementalContent::default()
            .with(Element::C, c)
            .with(Element::N, n)
            .with(Element::P, p),
    }
}

fn biomass(id: &str, name: &str) -> Species {
    organic(
        id,
        name,
        Category::Biomass,
        Organic::new(5.0, 7.0, 2.0, 1.0),
        BIOMASS_P,
    )
}

/// Dissolved species measured as one of its elements, one atom per formula unit.
fn measured_as(
    id: &str,
    name: &str,
    category: Category,
    element: Element,
    molar_mass: f64,
    charge: f64,
    cod: Option<f64>,
) -> Species {
    Species {
        id: id.to_string(),
        name: name.to_string(),
        category,
        phase: Phase::Liquid,
        basis: Basis::Element(element),
        molar_mass,
        basis_per_kmol: element.atomic_mass(),
        cod,
        charge,
        content: ElementalContent::default().with(element, 1.0),
    }
}

/// Mineral measured as raw mass, formula given as (element, count) plus the
/// untracked remainder (H, O, Na, Cl) in kg/kmol.
fn mineral(id: &str, name: &str, atoms: &[(Element, f64)], other_mass: f64) -> Species {
    let mw: f64 = atoms
        .iter()
        .map(|(e, n)| e.atomic_mass() * n)
        .sum::<f64>()
        + other_mass;
    let mut content = ElementalContent::default();
    for &(e, n) in atoms {
        content.set(e, e.atomic_mass() * n / mw);
    }
    Species {
        id: id.to_string(),
        name: name.to_string(),
        category: Category::MineralPrecipitate,
        phase: Phase::Liquid,
        basis: Basis::Mass,
        molar_mass: mw,
        basis_per_kmol: mw,
        cod: None,
        charge: 0.0,
        content,
    }
}

/// Hydrous ferric oxide measured as Fe, with `p_per_fe` kmol P bound per kmol Fe.
fn hfo(id: &str, name: &str, p_per_fe: f64) -> Species {
    let fe = Element::Fe.atomic_mass();
    let p = Element::P.atomic_mass();
    Species {
        id: id.to_string(),
        name: name.to_string(),
        category: Category::MineralPrecipitate,
        phase: Phase::Liquid,
        basis: Basis::Element(Element::Fe),
        // Fe(OH)₃
        molar_mass: fe + 3.0 * (O + H) + p_per_fe * (p + 4.0 * O),
        basis_per_kmol: fe,
        cod: None,
        charge: 0.0,
        content: ElementalContent::default()
            .with(Element::Fe, 1.0)
            .with(Element::P, p_per_fe * p / fe),
    }
}

fn headspace(mut sp: Species, id: &str, name: &str) -> Species {
    sp.id = id.to_string();
    sp.name = name.to_string();
    sp.category = Category::Gas;
    sp.phase = Phase::Headspace;
    sp.charge = 0.0;
    sp
}

fn strong_ion(id: &str, name: &str, basis: Basis, mass: f64, charge: f64) -> Species {
    Species {
        id: id.to_string(),
        name: name.to_string(),
        category: Category::SolubleInorganic,
        phase: Phase::Liquid,
        basis,
        molar_mass: mass,
        basis_per_kmol: mass,
        cod: None,
        charge,
        content: ElementalContent::default(),
    }
}

const SUGAR: Organic = Organic::new(6.0, 12.0, 6.0, 0.0);
const AMINO: Organic = Organic::new(4.0, 6.1, 1.2, 1.0);
const PALMITATE: Organic = Organic::new(16.0, 32.0, 2.0, 0.0);
const VALERATE: Organic = Organic::new(5.0, 10.0, 2.0, 0.0);
const BUTYRATE: Organic = Organic::new(4.0, 8.0, 2.0, 0.0);
const PROPIONATE: Organic = Organic::new(3.0, 6.0, 2.0, 0.0);
const ACETATE: Organic = Organic::new(2.0, 4.0, 2.0, 0.0);
const HYDROGEN: Organic = Organic::new(0.0, 2.0, 0.0, 0.0);
const METHANE: Organic = Organic::new(1.0, 4.0, 0.0, 0.0);
const STARCH: Organic = Organic::new(6.0, 10.0, 5.0, 0.0);
const TRIPALMITIN: Organic = Organic::new(51.0, 98.0, 6.0, 0.0);
const PHB: Organic = Organic::new(4.0, 6.0, 2.0, 0.0);

/// The full default species list, in declared order.
pub fn default_species() -> Vec<Species> {
    use Category::*;

    let fe = Element::Fe.atomic_mass();
    let p = Element::P.atomic_mass();
    let s = Element::S.atomic_mass();
    let c = Element::C.atomic_mass();

    let hydrogen = organic(S_H2, "Dissolved hydrogen", SolubleSubstrate, HYDROGEN, 0.0);
    let methane = organic(S_CH4, "Dissolved methane", SolubleSubstrate, METHANE, 0.0);
    let inorganic_c = measured_as(
        S_IC,
        "Inorganic carbon",
        SolubleInorganic,
        Element::C,
        c + 2.0 * O,
        0.0,
        None,
    );
    let sulfide = measured_as(
        S_IS,
        "Total sulfide",
        SolubleInorganic,
        Element::S,
        s + 2.0 * H,
        0.0,
        Some(COD_PER_SULFIDE_S),
    );

    let mut polyphosphate = measured_as(
        X_PP,
        "Polyphosphate",
        ParticulateSubstrate,
        Element::P,
        PP_K_PER_P * Element::K.atomic_mass()
            + PP_MG_PER_P * Element::Mg.atomic_mass()
            + p
            + 3.0 * O,
        0.0,
        None,
    );
    polyphosphate.content = polyphosphate
        .content
        .with(Element::K, PP_K_PER_P * Element::K.atomic_mass() / p)
        .with(Element::Mg, PP_MG_PER_P * Element::Mg.atomic_mass() / p);

    vec![
        organic(S_SU, "Monosaccharides", SolubleSubstrate, SUGAR, 0.0),
        organic(S_AA, "Amino acids", SolubleSubstrate, AMINO, 0.0),
        organic(S_FA, "Long-chain fatty acids", SolubleSubstrate, PALMITATE, 0.0),
        organic(S_VA, "Total valerate", SolubleSubstrate, VALERATE, 0.0),
        organic(S_BU, "Total butyrate", SolubleSubstrate, BUTYRATE, 0.0),
        organic(S_PRO, "Total propionate", SolubleSubstrate, PROPIONATE, 0.0),
        organic(S_AC, "Total acetate", SolubleSubstrate, ACETATE, 0.0),
        hydrogen.clone(),
        methane.clone(),
        inorganic_c.clone(),
        measured_as(
            S_IN,
            "Inorganic nitrogen",
            SolubleInorganic,
            Element::N,
            Element::N.atomic_mass() + 3.0 * H,
            0.0,
            None,
        ),
        measured_as(
            S_IP,
            "Inorganic phosphorus",
            SolubleInorganic,
            Element::P,
            p + 4.0 * O + 3.0 * H,
            0.0,
            None,
        ),
        lumped_inert(S_I, "Soluble inerts", 0.36, 0.06, 0.0),
        organic(X_CH, "Carbohydrates", ParticulateSubstrate, STARCH, 0.0),
        organic(X_PR, "Proteins", ParticulateSubstrate, AMINO, 0.0),
        organic(X_LI, "Lipids", ParticulateSubstrate, TRIPALMITIN, 0.0),
        biomass(X_SU, "Sugar degraders"),
        biomass(X_AA, "Amino acid degraders"),
        biomass(X_FA, "LCFA degraders"),
        biomass(X_C4, "Valerate and butyrate degraders"),
        biomass(X_PRO, "Propionate degraders"),
        biomass(X_AC, "Acetoclastic methanogens"),
        biomass(X_H2, "Hydrogenotrophic methanogens"),
        lumped_inert(X_I, "Particulate inerts", 0.36, 0.06, 0.01),
        organic(X_PHA, "Polyhydroxyalkanoates", ParticulateSubstrate, PHB, 0.0),
        polyphosphate,
        biomass(X_PAO, "Phosphorus-accumulating organisms"),
        strong_ion(
            S_K,
            "Potassium",
            Basis::Element(Element::K),
            Element::K.atomic_mass(),
            1.0,
        )
        .with_content(Element::K, 1.0),
        strong_ion(
            S_MG,
            "Magnesium",
            Basis::Element(Element::Mg),
            Element::Mg.atomic_mass(),
            2.0,
        )
        .with_content(Element::Mg, 1.0),
        measured_as(
            S_SO4,
            "Sulfate",
            SolubleInorganic,
            Element::S,
            s + 4.0 * O,
            -2.0,
            None,
        ),
        sulfide.clone(),
        biomass(X_HSRB, "Hydrogen-utilizing SRB"),
        biomass(X_ASRB, "Acetate-utilizing SRB"),
        biomass(X_PSRB, "Propionate-utilizing SRB"),
        biomass(X_C4SRB, "Valerate and butyrate utilizing SRB"),
        measured_as(
            S_S0,
            "Elemental sulfur",
            SolubleInorganic,
            Element::S,
            s,
            0.0,
            Some(COD_PER_ELEMENTAL_S),
        ),
        measured_as(S_FE3, "Ferric iron", SolubleInorganic, Element::Fe, fe, 3.0, None),
        measured_as(
            S_FE2,
            "Ferrous iron",
            SolubleInorganic,
            Element::Fe,
            fe,
            2.0,
            Some(COD_PER_ELECTRON / fe),
        ),
        hfo(X_HFO_H, "HFO, high reactivity", 0.0),
        hfo(X_HFO_L, "HFO, low reactivity", 0.0),
        hfo(X_HFO_OLD, "HFO, aged", 0.0),
        hfo(X_HFO_HP, "HFO, high reactivity with bound P", HFO_H_P_PER_FE),
        hfo(X_HFO_LP, "HFO, low reactivity with bound P", HFO_L_P_PER_FE),
        hfo(X_HFO_HP_OLD, "HFO, aged high with bound P", HFO_H_P_PER_FE),
        hfo(X_HFO_LP_OLD, "HFO, aged low with bound P", HFO_L_P_PER_FE),
        strong_ion(
            S_CA,
            "Calcium",
            Basis::Element(Element::Ca),
            Element::Ca.atomic_mass(),
            2.0,
        )
        .with_content(Element::Ca, 1.0),
        strong_ion(
            S_AL,
            "Aluminium",
            Basis::Element(Element::Al),
            Element::Al.atomic_mass(),
            3.0,
        )
        .with_content(Element::Al, 1.0),
        mineral(X_CCM, "Calcite", &[(Element::Ca, 1.0), (Element::C, 1.0)], 3.0 * O),
        mineral(X_ACC, "Aragonite", &[(Element::Ca, 1.0), (Element::C, 1.0)], 3.0 * O),
        mineral(
            X_ACP,
            "Amorphous calcium phosphate",
            &[(Element::Ca, 3.0), (Element::P, 2.0)],
            8.0 * O,
        ),
        mineral(
            X_HAP,
            "Hydroxylapatite",
            &[(Element::Ca, 5.0), (Element::P, 3.0)],
            13.0 * O + H,
        ),
        mineral(
            X_DCPD,
            "Brushite",
            &[(Element::Ca, 1.0), (Element::P, 1.0)],
            6.0 * O + 5.0 * H,
        ),
        mineral(
            X_OCP,
            "Octacalcium phosphate",
            &[(Element::Ca, 8.0), (Element::P, 6.0)],
            29.0 * O + 12.0 * H,
        ),
        mineral(
            X_STRUV,
            "Struvite",
            &[(Element::Mg, 1.0), (Element::N, 1.0), (Element::P, 1.0)],
            10.0 * O + 16.0 * H,
        ),
        mineral(
            X_NEWB,
            "Newberyite",
            &[(Element::Mg, 1.0), (Element::P, 1.0)],
            7.0 * O + 7.0 * H,
        ),
        mineral(X_MAGN, "Magnesite", &[(Element::Mg, 1.0), (Element::C, 1.0)], 3.0 * O),
        mineral(
            X_KSTRUV,
            "K-struvite",
            &[(Element::Mg, 1.0), (Element::K, 1.0), (Element::P, 1.0)],
            10.0 * O + 12.0 * H,
        ),
        mineral(X_FES, "Iron sulfide", &[(Element::Fe, 1.0), (Element::S, 1.0)], 0.0),
        mineral(
            X_FE3PO42,
            "Vivianite",
            &[(Element::Fe, 3.0), (Element::P, 2.0)],
            16.0 * O + 16.0 * H,
        ),
        mineral(
            X_ALPO4,
            "Aluminium phosphate",
            &[(Element::Al, 1.0), (Element::P, 1.0)],
            4.0 * O,
        ),
        strong_ion(S_NA, "Sodium", Basis::Sodium, NA, 1.0),
        strong_ion(S_CL, "Chloride", Basis::Chloride, CL, -1.0),
        headspace(hydrogen, G_H2, "Headspace hydrogen"),
        headspace(methane, G_CH4, "Headspace methane"),
        headspace(inorganic_c, G_CO2, "Headspace carbon dioxide"),
        headspace(sulfide, G_H2S, "Headspace hydrogen sulfide"),
    ]
}

impl Species {
    fn with_content(mut self, element: Element, value: f64) -> Self {
        self.content.set(element, value);
        self
    }
}

/// Register the default catalog.
pub fn default_registry() -> SpeciesResult<Registry> {
    Registry::register(default_species())
}
