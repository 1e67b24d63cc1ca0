//! The default process set: ADM1 core plus phosphorus, sulfur and iron.

use std::ops::Range;

use ad_core::SpeciesId;
use ad_core::constants::COD_PER_ELECTRON;
use ad_species::catalog::{COD_PER_ELEMENTAL_S, COD_PER_SULFIDE_S, names::*};
use ad_species::{Element, Registry};
use tracing::debug;

use crate::error::KineticsResult;
use crate::params::KineticParams;
use crate::process::{ProcessDef, ProcessSet, RateDef, TermDef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessGroup {
    Hydrolysis,
    Uptake,
    Decay,
    PhaStorage,
    Lysis,
    SulfateReduction,
    SrbDecay,
    IronReduction,
    HfoAdsorption,
    HfoAging,
    HfoDissolution,
    /// Processes supplied on top of the default set
    Extra,
}

/// Resolved positions a run needs alongside the process set.
#[derive(Debug, Clone, PartialEq)]
pub struct KineticIndex {
    /// Contiguous process ranges, in registration order
    pub groups: Vec<(ProcessGroup, Range<usize>)>,
    pub s_ch4: SpeciesId,
    pub s_h2: SpeciesId,
    pub s_ic: SpeciesId,
    pub s_in: SpeciesId,
    pub s_ip: SpeciesId,
    pub s_so4: SpeciesId,
    pub s_is: SpeciesId,
}

impl KineticIndex {
    pub fn group(&self, group: ProcessGroup) -> Range<usize> {
        self.groups
            .iter()
            .find(|(g, _)| *g == group)
            .map_or(0..0, |(_, r)| r.clone())
    }
}

/// Electron-acceptor bookkeeping for iron reduction.
fn fe_electrons() -> f64 {
    COD_PER_ELECTRON / Element::Fe.atomic_mass()
}

/// kg sulfide-S oxidized to S⁰ per kg Fe reduced.
fn sulfide_per_fe() -> f64 {
    fe_electrons() / (COD_PER_SULFIDE_S - COD_PER_ELEMENTAL_S)
}

fn cnp(def: ProcessDef) -> ProcessDef {
    def.balanced_by(Element::C, S_IC)
        .balanced_by(Element::N, S_IN)
        .balanced_by(Element::P, S_IP)
}

fn growth_limits(rate: RateDef, p: &KineticParams) -> RateDef {
    rate.molar_monod(S_IN, p.k_s_in_mol)
        .molar_monod(S_IP, p.k_s_ip_mol)
}

fn free_sulfide(rate: RateDef, k_i: f64) -> RateDef {
    rate.term(TermDef::FreeSulfide { k_i })
}

fn share(rate: RateDef, species: &str, others: &[&str]) -> RateDef {
    rate.term(TermDef::Share {
        species: species.to_string(),
        others: others.iter().map(|s| s.to_string()).collect(),
    })
}

fn decay(id: &str, biomass: &str, k: f64, p: &KineticParams) -> ProcessDef {
    let rest = 1.0 - p.f_xi_dec;
    cnp(ProcessDef::new(id, RateDef::new(k).first_order(biomass))
        .with(biomass, -1.0)
        .with(X_I, p.f_xi_dec)
        .with(X_CH, rest * p.f_ch_dec)
        .with(X_PR, rest * p.f_pr_dec)
        .with(X_LI, rest * p.f_li_dec))
}

/// Products as (species, share of the non-yield fraction).
fn uptake(
    id: &str,
    substrate: &str,
    biomass: &str,
    y: f64,
    products: &[(&str, f64)],
    rate: RateDef,
) -> ProcessDef {
    let mut def = ProcessDef::new(id, rate)
        .with(substrate, -1.0)
        .with(biomass, y);
    for &(species, f) in products {
        def = def.with(species, (1.0 - y) * f);
    }
    cnp(def)
}

/// SRB uptake: electrons not routed to `products` reduce sulfate.
fn srb_uptake(
    id: &str,
    substrate: &str,
    biomass: &str,
    y: f64,
    products: &[(&str, f64)],
    rate: RateDef,
) -> ProcessDef {
    let to_products: f64 = products.iter().map(|(_, f)| f).sum();
    let sulfur = (1.0 - y) * (1.0 - to_products) / COD_PER_SULFIDE_S;
    uptake(id, substrate, biomass, y, products, rate)
        .with(S_SO4, -sulfur)
        .with(S_IS, sulfur)
}

fn hydrolysis(p: &KineticParams) -> Vec<ProcessDef> {
    vec![
        cnp(ProcessDef::new("hydrolysis_ch", RateDef::new(p.k_hyd_ch).first_order(X_CH))
            .with(X_CH, -1.0)
            .with(S_SU, 1.0)),
        cnp(ProcessDef::new("hydrolysis_pr", RateDef::new(p.k_hyd_pr).first_order(X_PR))
            .with(X_PR, -1.0)
            .with(S_AA, 1.0)),
        cnp(ProcessDef::new("hydrolysis_li", RateDef::new(p.k_hyd_li).first_order(X_LI))
            .with(X_LI, -1.0)
            .with(S_FA, p.f_fa_li)
            .with(S_SU, 1.0 - p.f_fa_li)),
    ]
}

fn acidogenesis_and_methanogenesis(p: &KineticParams) -> Vec<ProcessDef> {
    let aa = (p.ph_ll_aa, p.ph_ul_aa);
    let base = |k: f64, s: &str, k_s: f64, x: &str, ph: (f64, f64)| {
        growth_limits(RateDef::new(k).monod(s, k_s).first_order(x).ph(ph.0, ph.1), p)
    };

    vec![
        uptake(
            "uptake_su",
            S_SU,
            X_SU,
            p.y_su,
            &[
                (S_H2, p.f_h2_su),
                (S_BU, p.f_bu_su),
                (S_PRO, p.f_pro_su),
                (S_AC, p.f_ac_su),
            ],
            base(p.k_m_su, S_SU, p.k_s_su, X_SU, aa),
        ),
        uptake(
            "uptake_aa",
            S_AA,
            X_AA,
            p.y_aa,
            &[
                (S_H2, p.f_h2_aa),
                (S_VA, p.f_va_aa),
                (S_BU, p.f_bu_aa),
                (S_PRO, p.f_pro_aa),
                (S_AC, p.f_ac_aa),
            ],
            base(p.k_m_aa, S_AA, p.k_s_aa, X_AA, aa),
        ),
        uptake(
            "uptake_fa",
            S_FA,
            X_FA,
            p.y_fa,
            &[(S_H2, p.f_h2_fa), (S_AC, 1.0 - p.f_h2_fa)],
            base(p.k_m_fa, S_FA, p.k_s_fa, X_FA, aa).inhibited_by(S_H2, p.k_i_h2_fa),
        ),
        uptake(
            "uptake_va",
            S_VA,
            X_C4,
            p.y_c4,
            &[(S_PRO, p.f_pro_va), (S_AC, p.f_ac_va), (S_H2, p.f_h2_va)],
            free_sulfide(
                share(
                    base(p.k_m_c4, S_VA, p.k_s_c4, X_C4, aa).inhibited_by(S_H2, p.k_i_h2_c4),
                    S_VA,
                    &[S_BU],
                ),
                p.k_i_h2s_c4_mol,
            ),
        ),
        uptake(
            "uptake_bu",
            S_BU,
            X_C4,
            p.y_c4,
            &[(S_AC, p.f_ac_bu), (S_H2, p.f_h2_bu)],
            free_sulfide(
                share(
                    base(p.k_m_c4, S_BU, p.k_s_c4, X_C4, aa).inhibited_by(S_H2, p.k_i_h2_c4),
                    S_BU,
                    &[S_VA],
                ),
                p.k_i_h2s_c4_mol,
            ),
        ),
        uptake(
            "uptake_pro",
            S_PRO,
            X_PRO,
            p.y_pro,
            &[(S_AC, p.f_ac_pro), (S_H2, p.f_h2_pro)],
            free_sulfide(
                base(p.k_m_pro, S_PRO, p.k_s_pro, X_PRO, aa).inhibited_by(S_H2, p.k_i_h2_pro),
                p.k_i_h2s_pro_mol,
            ),
        ),
        uptake(
            "uptake_ac",
            S_AC,
            X_AC,
            p.y_ac,
            &[(S_CH4, 1.0)],
            free_sulfide(
                base(p.k_m_ac, S_AC, p.k_s_ac, X_AC, (p.ph_ll_ac, p.ph_ul_ac))
                    .term(TermDef::FreeAmmonia { k_i: p.k_i_nh3_mol }),
                p.k_i_h2s_ac_mol,
            ),
        ),
        uptake(
            "uptake_h2",
            S_H2,
            X_H2,
            p.y_h2,
            &[(S_CH4, 1.0)],
            free_sulfide(
                base(p.k_m_h2, S_H2, p.k_s_h2, X_H2, (p.ph_ll_h2, p.ph_ul_h2)),
                p.k_i_h2s_h2_mol,
            ),
        ),
    ]
}

fn biomass_decay(p: &KineticParams) -> Vec<ProcessDef> {
    [
        ("decay_su", X_SU),
        ("decay_aa", X_AA),
        ("decay_fa", X_FA),
        ("decay_c4", X_C4),
        ("decay_pro", X_PRO),
        ("decay_ac", X_AC),
        ("decay_h2", X_H2),
    ]
    .into_iter()
    .map(|(id, x)| decay(id, x, p.k_dec, p))
    .collect()
}

fn pha_storage(p: &KineticParams) -> Vec<ProcessDef> {
    let vfas = [S_VA, S_BU, S_PRO, S_AC];
    vfas.iter()
        .map(|&vfa| {
            let others: Vec<&str> = vfas.iter().copied().filter(|&o| o != vfa).collect();
            let rate = share(
                RateDef::new(p.q_pha)
                    .monod(vfa, p.k_s_vfa_pao)
                    .term(TermDef::RatioMonod {
                        numerator: X_PP.to_string(),
                        denominator: X_PAO.to_string(),
                        k: p.k_pp,
                    })
                    .first_order(X_PAO),
                vfa,
                &others,
            );
            cnp(ProcessDef::new(format!("pha_storage_{}", &vfa[2..]), rate)
                .with(vfa, -1.0)
                .with(X_PHA, 1.0)
                .with(X_PP, -p.y_po4))
            .balanced_by(Element::K, S_K)
            .balanced_by(Element::Mg, S_MG)
        })
        .collect()
}

fn pao_lysis(p: &KineticParams) -> Vec<ProcessDef> {
    vec![
        decay("lysis_pao", X_PAO, p.b_pao, p),
        cnp(ProcessDef::new("lysis_pp", RateDef::new(p.b_pp).first_order(X_PP)).with(X_PP, -1.0))
            .balanced_by(Element::K, S_K)
            .balanced_by(Element::Mg, S_MG),
        cnp(ProcessDef::new("lysis_pha", RateDef::new(p.b_pha).first_order(X_PHA))
            .with(X_PHA, -1.0)
            .with(S_VA, p.f_va_pha)
            .with(S_BU, p.f_bu_pha)
            .with(S_PRO, p.f_pro_pha)
            .with(S_AC, p.f_ac_pha)),
    ]
}

fn sulfate_reduction(p: &KineticParams) -> Vec<ProcessDef> {
    let base = |k: f64, s: &str, k_s: f64, x: &str, ph: (f64, f64)| {
        free_sulfide(
            growth_limits(
                RateDef::new(k)
                    .monod(s, k_s)
                    .molar_monod(S_SO4, p.k_s_so4_mol)
                    .first_order(x)
                    .ph(ph.0, ph.1),
                p,
            ),
            p.k_i_h2s_srb_mol,
        )
    };
    let aa = (p.ph_ll_aa, p.ph_ul_aa);

    vec![
        srb_uptake(
            "srb_h2",
            S_H2,
            X_HSRB,
            p.y_hsrb,
            &[],
            base(p.k_m_hsrb, S_H2, p.k_s_hsrb, X_HSRB, (p.ph_ll_h2, p.ph_ul_h2)),
        ),
        srb_uptake(
            "srb_ac",
            S_AC,
            X_ASRB,
            p.y_asrb,
            &[],
            base(p.k_m_asrb, S_AC, p.k_s_asrb, X_ASRB, (p.ph_ll_ac, p.ph_ul_ac)),
        ),
        srb_uptake(
            "srb_pro",
            S_PRO,
            X_PSRB,
            p.y_psrb,
            &[(S_AC, p.f_ac_pro_srb)],
            base(p.k_m_psrb, S_PRO, p.k_s_psrb, X_PSRB, aa),
        ),
        srb_uptake(
            "srb_bu",
            S_BU,
            X_C4SRB,
            p.y_c4srb,
            &[(S_AC, p.f_ac_bu_srb)],
            share(base(p.k_m_c4srb, S_BU, p.k_s_c4srb, X_C4SRB, aa), S_BU, &[S_VA]),
        ),
        srb_uptake(
            "srb_va",
            S_VA,
            X_C4SRB,
            p.y_c4srb,
            &[(S_PRO, p.f_pro_va_srb), (S_AC, p.f_ac_va_srb)],
            share(base(p.k_m_c4srb, S_VA, p.k_s_c4srb, X_C4SRB, aa), S_VA, &[S_BU]),
        ),
    ]
}

fn srb_decay(p: &KineticParams) -> Vec<ProcessDef> {
    [
        ("decay_hsrb", X_HSRB),
        ("decay_asrb", X_ASRB),
        ("decay_psrb", X_PSRB),
        ("decay_c4srb", X_C4SRB),
    ]
    .into_iter()
    .map(|(id, x)| decay(id, x, p.k_dec_srb, p))
    .collect()
}

/// Electron donor side of an iron reduction by H₂ or by sulfide.
fn with_donor(def: ProcessDef, donor: &str) -> ProcessDef {
    if donor == S_H2 {
        def.with(S_H2, -fe_electrons())
    } else {
        let s = sulfide_per_fe();
        def.with(S_IS, -s).with(S_S0, s)
    }
}

fn donor_monod(rate: RateDef, donor: &str, p: &KineticParams) -> RateDef {
    if donor == S_H2 {
        rate.monod(S_H2, p.k_s_h2_fe)
    } else {
        rate.monod(S_IS, p.k_s_is_fe)
    }
}

fn iron_reduction(p: &KineticParams) -> Vec<ProcessDef> {
    [("fe3_reduction_h2", S_H2, p.k_fe3_h2), ("fe3_reduction_is", S_IS, p.k_fe3_is)]
        .into_iter()
        .map(|(id, donor, k)| {
            let rate = donor_monod(RateDef::new(k).first_order(S_FE3), donor, p);
            with_donor(
                ProcessDef::new(id, rate).with(S_FE3, -1.0).with(S_FE2, 1.0),
                donor,
            )
        })
        .collect()
}

fn hfo_adsorption(p: &KineticParams) -> Vec<ProcessDef> {
    [
        ("hfo_h_adsorption", X_HFO_H, X_HFO_HP, p.k_ads_hfo_h),
        ("hfo_l_adsorption", X_HFO_L, X_HFO_LP, p.k_ads_hfo_l),
    ]
    .into_iter()
    .map(|(id, bare, loaded, k)| {
        let rate = RateDef::new(k)
            .first_order(bare)
            .molar_monod(S_IP, p.k_s_ip_hfo_mol);
        ProcessDef::new(id, rate)
            .with(bare, -1.0)
            .with(loaded, 1.0)
            .balanced_by(Element::P, S_IP)
    })
    .collect()
}

fn hfo_aging(p: &KineticParams) -> Vec<ProcessDef> {
    [
        ("hfo_h_aging", X_HFO_H, X_HFO_OLD),
        ("hfo_l_aging", X_HFO_L, X_HFO_OLD),
        ("hfo_hp_aging", X_HFO_HP, X_HFO_HP_OLD),
        ("hfo_lp_aging", X_HFO_LP, X_HFO_LP_OLD),
    ]
    .into_iter()
    .map(|(id, from, to)| {
        ProcessDef::new(id, RateDef::new(p.k_aging).first_order(from))
            .with(from, -1.0)
            .with(to, 1.0)
            .balanced_by(Element::P, S_IP)
    })
    .collect()
}

fn hfo_dissolution(p: &KineticParams) -> Vec<ProcessDef> {
    let forms = [
        ("h", X_HFO_H, p.k_red_hfo_h),
        ("l", X_HFO_L, p.k_red_hfo_l),
        ("hp", X_HFO_HP, p.k_red_hfo_h),
        ("lp", X_HFO_LP, p.k_red_hfo_l),
    ];
    let mut defs = Vec::with_capacity(8);
    for (donor, tag) in [(S_H2, "h2"), (S_IS, "is")] {
        for &(form, species, k) in &forms {
            let rate = donor_monod(RateDef::new(k).first_order(species), donor, p);
            let def = ProcessDef::new(format!("hfo_{form}_dissolution_{tag}"), rate)
                .with(species, -1.0)
                .with(S_FE2, 1.0)
                .balanced_by(Element::P, S_IP);
            defs.push(with_donor(def, donor));
        }
    }
    defs
}

/// Every default process declaration, grouped, in registration order.
pub fn default_process_groups(p: &KineticParams) -> Vec<(ProcessGroup, Vec<ProcessDef>)> {
    vec![
        (ProcessGroup::Hydrolysis, hydrolysis(p)),
        (ProcessGroup::Uptake, acidogenesis_and_methanogenesis(p)),
        (ProcessGroup::Decay, biomass_decay(p)),
        (ProcessGroup::PhaStorage, pha_storage(p)),
        (ProcessGroup::Lysis, pao_lysis(p)),
        (ProcessGroup::SulfateReduction, sulfate_reduction(p)),
        (ProcessGroup::SrbDecay, srb_decay(p)),
        (ProcessGroup::IronReduction, iron_reduction(p)),
        (ProcessGroup::HfoAdsorption, hfo_adsorption(p)),
        (ProcessGroup::HfoAging, hfo_aging(p)),
        (ProcessGroup::HfoDissolution, hfo_dissolution(p)),
    ]
}

pub fn default_process_defs(p: &KineticParams) -> Vec<ProcessDef> {
    default_process_groups(p)
        .into_iter()
        .flat_map(|(_, defs)| defs)
        .collect()
}

/// Register the default process set.
pub fn build_processes(
    registry: &Registry,
    params: &KineticParams,
) -> KineticsResult<(ProcessSet, KineticIndex)> {
    build_processes_with(registry, params, Vec::new())
}

/// Register the default process set followed by `extra` declarations.
pub fn build_processes_with(
    registry: &Registry,
    params: &KineticParams,
    extra: Vec<ProcessDef>,
) -> KineticsResult<(ProcessSet, KineticIndex)> {
    params.check()?;

    let mut groups = Vec::new();
    let mut defs = Vec::new();
    let mut grouped = default_process_groups(params);
    if !extra.is_empty() {
        grouped.push((ProcessGroup::Extra, extra));
    }
    for (group, list) in grouped {
        let start = defs.len();
        defs.extend(list);
        groups.push((group, start..defs.len()));
    }

    let set = ProcessSet::register(registry, defs)?;
    debug!(processes = set.len(), "registered process set");

    let index = KineticIndex {
        groups,
        s_ch4: registry.lookup(S_CH4)?,
        s_h2: registry.lookup(S_H2)?,
        s_ic: registry.lookup(S_IC)?,
        s_in: registry.lookup(S_IN)?,
        s_ip: registry.lookup(S_IP)?,
        s_so4: registry.lookup(S_SO4)?,
        s_is: registry.lookup(S_IS)?,
    };
    Ok((set, index))
}
