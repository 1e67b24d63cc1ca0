//! Kinetic and stoichiometric parameters.
//!
//! Defaults follow BSM2 for the ADM1 core and the usual mADM1 values for the
//! phosphorus, sulfur and iron extensions. Units: 1/d for rate constants,
//! kg basis/m³ for half-saturation constants unless the name ends in `_mol`
//! (kmol/m³), kg COD/kg COD for yields and fractions.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{KineticsError, KineticsResult};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct KineticParams {
    // Hydrolysis
    pub k_hyd_ch: f64,
    pub k_hyd_pr: f64,
    pub k_hyd_li: f64,
    /// LCFA share of lipid hydrolysis (rest is sugar)
    pub f_fa_li: f64,

    // Uptake
    pub k_m_su: f64,
    pub k_s_su: f64,
    pub k_m_aa: f64,
    pub k_s_aa: f64,
    pub k_m_fa: f64,
    pub k_s_fa: f64,
    pub k_m_c4: f64,
    pub k_s_c4: f64,
    pub k_m_pro: f64,
    pub k_s_pro: f64,
    pub k_m_ac: f64,
    pub k_s_ac: f64,
    pub k_m_h2: f64,
    pub k_s_h2: f64,

    pub y_su: f64,
    pub y_aa: f64,
    pub y_fa: f64,
    pub y_c4: f64,
    pub y_pro: f64,
    pub y_ac: f64,
    pub y_h2: f64,

    pub f_h2_su: f64,
    pub f_bu_su: f64,
    pub f_pro_su: f64,
    pub f_ac_su: f64,
    pub f_h2_aa: f64,
    pub f_va_aa: f64,
    pub f_bu_aa: f64,
    pub f_pro_aa: f64,
    pub f_ac_aa: f64,
    pub f_h2_fa: f64,
    pub f_pro_va: f64,
    pub f_ac_va: f64,
    pub f_h2_va: f64,
    pub f_ac_bu: f64,
    pub f_h2_bu: f64,
    pub f_ac_pro: f64,
    pub f_h2_pro: f64,

    // Inhibition and limitation
    pub k_i_h2_fa: f64,
    pub k_i_h2_c4: f64,
    pub k_i_h2_pro: f64,
    pub k_i_nh3_mol: f64,
    pub k_s_in_mol: f64,
    pub k_s_ip_mol: f64,
    pub k_i_h2s_c4_mol: f64,
    pub k_i_h2s_pro_mol: f64,
    pub k_i_h2s_ac_mol: f64,
    pub k_i_h2s_h2_mol: f64,
    pub k_i_h2s_srb_mol: f64,
    pub ph_ll_aa: f64,
    pub ph_ul_aa: f64,
    pub ph_ll_ac: f64,
    pub ph_ul_ac: f64,
    pub ph_ll_h2: f64,
    pub ph_ul_h2: f64,

    // Decay
    pub k_dec: f64,
    /// Inert share of decayed biomass
    pub f_xi_dec: f64,
    /// Shares of the non-inert remainder
    pub f_ch_dec: f64,
    pub f_pr_dec: f64,
    pub f_li_dec: f64,

    // Phosphorus-accumulating organisms
    pub q_pha: f64,
    pub k_s_vfa_pao: f64,
    /// kg P / kg COD
    pub k_pp: f64,
    /// Polyphosphate released per PHA stored [kg P / kg COD]
    pub y_po4: f64,
    pub b_pao: f64,
    pub b_pp: f64,
    pub b_pha: f64,
    pub f_va_pha: f64,
    pub f_bu_pha: f64,
    pub f_pro_pha: f64,
    pub f_ac_pha: f64,

    // Sulfate reduction
    pub k_m_hsrb: f64,
    pub k_s_hsrb: f64,
    pub k_m_asrb: f64,
    pub k_s_asrb: f64,
    pub k_m_psrb: f64,
    pub k_s_psrb: f64,
    pub k_m_c4srb: f64,
    pub k_s_c4srb: f64,
    pub k_s_so4_mol: f64,
    pub y_hsrb: f64,
    pub y_asrb: f64,
    pub y_psrb: f64,
    pub y_c4srb: f64,
    /// Acetate share of the oxidized propionate
    pub f_ac_pro_srb: f64,
    pub f_ac_bu_srb: f64,
    pub f_pro_va_srb: f64,
    pub f_ac_va_srb: f64,
    pub k_dec_srb: f64,

    // Iron
    pub k_fe3_h2: f64,
    pub k_fe3_is: f64,
    pub k_s_h2_fe: f64,
    pub k_s_is_fe: f64,
    pub k_ads_hfo_h: f64,
    pub k_ads_hfo_l: f64,
    pub k_s_ip_hfo_mol: f64,
    pub k_aging: f64,
    pub k_red_hfo_h: f64,
    pub k_red_hfo_l: f64,
}

impl Default for KineticParams {
    fn default() -> Self {
        Self {
            k_hyd_ch: 10.0,
            k_hyd_pr: 10.0,
            k_hyd_li: 10.0,
            f_fa_li: 0.95,

            k_m_su: 30.0,
            k_s_su: 0.5,
            k_m_aa: 50.0,
            k_s_aa: 0.3,
            k_m_fa: 6.0,
            k_s_fa: 0.4,
            k_m_c4: 20.0,
            k_s_c4: 0.2,
            k_m_pro: 13.0,
            k_s_pro: 0.1,
            k_m_ac: 8.0,
            k_s_ac: 0.15,
            k_m_h2: 35.0,
            k_s_h2: 7e-6,

            y_su: 0.1,
            y_aa: 0.08,
            y_fa: 0.06,
            y_c4: 0.06,
            y_pro: 0.04,
            y_ac: 0.05,
            y_h2: 0.06,

            f_h2_su: 0.19,
            f_bu_su: 0.13,
            f_pro_su: 0.27,
            f_ac_su: 0.41,
            f_h2_aa: 0.06,
            f_va_aa: 0.23,
            f_bu_aa: 0.26,
            f_pro_aa: 0.05,
            f_ac_aa: 0.40,
            f_h2_fa: 0.3,
            f_pro_va: 0.54,
            f_ac_va: 0.31,
            f_h2_va: 0.15,
            f_ac_bu: 0.8,
            f_h2_bu: 0.2,
            f_ac_pro: 0.57,
            f_h2_pro: 0.43,

            k_i_h2_fa: 5e-6,
            k_i_h2_c4: 1e-5,
            k_i_h2_pro: 3.5e-6,
            k_i_nh3_mol: 0.0018,
            k_s_in_mol: 1e-4,
            k_s_ip_mol: 2e-5,
            k_i_h2s_c4_mol: 0.015,
            k_i_h2s_pro_mol: 0.0095,
            k_i_h2s_ac_mol: 0.0144,
            k_i_h2s_h2_mol: 0.0075,
            k_i_h2s_srb_mol: 0.0145,
            ph_ll_aa: 4.0,
            ph_ul_aa: 5.5,
            ph_ll_ac: 6.0,
            ph_ul_ac: 7.0,
            ph_ll_h2: 5.0,
            ph_ul_h2: 6.0,

            k_dec: 0.02,
            f_xi_dec: 0.1,
            f_ch_dec: 0.25,
            f_pr_dec: 0.45,
            f_li_dec: 0.3,

            q_pha: 3.0,
            k_s_vfa_pao: 0.004,
            k_pp: 0.01,
            y_po4: 0.4,
            b_pao: 0.2,
            b_pp: 0.2,
            b_pha: 0.2,
            f_va_pha: 0.1,
            f_bu_pha: 0.1,
            f_pro_pha: 0.4,
            f_ac_pha: 0.4,

            k_m_hsrb: 41.125,
            k_s_hsrb: 5.96e-6,
            k_m_asrb: 23.3,
            k_s_asrb: 0.24,
            k_m_psrb: 16.25,
            k_s_psrb: 0.295,
            k_m_c4srb: 23.0,
            k_s_c4srb: 0.174,
            k_s_so4_mol: 1e-4,
            y_hsrb: 0.05,
            y_asrb: 0.041,
            y_psrb: 0.0329,
            y_c4srb: 0.0329,
            f_ac_pro_srb: 0.57,
            f_ac_bu_srb: 0.8,
            f_pro_va_srb: 0.54,
            f_ac_va_srb: 0.31,
            k_dec_srb: 0.02,

            k_fe3_h2: 1_000.0,
            k_fe3_is: 1_000.0,
            k_s_h2_fe: 5e-6,
            k_s_is_fe: 0.003,
            k_ads_hfo_h: 1.0,
            k_ads_hfo_l: 0.1,
            k_s_ip_hfo_mol: 1e-4,
            k_aging: 0.1,
            k_red_hfo_h: 1.0,
            k_red_hfo_l: 0.1,
        }
    }
}

impl KineticParams {
    /// Check ranges that would otherwise surface as closure failures.
    pub fn check(&self) -> KineticsResult<()> {
        let unit = |name: &str, v: f64| {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(KineticsError::InvalidParams {
                    what: format!("{name} = {v} is outside [0, 1]"),
                })
            }
        };
        for (name, v) in [
            ("y_su", self.y_su),
            ("y_aa", self.y_aa),
            ("y_fa", self.y_fa),
            ("y_c4", self.y_c4),
            ("y_pro", self.y_pro),
            ("y_ac", self.y_ac),
            ("y_h2", self.y_h2),
            ("y_hsrb", self.y_hsrb),
            ("y_asrb", self.y_asrb),
            ("y_psrb", self.y_psrb),
            ("y_c4srb", self.y_c4srb),
            ("f_xi_dec", self.f_xi_dec),
            ("f_fa_li", self.f_fa_li),
            ("f_h2_fa", self.f_h2_fa),
        ] {
            unit(name, v)?;
        }

        let sums = [
            (
                "sugar fractions",
                self.f_h2_su + self.f_bu_su + self.f_pro_su + self.f_ac_su,
            ),
            (
                "amino acid fractions",
                self.f_h2_aa + self.f_va_aa + self.f_bu_aa + self.f_pro_aa + self.f_ac_aa,
            ),
            ("valerate fractions", self.f_pro_va + self.f_ac_va + self.f_h2_va),
            ("butyrate fractions", self.f_ac_bu + self.f_h2_bu),
            ("propionate fractions", self.f_ac_pro + self.f_h2_pro),
            ("decay fractions", self.f_ch_dec + self.f_pr_dec + self.f_li_dec),
            (
                "PHA lysis fractions",
                self.f_va_pha + self.f_bu_pha + self.f_pro_pha + self.f_ac_pha,
            ),
        ];
        for (name, sum) in sums {
            if (sum - 1.0).abs() > 1e-9 {
                return Err(KineticsError::InvalidParams {
                    what: format!("{name} sum to {sum}, expected 1"),
                });
            }
        }
        if self.f_pro_va_srb + self.f_ac_va_srb > 1.0 {
            return Err(KineticsError::InvalidParams {
                what: "valerate SRB product fractions exceed 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_consistent() {
        KineticParams::default().check().unwrap();
    }

    #[test]
    fn detects_bad_fraction_sum() {
        let p = KineticParams {
            f_ac_su: 0.5,
            ..KineticParams::default()
        };
        let err = p.check().unwrap_err();
        assert!(err.to_string().contains("sugar"), "{err}");
    }
}
