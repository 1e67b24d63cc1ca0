//! Canonical limitation and inhibition factors.
//!
//! Inputs come from validated (non-negative) states, and each function still
//! clamps to its documented range.

/// Monod limitation s/(k + s), in [0, 1).
#[inline]
pub fn monod(s: f64, k: f64) -> f64 {
    let s = s.max(0.0);
    if s == 0.0 {
        return 0.0;
    }
    (s / (k + s)).clamp(0.0, 1.0)
}

/// Non-competitive inhibition k_i/(k_i + i), in (0, 1].
#[inline]
pub fn non_competitive(i: f64, k_i: f64) -> f64 {
    (k_i / (k_i + i.max(0.0))).clamp(0.0, 1.0)
}

/// Lower-sided pH inhibition.
///
/// 1 above `upper`, exp(−3·((pH − upper)/(upper − lower))²) below it.
#[inline]
pub fn ph_inhibition(ph: f64, lower: f64, upper: f64) -> f64 {
    if ph >= upper {
        return 1.0;
    }
    let x = (ph - upper) / (upper - lower);
    (-3.0 * x * x).exp().clamp(0.0, 1.0)
}

/// Share of `s` among competing substrates, s/(s + others); 0 when all are 0.
#[inline]
pub fn share(s: f64, others: f64) -> f64 {
    let s = s.max(0.0);
    let total = s + others.max(0.0);
    if total <= 0.0 { 0.0 } else { s / total }
}
