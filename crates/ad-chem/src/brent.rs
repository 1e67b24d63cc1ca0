//! Bracketing scalar root finder (Brent–Dekker).

use crate::error::{ChemError, ChemResult};

/// Brent solver configuration.
#[derive(Debug, Clone, Copy)]
pub struct BrentConfig {
    /// Absolute tolerance on the root location
    pub x_tol: f64,
    /// Maximum iterations
    pub max_iterations: usize,
}

impl Default for BrentConfig {
    fn default() -> Self {
        Self {
            x_tol: 1e-12,
            max_iterations: 100,
        }
    }
}

/// Root found by [`brent`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrentResult {
    pub root: f64,
    /// f(root)
    pub value: f64,
    pub iterations: usize,
}

/// Find a root of `f` on `[a, b]` given the endpoint values.
///
/// The caller has already checked that `fa` and `fb` bracket a sign change.
/// Combines bisection, secant and inverse quadratic interpolation; converges
/// whenever the bracket is valid and `f` is continuous.
pub fn brent<F>(
    mut f: F,
    a: f64,
    b: f64,
    fa: f64,
    fb: f64,
    config: &BrentConfig,
) -> ChemResult<BrentResult>
where
    F: FnMut(f64) -> f64,
{
    if fa == 0.0 {
        return Ok(BrentResult {
            root: a,
            value: 0.0,
            iterations: 0,
        });
    }
    if fb == 0.0 {
        return Ok(BrentResult {
            root: b,
            value: 0.0,
            iterations: 0,
        });
    }
    if fa.signum() == fb.signum() {
        return Err(ChemError::InvalidArg {
            what: "brent: endpoints do not bracket a root",
        });
    }

    let (mut a, mut b, mut c) = (a, b, b);
    let (mut fa, mut fb, mut fc) = (fa, fb, fb);
    let mut d = b - a;
    let mut e = d;

    for iter in 1..=config.max_iterations {
        if fb.signum() == fc.signum() {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let tol1 = 2.0 * f64::EPSILON * b.abs() + 0.5 * config.x_tol;
        let xm = 0.5 * (c - b);
        if xm.abs() <= tol1 || fb == 0.0 {
            return Ok(BrentResult {
                root: b,
                value: fb,
                iterations: iter,
            });
        }

        if e.abs() >= tol1 && fa.abs() > fb.abs() {
            // Interpolation step
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                (2.0 * xm * s, 1.0 - s)
            } else {
                let q = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * xm * q * (q - r) - (b - a) * (r - 1.0)),
                    (q - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();
            let min1 = 3.0 * xm * q - (tol1 * q).abs();
            let min2 = (e * q).abs();
            if 2.0 * p < min1.min(min2) {
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }

        a = b;
        fa = fb;
        b += if d.abs() > tol1 {
            d
        } else {
            tol1.copysign(xm)
        };
        fb = f(b);
        if !fb.is_finite() {
            return Err(ChemError::NonFinite {
                what: "brent: function value",
                value: fb,
            });
        }
    }

    Err(ChemError::ConvergenceFailed {
        iterations: config.max_iterations,
    })
}
