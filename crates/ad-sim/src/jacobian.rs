//! Finite difference Jacobian of a model's derivative.

use nalgebra::{DMatrix, DVector};

use crate::error::SimResult;

/// Perturbation sizing for forward differences.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JacobianConfig {
    /// Relative perturbation
    pub epsilon: f64,
    /// Magnitude floor so near-zero entries still move
    pub floor: f64,
}

impl Default for JacobianConfig {
    fn default() -> Self {
        Self {
            epsilon: 1e-6,
            floor: 1e-3,
        }
    }
}

/// Forward-difference Jacobian with `f_x = f(x)` already known.
///
/// Column j perturbs x[j] upward by `epsilon * max(|x[j]|, floor)`, so a
/// non-negative state stays non-negative.
pub fn finite_difference_jacobian<F>(
    x: &DVector<f64>,
    f_x: &DVector<f64>,
    f: F,
    config: &JacobianConfig,
) -> SimResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> SimResult<DVector<f64>>,
{
    let n = x.len();
    let m = f_x.len();
    let mut jac = DMatrix::zeros(m, n);

    let mut x_perturbed = x.clone();
    for j in 0..n {
        let dx = config.epsilon * x[j].abs().max(config.floor);
        x_perturbed[j] = x[j] + dx;

        let f_perturbed = f(&x_perturbed)?;
        let df = (f_perturbed - f_x) / dx;
        jac.set_column(j, &df);

        x_perturbed[j] = x[j];
    }

    Ok(jac)
}
