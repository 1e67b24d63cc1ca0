//! Time integrators.

use nalgebra::{DMatrix, DVector};

use crate::error::{SimError, SimResult};
use crate::jacobian::{JacobianConfig, finite_difference_jacobian};
use crate::model::TransientModel;

/// Trait for fixed-step time integrators.
pub trait Integrator {
    /// Advance state by one time step.
    fn step<M: TransientModel>(
        &self,
        model: &M,
        t: f64,
        x: &DVector<f64>,
        dt: f64,
    ) -> SimResult<DVector<f64>>;
}

/// Classical RK4 integrator.
#[derive(Clone, Debug)]
pub struct RK4;

impl Integrator for RK4 {
    fn step<M: TransientModel>(
        &self,
        model: &M,
        t: f64,
        x: &DVector<f64>,
        dt: f64,
    ) -> SimResult<DVector<f64>> {
        let k1 = model.rhs(t, x)?;
        let k2 = model.rhs(t + 0.5 * dt, &(x + &k1 * (0.5 * dt)))?;
        let k3 = model.rhs(t + 0.5 * dt, &(x + &k2 * (0.5 * dt)))?;
        let k4 = model.rhs(t + dt, &(x + &k3 * dt))?;

        // x + (dt/6)(k1 + 2k2 + 2k3 + k4)
        Ok(x + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0))
    }
}

/// Forward Euler (explicit, 1st order). One rhs call per step.
#[derive(Clone, Debug)]
pub struct ForwardEuler;

impl Integrator for ForwardEuler {
    fn step<M: TransientModel>(
        &self,
        model: &M,
        t: f64,
        x: &DVector<f64>,
        dt: f64,
    ) -> SimResult<DVector<f64>> {
        let xdot = model.rhs(t, x)?;
        Ok(x + xdot * dt)
    }
}

/// Implicit Euler solved by modified Newton iteration.
///
/// Solves G(y) = y − x − dt·f(t + dt, y) = 0 with the Jacobian of f frozen
/// at the step's start. An iterate below −atol fails the attempt with
/// [`SimError::NegativeIterate`]; entries in [−atol, 0) are roundoff and read
/// as zero.
#[derive(Clone, Debug)]
pub struct BackwardEuler {
    pub max_iterations: usize,
    /// Convergence threshold on the scaled Newton update
    pub tolerance: f64,
    pub rtol: f64,
    pub atol: f64,
    pub jacobian: JacobianConfig,
}

impl Default for BackwardEuler {
    fn default() -> Self {
        Self {
            max_iterations: 12,
            tolerance: 1e-5,
            rtol: 1e-4,
            atol: 1e-8,
            jacobian: JacobianConfig::default(),
        }
    }
}

/// A converged implicit step.
#[derive(Clone, Debug)]
pub struct Trial {
    pub x: DVector<f64>,
    /// f(t + dt, x)
    pub xdot: DVector<f64>,
    pub iterations: usize,
}

impl BackwardEuler {
    /// ∂f/∂x at (t, x), given f(t, x).
    pub fn jacobian<M: TransientModel>(
        &self,
        model: &M,
        t: f64,
        x: &DVector<f64>,
        xdot: &DVector<f64>,
    ) -> SimResult<DMatrix<f64>> {
        finite_difference_jacobian(x, xdot, |v| model.rhs(t, v), &self.jacobian)
    }

    /// Scaled max-norm used for both Newton updates and error estimates.
    pub fn scaled_norm(&self, v: &DVector<f64>, x: &DVector<f64>, y: &DVector<f64>) -> f64 {
        v.iter()
            .zip(x.iter().zip(y.iter()))
            .map(|(d, (a, b))| d.abs() / (self.atol + self.rtol * a.abs().max(b.abs())))
            .fold(0.0, f64::max)
    }

    /// Attempt one implicit step of size `dt` from (t, x).
    pub fn attempt<M: TransientModel>(
        &self,
        model: &M,
        t: f64,
        x: &DVector<f64>,
        jac: &DMatrix<f64>,
        dt: f64,
    ) -> SimResult<Trial> {
        let n = x.len();
        let lu = (DMatrix::identity(n, n) - jac * dt).lu();
        let t_new = t + dt;

        let mut y = x.clone();
        let mut norm = f64::INFINITY;
        for iteration in 1..=self.max_iterations {
            let f = model.rhs(t_new, &y)?;
            let g = &y - x - f * dt;
            let delta = lu.solve(&g).ok_or(SimError::ConvergenceFailed {
                iterations: iteration,
                norm,
            })?;

            y -= &delta;
            if let Some((index, &value)) = y.iter().enumerate().find(|(_, v)| **v < -self.atol) {
                return Err(SimError::NegativeIterate { index, value });
            }
            y.apply(|v| *v = v.max(0.0));
            norm = self.scaled_norm(&delta, x, &y);
            if !norm.is_finite() {
                break;
            }
            if norm <= self.tolerance {
                let xdot = model.rhs(t_new, &y)?;
                return Ok(Trial {
                    x: y,
                    xdot,
                    iterations: iteration,
                });
            }
        }

        Err(SimError::ConvergenceFailed {
            iterations: self.max_iterations,
            norm,
        })
    }
}

impl Integrator for BackwardEuler {
    fn step<M: TransientModel>(
        &self,
        model: &M,
        t: f64,
        x: &DVector<f64>,
        dt: f64,
    ) -> SimResult<DVector<f64>> {
        let xdot = model.rhs(t, x)?;
        let jac = self.jacobian(model, t, x, &xdot)?;
        Ok(self.attempt(model, t, x, &jac, dt)?.x)
    }
}
