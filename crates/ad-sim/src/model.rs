//! TransientModel trait for pluggable dynamic systems.

use nalgebra::DVector;

use crate::error::SimResult;

/// A dynamic system dx/dt = f(t, x) over a flat state vector.
///
/// `rhs` takes `&self`: a model must not carry solver state between calls,
/// so repeated evaluation at the same (t, x) gives identical results.
pub trait TransientModel {
    /// Number of state entries.
    fn dim(&self) -> usize;

    /// State at t = 0.
    fn initial_state(&self) -> DVector<f64>;

    /// Compute the time derivative at (t, x).
    fn rhs(&self, t: f64, x: &DVector<f64>) -> SimResult<DVector<f64>>;
}
