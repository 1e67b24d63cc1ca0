//! Transient simulation of a single-stage digester.
//!
//! Provides:
//! - The pure reactor derivative ([`ReactorModel::derivative`])
//! - The [`TransientModel`] seam and fixed-step RK4 / forward Euler integrators
//! - Adaptive backward Euler with Newton iteration on a finite-difference Jacobian
//! - Reactor runs with derived scalars and a cumulative mass balance

pub mod balance;
pub mod error;
pub mod integrator;
pub mod jacobian;
pub mod model;
pub mod reactor;
pub mod run;
pub mod sim;

pub use balance::{BALANCE_MEASURES, MassBalance, MeasureBalance};
pub use error::{SimError, SimResult};
pub use integrator::{BackwardEuler, ForwardEuler, Integrator, RK4, Trial};
pub use jacobian::{JacobianConfig, finite_difference_jacobian};
pub use model::TransientModel;
pub use reactor::{ReactorConfig, ReactorModel, ReactorParams, StepDiagnostics, Transport};
pub use run::{RunOutput, run_reactor};
pub use sim::{IntegratorType, SimOptions, SimRecord, StepInfo, run_sim, run_sim_observed};
