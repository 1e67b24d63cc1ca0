//! Simulation runner and result recording.

use nalgebra::DVector;
use tracing::{debug, warn};

use crate::error::{SimError, SimResult};
use crate::integrator::{BackwardEuler, ForwardEuler, Integrator, RK4};
use crate::model::TransientModel;

/// Integrator selection for simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IntegratorType {
    /// Adaptive implicit Euler with Newton iteration (default, stiff-safe).
    #[default]
    BackwardEuler,
    /// 4th-order Runge-Kutta, fixed step.
    RK4,
    /// Forward Euler, fixed step.
    ForwardEuler,
}

/// Options for simulation runs. Times are in days.
#[derive(Clone, Debug, PartialEq)]
pub struct SimOptions {
    pub t_end: f64,
    /// Fixed step for explicit integrators, first trial step for the adaptive one
    pub dt: f64,
    pub dt_min: f64,
    pub dt_max: f64,
    /// Spacing of recorded points
    pub record_interval: f64,
    /// Accepted-step limit
    pub max_steps: usize,
    pub rtol: f64,
    pub atol: f64,
    pub integrator: IntegratorType,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            t_end: 1.0,
            dt: 1e-3,
            dt_min: 1e-10,
            dt_max: 0.5,
            record_interval: 0.1,
            max_steps: 100_000,
            rtol: 1e-4,
            atol: 1e-8,
            integrator: IntegratorType::default(),
        }
    }
}

impl SimOptions {
    pub fn validate(&self) -> SimResult<()> {
        let invalid = |what| Err(SimError::InvalidArg { what });
        if !(self.t_end.is_finite() && self.t_end >= 0.0) {
            return invalid("t_end must be finite and non-negative");
        }
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return invalid("dt must be positive");
        }
        if !(self.dt_min > 0.0 && self.dt_min <= self.dt && self.dt <= self.dt_max) {
            return invalid("steps must satisfy 0 < dt_min <= dt <= dt_max");
        }
        if !(self.record_interval.is_finite() && self.record_interval > 0.0) {
            return invalid("record_interval must be positive");
        }
        if self.max_steps == 0 {
            return invalid("max_steps must be positive");
        }
        if !(self.rtol > 0.0 && self.atol > 0.0) {
            return invalid("tolerances must be positive");
        }
        Ok(())
    }
}

/// Recorded trajectory.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimRecord {
    /// Time points [d]
    pub t: Vec<f64>,
    /// State snapshots
    pub x: Vec<DVector<f64>>,
}

impl SimRecord {
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn last(&self) -> Option<(f64, &DVector<f64>)> {
        self.t.last().copied().zip(self.x.last())
    }

    fn push(&mut self, t: f64, x: DVector<f64>) {
        self.t.push(t);
        self.x.push(x);
    }
}

/// One accepted step, handed to the run observer before it is committed.
#[derive(Debug)]
pub struct StepInfo<'a> {
    pub t_old: f64,
    pub t_new: f64,
    pub x_old: &'a DVector<f64>,
    pub x_new: &'a DVector<f64>,
}

impl StepInfo<'_> {
    #[inline]
    pub fn dt(&self) -> f64 {
        self.t_new - self.t_old
    }
}

/// Run a transient simulation and record the trajectory.
pub fn run_sim<M: TransientModel>(model: &M, opts: &SimOptions) -> SimResult<SimRecord> {
    run_sim_observed(model, opts, |_| Ok(()))
}

/// Run a transient simulation, calling `observe` for every accepted step.
///
/// Any failure after the initial state is wrapped in [`SimError::Aborted`]
/// with the trajectory up to and including the last valid state.
pub fn run_sim_observed<M, F>(model: &M, opts: &SimOptions, mut observe: F) -> SimResult<SimRecord>
where
    M: TransientModel,
    F: FnMut(&StepInfo<'_>) -> SimResult<()>,
{
    opts.validate()?;
    let x0 = model.initial_state();
    if x0.len() != model.dim() {
        return Err(SimError::InvalidArg {
            what: "initial state length does not match model dimension",
        });
    }

    let mut run = Run {
        t: 0.0,
        x: x0.clone(),
        record: SimRecord {
            t: vec![0.0],
            x: vec![x0],
        },
        records: 1,
        steps: 0,
    };

    let outcome = match opts.integrator {
        IntegratorType::BackwardEuler => run.adaptive(model, opts, &mut observe),
        IntegratorType::RK4 => run.fixed(model, opts, &RK4, &mut observe),
        IntegratorType::ForwardEuler => run.fixed(model, opts, &ForwardEuler, &mut observe),
    };

    match outcome {
        Ok(()) => {
            debug!(steps = run.steps, points = run.record.len(), "run complete");
            Ok(run.record)
        }
        Err(source) => {
            warn!(t = run.t, error = %source, "run aborted");
            let Run { t, x, mut record, .. } = run;
            if record.t.last() != Some(&t) {
                record.push(t, x);
            }
            Err(SimError::Aborted {
                t,
                source: Box::new(source),
                partial: Box::new(record),
            })
        }
    }
}

/// Loop state; `t` and `x` only ever hold accepted values.
struct Run {
    t: f64,
    x: DVector<f64>,
    record: SimRecord,
    /// Number of record targets reached, counting t = 0
    records: usize,
    steps: usize,
}

impl Run {
    /// Next record time, never past t_end.
    fn target(&self, opts: &SimOptions) -> f64 {
        (self.records as f64 * opts.record_interval).min(opts.t_end)
    }

    fn check_steps(&self, opts: &SimOptions) -> SimResult<()> {
        if self.steps >= opts.max_steps {
            return Err(SimError::StepLimit {
                steps: opts.max_steps,
            });
        }
        Ok(())
    }

    /// Commit an accepted step and record it when it lands on a target.
    fn commit<F>(&mut self, t_new: f64, x_new: DVector<f64>, target: f64, observe: &mut F) -> SimResult<()>
    where
        F: FnMut(&StepInfo<'_>) -> SimResult<()>,
    {
        observe(&StepInfo {
            t_old: self.t,
            t_new,
            x_old: &self.x,
            x_new: &x_new,
        })?;
        self.t = t_new;
        self.x = x_new;
        self.steps += 1;
        if self.t >= target {
            self.record.push(self.t, self.x.clone());
            self.records += 1;
        }
        Ok(())
    }

    fn fixed<M, I, F>(&mut self, model: &M, opts: &SimOptions, integrator: &I, observe: &mut F) -> SimResult<()>
    where
        M: TransientModel,
        I: Integrator,
        F: FnMut(&StepInfo<'_>) -> SimResult<()>,
    {
        while self.t < opts.t_end {
            self.check_steps(opts)?;
            let target = self.target(opts);
            let gap = target - self.t;
            let h = opts.dt.min(gap);
            let x_new = integrator.step(model, self.t, &self.x, h)?;
            let t_new = if h >= gap { target } else { self.t + h };
            self.commit(t_new, x_new, target, observe)?;
        }
        Ok(())
    }

    fn adaptive<M, F>(&mut self, model: &M, opts: &SimOptions, observe: &mut F) -> SimResult<()>
    where
        M: TransientModel,
        F: FnMut(&StepInfo<'_>) -> SimResult<()>,
    {
        let be = BackwardEuler {
            rtol: opts.rtol,
            atol: opts.atol,
            ..BackwardEuler::default()
        };
        let mut dt = opts.dt;
        let mut xdot = model.rhs(self.t, &self.x)?;

        while self.t < opts.t_end {
            self.check_steps(opts)?;
            let target = self.target(opts);
            let gap = target - self.t;
            let jac = be.jacobian(model, self.t, &self.x, &xdot)?;

            let mut h = dt.min(opts.dt_max).min(gap);
            let mut reason = String::new();
            let (trial, err) = loop {
                if h < opts.dt_min {
                    return Err(SimError::IntegratorDivergence {
                        t: self.t,
                        dt: h,
                        what: reason,
                    });
                }
                match be.attempt(model, self.t, &self.x, &jac, h) {
                    Ok(trial) => {
                        let estimate = (&trial.xdot - &xdot) * (0.5 * h);
                        let err = be.scaled_norm(&estimate, &self.x, &trial.x);
                        if err <= 1.0 {
                            break (trial, err);
                        }
                        debug!(t = self.t, dt = h, err, "step rejected by error estimate");
                        reason = format!("local error estimate {err:.3e}");
                        h *= (0.9 / err.sqrt()).max(0.2);
                    }
                    Err(e) if e.rejects_step() => {
                        warn!(t = self.t, dt = h, error = %e, "step rejected");
                        reason = e.to_string();
                        h *= 0.5;
                    }
                    Err(e) => return Err(e),
                }
            };

            let capped = h >= gap;
            let growth = if err > 0.0 {
                (0.9 / err.sqrt()).clamp(0.2, 2.0)
            } else {
                2.0
            };
            let next = h * growth;
            dt = if capped { next.max(dt) } else { next }.min(opts.dt_max);

            let t_new = if capped { target } else { self.t + h };
            xdot = trial.xdot;
            self.commit(t_new, trial.x, target, observe)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// dx/dt = −k·x
    struct Decay {
        k: f64,
        x0: f64,
    }

    impl TransientModel for Decay {
        fn dim(&self) -> usize {
            1
        }

        fn initial_state(&self) -> DVector<f64> {
            DVector::from_element(1, self.x0)
        }

        fn rhs(&self, _t: f64, x: &DVector<f64>) -> SimResult<DVector<f64>> {
            if x[0] < 0.0 {
                return Err(SimError::InvalidArg { what: "negative" });
            }
            Ok(x * -self.k)
        }
    }

    #[test]
    fn sim_options_defaults() {
        let opts = SimOptions::default();
        assert_eq!(opts.t_end, 1.0);
        assert_eq!(opts.max_steps, 100_000);
        assert_eq!(opts.integrator, IntegratorType::BackwardEuler);
        opts.validate().unwrap();
    }

    #[test]
    fn sim_options_invalid() {
        let opts = SimOptions {
            dt: 0.0,
            ..SimOptions::default()
        };
        assert!(matches!(
            run_sim(&Decay { k: 1.0, x0: 1.0 }, &opts),
            Err(SimError::InvalidArg { .. })
        ));
    }

    #[test]
    fn records_land_on_interval_and_end() {
        let opts = SimOptions {
            t_end: 1.05,
            dt: 0.01,
            record_interval: 0.25,
            integrator: IntegratorType::RK4,
            ..SimOptions::default()
        };
        let rec = run_sim(&Decay { k: 1.0, x0: 1.0 }, &opts).unwrap();
        assert_eq!(rec.t.len(), 6);
        assert_eq!(rec.t[0], 0.0);
        assert_eq!(rec.t[4], 1.0);
        assert_eq!(rec.t[5], 1.05);
        let (t, x) = rec.last().unwrap();
        assert!((x[0] - (-t).exp()).abs() < 1e-9);
    }

    #[test]
    fn adaptive_run_tracks_stiff_decay() {
        let opts = SimOptions {
            t_end: 2.0,
            record_interval: 0.5,
            ..SimOptions::default()
        };
        let rec = run_sim(&Decay { k: 50.0, x0: 1.0 }, &opts).unwrap();
        assert_eq!(rec.t.last().copied(), Some(2.0));
        let x_end = rec.x.last().unwrap()[0];
        assert!(x_end >= 0.0);
        assert!(x_end < 1e-6);
    }

    #[test]
    fn observer_failure_aborts_with_partial_record() {
        let opts = SimOptions {
            t_end: 1.0,
            dt: 0.1,
            record_interval: 0.1,
            integrator: IntegratorType::ForwardEuler,
            ..SimOptions::default()
        };
        let mut calls = 0;
        let err = run_sim_observed(&Decay { k: 1.0, x0: 1.0 }, &opts, |_| {
            calls += 1;
            if calls > 3 {
                Err(SimError::InvalidArg { what: "stop" })
            } else {
                Ok(())
            }
        })
        .unwrap_err();
        match err {
            SimError::Aborted { t, source, partial } => {
                assert!((t - 0.3).abs() < 1e-12);
                assert!(matches!(*source, SimError::InvalidArg { what: "stop" }));
                assert_eq!(partial.len(), 4);
                assert_eq!(partial.t.last().copied(), Some(t));
            }
            other => panic!("expected Aborted, got {other:?}"),
        }
    }

    /// dx/dt = 1, failing once t passes the threshold.
    struct FailsAfter(f64);

    impl TransientModel for FailsAfter {
        fn dim(&self) -> usize {
            1
        }

        fn initial_state(&self) -> DVector<f64> {
            DVector::from_element(1, 1.0)
        }

        fn rhs(&self, t: f64, _x: &DVector<f64>) -> SimResult<DVector<f64>> {
            if t > self.0 {
                return Err(SimError::InvalidArg { what: "late" });
            }
            Ok(DVector::from_element(1, 1.0))
        }
    }

    #[test]
    fn rhs_failure_keeps_last_valid_state() {
        let opts = SimOptions {
            t_end: 1.0,
            dt: 0.1,
            record_interval: 0.25,
            integrator: IntegratorType::RK4,
            ..SimOptions::default()
        };
        let err = run_sim(&FailsAfter(0.45), &opts).unwrap_err();
        assert!(matches!(err.root_cause(), SimError::InvalidArg { what: "late" }));
        let SimError::Aborted { t, partial, .. } = err else {
            panic!("expected Aborted");
        };
        assert!(t < 0.5);
        let (t_last, x_last) = partial.last().unwrap();
        assert_eq!(t_last, t);
        assert!((x_last[0] - (1.0 + t)).abs() < 1e-12);
    }
}
