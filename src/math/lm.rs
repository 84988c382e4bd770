//! Levenberg–Marquardt minimization of `‖r(p)‖²`.
//!
//! The driver only needs a residual function `r: ℝᵏ → ℝⁿ`. The iteration
//! itself (trust region, Marquardt scaling, ftol/xtol/gtol tests) is the
//! MINPACK port in the `levenberg-marquardt` crate; this module adapts a plain
//! closure to its `LeastSquaresProblem` trait and supplies a central
//! finite-difference Jacobian.
//!
//! Every residual evaluation the solver asks for, including the ones spent on
//! its Jacobians, counts toward `max_evaluations`. Hitting the cap is an
//! error; the last iterate is discarded rather than returned as if it had
//! converged. The Jacobian handed back for the covariance is computed once
//! after the solver stops and is not counted.
//!
//! There is no randomness anywhere: identical inputs give identical outputs.

use std::cell::Cell;

use levenberg_marquardt::{LeastSquaresProblem, LevenbergMarquardt, TerminationReason};
use nalgebra::storage::Owned;
use nalgebra::{DMatrix, DVector, Dyn};
use tracing::{debug, warn};

/// Stand-in for non-finite trial residuals, so the solver rejects the step.
const PENALTY: f64 = 1e100;

/// Stopping rules.
#[derive(Debug, Clone, Copy)]
pub struct LmSettings {
    pub max_evaluations: usize,
    /// Relative reduction of the cost below which we stop.
    pub ftol: f64,
    /// Relative step length below which we stop.
    pub xtol: f64,
    /// Cosine between residuals and Jacobian columns below which we stop.
    pub gtol: f64,
}

impl Default for LmSettings {
    fn default() -> Self {
        Self {
            max_evaluations: 10_000,
            ftol: 1.49012e-8,
            xtol: 1.49012e-8,
            gtol: 1e-12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The cost is exactly zero.
    ExactFit,
    SmallGradient,
    SmallCostReduction,
    SmallStep,
    /// No downhill step exists at working precision.
    Stalled,
}

#[derive(Debug, Clone)]
pub struct LmOutcome {
    pub params: DVector<f64>,
    pub residuals: DVector<f64>,
    /// `∂r/∂p` at `params` (`n × k`).
    pub jacobian: DMatrix<f64>,
    /// `‖r‖²` at `params`.
    pub cost: f64,
    /// Residual evaluations spent by the solver.
    pub evaluations: usize,
    pub reason: StopReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LmError {
    EvaluationLimit { max_evaluations: usize },
    /// The residuals at the starting point are not all finite.
    NonFiniteStart { index: usize },
    /// The solver gave up for a reason other than the evaluation cap.
    NotConverged { reason: String },
}

/// A residual closure seen through `LeastSquaresProblem`, with an
/// evaluation counter and the best point visited so far.
struct CountedProblem<F> {
    f: F,
    params: DVector<f64>,
    /// Raw residuals at `params`; `None` once the cap is hit.
    current: Option<DVector<f64>>,
    best: Option<(DVector<f64>, DVector<f64>, f64)>,
    used: Cell<usize>,
    max: usize,
    exhausted: Cell<bool>,
}

impl<F> CountedProblem<F>
where
    F: Fn(&[f64]) -> DVector<f64>,
{
    fn eval(&self, p: &DVector<f64>) -> Option<DVector<f64>> {
        if self.used.get() >= self.max {
            self.exhausted.set(true);
            return None;
        }
        self.used.set(self.used.get() + 1);
        Some((self.f)(p.as_slice()))
    }
}

impl<F> LeastSquaresProblem<f64, Dyn, Dyn> for CountedProblem<F>
where
    F: Fn(&[f64]) -> DVector<f64>,
{
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, Dyn>;
    type ParameterStorage = Owned<f64, Dyn>;

    fn set_params(&mut self, p: &DVector<f64>) {
        self.params.copy_from(p);
        self.current = self.eval(p);

        let Some(r) = &self.current else {
            return;
        };
        if !r.iter().all(|v| v.is_finite()) {
            return;
        }
        let cost = r.norm_squared();
        if self.best.as_ref().is_none_or(|(_, _, c)| cost < *c) {
            self.best = Some((p.clone(), r.clone(), cost));
        }
    }

    fn params(&self) -> DVector<f64> {
        self.params.clone()
    }

    fn residuals(&self) -> Option<DVector<f64>> {
        let r = self.current.as_ref()?;
        Some(r.map(|v| if v.is_finite() { v } else { PENALTY }))
    }

    fn jacobian(&self) -> Option<DMatrix<f64>> {
        let r = self.current.as_ref()?;
        finite_difference_jacobian(|q| self.eval(q), &self.params, r)
    }
}

/// Minimize `‖residuals(p)‖²` starting from `p0`.
pub fn minimize<F>(residuals: F, p0: &[f64], settings: &LmSettings) -> Result<LmOutcome, LmError>
where
    F: Fn(&[f64]) -> DVector<f64>,
{
    let p = DVector::from_column_slice(p0);
    let mut problem = CountedProblem {
        f: residuals,
        params: p.clone(),
        current: None,
        best: None,
        used: Cell::new(0),
        max: settings.max_evaluations,
        exhausted: Cell::new(false),
    };
    problem.set_params(&p);

    let Some(start) = &problem.current else {
        return Err(LmError::EvaluationLimit {
            max_evaluations: settings.max_evaluations,
        });
    };
    if let Some(index) = start.iter().position(|v| !v.is_finite()) {
        return Err(LmError::NonFiniteStart { index });
    }

    let solver = LevenbergMarquardt::new()
        .with_ftol(settings.ftol)
        .with_xtol(settings.xtol)
        .with_gtol(settings.gtol)
        .with_patience(settings.max_evaluations.max(1));
    let (problem, report) = solver.minimize(problem);

    let evaluations = problem.used.get();
    if problem.exhausted.get() {
        return Err(LmError::EvaluationLimit {
            max_evaluations: settings.max_evaluations,
        });
    }

    let reason = match report.termination {
        TerminationReason::ResidualsZero => StopReason::ExactFit,
        TerminationReason::Orthogonal => StopReason::SmallGradient,
        TerminationReason::Converged { ftol: true, .. } => StopReason::SmallCostReduction,
        TerminationReason::Converged { .. } => StopReason::SmallStep,
        TerminationReason::NoImprovementPossible(_) => StopReason::Stalled,
        TerminationReason::LostPatience => {
            return Err(LmError::EvaluationLimit {
                max_evaluations: settings.max_evaluations,
            });
        }
        other => {
            warn!(termination = ?other, evaluations, "levenberg-marquardt did not converge");
            return Err(LmError::NotConverged {
                reason: format!("{other:?}"),
            });
        }
    };

    let Some((params, residuals, cost)) = problem.best else {
        return Err(LmError::NotConverged {
            reason: "no finite iterate".into(),
        });
    };
    let f = &problem.f;
    let jacobian = finite_difference_jacobian(|q| Some(f(q.as_slice())), &params, &residuals)
        .unwrap_or_else(|| DMatrix::zeros(residuals.len(), params.len()));

    debug!(?reason, evaluations, cost, "levenberg-marquardt finished");

    Ok(LmOutcome {
        params,
        residuals,
        jacobian,
        cost,
        evaluations,
        reason,
    })
}

/// Central-difference Jacobian of the residual vector.
///
/// Falls back to a one-sided difference when one side evaluates to
/// non-finite values (e.g. a power law pushed to a negative base), and to a
/// zero column when both do. `None` when `eval` refuses.
fn finite_difference_jacobian<E>(eval: E, p: &DVector<f64>, r: &DVector<f64>) -> Option<DMatrix<f64>>
where
    E: Fn(&DVector<f64>) -> Option<DVector<f64>>,
{
    let n = r.len();
    let k = p.len();
    let base = f64::EPSILON.cbrt();
    let mut jac = DMatrix::<f64>::zeros(n, k);

    for j in 0..k {
        let h = base * p[j].abs().max(1.0);

        let mut plus = p.clone();
        plus[j] += h;
        let r_plus = eval(&plus)?;

        let mut minus = p.clone();
        minus[j] -= h;
        let r_minus = eval(&minus)?;

        let plus_ok = r_plus.iter().all(|v| v.is_finite());
        let minus_ok = r_minus.iter().all(|v| v.is_finite());

        let column = match (plus_ok, minus_ok) {
            (true, true) => (r_plus - r_minus) / (2.0 * h),
            (true, false) => (r_plus - r) / h,
            (false, true) => (r - r_minus) / h,
            (false, false) => DVector::zeros(n),
        };
        jac.set_column(j, &column);
    }

    Some(jac)
}
