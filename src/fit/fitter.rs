//! Weighted nonlinear least-squares fit of one model to one dataset.
//!
//! Given:
//! - a model `f(x; p)` with arity `k`
//! - a dataset `(x_i, y_i, σx_i, σy_i)` of `n` points
//! - an initial guess `p0`
//!
//! we minimize
//!
//! ```text
//! χ²(p) = Σ_i ((y_i - f(x_i; p)) / σy_i)²
//! ```
//!
//! with Levenberg–Marquardt. Only `σy` weights the objective: `x` is treated as
//! exact during optimization and `σx` is carried along for display only.
//!
//! The covariance is `(JᵀJ)⁻¹` at the solution, multiplied by `χ²/(n-k)`
//! unless `absolute_sigma` is set.

use nalgebra::DVector;
use tracing::{debug, warn};

use crate::domain::{Covariance, Dataset, FitResult, DEFAULT_MAX_EVALUATIONS};
use crate::error::FitError;
use crate::math::{LmError, LmSettings, minimize, normal_matrix_inverse};
use crate::models::{Model, check_arity};

/// Options that affect a single fit.
#[derive(Debug, Clone, Copy)]
pub struct FitOptions {
    /// Cap on residual-vector evaluations (Jacobian evaluations included).
    pub max_evaluations: usize,
    /// Take `σy` as absolute uncertainties. When false, the covariance is
    /// rescaled so that the reduced chi-square is one.
    pub absolute_sigma: bool,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_evaluations: DEFAULT_MAX_EVALUATIONS,
            absolute_sigma: false,
        }
    }
}

/// Fit `model` to `data` starting from `initial_guess`.
///
/// Fails fast, before any model evaluation, on an arity mismatch or an
/// underdetermined system.
pub fn fit(model: &Model, data: &Dataset, initial_guess: &[f64], opts: &FitOptions) -> Result<FitResult, FitError> {
    check_arity(model, initial_guess)?;

    let k = model.arity();
    let n = data.len();
    if n < k {
        return Err(FitError::UnderdeterminedSystem { points: n, params: k });
    }
    if let Some(index) = initial_guess.iter().position(|v| !v.is_finite()) {
        return Err(FitError::NonFiniteValue {
            what: "initial guess",
            index,
        });
    }

    let (x, y, sigma_y) = (data.x(), data.y(), data.sigma_y());
    let residuals = |p: &[f64]| DVector::from_iterator(n, (0..n).map(|i| (y[i] - model.eval(x[i], p)) / sigma_y[i]));

    let settings = LmSettings {
        max_evaluations: opts.max_evaluations,
        ..LmSettings::default()
    };
    let outcome = minimize(residuals, initial_guess, &settings).map_err(|e| match e {
        LmError::EvaluationLimit { max_evaluations } => FitError::ConvergenceFailure { max_evaluations },
        LmError::NonFiniteStart { index } => FitError::NonFiniteValue {
            what: "model prediction at the initial guess",
            index,
        },
        LmError::NotConverged { .. } => FitError::ConvergenceFailure {
            max_evaluations: opts.max_evaluations,
        },
    })?;

    let chi_square = outcome.cost;
    let dof = n - k;
    let covariance = estimate_covariance(&outcome.jacobian, chi_square, dof, opts.absolute_sigma);
    if let Covariance::Unavailable { reason } = &covariance {
        warn!(model = model.name, %reason, "parameter covariance unavailable");
    }

    debug!(
        model = model.name,
        n,
        chi_square,
        evaluations = outcome.evaluations,
        reason = ?outcome.reason,
        "fit converged"
    );

    Ok(FitResult {
        model: *model,
        params: outcome.params.iter().copied().collect(),
        covariance,
        dataset: data.clone(),
        chi_square,
        degrees_of_freedom: dof,
        evaluations: outcome.evaluations,
    })
}

fn estimate_covariance(
    jacobian: &nalgebra::DMatrix<f64>,
    chi_square: f64,
    dof: usize,
    absolute_sigma: bool,
) -> Covariance {
    let Some(inverse) = normal_matrix_inverse(jacobian) else {
        return Covariance::Unavailable {
            reason: "normal matrix JᵀJ is singular".into(),
        };
    };

    if absolute_sigma {
        return Covariance::Estimated(inverse);
    }
    if dof == 0 {
        return Covariance::Unavailable {
            reason: "zero degrees of freedom, residual variance cannot be estimated".into(),
        };
    }
    Covariance::Estimated(inverse * (chi_square / dof as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lookup;

    fn uniform(x: Vec<f64>, y: Vec<f64>, sigma: f64) -> Dataset {
        let n = x.len();
        Dataset::new(x, y, vec![0.0; n], vec![sigma; n]).unwrap()
    }

    #[test]
    fn recovers_exact_line() {
        let x: Vec<f64> = (0..10).map(|i| i as f64 * 0.7).collect();
        let y: Vec<f64> = x.iter().map(|x| 3.0 * x + 2.0).collect();
        let data = uniform(x, y, 0.5);

        let fit = fit(&lookup("linear").unwrap(), &data, &[1.0, 1.0], &FitOptions::default()).unwrap();
        assert!((fit.params[0] - 3.0).abs() < 1e-6, "m = {}", fit.params[0]);
        assert!((fit.params[1] - 2.0).abs() < 1e-6, "b = {}", fit.params[1]);
        assert!(fit.chi_square < 1e-12);
        assert_eq!(fit.degrees_of_freedom, 8);
    }

    #[test]
    fn arity_mismatch_never_evaluates_the_model() {
        let never = Model::new("never", "-", &["a", "b", "c"], |_, _| panic!("model evaluated"));
        let data = uniform(vec![0.0, 1.0, 2.0, 3.0], vec![1.0, 2.0, 3.0, 4.0], 1.0);
        let err = fit(&never, &data, &[1.0, 1.0], &FitOptions::default()).unwrap_err();
        assert_eq!(
            err,
            FitError::ParameterCountMismatch {
                model: "never",
                expected: 3,
                got: 2
            }
        );
    }

    #[test]
    fn quadratic_with_two_guesses_is_rejected() {
        let data = uniform(vec![0.0, 1.0, 2.0, 3.0], vec![1.0, 2.0, 5.0, 10.0], 1.0);
        let err = fit(&lookup("quadratic").unwrap(), &data, &[1.0, 1.0], &FitOptions::default()).unwrap_err();
        assert!(matches!(err, FitError::ParameterCountMismatch { expected: 3, got: 2, .. }));
    }

    #[test]
    fn too_few_points_is_underdetermined() {
        let data = uniform(vec![0.0, 1.0], vec![1.0, 2.0], 1.0);
        let err = fit(&lookup("quadratic").unwrap(), &data, &[1.0, 1.0, 1.0], &FitOptions::default()).unwrap_err();
        assert_eq!(err, FitError::UnderdeterminedSystem { points: 2, params: 3 });
    }

    #[test]
    fn zero_dof_keeps_estimate_but_flags_covariance() {
        let data = uniform(vec![1.0, 2.0], vec![5.0, 7.0], 0.1);
        let fit = fit(&lookup("linear").unwrap(), &data, &[1.0, 1.0], &FitOptions::default()).unwrap();
        assert!((fit.params[0] - 2.0).abs() < 1e-8);
        assert!((fit.params[1] - 3.0).abs() < 1e-8);
        assert!(matches!(fit.covariance(), Err(FitError::SingularCovariance { .. })));
    }

    #[test]
    fn absolute_sigma_matches_weighted_ols_formula() {
        // With σ = 1 the covariance of (m, b) is (XᵀX)⁻¹.
        let x = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        let y = vec![0.1, 1.9, 4.2, 5.8, 8.1];
        let data = uniform(x.clone(), y, 1.0);
        let opts = FitOptions {
            absolute_sigma: true,
            ..FitOptions::default()
        };
        let fit = fit(&lookup("linear").unwrap(), &data, &[1.0, 1.0], &opts).unwrap();
        let cov = fit.covariance().unwrap();

        let n = x.len() as f64;
        let sx: f64 = x.iter().sum();
        let sxx: f64 = x.iter().map(|v| v * v).sum();
        let det = n * sxx - sx * sx;
        assert!((cov[(0, 0)] - n / det).abs() < 1e-6);
        assert!((cov[(1, 1)] - sxx / det).abs() < 1e-6);
        assert!((cov[(0, 1)] + sx / det).abs() < 1e-6);
    }

    #[test]
    fn noisy_points_carry_less_weight() {
        // Four points on y = x and one outlier. A large σ on the outlier keeps
        // the slope close to 1.
        let x = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        let y = vec![0.0, 1.0, 2.0, 3.0, 10.0];
        let sigma_y = vec![0.1, 0.1, 0.1, 0.1, 100.0];
        let data = Dataset::new(x, y, vec![0.0; 5], sigma_y).unwrap();
        let fit = fit(&lookup("linear").unwrap(), &data, &[1.0, 0.0], &FitOptions::default()).unwrap();
        assert!((fit.params[0] - 1.0).abs() < 1e-3, "slope {}", fit.params[0]);
    }

    #[test]
    fn recovers_exponential_decay() {
        let x: Vec<f64> = (0..20).map(|i| i as f64 * 0.25).collect();
        let y: Vec<f64> = x.iter().map(|x| 4.0 * (-x / 1.5).exp()).collect();
        let data = uniform(x, y, 0.01);
        let fit = fit(&lookup("exponential").unwrap(), &data, &[1.0, 1.0], &FitOptions::default()).unwrap();
        assert!((fit.params[0] - 4.0).abs() < 1e-6);
        assert!((fit.params[1] - 1.5).abs() < 1e-6);
    }

    #[test]
    fn evaluation_cap_reports_convergence_failure() {
        let x: Vec<f64> = (0..20).map(|i| i as f64 * 0.25).collect();
        let y: Vec<f64> = x.iter().map(|x| 4.0 * (-x / 1.5).exp()).collect();
        let data = uniform(x, y, 0.01);
        let opts = FitOptions {
            max_evaluations: 4,
            ..FitOptions::default()
        };
        let err = fit(&lookup("exponential").unwrap(), &data, &[1.0, 1.0], &opts).unwrap_err();
        assert_eq!(err, FitError::ConvergenceFailure { max_evaluations: 4 });
    }

    #[test]
    fn non_finite_guess_is_rejected() {
        let data = uniform(vec![0.0, 1.0, 2.0], vec![1.0, 2.0, 3.0], 1.0);
        let err = fit(&lookup("linear").unwrap(), &data, &[f64::NAN, 1.0], &FitOptions::default()).unwrap_err();
        assert_eq!(
            err,
            FitError::NonFiniteValue {
                what: "initial guess",
                index: 0
            }
        );
    }
}
