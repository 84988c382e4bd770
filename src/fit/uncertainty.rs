//! One-sigma parameter uncertainties from the fit covariance.

use crate::domain::FitResult;
use crate::error::FitError;

/// `sqrt(diag(C))`, one entry per parameter.
///
/// Fails with `SingularCovariance` when the fit produced no covariance, and
/// with `NegativeVariance` when a diagonal entry is negative (an ill-conditioned
/// fit), instead of returning NaN.
pub fn parameter_sigmas(fit: &FitResult) -> Result<Vec<f64>, FitError> {
    let cov = fit.covariance()?;
    cov.diagonal()
        .iter()
        .enumerate()
        .map(|(index, &var)| {
            if var < 0.0 || var.is_nan() {
                Err(FitError::NegativeVariance { index, value: var })
            } else {
                Ok(var.sqrt())
            }
        })
        .collect()
}

/// A fitted parameter paired with its uncertainty (if one could be computed).
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterEstimate {
    pub name: &'static str,
    pub value: f64,
    pub sigma: Result<f64, FitError>,
}

/// Pair every parameter with its sigma.
///
/// A covariance problem never hides the point estimates: each entry carries
/// the value and either its sigma or the reason it is unavailable.
pub fn parameter_estimates(fit: &FitResult) -> Vec<ParameterEstimate> {
    let sigmas = parameter_sigmas(fit);
    fit.model
        .params
        .iter()
        .zip(&fit.params)
        .enumerate()
        .map(|(j, (&name, &value))| ParameterEstimate {
            name,
            value,
            sigma: sigmas.as_ref().map(|s| s[j]).map_err(Clone::clone),
        })
        .collect()
}
