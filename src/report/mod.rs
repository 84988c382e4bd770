//! Reporting utilities: residuals, goodness of fit, and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::{Dataset, FitResult, ResidualReport};
use crate::error::FitError;

/// Compute fitted values, residuals and the sums behind R².
///
/// `data` must be in fit space (i.e. already transformed); residuals stay
/// index-aligned with it so they can be plotted against the same `x` and
/// error bars.
pub fn compute_residuals(fit: &FitResult, data: &Dataset) -> Result<ResidualReport, FitError> {
    let n = data.len();
    let mut fitted = Vec::with_capacity(n);
    let mut residuals = Vec::with_capacity(n);

    for (index, (&x, &y)) in data.x().iter().zip(data.y()).enumerate() {
        let y_fit = fit.predict(x);
        if !y_fit.is_finite() {
            return Err(FitError::NonFiniteValue {
                what: "fitted model prediction",
                index,
            });
        }
        fitted.push(y_fit);
        residuals.push(y - y_fit);
    }

    let mean = if n == 0 { 0.0 } else { data.y().iter().sum::<f64>() / n as f64 };
    let ss_res = residuals.iter().map(|r| r * r).sum();
    // Constant y: the float mean can sit an ulp off the common value, so the
    // sum would come out tiny instead of zero.
    let constant = data.y().iter().all(|&v| v == data.y()[0]);
    let ss_tot = if constant {
        0.0
    } else {
        data.y().iter().map(|y| (y - mean) * (y - mean)).sum()
    };

    Ok(ResidualReport {
        residuals,
        fitted,
        ss_res,
        ss_tot,
    })
}
