//! Dataset transforms.
//!
//! A transform maps raw `(x, y, sigma_x, sigma_y)` columns into the coordinate
//! system the chosen model is fitted in. It always returns a new `Dataset`
//! with the same point count and index alignment.
//!
//! For the log transform, uncertainties are propagated to first order:
//!
//! `sigma_ln(v) ≈ sigma_v / v`
//!
//! Only non-positive inputs are rejected. An input of exactly `1` maps to
//! `ln(1) = 0`; that is a legal value here; callers whose data make such a
//! point meaningless must handle it before transforming.

use crate::domain::{Dataset, TransformKind};
use crate::error::{Axis, FitError};

/// Apply `kind` to `data`.
pub fn apply(kind: TransformKind, data: &Dataset) -> Result<Dataset, FitError> {
    match kind {
        TransformKind::Identity => Ok(data.clone()),
        TransformKind::LogLog => log_log(data),
    }
}

/// `x' = ln(x)`, `y' = ln(y)` with delta-method uncertainties.
pub fn log_log(data: &Dataset) -> Result<Dataset, FitError> {
    let (x, sigma_x) = log_column(data.x(), data.sigma_x(), Axis::X)?;
    let (y, sigma_y) = log_column(data.y(), data.sigma_y(), Axis::Y)?;
    Dataset::new(x, y, sigma_x, sigma_y)
}

fn log_column(values: &[f64], sigmas: &[f64], axis: Axis) -> Result<(Vec<f64>, Vec<f64>), FitError> {
    let mut logged = Vec::with_capacity(values.len());
    let mut propagated = Vec::with_capacity(values.len());
    for (index, (&v, &s)) in values.iter().zip(sigmas).enumerate() {
        if v <= 0.0 {
            return Err(FitError::DomainError { index, axis, value: v });
        }
        logged.push(v.ln());
        propagated.push(s / v);
    }
    Ok((logged, propagated))
}

/// Multiply `x`/`sigma_x` and `y`/`sigma_y` by unit factors.
pub fn rescale(data: &Dataset, x_scale: f64, y_scale: f64) -> Result<Dataset, FitError> {
    let scale = |col: &[f64], k: f64| col.iter().map(|v| v * k).collect::<Vec<_>>();
    Dataset::new(
        scale(data.x(), x_scale),
        scale(data.y(), y_scale),
        scale(data.sigma_x(), x_scale),
        scale(data.sigma_y(), y_scale),
    )
}
