//! Shared domain types.
//!
//! Every type here is immutable once built: transforms and fits produce new
//! values rather than editing existing ones, so results can be shared freely
//! across threads (see `fit::batch`).

use nalgebra::DMatrix;
use serde::Serialize;

use crate::error::{Axis, FitError};
use crate::models::Model;

/// Index-aligned measurement columns: point `i` is
/// `(x[i], y[i], sigma_x[i], sigma_y[i])`.
///
/// Invariants enforced by [`Dataset::new`]:
/// - all four columns have the same length
/// - every value is finite
/// - `sigma_y[i] > 0` and `sigma_x[i] >= 0`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    x: Vec<f64>,
    y: Vec<f64>,
    sigma_x: Vec<f64>,
    sigma_y: Vec<f64>,
}

impl Dataset {
    pub fn new(
        x: Vec<f64>,
        y: Vec<f64>,
        sigma_x: Vec<f64>,
        sigma_y: Vec<f64>,
    ) -> Result<Self, FitError> {
        let n = x.len();
        if y.len() != n || sigma_x.len() != n || sigma_y.len() != n {
            return Err(FitError::LengthMismatch {
                x: n,
                y: y.len(),
                sigma_x: sigma_x.len(),
                sigma_y: sigma_y.len(),
            });
        }

        for (what, column) in [("x", &x), ("y", &y), ("sigma_x", &sigma_x), ("sigma_y", &sigma_y)] {
            if let Some(index) = column.iter().position(|v| !v.is_finite()) {
                return Err(FitError::NonFiniteValue { what, index });
            }
        }

        if let Some(index) = sigma_y.iter().position(|&s| s <= 0.0) {
            return Err(FitError::InvalidUncertainty {
                index,
                axis: Axis::Y,
                value: sigma_y[index],
            });
        }
        if let Some(index) = sigma_x.iter().position(|&s| s < 0.0) {
            return Err(FitError::InvalidUncertainty {
                index,
                axis: Axis::X,
                value: sigma_x[index],
            });
        }

        Ok(Self {
            x,
            y,
            sigma_x,
            sigma_y,
        })
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn sigma_x(&self) -> &[f64] {
        &self.sigma_x
    }

    pub fn sigma_y(&self) -> &[f64] {
        &self.sigma_y
    }

    /// Summary of the value ranges, or `None` for an empty dataset.
    pub fn stats(&self) -> Option<DatasetStats> {
        if self.is_empty() {
            return None;
        }
        let (x_min, x_max) = min_max(&self.x);
        let (y_min, y_max) = min_max(&self.y);
        Some(DatasetStats {
            n_points: self.len(),
            x_min,
            x_max,
            y_min,
            y_max,
        })
    }
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

/// Summary stats about a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DatasetStats {
    pub n_points: usize,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

/// Parameter covariance as produced by the fit engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Covariance {
    Estimated(DMatrix<f64>),
    /// The normal matrix was singular or the residual variance could not be
    /// estimated. The point estimate is still valid.
    Unavailable { reason: String },
}

/// Output of a single fit.
#[derive(Debug, Clone)]
pub struct FitResult {
    pub model: Model,
    pub params: Vec<f64>,
    pub covariance: Covariance,
    /// The (fit-space) dataset the parameters were estimated from.
    pub dataset: Dataset,
    /// Weighted sum of squared residuals at the solution.
    pub chi_square: f64,
    pub degrees_of_freedom: usize,
    /// Residual-vector evaluations spent by the optimizer.
    pub evaluations: usize,
}

impl FitResult {
    pub fn covariance(&self) -> Result<&DMatrix<f64>, FitError> {
        match &self.covariance {
            Covariance::Estimated(c) => Ok(c),
            Covariance::Unavailable { reason } => Err(FitError::SingularCovariance {
                reason: reason.clone(),
            }),
        }
    }

    /// `χ² / dof`, or `None` with zero degrees of freedom.
    pub fn reduced_chi_square(&self) -> Option<f64> {
        (self.degrees_of_freedom > 0).then(|| self.chi_square / self.degrees_of_freedom as f64)
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.model.eval(x, &self.params)
    }
}

/// Point-wise residuals plus the sums behind the coefficient of determination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResidualReport {
    /// `y[i] - model(x[i])`, index-aligned with the dataset.
    pub residuals: Vec<f64>,
    pub fitted: Vec<f64>,
    pub ss_res: f64,
    pub ss_tot: f64,
}

impl ResidualReport {
    /// `1 - ss_res / ss_tot`.
    pub fn r_squared(&self) -> Result<f64, FitError> {
        if self.ss_tot == 0.0 {
            return Err(FitError::UndefinedRSquared);
        }
        Ok(1.0 - self.ss_res / self.ss_tot)
    }
}

/// Dense `(x, model(x))` samples, strictly increasing in `x`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampledCurve {
    pub points: Vec<(f64, f64)>,
}

impl SampledCurve {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
