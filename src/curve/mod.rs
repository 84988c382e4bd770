//! Dense sampling of a fitted model for plotting.
//!
//! `CurveSampler` is a lazy, finite, restartable sequence of
//! `(x, model(x; p))` pairs at `count` evenly spaced points covering
//! `[start, stop)`:
//!
//! `x_i = start + i · (stop - start) / count`, `i = 0 .. count-1`
//!
//! so the first point is `start` and the last is strictly below `stop`.
//! No fitting or statistics happen here.

use crate::domain::{FitResult, SampledCurve};
use crate::error::FitError;
use crate::models::Model;

pub use crate::domain::DEFAULT_CURVE_POINTS;

#[derive(Debug, Clone)]
pub struct CurveSampler {
    model: Model,
    params: Vec<f64>,
    start: f64,
    step: f64,
    count: usize,
}

impl CurveSampler {
    pub fn new(model: Model, params: Vec<f64>, start: f64, stop: f64, count: usize) -> Result<Self, FitError> {
        if !(start.is_finite() && stop.is_finite()) || stop <= start {
            return Err(FitError::EmptyRange { start, stop });
        }
        if count == 0 {
            return Err(FitError::InvalidConfig("curve point count must be > 0".into()));
        }
        Ok(Self {
            model,
            params,
            start,
            step: (stop - start) / count as f64,
            count,
        })
    }

    /// Sampler over the x-range of the data the fit was computed from.
    pub fn for_fit(fit: &FitResult, count: usize) -> Result<Self, FitError> {
        let stats = fit.dataset.stats().ok_or(FitError::EmptyDataset)?;
        Self::new(fit.model, fit.params.clone(), stats.x_min, stats.x_max, count)
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// A fresh pass over the samples. Can be called any number of times.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + Clone + '_ {
        (0..self.count).map(move |i| {
            let x = self.start + i as f64 * self.step;
            (x, self.model.eval(x, &self.params))
        })
    }

    /// Materialize every sample.
    pub fn sample(&self) -> SampledCurve {
        SampledCurve {
            points: self.iter().collect(),
        }
    }
}
