//! Synthetic measurement generation.
//!
//! Produces datasets of the shape a lab notebook would: evenly spaced `x`
//! readings, `y = model(x; p) + ε` with `ε ~ N(0, σy²)`, and constant
//! instrument uncertainties on both axes. Useful for checking that a model and
//! initial guess recover known parameters before pointing them at real data.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::domain::Dataset;
use crate::error::FitError;
use crate::models::{Model, check_arity};

#[derive(Debug, Clone)]
pub struct SimulationSpec {
    pub model: Model,
    /// True parameter values.
    pub params: Vec<f64>,
    pub x_min: f64,
    pub x_max: f64,
    pub points: usize,
    /// Reported x uncertainty (x values themselves are exact).
    pub sigma_x: f64,
    /// Standard deviation of the y noise, also reported as `sigma_y`.
    pub sigma_y: f64,
    pub seed: u64,
}

/// Generate a dataset from `spec`. The same spec always yields the same data.
pub fn generate_sample(spec: &SimulationSpec) -> Result<Dataset, FitError> {
    check_arity(&spec.model, &spec.params)?;
    if spec.points == 0 {
        return Err(FitError::InvalidConfig("point count must be > 0".into()));
    }
    if !(spec.x_min.is_finite() && spec.x_max.is_finite() && spec.x_max >= spec.x_min) {
        return Err(FitError::InvalidConfig(format!(
            "invalid x range [{}, {}]",
            spec.x_min, spec.x_max
        )));
    }
    if !(spec.sigma_y.is_finite() && spec.sigma_y > 0.0) {
        return Err(FitError::InvalidConfig(format!("sigma_y must be > 0, got {}", spec.sigma_y)));
    }
    if !(spec.sigma_x.is_finite() && spec.sigma_x >= 0.0) {
        return Err(FitError::InvalidConfig(format!("sigma_x must be >= 0, got {}", spec.sigma_x)));
    }

    let mut rng = StdRng::seed_from_u64(spec.seed);
    let noise = Normal::new(0.0, spec.sigma_y)
        .map_err(|e| FitError::InvalidConfig(format!("noise distribution error: {e}")))?;

    let n = spec.points;
    let step = if n > 1 {
        (spec.x_max - spec.x_min) / (n - 1) as f64
    } else {
        0.0
    };

    let mut x = Vec::with_capacity(n);
    let mut y = Vec::with_capacity(n);
    for i in 0..n {
        let xi = spec.x_min + i as f64 * step;
        let truth = spec.model.eval(xi, &spec.params);
        if !truth.is_finite() {
            return Err(FitError::NonFiniteValue {
                what: "simulated model value",
                index: i,
            });
        }
        x.push(xi);
        y.push(truth + noise.sample(&mut rng));
    }

    Dataset::new(x, y, vec![spec.sigma_x; n], vec![spec.sigma_y; n])
}
