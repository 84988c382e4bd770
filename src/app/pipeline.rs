//! Shared "fit pipeline" logic used by the `fit` and `batch` commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load -> rescale -> transform -> fit -> residuals / R² -> curve samples
//!
//! The commands can then focus on presentation (printing, exports).

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::curve::CurveSampler;
use crate::domain::{Dataset, FitConfig, FitResult, ResidualReport, SampledCurve};
use crate::error::{AppError, FitError};
use crate::fit::{FitOptions, fit, fit_batch};
use crate::io::read_dataset;
use crate::models::{Model, check_arity, lookup};
use crate::report::compute_residuals;
use crate::transform;

/// A validated run: the model resolved from the registry and a guess of the
/// matching length.
#[derive(Debug, Clone)]
pub struct FitPlan {
    pub model: Model,
    pub initial_guess: Vec<f64>,
    pub options: FitOptions,
}

/// Validate `config` and resolve its model.
///
/// Everything that can be checked without touching the data is checked here,
/// so a bad model name or guess fails before any file is read.
pub fn plan(config: &FitConfig) -> Result<FitPlan, FitError> {
    config.validate()?;
    let model = lookup(&config.model)?;
    let initial_guess = config
        .initial_guess
        .clone()
        .unwrap_or_else(|| vec![1.0; model.arity()]);
    check_arity(&model, &initial_guess)?;

    Ok(FitPlan {
        model,
        initial_guess,
        options: FitOptions {
            max_evaluations: config.max_evaluations,
            absolute_sigma: config.absolute_sigma,
        },
    })
}

/// All computed outputs of a single `curvefit fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub plan: FitPlan,
    /// Dataset after unit scaling and transform: what was actually fitted.
    pub data: Dataset,
    pub fit: FitResult,
    pub residuals: ResidualReport,
    /// Absent (with the reason) when the data span no x-range.
    pub curve: Result<SampledCurve, FitError>,
}

/// Execute the full pipeline for `config.input_path`.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    let plan = plan(config)?;
    let raw = read_dataset(&config.input_path)?;
    Ok(run_fit_with_dataset(config, plan, &raw)?)
}

/// Execute the pipeline on an already loaded dataset.
pub fn run_fit_with_dataset(config: &FitConfig, plan: FitPlan, raw: &Dataset) -> Result<RunOutput, FitError> {
    let data = prepare(config, raw)?;
    let fit = fit(&plan.model, &data, &plan.initial_guess, &plan.options)?;
    info!(model = plan.model.name, params = ?fit.params, "fit complete");

    let residuals = compute_residuals(&fit, &data)?;
    let curve = CurveSampler::for_fit(&fit, config.curve_points).map(|s| s.sample());
    if let Err(e) = &curve {
        warn!(error = %e, "no fit curve sampled");
    }

    Ok(RunOutput {
        plan,
        data,
        fit,
        residuals,
        curve,
    })
}

/// Unit scaling followed by the configured transform.
pub fn prepare(config: &FitConfig, raw: &Dataset) -> Result<Dataset, FitError> {
    let scaled = if config.x_scale == 1.0 && config.y_scale == 1.0 {
        raw.clone()
    } else {
        transform::rescale(raw, config.x_scale, config.y_scale)?
    };
    transform::apply(config.transform, &scaled)
}

/// Fit every file with the same plan; one row per input, in input order.
///
/// Files that fail to load or transform get their error in place; the rest
/// are fitted in parallel.
pub fn run_batch(config: &FitConfig, inputs: &[PathBuf]) -> Result<Vec<(String, Result<FitResult, AppError>)>, AppError> {
    let plan = plan(config)?;

    let prepared: Vec<Result<Dataset, AppError>> = inputs
        .iter()
        .map(|path| {
            let raw = read_dataset(path)?;
            prepare(config, &raw).map_err(|e| label_error(path, e))
        })
        .collect();

    let ready: Vec<Dataset> = prepared.iter().filter_map(|r| r.as_ref().ok().cloned()).collect();
    let mut fits = fit_batch(&plan.model, &ready, &plan.initial_guess, &plan.options)?.into_iter();

    let mut rows = Vec::with_capacity(inputs.len());
    for (path, prep) in inputs.iter().zip(prepared) {
        let outcome = match prep {
            Ok(_) => match fits.next() {
                Some(result) => result.map_err(|e| label_error(path, e)),
                None => Err(AppError::new(4, "batch produced fewer results than inputs")),
            },
            Err(e) => Err(e),
        };
        rows.push((path.display().to_string(), outcome));
    }
    Ok(rows)
}

fn label_error(path: &Path, err: FitError) -> AppError {
    AppError::new(err.exit_code(), format!("{}: {err}", path.display()))
}
