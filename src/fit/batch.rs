//! Fit many datasets with the same model in parallel.
//!
//! Each job owns its inputs and produces its own `FitResult`; nothing is
//! shared mutably between jobs, so results are identical to fitting the
//! datasets one by one.

use rayon::prelude::*;

use crate::domain::{Dataset, FitResult};
use crate::error::FitError;
use crate::fit::fitter::{FitOptions, fit};
use crate::models::{Model, check_arity};

/// Fit `model` to every dataset; results come back in input order.
///
/// An arity mismatch is a property of the request, not of any dataset, so it
/// is reported once before any work is scheduled.
pub fn fit_batch(
    model: &Model,
    datasets: &[Dataset],
    initial_guess: &[f64],
    opts: &FitOptions,
) -> Result<Vec<Result<FitResult, FitError>>, FitError> {
    check_arity(model, initial_guess)?;

    Ok(datasets
        .par_iter()
        .map(|data| fit(model, data, initial_guess, opts))
        .collect())
}
