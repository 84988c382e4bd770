//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized
//!
//! Every fitted parameter is printed on the same line as its uncertainty. A
//! missing uncertainty or R² is spelled out with its reason, never shown as NaN.

use crate::domain::{FitResult, ResidualReport, TransformKind};
use crate::error::{AppError, FitError};
use crate::fit::uncertainty::{ParameterEstimate, parameter_estimates};
use crate::models::Model;
use crate::report::compute_residuals;

/// Format the full report for a single fit.
pub fn format_fit_report(fit: &FitResult, residuals: &ResidualReport, transform: TransformKind) -> String {
    let mut out = String::new();

    out.push_str("=== curvefit - weighted least squares ===\n");
    out.push_str(&format!("Model: {} ({})\n", fit.model.name, fit.model.formula));
    out.push_str(&format!("Transform: {}\n", transform.display_name()));
    if let Some(stats) = fit.dataset.stats() {
        out.push_str(&format!(
            "Points: n={} | x=[{}, {}] | y=[{}, {}]\n",
            stats.n_points,
            fmt_num(stats.x_min),
            fmt_num(stats.x_max),
            fmt_num(stats.y_min),
            fmt_num(stats.y_max),
        ));
    }

    out.push_str("\nParameters:\n");
    for est in parameter_estimates(fit) {
        out.push_str(&format_estimate(&est));
        out.push('\n');
    }

    out.push_str("\nGoodness of fit:\n");
    out.push_str(&format!("  chi2 = {} (dof={})", fmt_num(fit.chi_square), fit.degrees_of_freedom));
    if let Some(reduced) = fit.reduced_chi_square() {
        out.push_str(&format!(" | chi2/dof = {}", fmt_num(reduced)));
    }
    out.push('\n');
    out.push_str(&format!("  {}\n", fmt_r_squared(&residuals.r_squared())));
    out.push_str(&format!("  evaluations = {}\n", fit.evaluations));

    out
}

/// Format one row per input of a batch run.
pub fn format_batch_table(rows: &[(String, Result<FitResult, AppError>)]) -> String {
    let mut out = String::new();
    out.push_str(format!("{:<28} {:>12} {:<}", "input", "R²", "parameters").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<28} {:-<12} {:-<10}", "", "", "").trim_end());
    out.push('\n');

    for (label, outcome) in rows {
        let line = match outcome {
            Ok(fit) => {
                let r2 = compute_residuals(fit, &fit.dataset)
                    .and_then(|r| r.r_squared())
                    .map(fmt_num)
                    .unwrap_or_else(|_| "undefined".into());
                let params: Vec<String> = parameter_estimates(fit)
                    .iter()
                    .map(|e| format!("{}={}±{}", e.name, fmt_num(e.value), fmt_sigma_short(&e.sigma)))
                    .collect();
                format!("{:<28} {:>12} {}", truncate(label, 28), r2, params.join(" "))
            }
            Err(e) => format!("{:<28} {:>12} error: {e}", truncate(label, 28), "-"),
        };
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

/// Format the model catalog.
pub fn format_model_catalog(models: &[Model]) -> String {
    let mut out = String::new();
    out.push_str(format!("{:<18} {:>5}  {:<24} {}", "model", "arity", "parameters", "formula").trim_end());
    out.push('\n');
    for m in models {
        out.push_str(&format!(
            "{:<18} {:>5}  {:<24} {}\n",
            m.name,
            m.arity(),
            m.params.join(", "),
            m.formula
        ));
    }
    out
}

fn format_estimate(est: &ParameterEstimate) -> String {
    match &est.sigma {
        Ok(sigma) => format!("  {:<6} = {} ± {}", est.name, fmt_num(est.value), fmt_num(*sigma)),
        Err(e) => format!("  {:<6} = {} ± unavailable ({e})", est.name, fmt_num(est.value)),
    }
}

fn fmt_r_squared(r2: &Result<f64, FitError>) -> String {
    match r2 {
        Ok(v) => format!("R² = {}", fmt_num(*v)),
        Err(e) => format!("R² undefined ({e})"),
    }
}

fn fmt_sigma_short(sigma: &Result<f64, FitError>) -> String {
    match sigma {
        Ok(s) => fmt_num(*s),
        Err(_) => "n/a".into(),
    }
}

/// Fixed notation for ordinary magnitudes, scientific otherwise.
fn fmt_num(v: f64) -> String {
    let a = v.abs();
    if a == 0.0 || (1e-3..1e6).contains(&a) {
        format!("{v:.6}")
    } else {
        format!("{v:.6e}")
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use nalgebra::DMatrix;

    use super::*;
    use crate::domain::{Covariance, Dataset};
    use crate::models::{all, lookup};

    fn fit_with(covariance: Covariance) -> FitResult {
        FitResult {
            model: lookup("linear").unwrap(),
            params: vec![3.0, 2.0],
            covariance,
            dataset: Dataset::new(vec![0.0, 1.0, 2.0], vec![2.0, 5.0, 8.0], vec![0.0; 3], vec![0.5; 3]).unwrap(),
            chi_square: 0.0,
            degrees_of_freedom: 1,
            evaluations: 9,
        }
    }

    #[test]
    fn report_pairs_values_with_uncertainties() {
        let fit = fit_with(Covariance::Estimated(DMatrix::from_row_slice(2, 2, &[0.01, 0.0, 0.0, 0.04])));
        let residuals = compute_residuals(&fit, &fit.dataset).unwrap();
        let text = format_fit_report(&fit, &residuals, TransformKind::Identity);

        assert!(text.contains("m      = 3.000000 ± 0.100000"), "{text}");
        assert!(text.contains("b      = 2.000000 ± 0.200000"), "{text}");
        assert!(text.contains("R² = 1.000000"), "{text}");
        assert!(!text.contains("NaN"));
    }

    #[test]
    fn report_spells_out_missing_uncertainty() {
        let fit = fit_with(Covariance::Unavailable {
            reason: "normal matrix JᵀJ is singular".into(),
        });
        let residuals = compute_residuals(&fit, &fit.dataset).unwrap();
        let text = format_fit_report(&fit, &residuals, TransformKind::LogLog);

        assert!(text.contains("m      = 3.000000 ± unavailable (covariance is unavailable"), "{text}");
        assert!(text.contains("Transform: log-log"));
    }

    #[test]
    fn batch_table_shows_errors_inline() {
        let rows: Vec<(String, Result<FitResult, AppError>)> = vec![
            ("good.txt".to_string(), Ok(fit_with(Covariance::Unavailable { reason: "x".into() }))),
            (
                "short.txt".to_string(),
                Err(FitError::UnderdeterminedSystem { points: 1, params: 2 }.into()),
            ),
        ];
        let text = format_batch_table(&rows);
        assert!(text.contains("m=3.000000±n/a"), "{text}");
        assert!(text.contains("error: 1 data points cannot determine 2 parameters"), "{text}");
    }

    #[test]
    fn catalog_lists_every_model() {
        let text = format_model_catalog(all());
        for m in all() {
            assert!(text.contains(m.name));
        }
    }

    #[test]
    fn fmt_num_switches_to_scientific() {
        assert_eq!(fmt_num(1.5), "1.500000");
        assert_eq!(fmt_num(0.0), "0.000000");
        assert_eq!(fmt_num(2.5e-7), "2.500000e-7");
    }
}
