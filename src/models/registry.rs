//! Static model catalog.
//!
//! The registry is process-wide read-only data. New models are added by
//! appending an entry to `MODELS`; lookups never mutate it.

use crate::error::FitError;
use crate::models::model::{
    Model, cubic, damped_sinusoid, exponential_decay, generalized_power, linear, power_law, power_series,
    quadratic, sextic, sinusoid,
};

pub static MODELS: &[Model] = &[
    Model::new("linear", "m·x + b", &["m", "b"], linear),
    Model::new("quadratic", "a·x² + b·x + c", &["a", "b", "c"], quadratic),
    Model::new("power-law", "a·x^b", &["a", "b"], power_law),
    Model::new("exponential", "a·exp(-x/τ)", &["a", "tau"], exponential_decay),
    Model::new(
        "damped-sinusoid",
        "a·exp(-x/τ)·cos(2πx/T + φ)",
        &["a", "tau", "T", "phi"],
        damped_sinusoid,
    ),
    Model::new("power-series", "a·(1 + b·x + c²·x)", &["a", "b", "c"], power_series),
    Model::new("cubic", "a + b·x + c·x² + d·x³", &["a", "b", "c", "d"], cubic),
    Model::new(
        "sextic",
        "a + b·x + c·x² + d·x³ + e·x⁴ + f·x⁵ + g·x⁶",
        &["a", "b", "c", "d", "e", "f", "g"],
        sextic,
    ),
    Model::new("generalized-power", "K·Lⁿ", &["K", "n"], generalized_power),
    Model::new("sine", "A·sin(w·x + φ) + d", &["A", "w", "d", "phi"], sinusoid),
];

/// Every registered model, in catalog order.
pub fn all() -> &'static [Model] {
    MODELS
}

/// Find a model by registry key (case-insensitive; `_` and `-` are equivalent).
pub fn lookup(name: &str) -> Result<Model, FitError> {
    let wanted = normalize(name);
    MODELS
        .iter()
        .find(|m| m.name == wanted)
        .copied()
        .ok_or_else(|| FitError::UnknownModel {
            name: name.to_string(),
            known: MODELS.iter().map(|m| m.name).collect::<Vec<_>>().join(", "),
        })
}

/// Check an initial guess against a model's arity.
///
/// Mismatches are rejected, never truncated or padded.
pub fn check_arity(model: &Model, guess: &[f64]) -> Result<(), FitError> {
    if guess.len() != model.arity() {
        return Err(FitError::ParameterCountMismatch {
            model: model.name,
            expected: model.arity(),
            got: guess.len(),
        });
    }
    Ok(())
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase().replace('_', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_every_entry() {
        for m in all() {
            assert_eq!(lookup(m.name).unwrap(), *m);
        }
    }

    #[test]
    fn lookup_is_forgiving_about_case_and_separators() {
        assert_eq!(lookup("Power_Law").unwrap().name, "power-law");
        assert_eq!(lookup(" linear ").unwrap().arity(), 2);
    }

    #[test]
    fn unknown_model_lists_catalog() {
        match lookup("gaussian") {
            Err(FitError::UnknownModel { name, known }) => {
                assert_eq!(name, "gaussian");
                assert!(known.contains("damped-sinusoid"));
            }
            other => panic!("expected UnknownModel, got {other:?}"),
        }
    }

    #[test]
    fn catalog_keys_are_unique() {
        let mut names: Vec<_> = all().iter().map(|m| m.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), all().len());
    }

    #[test]
    fn arities_match_catalog() {
        let arity = |n: &str| lookup(n).unwrap().arity();
        assert_eq!(arity("linear"), 2);
        assert_eq!(arity("quadratic"), 3);
        assert_eq!(arity("damped-sinusoid"), 4);
        assert_eq!(arity("sextic"), 7);
        assert_eq!(arity("generalized-power"), 2);
    }

    #[test]
    fn arity_mismatch_is_reported() {
        let quad = lookup("quadratic").unwrap();
        assert_eq!(
            check_arity(&quad, &[1.0, 1.0]),
            Err(FitError::ParameterCountMismatch {
                model: "quadratic",
                expected: 3,
                got: 2
            })
        );
    }
}
