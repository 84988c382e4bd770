//! Run configuration.
//!
//! A run is fully described by a `FitConfig`. It can be loaded from a TOML file
//! and then patched by CLI flags (see `app::fit_config_from_args`).

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::FitError;

/// Default cap on residual evaluations spent by the optimizer.
pub const DEFAULT_MAX_EVALUATIONS: usize = 10_000;

/// Default number of samples in the plotted fit curve.
pub const DEFAULT_CURVE_POINTS: usize = 10_000;

/// Coordinate transform applied to the data before fitting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TransformKind {
    /// Fit the data as measured.
    #[default]
    Identity,
    /// Fit `ln(y)` against `ln(x)`, e.g. to linearize a power law.
    LogLog,
}

impl TransformKind {
    pub fn display_name(self) -> &'static str {
        match self {
            TransformKind::Identity => "identity",
            TransformKind::LogLog => "log-log",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FitConfig {
    /// Measurement file (`x y sigma_x sigma_y`, one header line).
    pub input_path: PathBuf,
    /// Registry key of the model to fit.
    pub model: String,
    /// Starting point for the optimizer. Defaults to all ones.
    #[serde(default)]
    pub initial_guess: Option<Vec<f64>>,
    /// Where the renderer writes its artifact (if anywhere).
    #[serde(default)]
    pub output_artifact_path: Option<PathBuf>,

    #[serde(default)]
    pub transform: TransformKind,
    /// Multiplier applied to `x` and `sigma_x` at ingestion (e.g. `0.01` for cm → m).
    #[serde(default = "unit_scale")]
    pub x_scale: f64,
    /// Multiplier applied to `y` and `sigma_y` at ingestion.
    #[serde(default = "unit_scale")]
    pub y_scale: f64,
    #[serde(default = "default_max_evaluations")]
    pub max_evaluations: usize,
    #[serde(default = "default_curve_points")]
    pub curve_points: usize,
    /// Treat `sigma_y` as absolute; otherwise the covariance is rescaled by
    /// the reduced chi-square.
    #[serde(default)]
    pub absolute_sigma: bool,
    /// Optional CSV of per-point fitted values and residuals.
    #[serde(default)]
    pub export_residuals: Option<PathBuf>,
}

fn unit_scale() -> f64 {
    1.0
}

fn default_max_evaluations() -> usize {
    DEFAULT_MAX_EVALUATIONS
}

fn default_curve_points() -> usize {
    DEFAULT_CURVE_POINTS
}

impl FitConfig {
    /// A config with every optional field at its default.
    pub fn new(input_path: impl Into<PathBuf>, model: impl Into<String>) -> Self {
        Self {
            input_path: input_path.into(),
            model: model.into(),
            initial_guess: None,
            output_artifact_path: None,
            transform: TransformKind::Identity,
            x_scale: unit_scale(),
            y_scale: unit_scale(),
            max_evaluations: DEFAULT_MAX_EVALUATIONS,
            curve_points: DEFAULT_CURVE_POINTS,
            absolute_sigma: false,
            export_residuals: None,
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, FitError> {
        toml::from_str(text).map_err(|e| FitError::InvalidConfig(e.to_string()))
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, FitError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| FitError::InvalidConfig(format!("cannot read '{}': {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Checks that do not need the model registry.
    pub fn validate(&self) -> Result<(), FitError> {
        for (name, scale) in [("x_scale", self.x_scale), ("y_scale", self.y_scale)] {
            if !(scale.is_finite() && scale > 0.0) {
                return Err(FitError::InvalidConfig(format!("{name} must be finite and > 0, got {scale}")));
            }
        }
        if self.max_evaluations == 0 {
            return Err(FitError::InvalidConfig("max_evaluations must be > 0".into()));
        }
        if self.curve_points == 0 {
            return Err(FitError::InvalidConfig("curve_points must be > 0".into()));
        }
        Ok(())
    }
}
