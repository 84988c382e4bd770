//! Command-line parsing.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fitting/math code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_MAX_EVALUATIONS, TransformKind};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "curvefit",
    version,
    about = "Weighted nonlinear least-squares fits for measurements with uncertainties"
)]
pub struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit one measurement file and print parameters with uncertainties.
    Fit(FitArgs),
    /// Fit the same model to several files in parallel and print a summary table.
    Batch(BatchArgs),
    /// Write a synthetic measurement file generated from a model.
    Simulate(SimulateArgs),
    /// List the available models.
    Models,
}

/// Options for a single fit.
///
/// Every flag is optional when `--config` supplies the value; flags given on
/// the command line override the file.
#[derive(Debug, Args, Clone, Default)]
pub struct FitArgs {
    /// TOML file with a full run configuration.
    #[arg(long, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Measurement file: header line, then `x y sigma_x sigma_y` rows.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Model to fit (see `curvefit models`).
    #[arg(short, long)]
    pub model: Option<String>,

    /// Initial parameter guess, comma separated (defaults to all ones).
    #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true)]
    pub guess: Option<Vec<f64>>,

    /// Transform applied before fitting.
    #[arg(long, value_enum)]
    pub transform: Option<TransformKind>,

    /// Multiply x and sigma_x by this factor on load (e.g. 0.01 for cm → m).
    #[arg(long)]
    pub x_scale: Option<f64>,

    /// Multiply y and sigma_y by this factor on load.
    #[arg(long)]
    pub y_scale: Option<f64>,

    /// Cap on model evaluations before the fit is declared non-convergent.
    #[arg(long)]
    pub max_evaluations: Option<usize>,

    /// Number of samples in the plotted fit curve.
    #[arg(long)]
    pub curve_points: Option<usize>,

    /// Treat sigma_y as absolute (do not rescale the covariance by chi2/dof).
    #[arg(long)]
    pub absolute_sigma: bool,

    /// Export per-point fitted values and residuals to CSV.
    #[arg(long)]
    pub export_residuals: Option<PathBuf>,

    /// Write the plot bundle (data, curve, residuals) as JSON.
    #[arg(long, value_name = "PATH")]
    pub artifact: Option<PathBuf>,
}

/// Options for fitting several files.
#[derive(Debug, Args, Clone)]
pub struct BatchArgs {
    /// Model to fit (see `curvefit models`).
    #[arg(short, long)]
    pub model: String,

    /// Initial parameter guess, comma separated (defaults to all ones).
    #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true)]
    pub guess: Option<Vec<f64>>,

    #[arg(long, value_enum, default_value_t = TransformKind::Identity)]
    pub transform: TransformKind,

    #[arg(long, default_value_t = 1.0)]
    pub x_scale: f64,

    #[arg(long, default_value_t = 1.0)]
    pub y_scale: f64,

    #[arg(long, default_value_t = DEFAULT_MAX_EVALUATIONS)]
    pub max_evaluations: usize,

    #[arg(long)]
    pub absolute_sigma: bool,

    /// Measurement files.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
}

/// Options for generating a synthetic measurement file.
#[derive(Debug, Args, Clone)]
pub struct SimulateArgs {
    #[arg(short, long)]
    pub model: String,

    /// True parameter values, comma separated.
    #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
    pub params: Vec<f64>,

    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub x_min: f64,

    #[arg(long, default_value_t = 10.0, allow_hyphen_values = true)]
    pub x_max: f64,

    #[arg(short = 'n', long, default_value_t = 20)]
    pub points: usize,

    #[arg(long, default_value_t = 0.0)]
    pub sigma_x: f64,

    #[arg(long, default_value_t = 1.0)]
    pub sigma_y: f64,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Output file (ingest format).
    #[arg(short, long)]
    pub output: PathBuf,
}
