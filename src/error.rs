//! Error types.
//!
//! - `FitError` is the library taxonomy: one variant per way the fitting
//!   pipeline can refuse or fail. Library functions return it directly.
//! - `AppError` is what the binary reports: a message plus a process exit code.
//!
//! Exit codes:
//! - `2` input, configuration, or model-selection errors
//! - `3` not enough data to fit
//! - `4` numerical failure while fitting

use std::fmt;

/// Which coordinate of a data point an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FitError {
    /// A data row did not parse to exactly four numbers.
    #[error("line {line}: malformed row ({message})")]
    MalformedRow { line: usize, message: String },

    #[error("input contains no data rows")]
    EmptyDataset,

    #[error("column lengths differ: x={x}, y={y}, sigma_x={sigma_x}, sigma_y={sigma_y}")]
    LengthMismatch {
        x: usize,
        y: usize,
        sigma_x: usize,
        sigma_y: usize,
    },

    #[error("point {index}: invalid {axis} uncertainty {value}")]
    InvalidUncertainty { index: usize, axis: Axis, value: f64 },

    #[error("{what} contains a non-finite value at index {index}")]
    NonFiniteValue { what: &'static str, index: usize },

    /// The log transform was handed a value it cannot take the log of.
    #[error("point {index}: cannot take ln of {axis}={value} (must be > 0)")]
    DomainError { index: usize, axis: Axis, value: f64 },

    #[error("unknown model '{name}' (known: {known})")]
    UnknownModel { name: String, known: String },

    #[error("model '{model}' takes {expected} parameters but the initial guess has {got}")]
    ParameterCountMismatch {
        model: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("{points} data points cannot determine {params} parameters")]
    UnderdeterminedSystem { points: usize, params: usize },

    #[error("fit did not converge within {max_evaluations} evaluations")]
    ConvergenceFailure { max_evaluations: usize },

    #[error("covariance is unavailable: {reason}")]
    SingularCovariance { reason: String },

    #[error("parameter {index} has negative variance {value}")]
    NegativeVariance { index: usize, value: f64 },

    #[error("R² is undefined: all y values are equal")]
    UndefinedRSquared,

    #[error("cannot sample an empty range [{start}, {stop})")]
    EmptyRange { start: f64, stop: f64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl FitError {
    /// Exit code used when this error aborts the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            FitError::UnderdeterminedSystem { .. } | FitError::EmptyDataset => 3,
            FitError::ConvergenceFailure { .. }
            | FitError::SingularCovariance { .. }
            | FitError::NegativeVariance { .. }
            | FitError::UndefinedRSquared
            | FitError::EmptyRange { .. } => 4,
            _ => 2,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
