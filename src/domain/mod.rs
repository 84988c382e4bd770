//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - measurement data (`Dataset`, `DatasetStats`)
//! - fit outputs (`FitResult`, `Covariance`, `ResidualReport`, `SampledCurve`)
//! - run configuration (`FitConfig`, `TransformKind`)

pub mod config;
pub mod types;

pub use config::*;
pub use types::*;
