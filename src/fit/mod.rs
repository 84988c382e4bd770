//! Fitting and uncertainty propagation.
//!
//! Responsibilities:
//!
//! - weighted nonlinear least-squares fit of one model to one dataset
//! - one-sigma parameter uncertainties from the covariance
//! - parallel fitting of many datasets

pub mod batch;
pub mod fitter;
pub mod uncertainty;

pub use batch::*;
pub use fitter::*;
pub use uncertainty::*;
