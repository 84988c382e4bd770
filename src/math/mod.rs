//! Numerical building blocks: the covariance inverse and the Levenberg–Marquardt driver.

pub mod lm;
pub mod ols;

pub use lm::*;
pub use ols::*;
