//! Synthetic datasets with known parameters.

pub mod sample;

pub use sample::*;
