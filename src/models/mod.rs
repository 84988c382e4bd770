//! Parametric model catalog.
//!
//! Models are small, pure functions `f(x, p)` so that the fitting code can
//! stay generic over them.

pub mod model;
pub mod registry;

pub use model::*;
pub use registry::*;
