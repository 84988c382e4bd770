//! Input/output helpers.
//!
//! - measurement file ingest (`ingest`)
//! - per-point residual export to CSV (`export`)
//! - plot bundle hand-off to the renderer (`bundle`)

pub mod bundle;
pub mod export;
pub mod ingest;

pub use bundle::*;
pub use export::*;
pub use ingest::*;
