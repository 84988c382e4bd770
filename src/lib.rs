//! `curvefit` library crate.
//!
//! The binary (`curvefit`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the fit pipeline can be driven from other tools (batch scripts, notebooks)
//! - code stays easy to navigate as the project grows
//!
//! Pipeline: `io::ingest` -> `transform` -> `fit` -> `report` / `curve`.

pub mod app;
pub mod cli;
pub mod curve;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
pub mod transform;
