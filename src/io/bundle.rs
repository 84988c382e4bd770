//! Hand-off to the plotting collaborator.
//!
//! The core never draws anything. It passes three read-only structures to a
//! `Renderer`:
//! - the dataset (points + error bars)
//! - the sampled fit curve
//! - the residual report (lower residual panel)
//!
//! The bundled `JsonBundleRenderer` serializes them, plus run metadata, to a
//! JSON "plot bundle" that an external plotting tool can draw from.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{Dataset, FitResult, ResidualReport, SampledCurve, TransformKind};
use crate::error::AppError;

/// Consumer of a finished fit.
pub trait Renderer {
    fn render(
        &self,
        fit: &FitResult,
        data: &Dataset,
        curve: &SampledCurve,
        residuals: &ResidualReport,
    ) -> Result<(), AppError>;
}

/// Serialized form of a plot bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotBundle {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub model: String,
    pub transform: TransformKind,
    pub param_names: Vec<String>,
    pub params: Vec<f64>,
    pub data: BundleData,
    pub curve: Vec<(f64, f64)>,
    pub residuals: Vec<f64>,
    pub r_squared: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleData {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub sigma_x: Vec<f64>,
    pub sigma_y: Vec<f64>,
}

/// Writes a `PlotBundle` JSON file to `path`.
#[derive(Debug, Clone)]
pub struct JsonBundleRenderer {
    pub path: PathBuf,
    pub transform: TransformKind,
}

impl Renderer for JsonBundleRenderer {
    fn render(
        &self,
        fit: &FitResult,
        data: &Dataset,
        curve: &SampledCurve,
        residuals: &ResidualReport,
    ) -> Result<(), AppError> {
        let bundle = PlotBundle {
            tool: "curvefit".to_string(),
            generated_at: Utc::now(),
            model: fit.model.name.to_string(),
            transform: self.transform,
            param_names: fit.model.params.iter().map(|s| s.to_string()).collect(),
            params: fit.params.clone(),
            data: BundleData {
                x: data.x().to_vec(),
                y: data.y().to_vec(),
                sigma_x: data.sigma_x().to_vec(),
                sigma_y: data.sigma_y().to_vec(),
            },
            curve: curve.points.clone(),
            residuals: residuals.residuals.clone(),
            r_squared: residuals.r_squared().ok(),
        };
        write_plot_bundle(&self.path, &bundle)?;
        info!(path = %self.path.display(), "wrote plot bundle");
        Ok(())
    }
}

/// Write a plot bundle JSON file.
pub fn write_plot_bundle(path: &Path, bundle: &PlotBundle) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create plot bundle '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, bundle)
        .map_err(|e| AppError::new(2, format!("Failed to write plot bundle: {e}")))?;
    Ok(())
}

/// Read a plot bundle JSON file.
pub fn read_plot_bundle(path: &Path) -> Result<PlotBundle, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open plot bundle '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid plot bundle: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::CurveSampler;
    use crate::fit::{FitOptions, fit};
    use crate::models::lookup;
    use crate::report::compute_residuals;

    #[test]
    fn json_renderer_writes_readable_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plot.json");

        let data = Dataset::new(vec![1.0, 2.0, 3.0, 4.0], vec![3.1, 4.9, 7.2, 8.8], vec![0.05; 4], vec![0.2; 4]).unwrap();
        let fit = fit(&lookup("linear").unwrap(), &data, &[1.0, 1.0], &FitOptions::default()).unwrap();
        let curve = CurveSampler::for_fit(&fit, 20).unwrap().sample();
        let residuals = compute_residuals(&fit, &data).unwrap();

        let renderer = JsonBundleRenderer {
            path: path.clone(),
            transform: TransformKind::Identity,
        };
        renderer.render(&fit, &data, &curve, &residuals).unwrap();

        let bundle = read_plot_bundle(&path).unwrap();
        assert_eq!(bundle.model, "linear");
        assert_eq!(bundle.param_names, vec!["m", "b"]);
        assert_eq!(bundle.curve.len(), 20);
        assert_eq!(bundle.residuals.len(), 4);
        assert_eq!(bundle.data.sigma_x, vec![0.05; 4]);
        assert!(bundle.r_squared.unwrap() > 0.99);
    }
}
