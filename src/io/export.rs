//! File exports.
//!
//! - per-point fit results as CSV, easy to consume in spreadsheets or downstream
//!   scripts (values are in fit space, after any transform)
//! - datasets in the ingest format, e.g. simulated measurements

use std::path::Path;

use serde::Serialize;

use crate::domain::{Dataset, ResidualReport};
use crate::error::AppError;

#[derive(Debug, Serialize)]
struct ResidualRow {
    x: f64,
    y: f64,
    sigma_x: f64,
    sigma_y: f64,
    y_fit: f64,
    residual: f64,
}

/// Write `x,y,sigma_x,sigma_y,y_fit,residual` for every point.
pub fn write_residuals_csv(path: &Path, data: &Dataset, report: &ResidualReport) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    for i in 0..data.len() {
        writer
            .serialize(ResidualRow {
                x: data.x()[i],
                y: data.y()[i],
                sigma_x: data.sigma_x()[i],
                sigma_y: data.sigma_y()[i],
                y_fit: report.fitted[i],
                residual: report.residuals[i],
            })
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write a dataset in the ingest format (header line + four columns).
pub fn write_dataset(path: &Path, data: &Dataset) -> Result<(), AppError> {
    let mut out = String::from("x\ty\tsigma_x\tsigma_y\n");
    for i in 0..data.len() {
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\n",
            data.x()[i],
            data.y()[i],
            data.sigma_x()[i],
            data.sigma_y()[i]
        ));
    }
    std::fs::write(path, out)
        .map_err(|e| AppError::new(2, format!("Failed to write data file '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("residuals.csv");
        let data = Dataset::new(vec![1.0, 2.0], vec![3.0, 5.5], vec![0.1, 0.1], vec![0.5, 0.5]).unwrap();
        let report = ResidualReport {
            residuals: vec![0.0, 0.5],
            fitted: vec![3.0, 5.0],
            ss_res: 0.25,
            ss_tot: 3.125,
        };

        write_residuals_csv(&path, &data, &report).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "x,y,sigma_x,sigma_y,y_fit,residual");
        assert_eq!(lines[2], "2.0,5.5,0.1,0.5,5.0,0.5");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn written_dataset_reads_back_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.txt");
        let data = Dataset::new(vec![0.1, 2.5], vec![-3.75, 1e-9], vec![0.0, 0.01], vec![0.3, 0.125]).unwrap();

        write_dataset(&path, &data).unwrap();
        assert_eq!(crate::io::read_dataset(&path).unwrap(), data);
    }
}
