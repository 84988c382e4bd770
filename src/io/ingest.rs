//! Measurement file ingest.
//!
//! Input format:
//!
//! ```text
//! <header line, ignored>
//! x   y   sigma_x   sigma_y
//! ...
//! ```
//!
//! - fields are separated by spaces and/or tabs
//! - every data row has exactly four numeric fields
//! - commas are rejected (as delimiters and as decimal separators)
//! - blank lines and `#` comments are skipped
//!
//! Any bad row aborts the load; no partial dataset is ever returned.

use std::path::Path;

use tracing::info;

use crate::domain::Dataset;
use crate::error::{AppError, FitError};

const FIELDS: usize = 4;

/// Read and parse a measurement file.
pub fn read_dataset(path: &Path) -> Result<Dataset, AppError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| AppError::new(2, format!("Failed to open data file '{}': {e}", path.display())))?;
    let data = parse_dataset(&text)
        .map_err(|e| AppError::new(e.exit_code(), format!("{}: {e}", path.display())))?;
    info!(path = %path.display(), points = data.len(), "loaded dataset");
    Ok(data)
}

/// Parse measurement text (header line first).
pub fn parse_dataset(text: &str) -> Result<Dataset, FitError> {
    let mut x = Vec::new();
    let mut y = Vec::new();
    let mut sigma_x = Vec::new();
    let mut sigma_y = Vec::new();

    // Line 1 is the header.
    for (idx, raw) in text.lines().enumerate().skip(1) {
        let line = idx + 1;
        let content = raw.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }

        let [vx, vy, sx, sy] = parse_row(content, line)?;
        x.push(vx);
        y.push(vy);
        sigma_x.push(sx);
        sigma_y.push(sy);
    }

    if x.is_empty() {
        return Err(FitError::EmptyDataset);
    }

    Dataset::new(x, y, sigma_x, sigma_y)
}

fn parse_row(content: &str, line: usize) -> Result<[f64; FIELDS], FitError> {
    let malformed = |message: String| FitError::MalformedRow { line, message };

    if content.contains(',') {
        return Err(malformed("commas are not permitted; separate fields with spaces or tabs".into()));
    }

    let fields: Vec<&str> = content.split_whitespace().collect();
    if fields.len() != FIELDS {
        return Err(malformed(format!("expected {FIELDS} fields, found {}", fields.len())));
    }

    let mut out = [0.0; FIELDS];
    for (slot, field) in out.iter_mut().zip(&fields) {
        let v: f64 = field
            .parse()
            .map_err(|_| malformed(format!("'{field}' is not a number")))?;
        if !v.is_finite() {
            return Err(malformed(format!("'{field}' is not a finite number")));
        }
        *slot = v;
    }
    Ok(out)
}
