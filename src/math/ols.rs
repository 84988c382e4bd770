//! Dense linear algebra for the covariance.
//!
//! The fit engine inverts `JᵀJ` once at the solution. `k` is the model arity
//! (2–7), so this is a tiny problem; it goes through the SVD of `J` rather
//! than forming `JᵀJ`, which squares the condition number.

use nalgebra::{DMatrix, DVector};

/// `(JᵀJ)⁻¹` computed from the SVD of `J`.
///
/// Singular values at or below `eps · max(n, k) · s_max` make the normal
/// matrix numerically singular; in that case `None` is returned instead of a
/// matrix full of huge or non-finite entries.
pub fn normal_matrix_inverse(jacobian: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    let (n, k) = jacobian.shape();
    if n < k || k == 0 {
        return None;
    }

    let svd = jacobian.clone().svd(false, true);
    let v_t = svd.v_t?;
    let s = &svd.singular_values;

    let s_max = s.max();
    if !(s_max.is_finite() && s_max > 0.0) {
        return None;
    }
    let cutoff = f64::EPSILON * n.max(k) as f64 * s_max;
    if s.iter().any(|&sv| sv <= cutoff) {
        return None;
    }

    let inv_sq = DVector::from_iterator(s.len(), s.iter().map(|sv| 1.0 / (sv * sv)));
    let cov = v_t.transpose() * DMatrix::from_diagonal(&inv_sq) * v_t;
    cov.iter().all(|v| v.is_finite()).then_some(cov)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_inverse_of_identity_design() {
        let j = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
        let inv = normal_matrix_inverse(&j).unwrap();
        approx::assert_relative_eq!(inv, DMatrix::identity(2, 2), epsilon = 1e-12);
    }

    #[test]
    fn normal_inverse_detects_collinear_columns() {
        let j = DMatrix::from_row_slice(3, 2, &[1.0, 2.0, 2.0, 4.0, 3.0, 6.0]);
        assert!(normal_matrix_inverse(&j).is_none());
    }
}
