// Export similarity between locations, Bahar et al. (2014)

use ndarray::{Array2, Axis, Zip};

use crate::error::{ensure_epsilon, ComplexityError};
use crate::matrix::LabeledMatrix;

/// Calculates the Export Similarity Index for a matrix of RCAs: the Pearson
/// correlation between the log-RCA vectors of every pair of locations.
///
/// `epsilon` is added before taking logarithms so that zero RCA cells do
/// not produce `-inf`; it must be strictly positive. The result is a
/// symmetric location×location matrix in [-1, 1] with diagonal exactly 1.
/// Locations whose RCA row contains NaN, or whose log-RCA vector has zero
/// variance, correlate as NaN with everything (themselves included).
pub fn similarity(rca: &LabeledMatrix, epsilon: f64) -> Result<LabeledMatrix, ComplexityError> {
    ensure_epsilon(epsilon)?;

    let logs = rca.values().mapv(|x| (x + epsilon).ln());
    let n_obs = logs.ncols() as f64;
    let means = logs.sum_axis(Axis(1)) / n_obs;
    let centered = &logs - &means.insert_axis(Axis(1));

    // co-moments between all location pairs in one product
    let cov = centered.dot(&centered.t());
    let sigma: Vec<f64> = (0..cov.nrows()).map(|i| cov[(i, i)].sqrt()).collect();

    let n = cov.nrows();
    let mut sim = Array2::<f64>::zeros((n, n));
    Zip::indexed(&mut sim).par_for_each(|(i, j), cell| {
        *cell = if i == j {
            if sigma[i] > 0.0 {
                1.0
            } else {
                f64::NAN
            }
        } else {
            (cov[(i, j)] / (sigma[i] * sigma[j])).clamp(-1.0, 1.0)
        };
    });

    Ok(LabeledMatrix::from_validated(
        rca.row_labels().to_vec(),
        rca.row_labels().to_vec(),
        sim,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::labels;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_similarity_shape_diagonal_symmetry() {
        let r = LabeledMatrix::from_parts(
            labels(&["arg", "bra", "chl"]),
            labels(&["p", "q", "s"]),
            array![[2.0, 0.0, 0.5], [0.1, 1.8, 0.9], [1.0, 0.7, 1.3]],
        )
        .unwrap();
        let s = similarity(&r, 0.1).unwrap();
        assert_eq!(s.nrows(), 3);
        assert_eq!(s.ncols(), 3);
        for i in 0..3 {
            assert_eq!(s.values()[(i, i)], 1.0);
            for j in 0..3 {
                let v = s.values()[(i, j)];
                assert_relative_eq!(v, s.values()[(j, i)], epsilon = 1e-12);
                assert!((-1.0..=1.0).contains(&v));
            }
        }
    }

    #[test]
    fn test_similarity_identical_rows_correlate_fully() {
        let r = LabeledMatrix::from_parts(
            labels(&["arg", "twin"]),
            labels(&["p", "q", "s"]),
            array![[2.0, 0.0, 0.5], [2.0, 0.0, 0.5]],
        )
        .unwrap();
        let s = similarity(&r, 0.1).unwrap();
        assert_relative_eq!(s.get("arg", "twin").unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_similarity_log_affine_rows_correlate_fully() {
        // rows built so the log-RCA vectors are exact affine images
        let e = 0.1;
        let base = [0.0f64, 1.0, 2.0];
        let row_a: Vec<f64> = base.iter().map(|x| x.exp() - e).collect();
        let row_b: Vec<f64> = base.iter().map(|x| (2.0 * x + 1.0).exp() - e).collect();
        let r = LabeledMatrix::from_parts(
            labels(&["a", "b"]),
            labels(&["p", "q", "s"]),
            array![
                [row_a[0], row_a[1], row_a[2]],
                [row_b[0], row_b[1], row_b[2]]
            ],
        )
        .unwrap();
        let s = similarity(&r, e).unwrap();
        assert_relative_eq!(s.get("a", "b").unwrap(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_similarity_nan_row_stays_nan() {
        let r = LabeledMatrix::from_parts(
            labels(&["arg", "hole"]),
            labels(&["p", "q"]),
            array![[2.0, 0.0], [f64::NAN, 1.0]],
        )
        .unwrap();
        let s = similarity(&r, 0.1).unwrap();
        assert!(s.values()[(1, 0)].is_nan());
        assert!(s.values()[(1, 1)].is_nan());
        assert_eq!(s.values()[(0, 0)], 1.0);
    }

    #[test]
    fn test_similarity_zero_variance_row_is_nan() {
        let r = LabeledMatrix::from_parts(
            labels(&["arg", "flat"]),
            labels(&["p", "q"]),
            array![[2.0, 0.0], [1.0, 1.0]],
        )
        .unwrap();
        let s = similarity(&r, 0.1).unwrap();
        assert!(s.values()[(0, 1)].is_nan());
        assert!(s.values()[(1, 1)].is_nan());
    }

    #[test]
    fn test_similarity_epsilon_must_be_positive() {
        let r = LabeledMatrix::from_parts(
            labels(&["arg"]),
            labels(&["p"]),
            array![[2.0]],
        )
        .unwrap();
        assert!(matches!(
            similarity(&r, 0.0),
            Err(ComplexityError::InvalidParameter { .. })
        ));
    }
}
