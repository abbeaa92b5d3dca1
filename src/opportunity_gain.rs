// Opportunity gain: complexity-weighted value of the activities a location
// could reach, net of the relative value it would forgo.

use ndarray::Axis;

use crate::error::{ensure_cutoff, ComplexityError};
use crate::matrix::{LabeledMatrix, LabeledVector};
use crate::proximity::{proximity, Procedure};
use crate::relatedness::density;

/// Calculates the opportunity gain for every location×activity cell: the
/// expected PCI-weighted benefit of entering activities not yet held,
/// relative to how this affects the standing of the others.
///
/// The PCI vector must cover exactly the activities of the RCA matrix.
/// When `proximities` is not supplied it is computed with the same cutoff
/// and the `Max` procedure.
pub fn opportunity_gain(
    rca: &LabeledMatrix,
    pci: &LabeledVector,
    cutoff: f64,
    proximities: Option<&LabeledMatrix>,
) -> Result<LabeledMatrix, ComplexityError> {
    ensure_cutoff(cutoff)?;
    let phi = match proximities {
        Some(p) => p.align_square_to(rca.col_labels(), "opportunity_gain")?,
        None => proximity(rca, cutoff, Procedure::Max)?,
    };
    let pci = pci.align_to(rca.col_labels(), "opportunity_gain")?;

    let m = rca.binarize(cutoff);
    // flips the 0/1 advantage pattern
    let inverse = m.values().mapv(|x| 1.0 - x);

    // each activity's proximity column as ratios of its total mass
    let col_sums = phi.values().sum_axis(Axis(0));
    let prox_ratio = phi.values() / &col_sums;

    let middle = &inverse * pci.values();

    // density over the inverted advantage pattern
    let dcp = density(&inverse, phi.values()).mapv(|x| 1.0 - x);
    let right = &dcp * pci.values();

    let gain = middle.dot(&prox_ratio) - right;
    Ok(LabeledMatrix::from_validated(
        rca.row_labels().to_vec(),
        rca.col_labels().to_vec(),
        gain,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complexity::{complexity, ComplexityOptions};
    use crate::matrix::labels;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn fixture() -> LabeledMatrix {
        LabeledMatrix::from_parts(
            labels(&["arg", "bra", "chl", "per"]),
            labels(&["p", "q", "s"]),
            array![
                [1.5, 1.2, 0.0],
                [2.0, 0.3, 0.1],
                [1.1, 1.4, 3.0],
                [0.2, 1.6, 1.1]
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_opportunity_gain_shape_and_labels() {
        let r = fixture();
        let indices = complexity(&r, &ComplexityOptions::default()).unwrap();
        let gain = opportunity_gain(&r, &indices.pci, 1.0, None).unwrap();
        assert_eq!(gain.nrows(), 4);
        assert_eq!(gain.ncols(), 3);
        assert_eq!(gain.row_labels(), r.row_labels());
        assert_eq!(gain.col_labels(), r.col_labels());
    }

    #[test]
    fn test_opportunity_gain_matches_direct_formula() {
        let r = fixture();
        let phi = proximity(&r, 1.0, Procedure::Max).unwrap();
        let pci = LabeledVector::from_parts(labels(&["p", "q", "s"]), array![-0.5, 0.25, 1.5])
            .unwrap();
        let gain = opportunity_gain(&r, &pci, 1.0, Some(&phi)).unwrap();

        let m = r.binarize(1.0);
        let n_loc = m.nrows();
        let n_act = m.ncols();
        let pv = phi.values();
        let col_sums = pv.sum_axis(Axis(0));
        for l in 0..n_loc {
            for a in 0..n_act {
                // middle · prox_ratio contraction by hand
                let mut left = 0.0;
                for b in 0..n_act {
                    let inv = 1.0 - m.values()[(l, b)];
                    left += inv * pci.values()[b] * pv[(b, a)] / col_sums[a];
                }
                // right: complement density of the inverted pattern
                let mut numer = 0.0;
                for b in 0..n_act {
                    numer += (1.0 - m.values()[(l, b)]) * pv[(b, a)];
                }
                let dcp = 1.0 - numer / col_sums[a];
                let expected = left - dcp * pci.values()[a];
                assert_relative_eq!(gain.values()[(l, a)], expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_opportunity_gain_accepts_shuffled_pci() {
        let r = fixture();
        let pci = LabeledVector::from_parts(labels(&["p", "q", "s"]), array![-0.5, 0.25, 1.5])
            .unwrap();
        let shuffled =
            LabeledVector::from_parts(labels(&["s", "p", "q"]), array![1.5, -0.5, 0.25]).unwrap();
        let a = opportunity_gain(&r, &pci, 1.0, None).unwrap();
        let b = opportunity_gain(&r, &shuffled, 1.0, None).unwrap();
        for (x, y) in a.values().iter().zip(b.values().iter()) {
            assert_relative_eq!(x, y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_opportunity_gain_rejects_incomplete_pci() {
        let r = fixture();
        let pci = LabeledVector::from_parts(labels(&["p", "q"]), array![-0.5, 0.25]).unwrap();
        assert!(matches!(
            opportunity_gain(&r, &pci, 1.0, None),
            Err(ComplexityError::LabelMismatch { .. })
        ));
    }
}
