// Cross-space proximity and relatedness, Catalan et al. (2020)
//
// Same machinery as the product space, but between two activity
// vocabularies (e.g. patent areas and knowledge areas) observed over the
// same set of locations.

use ndarray::{Array2, Axis, Zip};

use crate::error::{ensure_cutoff, ComplexityError};
use crate::matrix::LabeledMatrix;
use crate::relatedness::density;

/// Calculates the Cross-proximity between two RCA matrices that share a
/// location axis but describe different characteristics.
///
/// For a pair (i from A, j from B) the two conditional probabilities
/// `count/k_B[j]` and `count/k_A[i]` are formed (zero prevalence gives 0,
/// not NaN) and the element-wise minimum is kept: the minimum conditional
/// probability semantics of the square proximity, on a rectangular matrix.
/// No diagonal adjustment is applied; the vocabularies generally differ.
///
/// The location label sets must be equal; rows of `rca_b` are reordered to
/// `rca_a`'s order before any computation.
pub fn cross_proximity(
    rca_a: &LabeledMatrix,
    rca_b: &LabeledMatrix,
    cutoff: f64,
) -> Result<LabeledMatrix, ComplexityError> {
    ensure_cutoff(cutoff)?;
    let rb = rca_b.align_rows_to(rca_a.row_labels(), "cross_proximity")?;

    let ma = rca_a.binarize(cutoff);
    let mb = rb.binarize(cutoff);

    // locations with advantage in both i (from A) and j (from B)
    let counts = ma.values().t().dot(mb.values());
    let ka = ma.values().sum_axis(Axis(0));
    let kb = mb.values().sum_axis(Axis(0));

    let mut phi = Array2::<f64>::zeros((ka.len(), kb.len()));
    Zip::indexed(&mut phi).par_for_each(|(i, j), cell| {
        let by_b = if kb[j] == 0.0 { 0.0 } else { counts[(i, j)] / kb[j] };
        let by_a = if ka[i] == 0.0 { 0.0 } else { counts[(i, j)] / ka[i] };
        *cell = by_b.min(by_a);
    });

    Ok(LabeledMatrix::from_validated(
        rca_a.col_labels().to_vec(),
        rca_b.col_labels().to_vec(),
        phi,
    ))
}

/// Calculates the Cross-relatedness: the average cross-proximity between a
/// location's holdings in characteristic A and each activity of
/// characteristic B.
///
/// Structurally the same density as [`crate::relatedness::relatedness`],
/// contracted against the rectangular cross-proximity matrix. Zero
/// cross-proximity columns yield NaN, preserved.
pub fn cross_relatedness(
    rca: &LabeledMatrix,
    x_proximity: &LabeledMatrix,
    cutoff: f64,
) -> Result<LabeledMatrix, ComplexityError> {
    ensure_cutoff(cutoff)?;
    let phi = x_proximity.align_rows_to(rca.col_labels(), "cross_relatedness")?;
    let m = rca.binarize(cutoff);
    let d = density(m.values(), phi.values());
    Ok(LabeledMatrix::from_validated(
        rca.row_labels().to_vec(),
        phi.col_labels().to_vec(),
        d,
    ))
}
