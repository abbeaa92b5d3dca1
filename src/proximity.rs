// Proximity network between activities, Hidalgo et al. (2007)

use ndarray::{Array2, Axis, Zip};
use serde::{Deserialize, Serialize};

use crate::error::{ensure_cutoff, ComplexityError};
use crate::matrix::LabeledMatrix;

/// Denominator used for the conditional co-occurrence probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Procedure {
    /// max(k_i, k_j): the minimum of the two conditional probabilities.
    #[default]
    Max,
    /// sqrt(k_i * k_j): geometric mean of the prevalences.
    Sqrt,
}

/// Calculates the Proximity index for a matrix of RCAs.
///
/// Proximity measures the minimum probability that a location has
/// comparative advantage in activity `i` given that it has advantage in
/// activity `j`. The result is a symmetric activity×activity matrix in
/// [0, 1] with the diagonal forced to zero; an activity is not proximate
/// to itself in this model. Pairs where neither activity is held anywhere
/// get proximity 0, not NaN.
pub fn proximity(
    rca: &LabeledMatrix,
    cutoff: f64,
    procedure: Procedure,
) -> Result<LabeledMatrix, ComplexityError> {
    ensure_cutoff(cutoff)?;
    let m = rca.binarize(cutoff);
    let mv = m.values();

    // number of locations with advantage in both i and j
    let counts = mv.t().dot(mv);
    // prevalence: number of locations with advantage in each activity
    let k = mv.sum_axis(Axis(0));

    let n = k.len();
    let mut phi = Array2::<f64>::zeros((n, n));
    Zip::indexed(&mut phi).par_for_each(|(i, j), cell| {
        let union = match procedure {
            Procedure::Max => k[i].max(k[j]),
            Procedure::Sqrt => (k[i] * k[j]).sqrt(),
        };
        *cell = if union == 0.0 {
            0.0
        } else {
            counts[(i, j)] / union
        };
    });
    phi.diag_mut().fill(0.0);

    Ok(LabeledMatrix::from_validated(
        rca.col_labels().to_vec(),
        rca.col_labels().to_vec(),
        phi,
    ))
}
