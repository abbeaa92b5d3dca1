// Relatedness density over the proximity network, Hidalgo et al. (2018)

use ndarray::{Array2, Axis};

use crate::error::{ensure_cutoff, ComplexityError};
use crate::matrix::{nan_mean, nan_sample_std, LabeledMatrix};
use crate::proximity::{proximity, Procedure};

/// Density kernel shared by relatedness and the cross-space variant:
/// weighted share of proximate activities already present, given an
/// advantage mask and a proximity matrix.
///
/// The denominator is the proximity column sum, identical for every
/// location. A zero proximity column yields NaN density, an undefined
/// value that must be preserved.
pub(crate) fn density(m: &Array2<f64>, phi: &Array2<f64>) -> Array2<f64> {
    let numerator = m.dot(phi);
    let denominator = phi.sum_axis(Axis(0));
    &numerator / &denominator
}

fn resolve_proximities(
    rca: &LabeledMatrix,
    proximities: Option<&LabeledMatrix>,
    cutoff: f64,
    context: &'static str,
) -> Result<LabeledMatrix, ComplexityError> {
    match proximities {
        Some(phi) => phi.align_square_to(rca.col_labels(), context),
        None => proximity(rca, cutoff, Procedure::Max),
    }
}

/// Calculates the Relatedness between every location and every activity.
///
/// The probability that a location enters an economic activity grows with
/// the number of related activities already present there, the Principle
/// of Relatedness (Hidalgo et al. 2018). Each cell is the proximity-weighted
/// share of activities the location already holds advantage in.
///
/// When `proximities` is not supplied it is computed from `rca` with the
/// same cutoff and the `Max` procedure. A supplied matrix is aligned to the
/// RCA activity labels first; a mismatched label set is a fatal error.
pub fn relatedness(
    rca: &LabeledMatrix,
    proximities: Option<&LabeledMatrix>,
    cutoff: f64,
) -> Result<LabeledMatrix, ComplexityError> {
    ensure_cutoff(cutoff)?;
    let phi = resolve_proximities(rca, proximities, cutoff, "relatedness")?;
    let m = rca.binarize(cutoff);
    let d = density(m.values(), phi.values());
    Ok(LabeledMatrix::from_validated(
        rca.row_labels().to_vec(),
        rca.col_labels().to_vec(),
        d,
    ))
}

/// Distance is the pure complement of relatedness: `1 - D`, with identical
/// NaN propagation.
pub fn distance(
    rca: &LabeledMatrix,
    proximities: Option<&LabeledMatrix>,
    cutoff: f64,
) -> Result<LabeledMatrix, ComplexityError> {
    let d = relatedness(rca, proximities, cutoff)?;
    let values = d.values().mapv(|x| 1.0 - x);
    Ok(LabeledMatrix::from_validated(
        d.row_labels().to_vec(),
        d.col_labels().to_vec(),
        values,
    ))
}

/// Calculates the Relative Relatedness: each location's relatedness row
/// standardized against the mean and deviation of its *unheld* activities.
///
/// Cells at or above the cutoff are masked out of the row statistics, so
/// the z-score expresses how related an activity is compared to the other
/// activities the location could still enter. With `cutoff = 0` nothing is
/// masked. Statistics skip NaN and use the sample (n-1) deviation.
pub fn relative_relatedness(
    rca: &LabeledMatrix,
    proximities: Option<&LabeledMatrix>,
    cutoff: f64,
) -> Result<LabeledMatrix, ComplexityError> {
    ensure_cutoff(cutoff)?;
    let wcp = relatedness(rca, proximities, cutoff)?;

    let mask = if cutoff == 0.0 {
        Array2::ones(rca.values().dim())
    } else {
        rca.values().mapv(|x| if x < cutoff { 1.0 } else { f64::NAN })
    };
    let masked = wcp.values() * &mask;

    let mut out = Array2::zeros(wcp.values().dim());
    for (l, row) in masked.axis_iter(Axis(0)).enumerate() {
        let m = nan_mean(row);
        let s = nan_sample_std(row, m);
        for a in 0..out.ncols() {
            out[(l, a)] = (wcp.values()[(l, a)] - m) / s;
        }
    }
    Ok(LabeledMatrix::from_validated(
        wcp.row_labels().to_vec(),
        wcp.col_labels().to_vec(),
        out,
    ))
}
