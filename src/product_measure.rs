// Product-measure index: export-share-weighted average of a per-location
// measure across the locations holding advantage in each activity.
// Generalizes the Product Gini Index and the Product Emissions Intensity
// Index.

use ndarray::Axis;

use crate::error::{ensure_cutoff, ComplexityError};
use crate::matrix::{intersect_sorted, LabeledMatrix, LabeledVector};

/// Calculates the Product-measure Index for a pivoted value matrix, its RCA
/// matrix, and one measure value per location (a Gini coefficient, an
/// emissions intensity, ...).
///
/// Activities with no export data at all are dropped; remaining missing
/// values are treated as zero. The three inputs are aligned to their common
/// location set, sorted ascending by label; an empty intersection is a
/// fatal error. Activities whose advantage mass is zero (no location holds
/// them) get NaN, preserved.
pub fn product_measure_index(
    values: &LabeledMatrix,
    rca: &LabeledMatrix,
    measure: &LabeledVector,
    cutoff: f64,
) -> Result<LabeledVector, ComplexityError> {
    ensure_cutoff(cutoff)?;

    let v = values.drop_all_nan_cols();

    let common_geo = {
        let vm = intersect_sorted(v.row_labels(), measure.labels());
        intersect_sorted(&vm, rca.row_labels())
    };
    if common_geo.is_empty() {
        return Err(ComplexityError::DisjointLabels {
            context: "product_measure_index",
            axis: "location",
        });
    }
    let common_act: Vec<String> = {
        let rca_set: std::collections::HashSet<&str> =
            rca.col_labels().iter().map(String::as_str).collect();
        v.col_labels()
            .iter()
            .filter(|l| rca_set.contains(l.as_str()))
            .cloned()
            .collect()
    };
    if common_act.is_empty() {
        return Err(ComplexityError::DisjointLabels {
            context: "product_measure_index",
            axis: "activity",
        });
    }

    let v = v.select_labels(&common_geo, &common_act, "product_measure_index")?;
    let r = rca.select_labels(&common_geo, &common_act, "product_measure_index")?;
    let meas = measure.select_labels(&common_geo, "product_measure_index")?;

    let vv = v.fill_nan();
    let m = r.binarize(cutoff);
    let measure_filled = meas.values().mapv(|x| if x.is_nan() { 0.0 } else { x });

    // each location's export share per activity
    let row_sums = vv.sum_axis(Axis(1));
    let shares = &vv / &row_sums.insert_axis(Axis(1));

    let weighted = m.values() * &shares;
    let norm = weighted.sum_axis(Axis(0));
    let numerator = weighted.t().dot(&measure_filled);
    let index = &numerator / &norm;

    Ok(LabeledVector::from_validated(common_act, index))
}

/// Product Gini Index: the product-measure index applied to per-location
/// Gini coefficients.
pub fn pgi(
    values: &LabeledMatrix,
    rca: &LabeledMatrix,
    gini: &LabeledVector,
    cutoff: f64,
) -> Result<LabeledVector, ComplexityError> {
    product_measure_index(values, rca, gini, cutoff)
}

/// Product Emissions Intensity Index: the product-measure index applied to
/// per-location emissions intensities.
pub fn peii(
    values: &LabeledMatrix,
    rca: &LabeledMatrix,
    emissions: &LabeledVector,
    cutoff: f64,
) -> Result<LabeledVector, ComplexityError> {
    product_measure_index(values, rca, emissions, cutoff)
}
