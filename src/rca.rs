// Revealed Comparative Advantage, Balassa (1965)

use ndarray::Axis;

use crate::matrix::LabeledMatrix;

/// Calculates the Revealed Comparative Advantage matrix for a pivoted
/// location×activity value matrix.
///
/// Each cell is the location's share of its own basket devoted to an
/// activity, divided by the activity's share of the grand total
/// (Hidalgo et al. 2007). Missing cells are treated as zero value before
/// any ratio is computed. Locations with an empty basket, activities with
/// no value anywhere, or an all-zero matrix produce NaN cells: "no data"
/// is not the same as "no advantage", and downstream binarization treats
/// NaN as no advantage.
///
/// The input must cover a single period; the index is always a geographic
/// level.
pub fn rca(values: &LabeledMatrix) -> LabeledMatrix {
    let v = values.fill_nan();

    let row_sums = v.sum_axis(Axis(1));
    let col_sums = v.sum_axis(Axis(0));
    let total = row_sums.sum();

    // location share of its own basket
    let shares = &v / &row_sums.insert_axis(Axis(1));
    // activity share of the world total
    let global = col_sums / total;

    let ratios = &shares / &global;
    LabeledMatrix::from_validated(
        values.row_labels().to_vec(),
        values.col_labels().to_vec(),
        ratios,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::labels;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn simple_values() -> LabeledMatrix {
        LabeledMatrix::from_parts(
            labels(&["arg", "bra", "chl"]),
            labels(&["wine", "copper"]),
            array![[10.0, 0.0], [0.0, 10.0], [5.0, 5.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_rca_small_fixture() {
        let r = rca(&simple_values());
        // row sums are all 10, both activity shares are 1/2, so each cell
        // is value / 5
        assert_relative_eq!(r.get("arg", "wine").unwrap(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(r.get("arg", "copper").unwrap(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(r.get("chl", "wine").unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(r.get("chl", "copper").unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rca_scale_invariance() {
        let v = simple_values();
        let scaled = LabeledMatrix::from_parts(
            v.row_labels().to_vec(),
            v.col_labels().to_vec(),
            v.values() * 73.0,
        )
        .unwrap();
        let r = rca(&v);
        let r_scaled = rca(&scaled);
        for (a, b) in r.values().iter().zip(r_scaled.values().iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_rca_missing_cells_are_zero_value() {
        let v = LabeledMatrix::from_parts(
            labels(&["arg", "bra"]),
            labels(&["wine", "copper"]),
            array![[10.0, f64::NAN], [5.0, 5.0]],
        )
        .unwrap();
        let r = rca(&v);
        // NaN cell counts as zero value, so arg is fully specialized in wine
        assert_relative_eq!(r.get("arg", "copper").unwrap(), 0.0, epsilon = 1e-12);
        assert!(r.get("arg", "wine").unwrap() > 1.0);
    }

    #[test]
    fn test_rca_empty_row_yields_nan() {
        let v = LabeledMatrix::from_parts(
            labels(&["arg", "bra"]),
            labels(&["wine", "copper"]),
            array![[0.0, 0.0], [5.0, 5.0]],
        )
        .unwrap();
        let r = rca(&v);
        assert!(r.values()[(0, 0)].is_nan());
        assert!(r.values()[(0, 1)].is_nan());
        assert!(r.get("bra", "wine").is_some());
    }

    #[test]
    fn test_rca_empty_column_yields_nan() {
        let v = LabeledMatrix::from_parts(
            labels(&["arg", "bra"]),
            labels(&["wine", "copper"]),
            array![[10.0, 0.0], [5.0, 0.0]],
        )
        .unwrap();
        let r = rca(&v);
        assert!(r.values()[(0, 1)].is_nan());
        assert!(r.values()[(1, 1)].is_nan());
    }

    #[test]
    fn test_rca_all_zero_matrix_is_all_nan() {
        let v = LabeledMatrix::from_parts(
            labels(&["arg"]),
            labels(&["wine"]),
            array![[0.0]],
        )
        .unwrap();
        let r = rca(&v);
        assert!(r.values()[(0, 0)].is_nan());
    }
}
