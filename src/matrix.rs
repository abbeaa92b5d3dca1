// Labeled dense matrices and vectors
//
// Every engine in this crate consumes and produces these. Rows are location
// identifiers, columns are activity identifiers; alignment between matrices
// is always by label, never by position. Missing data is IEEE NaN inside the
// dense storage so that BLAS-style products keep working; the cell accessors
// expose the nullable view as Option<f64>.

use std::collections::{HashMap, HashSet};

use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use crate::error::ComplexityError;

/// Dense two-dimensional f64 matrix with row and column labels.
///
/// Immutable after construction: every operation returns a new matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledMatrix {
    row_labels: Vec<String>,
    col_labels: Vec<String>,
    values: Array2<f64>,
}

/// One f64 value per label (an ECI/PCI vector, a per-location measure).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledVector {
    labels: Vec<String>,
    values: Array1<f64>,
}

/// Row/column labels removed by an all-NaN trim, reported back to the caller
/// so the computation never depends on log output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DroppedLabels {
    pub rows: Vec<String>,
    pub cols: Vec<String>,
}

impl DroppedLabels {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.cols.is_empty()
    }
}

fn check_unique(labels: &[String], axis: &'static str) -> Result<(), ComplexityError> {
    let mut seen = HashSet::with_capacity(labels.len());
    for label in labels {
        if !seen.insert(label.as_str()) {
            return Err(ComplexityError::DuplicateLabel {
                axis,
                label: label.clone(),
            });
        }
    }
    Ok(())
}

fn index_of<'a>(labels: &'a [String]) -> HashMap<&'a str, usize> {
    labels
        .iter()
        .enumerate()
        .map(|(i, l)| (l.as_str(), i))
        .collect()
}

impl LabeledMatrix {
    /// Builds a matrix from labels and dense values, validating that the
    /// dimensions agree and that no label repeats on either axis.
    pub fn from_parts(
        row_labels: Vec<String>,
        col_labels: Vec<String>,
        values: Array2<f64>,
    ) -> Result<Self, ComplexityError> {
        if values.nrows() != row_labels.len() || values.ncols() != col_labels.len() {
            return Err(ComplexityError::DimensionMismatch {
                value_rows: values.nrows(),
                value_cols: values.ncols(),
                label_rows: row_labels.len(),
                label_cols: col_labels.len(),
            });
        }
        check_unique(&row_labels, "row")?;
        check_unique(&col_labels, "column")?;
        Ok(LabeledMatrix {
            row_labels,
            col_labels,
            values,
        })
    }

    /// Internal constructor for outputs whose labels were already validated.
    pub(crate) fn from_validated(
        row_labels: Vec<String>,
        col_labels: Vec<String>,
        values: Array2<f64>,
    ) -> Self {
        debug_assert_eq!(values.nrows(), row_labels.len());
        debug_assert_eq!(values.ncols(), col_labels.len());
        LabeledMatrix {
            row_labels,
            col_labels,
            values,
        }
    }

    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    pub fn col_labels(&self) -> &[String] {
        &self.col_labels
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Cell accessor at the nullable boundary: `None` when either label is
    /// unknown or the cell holds NaN.
    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let r = self.row_labels.iter().position(|l| l == row)?;
        let c = self.col_labels.iter().position(|l| l == col)?;
        let v = self.values[(r, c)];
        if v.is_nan() {
            None
        } else {
            Some(v)
        }
    }

    /// Advantage mask: 1.0 where the cell is at or above the cutoff, 0.0
    /// otherwise. NaN cells binarize to 0 (no advantage).
    pub fn binarize(&self, cutoff: f64) -> LabeledMatrix {
        let values = self.values.mapv(|x| if x >= cutoff { 1.0 } else { 0.0 });
        LabeledMatrix::from_validated(self.row_labels.clone(), self.col_labels.clone(), values)
    }

    /// Replaces NaN cells with 0.0.
    pub(crate) fn fill_nan(&self) -> Array2<f64> {
        self.values.mapv(|x| if x.is_nan() { 0.0 } else { x })
    }

    fn all_nan_row_indices(&self) -> Vec<usize> {
        (0..self.nrows())
            .filter(|&r| self.values.row(r).iter().all(|v| v.is_nan()))
            .collect()
    }

    fn all_nan_col_indices(&self) -> Vec<usize> {
        (0..self.ncols())
            .filter(|&c| self.values.column(c).iter().all(|v| v.is_nan()))
            .collect()
    }

    /// Removes rows and columns that are entirely NaN, returning the trimmed
    /// matrix together with the labels that were dropped.
    pub fn drop_all_nan(&self) -> (LabeledMatrix, DroppedLabels) {
        let nan_rows = self.all_nan_row_indices();
        let nan_cols = self.all_nan_col_indices();
        if nan_rows.is_empty() && nan_cols.is_empty() {
            return (self.clone(), DroppedLabels::default());
        }
        let keep_rows: Vec<usize> = (0..self.nrows()).filter(|r| !nan_rows.contains(r)).collect();
        let keep_cols: Vec<usize> = (0..self.ncols()).filter(|c| !nan_cols.contains(c)).collect();
        let dropped = DroppedLabels {
            rows: nan_rows
                .iter()
                .map(|&r| self.row_labels[r].clone())
                .collect(),
            cols: nan_cols
                .iter()
                .map(|&c| self.col_labels[c].clone())
                .collect(),
        };
        let values = self
            .values
            .select(Axis(0), &keep_rows)
            .select(Axis(1), &keep_cols);
        let row_labels = keep_rows
            .iter()
            .map(|&r| self.row_labels[r].clone())
            .collect();
        let col_labels = keep_cols
            .iter()
            .map(|&c| self.col_labels[c].clone())
            .collect();
        (
            LabeledMatrix::from_validated(row_labels, col_labels, values),
            dropped,
        )
    }

    /// Drops activity columns that carry no data at all. Used by the
    /// product-measure index, which trims activities before zero-filling.
    pub(crate) fn drop_all_nan_cols(&self) -> LabeledMatrix {
        let nan_cols: HashSet<usize> = self.all_nan_col_indices().into_iter().collect();
        if nan_cols.is_empty() {
            return self.clone();
        }
        let keep: Vec<usize> = (0..self.ncols()).filter(|c| !nan_cols.contains(c)).collect();
        let values = self.values.select(Axis(1), &keep);
        let col_labels = keep.iter().map(|&c| self.col_labels[c].clone()).collect();
        LabeledMatrix::from_validated(self.row_labels.clone(), col_labels, values)
    }

    /// Reorders a square matrix so both axes follow `labels`. The label sets
    /// must be exactly equal; anything else is a fatal alignment error.
    pub(crate) fn align_square_to(
        &self,
        labels: &[String],
        context: &'static str,
    ) -> Result<LabeledMatrix, ComplexityError> {
        let rows = self.reorder_axis(Axis(0), &self.row_labels, labels, context, "activity")?;
        rows.reorder_axis_owned(Axis(1), labels, context, "activity")
    }

    /// Reorders rows to follow `labels`; the row label set must equal the
    /// target set.
    pub(crate) fn align_rows_to(
        &self,
        labels: &[String],
        context: &'static str,
    ) -> Result<LabeledMatrix, ComplexityError> {
        self.reorder_axis(Axis(0), &self.row_labels, labels, context, "location")
    }

    fn reorder_axis(
        &self,
        axis: Axis,
        current: &[String],
        target: &[String],
        context: &'static str,
        axis_name: &'static str,
    ) -> Result<LabeledMatrix, ComplexityError> {
        if current.len() != target.len() {
            return Err(ComplexityError::LabelMismatch {
                context,
                axis: axis_name,
                detail: format!("expected {} labels, found {}", target.len(), current.len()),
            });
        }
        let lookup = index_of(current);
        let mut indices = Vec::with_capacity(target.len());
        for label in target {
            match lookup.get(label.as_str()) {
                Some(&i) => indices.push(i),
                None => {
                    return Err(ComplexityError::LabelMismatch {
                        context,
                        axis: axis_name,
                        detail: format!("label `{label}` is missing"),
                    })
                }
            }
        }
        let values = self.values.select(axis, &indices);
        let (row_labels, col_labels) = match axis {
            Axis(0) => (target.to_vec(), self.col_labels.clone()),
            _ => (self.row_labels.clone(), target.to_vec()),
        };
        Ok(LabeledMatrix::from_validated(row_labels, col_labels, values))
    }

    fn reorder_axis_owned(
        self,
        axis: Axis,
        target: &[String],
        context: &'static str,
        axis_name: &'static str,
    ) -> Result<LabeledMatrix, ComplexityError> {
        let current = match axis {
            Axis(0) => self.row_labels.clone(),
            _ => self.col_labels.clone(),
        };
        self.reorder_axis(axis, &current, target, context, axis_name)
    }

    /// Selects a sub-matrix by label on both axes. Every requested label must
    /// exist; callers pass labels obtained from an intersection step.
    pub(crate) fn select_labels(
        &self,
        rows: &[String],
        cols: &[String],
        context: &'static str,
    ) -> Result<LabeledMatrix, ComplexityError> {
        let row_lookup = index_of(&self.row_labels);
        let col_lookup = index_of(&self.col_labels);
        let mut row_idx = Vec::with_capacity(rows.len());
        for label in rows {
            match row_lookup.get(label.as_str()) {
                Some(&i) => row_idx.push(i),
                None => {
                    return Err(ComplexityError::LabelMismatch {
                        context,
                        axis: "location",
                        detail: format!("label `{label}` is missing"),
                    })
                }
            }
        }
        let mut col_idx = Vec::with_capacity(cols.len());
        for label in cols {
            match col_lookup.get(label.as_str()) {
                Some(&i) => col_idx.push(i),
                None => {
                    return Err(ComplexityError::LabelMismatch {
                        context,
                        axis: "activity",
                        detail: format!("label `{label}` is missing"),
                    })
                }
            }
        }
        let values = self
            .values
            .select(Axis(0), &row_idx)
            .select(Axis(1), &col_idx);
        Ok(LabeledMatrix::from_validated(
            rows.to_vec(),
            cols.to_vec(),
            values,
        ))
    }
}

impl LabeledVector {
    pub fn from_parts(labels: Vec<String>, values: Array1<f64>) -> Result<Self, ComplexityError> {
        if values.len() != labels.len() {
            return Err(ComplexityError::VectorDimensionMismatch {
                value_len: values.len(),
                label_len: labels.len(),
            });
        }
        check_unique(&labels, "vector")?;
        Ok(LabeledVector { labels, values })
    }

    pub(crate) fn from_validated(labels: Vec<String>, values: Array1<f64>) -> Self {
        debug_assert_eq!(values.len(), labels.len());
        LabeledVector { labels, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    /// `None` when the label is unknown or the entry holds NaN.
    pub fn get(&self, label: &str) -> Option<f64> {
        let i = self.labels.iter().position(|l| l == label)?;
        let v = self.values[i];
        if v.is_nan() {
            None
        } else {
            Some(v)
        }
    }

    /// Reorders the vector to follow `labels`; label sets must be equal.
    pub(crate) fn align_to(
        &self,
        labels: &[String],
        context: &'static str,
    ) -> Result<LabeledVector, ComplexityError> {
        if self.labels.len() != labels.len() {
            return Err(ComplexityError::LabelMismatch {
                context,
                axis: "activity",
                detail: format!("expected {} labels, found {}", labels.len(), self.labels.len()),
            });
        }
        let lookup = index_of(&self.labels);
        let mut values = Array1::zeros(labels.len());
        for (slot, label) in labels.iter().enumerate() {
            match lookup.get(label.as_str()) {
                Some(&i) => values[slot] = self.values[i],
                None => {
                    return Err(ComplexityError::LabelMismatch {
                        context,
                        axis: "activity",
                        detail: format!("label `{label}` is missing"),
                    })
                }
            }
        }
        Ok(LabeledVector::from_validated(labels.to_vec(), values))
    }

    /// Selects a sub-vector by label; every requested label must exist.
    pub(crate) fn select_labels(
        &self,
        labels: &[String],
        context: &'static str,
    ) -> Result<LabeledVector, ComplexityError> {
        let lookup = index_of(&self.labels);
        let mut values = Array1::zeros(labels.len());
        for (slot, label) in labels.iter().enumerate() {
            match lookup.get(label.as_str()) {
                Some(&i) => values[slot] = self.values[i],
                None => {
                    return Err(ComplexityError::LabelMismatch {
                        context,
                        axis: "location",
                        detail: format!("label `{label}` is missing"),
                    })
                }
            }
        }
        Ok(LabeledVector::from_validated(labels.to_vec(), values))
    }

    /// Z-score standardization with sample (n-1) standard deviation.
    pub fn standardized(&self) -> LabeledVector {
        LabeledVector::from_validated(self.labels.clone(), standardize(&self.values))
    }
}

/// Sorted intersection of two label slices.
pub(crate) fn intersect_sorted(a: &[String], b: &[String]) -> Vec<String> {
    let set: HashSet<&str> = b.iter().map(String::as_str).collect();
    let mut common: Vec<String> = a
        .iter()
        .filter(|l| set.contains(l.as_str()))
        .cloned()
        .collect();
    common.sort();
    common
}

// ---
// NUMERIC HELPERS
// ---

/// Plain mean; NaN entries propagate.
pub(crate) fn mean(v: ArrayView1<'_, f64>) -> f64 {
    v.sum() / v.len() as f64
}

/// Sample standard deviation (n-1 denominator); NaN when fewer than two
/// entries.
pub(crate) fn sample_std(v: ArrayView1<'_, f64>, mean: f64) -> f64 {
    let n = v.len();
    if n < 2 {
        return f64::NAN;
    }
    let ss: f64 = v.iter().map(|x| (x - mean) * (x - mean)).sum();
    (ss / (n - 1) as f64).sqrt()
}

/// Z-score over the whole vector. A constant vector standardizes to NaN
/// (zero deviation), which is preserved.
pub(crate) fn standardize(v: &Array1<f64>) -> Array1<f64> {
    let m = mean(v.view());
    let s = sample_std(v.view(), m);
    v.mapv(|x| (x - m) / s)
}

/// NaN-skipping mean; NaN when no finite entries remain.
pub(crate) fn nan_mean(v: ArrayView1<'_, f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for &x in v.iter() {
        if !x.is_nan() {
            sum += x;
            count += 1;
        }
    }
    sum / count as f64
}

/// NaN-skipping sample standard deviation (n-1); NaN when fewer than two
/// finite entries.
pub(crate) fn nan_sample_std(v: ArrayView1<'_, f64>, mean: f64) -> f64 {
    let mut ss = 0.0;
    let mut count = 0usize;
    for &x in v.iter() {
        if !x.is_nan() {
            ss += (x - mean) * (x - mean);
            count += 1;
        }
    }
    if count < 2 {
        return f64::NAN;
    }
    (ss / (count - 1) as f64).sqrt()
}

#[cfg(test)]
pub(crate) fn labels(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}
