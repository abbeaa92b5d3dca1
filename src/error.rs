// Error taxonomy for the complexity engines
//
// Shape and parameter problems are fatal and surface before any computation
// starts. Data-sparsity problems (empty rows, zero denominators) never error:
// they propagate as NaN through the result matrices.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComplexityError {
    #[error("value matrix is {value_rows}x{value_cols} but labels describe {label_rows}x{label_cols}")]
    DimensionMismatch {
        value_rows: usize,
        value_cols: usize,
        label_rows: usize,
        label_cols: usize,
    },

    #[error("value vector has {value_len} entries but {label_len} labels")]
    VectorDimensionMismatch { value_len: usize, label_len: usize },

    #[error("duplicate {axis} label: {label}")]
    DuplicateLabel { axis: &'static str, label: String },

    #[error("{context}: {axis} labels are not aligned: {detail}")]
    LabelMismatch {
        context: &'static str,
        axis: &'static str,
        detail: String,
    },

    #[error("{context}: no common {axis} labels between inputs")]
    DisjointLabels {
        context: &'static str,
        axis: &'static str,
    },

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Binarization cutoffs must be finite and non-negative.
pub(crate) fn ensure_cutoff(cutoff: f64) -> Result<(), ComplexityError> {
    if !cutoff.is_finite() || cutoff < 0.0 {
        return Err(ComplexityError::InvalidParameter {
            name: "cutoff",
            reason: format!("must be finite and >= 0, got {cutoff}"),
        });
    }
    Ok(())
}

pub(crate) fn ensure_iterations(iterations: usize) -> Result<(), ComplexityError> {
    if iterations == 0 {
        return Err(ComplexityError::InvalidParameter {
            name: "iterations",
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(())
}

pub(crate) fn ensure_epsilon(epsilon: f64) -> Result<(), ComplexityError> {
    if !epsilon.is_finite() || epsilon <= 0.0 {
        return Err(ComplexityError::InvalidParameter {
            name: "epsilon",
            reason: format!("must be finite and > 0, got {epsilon}"),
        });
    }
    Ok(())
}
