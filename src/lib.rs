//! Economic Complexity metrics over labeled location×activity matrices.
//!
//! The pipeline flows strictly forward from a raw value matrix:
//!
//! ```text
//! values -> rca -> proximity -> relatedness / distance
//!             |         |             |
//!             |         +-> opportunity_gain (needs pci)
//!             +-> complexity (eci, pci) / complexity_subnational
//!             +-> cross_proximity -> cross_relatedness
//!             +-> product_measure_index (pgi, peii)
//!             +-> similarity
//! ```
//!
//! Every function is pure and deterministic; nothing is mutated in place.
//! Matrices and vectors carry their label sets, and combination across
//! differently-sourced inputs always aligns by label, never by position.
//! Division by zero from empty rows, empty columns, or zero proximity mass
//! propagates as NaN; "no data" is kept distinct from a definite zero.
//! Shape and parameter problems error out before any computation starts.

pub mod complexity;
pub mod cross_space;
pub mod error;
pub mod matrix;
pub mod opportunity_gain;
pub mod product_measure;
pub mod proximity;
pub mod rca;
pub mod relatedness;
pub mod similarity;

pub use crate::complexity::{
    complexity, complexity_subnational, ComplexityIndices, ComplexityOptions,
};
pub use crate::cross_space::{cross_proximity, cross_relatedness};
pub use crate::error::ComplexityError;
pub use crate::matrix::{DroppedLabels, LabeledMatrix, LabeledVector};
pub use crate::opportunity_gain::opportunity_gain;
pub use crate::product_measure::{peii, pgi, product_measure_index};
pub use crate::proximity::{proximity, Procedure};
pub use crate::rca::rca;
pub use crate::relatedness::{distance, relatedness, relative_relatedness};
pub use crate::similarity::similarity;

/// Parity threshold: a location holds advantage in an activity when its
/// RCA reaches this value.
pub const DEFAULT_CUTOFF: f64 = 1.0;

/// Default iteration limit for the method of reflections.
pub const DEFAULT_ITERATIONS: usize = 20;

/// Default epsilon added before the logarithm in the similarity index.
pub const DEFAULT_EPSILON: f64 = 0.1;
