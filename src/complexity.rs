// Method of reflections, Hidalgo & Hausmann (2009)
//
// Alternating normalization over the bipartite location-activity network.
// The iteration is a fold over immutable (kc, kp) snapshots. The asymmetric
// stopping rule (kp always advanced one step further than kc) is part of
// the transition function, not an artifact of loop bounds.

use std::collections::HashMap;

use ndarray::{Array1, Array2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_cutoff, ensure_iterations, ComplexityError};
use crate::matrix::{standardize, DroppedLabels, LabeledMatrix, LabeledVector};

/// Parameters for the reflections computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplexityOptions {
    /// Binarization threshold for the RCA matrix.
    pub cutoff: f64,
    /// Limit of recursive calculations for kp and kc.
    pub iterations: usize,
    /// Remove rows/columns that are entirely NaN in the input before
    /// computing. When false they are passed through and their NaN
    /// poisons the final standardization.
    pub drop: bool,
}

impl Default for ComplexityOptions {
    fn default() -> Self {
        ComplexityOptions {
            cutoff: 1.0,
            iterations: 20,
            drop: true,
        }
    }
}

/// Standardized complexity vectors plus the labels removed by the all-NaN
/// trim (empty when the input was dense).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplexityIndices {
    /// Economic Complexity Index, one value per location.
    pub eci: LabeledVector,
    /// Product Complexity Index, one value per activity.
    pub pci: LabeledVector,
    /// Degenerate rows/columns detected in the input.
    pub dropped: DroppedLabels,
}

#[derive(Debug, Clone)]
struct ReflectionState {
    kc: Array1<f64>,
    kp: Array1<f64>,
}

/// One reflection: kp advances from the previous kc, and kc advances from
/// the previous kp only while `advance_kc` holds. The final iteration
/// advances kp alone, leaving kc at its second-to-last iterate; an extra kc
/// step would collapse both vectors toward the trivial constant solution.
fn reflection_step(
    m: &Array2<f64>,
    kc0: &Array1<f64>,
    kp0: &Array1<f64>,
    prev: &ReflectionState,
    advance_kc: bool,
) -> ReflectionState {
    let kp = &m.t().dot(&prev.kc) / kp0;
    let kc = if advance_kc {
        &m.dot(&prev.kp) / kc0
    } else {
        prev.kc.clone()
    };
    ReflectionState { kc, kp }
}

/// Calculates the Economic Complexity Index (ECI) and Product Complexity
/// Index (PCI) from an RCA matrix by the method of reflections.
///
/// Diversity `kc0` (activities per location) and ubiquity `kp0` (locations
/// per activity) of the binarized matrix are the fixed normalizers for
/// every iteration. After `iterations - 1` updates to kp and
/// `iterations - 2` to kc, both vectors are z-scored with the sample (n-1)
/// deviation.
///
/// Rows or columns that are entirely NaN in the input contribute no
/// information and would corrupt the means used in standardization; they
/// are reported in the result (and as a `tracing` warning), and removed
/// when `options.drop` is set.
pub fn complexity(
    rca: &LabeledMatrix,
    options: &ComplexityOptions,
) -> Result<ComplexityIndices, ComplexityError> {
    ensure_cutoff(options.cutoff)?;
    ensure_iterations(options.iterations)?;

    let (trimmed, dropped) = rca.drop_all_nan();
    if !dropped.is_empty() {
        tracing::warn!(
            dropped_rows = dropped.rows.len(),
            dropped_cols = dropped.cols.len(),
            "RCA matrix contains rows or columns that are entirely NaN"
        );
    }
    let work = if options.drop { trimmed } else { rca.clone() };

    let m = work.binarize(options.cutoff);
    let mv = m.values();
    let kc0 = mv.sum_axis(Axis(1)); // diversity
    let kp0 = mv.sum_axis(Axis(0)); // ubiquity

    let mut state = ReflectionState {
        kc: kc0.clone(),
        kp: kp0.clone(),
    };
    for n in 1..options.iterations {
        state = reflection_step(mv, &kc0, &kp0, &state, n < options.iterations - 1);
    }

    Ok(ComplexityIndices {
        eci: LabeledVector::from_validated(work.row_labels().to_vec(), standardize(&state.kc)),
        pci: LabeledVector::from_validated(work.col_labels().to_vec(), standardize(&state.kp)),
        dropped,
    })
}

/// Calculates the ECI for a subnational RCA matrix against an externally
/// computed PCI (the "external method").
///
/// Each location's ECI is the plain mean of the external PCI over the
/// activities it holds at or above the cutoff. Activities missing from the
/// external index are excluded from the mean, not treated as zero. A
/// location with no eligible activities gets NaN, never 0. The ECI vector
/// is standardized only on request; the external PCI is returned untouched.
pub fn complexity_subnational(
    rca: &LabeledMatrix,
    pci_external: &LabeledVector,
    cutoff: f64,
    standardize_eci: bool,
) -> Result<(LabeledVector, LabeledVector), ComplexityError> {
    ensure_cutoff(cutoff)?;

    let (work, _dropped) = rca.drop_all_nan();
    let m = work.binarize(cutoff);
    let mv = m.values();

    let pci_lookup: HashMap<&str, f64> = pci_external
        .labels()
        .iter()
        .map(String::as_str)
        .zip(pci_external.values().iter().copied())
        .collect();
    let col_pci: Vec<Option<f64>> = work
        .col_labels()
        .iter()
        .map(|l| pci_lookup.get(l.as_str()).copied())
        .collect();

    let eci_values: Vec<f64> = (0..mv.nrows())
        .into_par_iter()
        .map(|l| {
            let mut sum = 0.0;
            let mut count = 0usize;
            for (a, pci) in col_pci.iter().enumerate() {
                if mv[(l, a)] != 0.0 {
                    if let Some(p) = pci {
                        sum += p;
                        count += 1;
                    }
                }
            }
            if count == 0 {
                f64::NAN
            } else {
                sum / count as f64
            }
        })
        .collect();

    let mut eci = LabeledVector::from_validated(work.row_labels().to_vec(), Array1::from(eci_values));
    if standardize_eci {
        eci = eci.standardized();
    }
    Ok((eci, pci_external.clone()))
}
