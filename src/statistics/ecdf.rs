//! Empirical CDF construction on a shared RT grid.
//!
//! The ECDF of a sample of size n is the step function rank/n at each sorted
//! observation. For cross-modality and cross-participant comparison the step
//! function is linearly interpolated onto a caller-supplied [`RtGrid`],
//! with the standard extension outside the sample's range: 0 below the
//! minimum, 1 at and above the maximum.

use crate::constants::MIN_TRIALS_PER_MODALITY;
use crate::grid::RtGrid;

/// An empirical CDF evaluated on an RT grid.
///
/// Values are aligned 1:1 with the grid that built them, monotonically
/// non-decreasing, and bounded in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct Ecdf {
    values: Vec<f64>,
}

impl Ecdf {
    /// The cumulative probabilities, one per grid point.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of grid points the curve is evaluated on.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the curve has no points.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Wrap an already-computed curve. Used by the violation calculator when
    /// averaging per-participant curves; the invariants (grid alignment,
    /// monotonicity) are the caller's to uphold.
    pub(crate) fn from_values(values: Vec<f64>) -> Ecdf {
        Ecdf { values }
    }
}

impl std::ops::Index<usize> for Ecdf {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.values[i]
    }
}

/// Compute the empirical CDF of `rts` interpolated onto `grid`.
///
/// Sorts the sample, assigns rank `(i+1)/n` to the i-th sorted value, and
/// linearly interpolates the (RT, rank) pairs onto the grid. Grid points
/// below the sample minimum get 0; points at or above the maximum get 1.
///
/// Returns `None` when the sample has fewer than
/// [`MIN_TRIALS_PER_MODALITY`] observations — there is no resolvable rank
/// statistic. Pure function of its inputs.
pub fn ecdf_on_grid(rts: &[f64], grid: &RtGrid) -> Option<Ecdf> {
    if rts.len() < MIN_TRIALS_PER_MODALITY {
        return None;
    }

    let n = rts.len();
    let mut sorted = rts.to_vec();
    sorted.sort_unstable_by(|a, b| a.total_cmp(b));

    let values = grid
        .points()
        .iter()
        .map(|&t| {
            // First sorted index strictly above t. Everything at or below t
            // has cumulative probability idx/n; interpolate toward the next
            // rank within the gap.
            let idx = sorted.partition_point(|&x| x <= t);
            if idx == 0 {
                0.0
            } else if idx == n {
                1.0
            } else {
                let (x0, x1) = (sorted[idx - 1], sorted[idx]);
                let (r0, r1) = (idx as f64 / n as f64, (idx + 1) as f64 / n as f64);
                // x0 <= t < x1, so the gap is nonzero even with tied samples.
                r0 + (t - x0) / (x1 - x0) * (r1 - r0)
            }
        })
        .collect();

    Some(Ecdf { values })
}
