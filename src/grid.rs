//! Reaction-time grid construction.
//!
//! Every violation computation evaluates its curves on a fixed-length
//! ascending grid spanning the RT range of the population being analyzed.
//! The grid is built fresh for every call (its bounds depend on the current
//! exclusion state) and is never cached. Making construction an explicit
//! step with explicit bounds is what enforces the shared-grid invariant:
//! per-participant curves are only averageable because they were all
//! evaluated on the *same* `RtGrid` value.

use serde::{Deserialize, Serialize};

use crate::constants::GRID_POINTS;

/// A fixed-length ascending sequence of reaction-time values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RtGrid {
    points: Vec<f64>,
}

impl RtGrid {
    /// Build a grid of [`GRID_POINTS`] evenly spaced values over `[min, max]`.
    ///
    /// Returns `None` for a degenerate (`min == max`), inverted, or
    /// non-finite range — there is no resolvable RT axis in those cases and
    /// the analysis is indeterminate.
    pub fn from_bounds(min: f64, max: f64) -> Option<RtGrid> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return None;
        }
        let n = GRID_POINTS;
        let step = (max - min) / (n - 1) as f64;
        let mut points = Vec::with_capacity(n);
        for i in 0..n {
            points.push(min + step * i as f64);
        }
        // Pin the endpoint exactly; accumulated rounding must not shrink the range.
        points[n - 1] = max;
        Some(RtGrid { points })
    }

    /// Build a grid spanning the range of the given reaction times.
    ///
    /// Returns `None` when the sample is empty or has no variability.
    pub fn from_rts<I>(rts: I) -> Option<RtGrid>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for rt in rts {
            min = min.min(rt);
            max = max.max(rt);
        }
        RtGrid::from_bounds(min, max)
    }

    /// The grid values, ascending.
    pub fn points(&self) -> &[f64] {
        &self.points
    }

    /// Number of grid points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the grid is empty. Grids built by this module never are.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Smallest grid value.
    pub fn min(&self) -> f64 {
        self.points[0]
    }

    /// Largest grid value.
    pub fn max(&self) -> f64 {
        self.points[self.points.len() - 1]
    }
}
