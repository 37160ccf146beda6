//! Constants used throughout the crate.

/// Default deterministic seed for RNG operations.
///
/// Same seed + same data = same permutation null distribution.
/// The value `0x72616365` is "race" encoded in ASCII.
pub const DEFAULT_SEED: u64 = 0x72616365;

/// Number of points in every RT grid.
///
/// All ECDFs, predicted curves, and violation curves are evaluated on a
/// fixed-length ascending grid so that per-participant curves computed on
/// shared bounds are directly averageable.
pub const GRID_POINTS: usize = 500;

/// Minimum trials per modality for a resolvable ECDF.
///
/// Below this there is no rank statistic to interpolate; participants (or
/// pooled samples) with fewer trials in any modality are indeterminate.
pub const MIN_TRIALS_PER_MODALITY: usize = 2;

/// Default number of permutations for the significance test.
pub const DEFAULT_PERMUTATIONS: usize = 1000;

/// Default significance level for the permutation test.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Default percentile window: the full violation curve.
pub const FULL_WINDOW: (f64, f64) = (0.0, 100.0);
