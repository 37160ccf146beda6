//! Statistical building blocks for the violation engine.
//!
//! This module provides the distribution-level infrastructure:
//! - Empirical CDF construction interpolated onto a shared RT grid
//! - Descriptive statistics used by the exclusion layer and factor
//!   extraction (mean, median, population z-scores, percentiles, IQR)
//! - The standard normal CDF used by the coactivation predictor

mod descriptive;
mod ecdf;

pub use descriptive::{iqr, mean, median, percent_deviation_from_median, percentile, zscores};
pub use ecdf::{ecdf_on_grid, Ecdf};

/// Standard normal CDF: Φ(x) = (1 + erf(x/√2)) / 2.
///
/// `f64` has no `erf` in std; libm provides it.
#[inline]
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + libm::erf(x * std::f64::consts::FRAC_1_SQRT_2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_cdf_reference_values() {
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-12);
        assert!((normal_cdf(1.96) - 0.975).abs() < 1e-3);
        assert!((normal_cdf(-1.96) - 0.025).abs() < 1e-3);
        assert!(normal_cdf(-8.0) < 1e-12);
        assert!(normal_cdf(8.0) > 1.0 - 1e-12);
    }
}
