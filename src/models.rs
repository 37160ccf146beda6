//! The race-model predictor family.
//!
//! Each variant maps per-modality ECDFs (plus free parameters, plus the RT
//! grid for the parametric variant) to a predicted audiovisual CDF. The set
//! is closed: dispatch is a compile-time-exhaustive match, so there is no
//! "unknown model" runtime path. Every predictor applies pointwise across
//! the grid and clips its output to [0, 1] before returning — clipping is
//! part of the contract, not an error condition.

use serde::{Deserialize, Serialize};

use crate::grid::RtGrid;
use crate::statistics::{normal_cdf, Ecdf};

/// A race-model predictor with its parameters.
///
/// Parameters are owned by the caller and passed by value; the engine holds
/// no mutable parameter state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RaceModel {
    /// Independent-channel probability summation: `1 - (1-A)(1-V)`.
    Standard,
    /// Miller's race-model inequality upper bound: `min(A + V, 1)`.
    MillerBound,
    /// Gaussian coactivation: `Φ(rt; μ, σ)` evaluated at each grid point.
    ///
    /// Ignores the unisensory ECDFs entirely; a pure parametric curve.
    Coactivation {
        /// Gaussian mean in milliseconds.
        mean_ms: f64,
        /// Gaussian standard deviation in milliseconds. Must be positive.
        std_ms: f64,
    },
    /// Parallel interactive race: `[1-(1-A)(1-V)] + γ·min(A, V)`.
    ParallelInteractive {
        /// Crosstalk weight γ in [0, 1].
        gamma: f64,
    },
    /// Multisensory response enhancement: `α·A + β·V + λ·(A·V)`.
    Mre {
        /// Audio weight in [0, 1].
        alpha: f64,
        /// Visual weight in [0, 1].
        beta: f64,
        /// Interaction weight in [0, 1].
        lambda: f64,
    },
}

impl RaceModel {
    /// Short name of the variant.
    pub fn name(&self) -> &'static str {
        match self {
            RaceModel::Standard => "Standard Race Model",
            RaceModel::MillerBound => "Miller Bound",
            RaceModel::Coactivation { .. } => "Coactivation Model",
            RaceModel::ParallelInteractive { .. } => "Parallel Interactive Race Model",
            RaceModel::Mre { .. } => "Multisensory Response Enhancement Model",
        }
    }

    /// Validate the variant's free parameters.
    ///
    /// Surfaced before any computation begins; the predictors themselves
    /// assume validated parameters.
    pub fn validate(&self) -> Result<(), String> {
        match *self {
            RaceModel::Standard | RaceModel::MillerBound => Ok(()),
            RaceModel::Coactivation { mean_ms, std_ms } => {
                if !mean_ms.is_finite() {
                    return Err("coactivation mean must be finite".to_string());
                }
                if !(std_ms.is_finite() && std_ms > 0.0) {
                    return Err(format!("coactivation std {} must be positive", std_ms));
                }
                Ok(())
            }
            RaceModel::ParallelInteractive { gamma } => {
                if !(0.0..=1.0).contains(&gamma) {
                    return Err(format!("interaction weight gamma {} must be in [0, 1]", gamma));
                }
                Ok(())
            }
            RaceModel::Mre { alpha, beta, lambda } => {
                for (name, v) in [("alpha", alpha), ("beta", beta), ("lambda", lambda)] {
                    if !(0.0..=1.0).contains(&v) {
                        return Err(format!("MRE weight {} = {} must be in [0, 1]", name, v));
                    }
                }
                Ok(())
            }
        }
    }

    /// Predicted audiovisual CDF over the grid, clipped to [0, 1].
    ///
    /// `audio` and `visual` must be aligned with `grid`; the output has one
    /// value per grid point. Pure function of its inputs.
    pub fn predict(&self, audio: &Ecdf, visual: &Ecdf, grid: &RtGrid) -> Vec<f64> {
        debug_assert_eq!(audio.len(), grid.len());
        debug_assert_eq!(visual.len(), grid.len());

        let pointwise = |f: &dyn Fn(f64, f64) -> f64| -> Vec<f64> {
            audio
                .values()
                .iter()
                .zip(visual.values())
                .map(|(&a, &v)| f(a, v).clamp(0.0, 1.0))
                .collect()
        };

        match *self {
            RaceModel::Standard => pointwise(&|a, v| 1.0 - (1.0 - a) * (1.0 - v)),
            RaceModel::MillerBound => pointwise(&|a, v| (a + v).min(1.0)),
            RaceModel::Coactivation { mean_ms, std_ms } => grid
                .points()
                .iter()
                .map(|&rt| normal_cdf((rt - mean_ms) / std_ms).clamp(0.0, 1.0))
                .collect(),
            RaceModel::ParallelInteractive { gamma } => {
                pointwise(&|a, v| (1.0 - (1.0 - a) * (1.0 - v)) + gamma * a.min(v))
            }
            RaceModel::Mre { alpha, beta, lambda } => {
                pointwise(&|a, v| alpha * a + beta * v + lambda * (a * v))
            }
        }
    }
}
