//! Result types returned by the violation engine.

use serde::{Deserialize, Serialize};

use crate::grid::RtGrid;
use crate::types::Modality;

/// Why an analysis produced no result.
///
/// Insufficient data is an expected state for callers to display, not a
/// crash: the engine returns this sentinel and never raises for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IndeterminateReason {
    /// The trial set holds no trials at all.
    NoTrials,

    /// A modality has no usable trials.
    MissingModality {
        /// The modality with no trials.
        modality: Modality,
    },

    /// A modality has too few trials for a resolvable ECDF.
    InsufficientTrials {
        /// The undersized modality.
        modality: Modality,
        /// Number of trials found.
        got: usize,
        /// Minimum required.
        min: usize,
    },

    /// All reaction times are identical; the RT grid is degenerate.
    DegenerateRtRange,

    /// Per-participant mode found no participant with two or more trials in
    /// every modality.
    NoQualifyingParticipants,
}

impl IndeterminateReason {
    /// Human-readable description for display.
    pub fn description(&self) -> String {
        match self {
            IndeterminateReason::NoTrials => "no trials to analyze".to_string(),
            IndeterminateReason::MissingModality { modality } => {
                format!("no {} trials", modality)
            }
            IndeterminateReason::InsufficientTrials { modality, got, min } => {
                format!("{} trials in {}, need at least {}", got, modality, min)
            }
            IndeterminateReason::DegenerateRtRange => {
                "no variability in reaction times".to_string()
            }
            IndeterminateReason::NoQualifyingParticipants => {
                "no participant has enough trials in every modality".to_string()
            }
        }
    }
}

impl std::fmt::Display for IndeterminateReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.description())
    }
}

/// The curves produced by one violation computation.
///
/// All arrays are aligned 1:1 with `grid`. In per-participant mode each is
/// the arithmetic mean of the qualifying participants' curves, all
/// evaluated on the same grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationCurves {
    /// The RT grid the curves are evaluated on.
    pub grid: RtGrid,
    /// Audio ECDF.
    pub ecdf_audio: Vec<f64>,
    /// Visual ECDF.
    pub ecdf_visual: Vec<f64>,
    /// Observed audiovisual ECDF.
    pub ecdf_av: Vec<f64>,
    /// Predicted audiovisual CDF from the selected race model.
    pub predicted: Vec<f64>,
    /// Violation magnitude `max(observed - predicted, 0)` per grid point.
    pub violations: Vec<f64>,
    /// Mean violation magnitude inside the percentile window.
    ///
    /// NaN when the window selects no grid points; check
    /// [`ViolationCurves::window_is_empty`] before comparing.
    pub summary: f64,
    /// Participants contributing to the averages (per-participant mode) or
    /// distinct participants pooled (pooled mode).
    pub participants_used: usize,
    /// Whether the percentile window selected no grid points.
    pub window_is_empty: bool,
}

impl ViolationCurves {
    /// Signed difference `observed - predicted` per grid point.
    ///
    /// Unlike [`ViolationCurves::violations`] this is not clipped; negative
    /// values mark regions where the race model over-predicts.
    pub fn signed_difference(&self) -> Vec<f64> {
        self.ecdf_av
            .iter()
            .zip(&self.predicted)
            .map(|(&obs, &pred)| obs - pred)
            .collect()
    }
}

/// Summary statistics over a violation curve.
///
/// Computed on the signed difference across the full grid, the quartet a
/// report quotes per dataset: peak, mean, total positive area, and the
/// share of the grid in violation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViolationStats {
    /// Largest signed difference.
    pub max: f64,
    /// Mean signed difference.
    pub mean: f64,
    /// Sum of the positive differences.
    pub total: f64,
    /// Percent of grid points where observed exceeds predicted.
    pub percent_positive: f64,
}

impl ViolationStats {
    /// Compute the statistics for a set of curves.
    pub fn from_curves(curves: &ViolationCurves) -> ViolationStats {
        let diff = curves.signed_difference();
        let n = diff.len().max(1);
        let max = diff.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = diff.iter().sum::<f64>() / n as f64;
        let total = diff.iter().filter(|&&d| d > 0.0).sum::<f64>();
        let percent_positive = diff.iter().filter(|&&d| d > 0.0).count() as f64 / n as f64 * 100.0;
        ViolationStats {
            max,
            mean,
            total,
            percent_positive,
        }
    }
}

/// Result of the permutation significance test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermutationOutcome {
    /// Observed mean violation magnitude over the full grid.
    pub observed: f64,
    /// One-sided p-value: fraction of permuted values >= observed.
    pub p_value: f64,
    /// Whether `p_value < alpha`.
    pub significant: bool,
    /// The significance level the flag was judged against.
    pub alpha: f64,
    /// The permutation null distribution, one value per reshuffle.
    pub null_distribution: Vec<f64>,
}

/// A completed analysis: curves, summary statistics, and (when requested)
/// the permutation test result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// The computed curves and windowed scalar summary.
    pub curves: ViolationCurves,
    /// Full-grid summary statistics.
    pub stats: ViolationStats,
    /// Permutation test result, if the configuration asked for one.
    pub permutation: Option<PermutationOutcome>,
}

/// Outcome of one analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnalysisOutcome {
    /// The analysis ran to completion.
    Completed(Box<AnalysisResult>),
    /// Insufficient data; the reason says which precondition failed.
    Indeterminate(IndeterminateReason),
}

impl AnalysisOutcome {
    /// The completed result, if any.
    pub fn completed(&self) -> Option<&AnalysisResult> {
        match self {
            AnalysisOutcome::Completed(result) => Some(result),
            AnalysisOutcome::Indeterminate(_) => None,
        }
    }

    /// Whether the analysis produced a result.
    pub fn is_completed(&self) -> bool {
        matches!(self, AnalysisOutcome::Completed(_))
    }
}
