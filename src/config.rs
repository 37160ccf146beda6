//! Configuration for race-model violation analysis.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_ALPHA, DEFAULT_PERMUTATIONS, FULL_WINDOW};
use crate::models::RaceModel;
use crate::types::AnalysisMode;

/// A percentile window restricting which part of the violation curve counts
/// toward the scalar summary.
///
/// The window `(lo, hi)` in percent maps to index bounds on the RT grid as a
/// fraction of grid length: `floor(N * lo / 100) .. floor(N * hi / 100)`.
/// This indexes the RT axis uniformly (it is *not* a probability-mass window
/// on the CDF values); the one semantic is used everywhere in the crate.
///
/// An empty window (`lo == hi`) selects no grid points; the mean over it is
/// NaN and is flagged as such by the result, never silently treated as zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileWindow {
    /// Lower bound in percent, `0 <= lo <= hi`.
    pub lo: f64,
    /// Upper bound in percent, `lo <= hi <= 100`.
    pub hi: f64,
}

impl Default for PercentileWindow {
    fn default() -> Self {
        PercentileWindow {
            lo: FULL_WINDOW.0,
            hi: FULL_WINDOW.1,
        }
    }
}

impl PercentileWindow {
    /// Construct a window, panicking on out-of-range bounds.
    pub fn new(lo: f64, hi: f64) -> Self {
        let window = PercentileWindow { lo, hi };
        assert!(window.validate().is_ok(), "percentile window must satisfy 0 <= lo <= hi <= 100");
        window
    }

    /// The full `[0, 100]` window.
    pub fn full() -> Self {
        Self::default()
    }

    /// Check the bounds.
    pub fn validate(&self) -> Result<(), String> {
        if !self.lo.is_finite() || !self.hi.is_finite() {
            return Err("percentile window bounds must be finite".to_string());
        }
        if self.lo < 0.0 || self.hi > 100.0 || self.lo > self.hi {
            return Err(format!(
                "percentile window ({}, {}) must satisfy 0 <= lo <= hi <= 100",
                self.lo, self.hi
            ));
        }
        Ok(())
    }

    /// Map the window to index bounds on a grid of length `n`.
    pub fn index_bounds(&self, n: usize) -> (usize, usize) {
        let lower = ((n as f64 * self.lo / 100.0).floor() as usize).min(n);
        let upper = ((n as f64 * self.hi / 100.0).floor() as usize).min(n);
        (lower, upper)
    }

    /// Whether the window selects no points on a grid of length `n`.
    pub fn is_empty_for(&self, n: usize) -> bool {
        let (lower, upper) = self.index_bounds(n);
        lower >= upper
    }
}

/// Settings for the permutation significance test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PermutationConfig {
    /// Number of label reshuffles. Default: 1000.
    pub iterations: usize,
    /// Significance level for the one-sided test. Default: 0.05.
    pub alpha: f64,
    /// Deterministic RNG seed. `None` uses [`crate::constants::DEFAULT_SEED`].
    pub seed: Option<u64>,
}

impl Default for PermutationConfig {
    fn default() -> Self {
        PermutationConfig {
            iterations: DEFAULT_PERMUTATIONS,
            alpha: DEFAULT_ALPHA,
            seed: None,
        }
    }
}

impl PermutationConfig {
    /// Create with default iteration count and significance level.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of permutations.
    pub fn iterations(mut self, n: usize) -> Self {
        assert!(n > 0, "iterations must be positive");
        self.iterations = n;
        self
    }

    /// Set the significance level.
    pub fn alpha(mut self, alpha: f64) -> Self {
        assert!(alpha > 0.0 && alpha < 1.0, "alpha must be in (0, 1)");
        self.alpha = alpha;
        self
    }

    /// Set a deterministic seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check the settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.iterations == 0 {
            return Err("permutation iterations must be positive".to_string());
        }
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(format!("alpha {} must be in (0, 1)", self.alpha));
        }
        Ok(())
    }
}

/// Full configuration for one analysis call.
///
/// Owned by the caller and passed by value; the engine holds no mutable
/// configuration state between calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Which race-model predictor to evaluate, with its parameters.
    pub model: RaceModel,
    /// Percentile window for the scalar summary.
    pub window: PercentileWindow,
    /// Pooled vs per-participant aggregation.
    pub mode: AnalysisMode,
    /// Permutation test settings; `None` skips the test.
    pub permutation: Option<PermutationConfig>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            model: RaceModel::Standard,
            window: PercentileWindow::full(),
            mode: AnalysisMode::PerParticipant,
            permutation: None,
        }
    }
}

impl AnalysisConfig {
    /// Create a configuration with default settings: standard race model,
    /// full window, per-participant mode, no permutation test.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check the whole configuration before computation begins.
    pub fn validate(&self) -> Result<(), String> {
        self.model.validate()?;
        self.window.validate()?;
        if let Some(perm) = &self.permutation {
            perm.validate()?;
        }
        Ok(())
    }
}
