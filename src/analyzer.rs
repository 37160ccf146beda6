//! Main `RaceAnalyzer` entry point and builder.

use crate::analysis::{compute_violation, permutation_test};
use crate::config::{AnalysisConfig, PercentileWindow, PermutationConfig};
use crate::data::TrialSet;
use crate::exclusion::FilterState;
use crate::models::RaceModel;
use crate::result::{AnalysisOutcome, AnalysisResult, ViolationStats};
use crate::types::AnalysisMode;

/// Main entry point for race-model violation analysis.
///
/// Configure with the builder, then call [`RaceAnalyzer::analyze`] with a
/// trial store. Every call operates on caller-owned data and returns a
/// fresh result; the analyzer itself holds only configuration.
///
/// # Example
///
/// ```ignore
/// use coactive::{RaceAnalyzer, RaceModel, data::load_trials_csv};
///
/// let trials = load_trials_csv(Path::new("experiment.csv"))?;
/// let outcome = RaceAnalyzer::new()
///     .model(RaceModel::MillerBound)
///     .window(10.0, 90.0)
///     .permutations(2000)
///     .analyze(&trials);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RaceAnalyzer {
    config: AnalysisConfig,
}

impl RaceAnalyzer {
    /// Create with default configuration: standard race model, full
    /// percentile window, per-participant aggregation, no permutation test.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the race-model variant (with its parameters).
    pub fn model(mut self, model: RaceModel) -> Self {
        self.config.model = model;
        self
    }

    /// Set the percentile window for the scalar summary.
    pub fn window(mut self, lo: f64, hi: f64) -> Self {
        self.config.window = PercentileWindow::new(lo, hi);
        self
    }

    /// Use per-participant aggregation (the default).
    pub fn per_participant(mut self) -> Self {
        self.config.mode = AnalysisMode::PerParticipant;
        self
    }

    /// Use pooled aggregation.
    pub fn pooled(mut self) -> Self {
        self.config.mode = AnalysisMode::Pooled;
        self
    }

    /// Enable the permutation test with the given iteration count.
    pub fn permutations(mut self, iterations: usize) -> Self {
        let perm = self.config.permutation.unwrap_or_default();
        self.config.permutation = Some(perm.iterations(iterations));
        self
    }

    /// Set the permutation significance level (enables the test).
    pub fn alpha(mut self, alpha: f64) -> Self {
        let perm = self.config.permutation.unwrap_or_default();
        self.config.permutation = Some(perm.alpha(alpha));
        self
    }

    /// Set a deterministic permutation seed (enables the test).
    pub fn seed(mut self, seed: u64) -> Self {
        let perm = self.config.permutation.unwrap_or_default();
        self.config.permutation = Some(perm.seed(seed));
        self
    }

    /// Replace the permutation settings wholesale.
    pub fn permutation(mut self, config: PermutationConfig) -> Self {
        self.config.permutation = Some(config);
        self
    }

    /// Disable the permutation test.
    pub fn no_permutation(mut self) -> Self {
        self.config.permutation = None;
        self
    }

    /// The current configuration.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run the analysis on a trial store.
    ///
    /// Insufficient data yields [`AnalysisOutcome::Indeterminate`]; invalid
    /// configuration is a caller error surfaced as `Err` before any
    /// computation begins.
    pub fn analyze(&self, trials: &TrialSet) -> Result<AnalysisOutcome, String> {
        self.config.validate()?;

        let curves = match compute_violation(
            trials,
            &self.config.model,
            self.config.window,
            self.config.mode,
        ) {
            Ok(curves) => curves,
            Err(reason) => return Ok(AnalysisOutcome::Indeterminate(reason)),
        };

        let permutation = match &self.config.permutation {
            Some(perm_config) => {
                match permutation_test(trials, &self.config.model, perm_config) {
                    Ok(outcome) => Some(outcome),
                    // The curves resolved but the pooled unit did not; treat
                    // the whole call as indeterminate rather than reporting
                    // curves without the requested test.
                    Err(reason) => return Ok(AnalysisOutcome::Indeterminate(reason)),
                }
            }
            None => None,
        };

        let stats = ViolationStats::from_curves(&curves);
        Ok(AnalysisOutcome::Completed(Box::new(AnalysisResult {
            curves,
            stats,
            permutation,
        })))
    }

    /// Run the exclusion layer, then the analysis, against one trial store.
    ///
    /// The filter sees the same model, window, and mode the analysis uses,
    /// so violation-dependent criteria agree with the reported curves.
    pub fn analyze_filtered(
        &self,
        trials: &TrialSet,
        filters: &FilterState,
    ) -> Result<AnalysisOutcome, String> {
        self.config.validate()?;
        let outcome = filters.apply(
            trials,
            &self.config.model,
            self.config.window,
            self.config.mode,
        );
        self.analyze(&outcome.kept)
    }
}
