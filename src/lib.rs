//! # coactive
//!
//! Race-model violation analysis for multisensory reaction-time
//! experiments.
//!
//! When audiovisual reaction times are faster than independent-channel race
//! models predict, that excess speed is the classic signature of
//! multisensory integration. This crate is the violation engine: it builds
//! empirical CDFs on a shared reaction-time grid, evaluates a family of
//! race-model predictors against the observed audiovisual distribution,
//! summarizes the violation over a percentile window, and assesses
//! significance with a label-reshuffling permutation test.
//!
//! The engine is a library consumed in-process: trial tables come in,
//! numeric results go out. Plotting, figure persistence, and widget state
//! belong to the caller.
//!
//! ## Quick Start
//!
//! ```ignore
//! use coactive::{RaceAnalyzer, RaceModel, AnalysisOutcome};
//! use coactive::data::load_trials_csv;
//!
//! let trials = load_trials_csv(Path::new("experiment.csv"))?;
//! let outcome = RaceAnalyzer::new()
//!     .model(RaceModel::Standard)
//!     .window(0.0, 100.0)
//!     .permutations(1000)
//!     .analyze(&trials)?;
//!
//! match outcome {
//!     AnalysisOutcome::Completed(result) => {
//!         println!("mean violation: {:.4}", result.curves.summary);
//!         if let Some(perm) = &result.permutation {
//!             println!("p = {:.4}", perm.p_value);
//!         }
//!     }
//!     AnalysisOutcome::Indeterminate(reason) => {
//!         println!("no result: {}", reason);
//!     }
//! }
//! ```
//!
//! ## Design notes
//!
//! - Insufficient data is an expected outcome, not an error: the engine
//!   returns [`AnalysisOutcome::Indeterminate`] and never panics for it.
//! - Exclusion state is an explicit [`exclusion::FilterState`] value passed
//!   into each call; the engine holds nothing mutable between calls.
//! - The RT grid is rebuilt for every call from the currently-filtered
//!   population, so per-participant curves share bounds by construction.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
mod analyzer;
mod config;
mod constants;
mod grid;
mod models;
mod result;
mod types;

// Functional modules
pub mod analysis;
pub mod data;
pub mod exclusion;
pub mod output;
pub mod statistics;

// Re-exports for the public API
pub use analyzer::RaceAnalyzer;
pub use config::{AnalysisConfig, PercentileWindow, PermutationConfig};
pub use constants::{DEFAULT_ALPHA, DEFAULT_PERMUTATIONS, DEFAULT_SEED, GRID_POINTS, MIN_TRIALS_PER_MODALITY};
pub use grid::RtGrid;
pub use models::RaceModel;
pub use result::{
    AnalysisOutcome, AnalysisResult, IndeterminateReason, PermutationOutcome, ViolationCurves,
    ViolationStats,
};
pub use types::{AnalysisMode, Covariate, Modality, Trial};

// Convenience re-exports from the functional modules
pub use analysis::{CancelToken, PermutationStatus};
pub use data::TrialSet;
pub use exclusion::FilterState;
