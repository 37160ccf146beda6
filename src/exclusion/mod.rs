//! The exclusion layer: which trials and participants reach the engine.
//!
//! Exclusion state is a plain value object owned by the caller and passed
//! into every engine call. Nothing here is global or accumulated: applying
//! the same `FilterState` to the same unfiltered trial store always yields
//! the same filtered set (idempotent), and discarding the state fully
//! reverses every exclusion.

mod participant;
mod trial;

pub use participant::{DemographicFilter, ParticipantFilter};
pub use trial::{ModalityMask, TrialFilter};

use serde::{Deserialize, Serialize};

use crate::config::PercentileWindow;
use crate::data::TrialSet;
use crate::models::RaceModel;
use crate::types::AnalysisMode;

/// Combined trial- and participant-level filter settings for one analysis
/// run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    /// Trial-level criteria, applied first.
    pub trial: TrialFilter,
    /// Participant-level criteria, applied to the trial-filtered set.
    pub participant: ParticipantFilter,
}

/// What a filter application produced.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    /// The surviving trials.
    pub kept: TrialSet,
    /// Row indices (into the unfiltered set) of excluded trials.
    pub excluded_trials: Vec<usize>,
    /// Ids of excluded participants, in order of exclusion.
    pub excluded_participants: Vec<String>,
}

impl FilterState {
    /// A state with no criteria enabled.
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether any criterion is enabled.
    pub fn is_active(&self) -> bool {
        self.trial.is_active() || self.participant.is_active()
    }

    /// Apply all filters to a trial store.
    ///
    /// Trial criteria run first; participant criteria then run on the
    /// reduced set in their fixed order (manual, demographic, violation
    /// range, non-violators). The violation-dependent criteria use the
    /// supplied model, window, and mode — the same ones the subsequent
    /// analysis will use.
    pub fn apply(
        &self,
        set: &TrialSet,
        model: &RaceModel,
        window: PercentileWindow,
        mode: AnalysisMode,
    ) -> FilterOutcome {
        let excluded_trials = self.trial.find_exclusions(set);
        let after_trials = if excluded_trials.is_empty() {
            set.clone()
        } else {
            set.filtered(|i, _| excluded_trials.binary_search(&i).is_err())
        };

        let (kept, excluded_participants) =
            self.participant.apply(&after_trials, model, window, mode);

        FilterOutcome {
            kept,
            excluded_trials,
            excluded_participants,
        }
    }
}
