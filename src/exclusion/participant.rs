//! Participant-level exclusion criteria.
//!
//! Participant filters gate whole participants out of an analysis run:
//! manual selections, demographic criteria over covariate columns, the raw
//! violation-value range, and the non-violator rule. NaN or unresolvable
//! values are treated as exclude/skip, never compared.

use serde::{Deserialize, Serialize};

use crate::analysis::factors::age_of;
use crate::analysis::violation::{compute_violation, participant_violation_value};
use crate::config::PercentileWindow;
use crate::data::TrialSet;
use crate::models::RaceModel;
use crate::types::AnalysisMode;

/// A demographic criterion over one covariate column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DemographicFilter {
    /// Keep participants whose numeric value lies inside the closed range.
    ///
    /// `None` bounds are open. A missing or non-numeric value fails the
    /// filter.
    NumericRange {
        /// Covariate column name.
        column: String,
        /// Lower bound, inclusive.
        min: Option<f64>,
        /// Upper bound, inclusive.
        max: Option<f64>,
    },
    /// Keep participants whose value is one of the allowed categories.
    Categorical {
        /// Covariate column name.
        column: String,
        /// Allowed values.
        allowed: Vec<String>,
    },
}

impl DemographicFilter {
    /// Whether the participant passes this criterion.
    pub fn passes(&self, participant_set: &TrialSet, participant: &str) -> bool {
        match self {
            DemographicFilter::NumericRange { column, min, max } => {
                // The age columns get the same alias treatment as factor
                // extraction: "Age" matches "SubjectAge" too.
                let value = if column.eq_ignore_ascii_case("age") {
                    age_of(participant_set)
                } else {
                    participant_set
                        .participant_covariate(participant, column)
                        .and_then(|c| c.as_numeric())
                };
                match value {
                    Some(v) => min.map_or(true, |m| v >= m) && max.map_or(true, |m| v <= m),
                    None => false,
                }
            }
            DemographicFilter::Categorical { column, allowed } => participant_set
                .participant_covariate(participant, column)
                .and_then(|c| c.as_text())
                .map_or(false, |v| allowed.iter().any(|a| a == v)),
        }
    }
}

/// Participant-level filter settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParticipantFilter {
    /// Participant ids excluded by hand.
    pub manual_exclusions: Vec<String>,
    /// Demographic criteria; a participant must pass every one.
    pub demographics: Vec<DemographicFilter>,
    /// Keep only participants whose raw violation value (windowed positive
    /// sum) lies inside this closed range. Participants with an
    /// indeterminate value are dropped.
    pub violation_range: Option<(f64, f64)>,
    /// Drop participants whose scalar summary is not strictly positive
    /// (non-violators). A NaN summary counts as non-violating.
    pub exclude_nonviolators: bool,
}

impl ParticipantFilter {
    /// A filter that keeps everyone.
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether any criterion is enabled.
    pub fn is_active(&self) -> bool {
        !self.manual_exclusions.is_empty()
            || !self.demographics.is_empty()
            || self.violation_range.is_some()
            || self.exclude_nonviolators
    }

    /// Apply the filter, returning the kept copy and the excluded ids.
    ///
    /// Criteria apply in a fixed order — manual, demographic, violation
    /// range, non-violators — because the later two depend on which
    /// participants are still present when curves are recomputed.
    pub fn apply(
        &self,
        set: &TrialSet,
        model: &RaceModel,
        window: PercentileWindow,
        mode: AnalysisMode,
    ) -> (TrialSet, Vec<String>) {
        let mut excluded: Vec<String> = Vec::new();
        let mut current = set.clone();

        if !self.manual_exclusions.is_empty() {
            let manual: Vec<String> = current
                .participants()
                .into_iter()
                .filter(|p| self.manual_exclusions.iter().any(|m| m == p))
                .map(String::from)
                .collect();
            current = remove(&current, &manual);
            excluded.extend(manual);
        }

        if !self.demographics.is_empty() {
            let mut failed = Vec::new();
            for participant in current.participants() {
                let view = current.participant_view(participant);
                if !self.demographics.iter().all(|d| d.passes(&view, participant)) {
                    failed.push(participant.to_string());
                }
            }
            current = remove(&current, &failed);
            excluded.extend(failed);
        }

        if let Some((lo, hi)) = self.violation_range {
            let mut outside = Vec::new();
            for participant in current.participants() {
                let view = current.participant_view(participant);
                let keep = match participant_violation_value(&view, model, window, mode) {
                    Some(value) => value >= lo && value <= hi,
                    None => false,
                };
                if !keep {
                    outside.push(participant.to_string());
                }
            }
            current = remove(&current, &outside);
            excluded.extend(outside);
        }

        if self.exclude_nonviolators {
            let mut nonviolators = Vec::new();
            for participant in current.participants() {
                let view = current.participant_view(participant);
                let keep = match compute_violation(&view, model, window, mode) {
                    // NaN summary fails the > comparison and is dropped.
                    Ok(curves) => curves.summary > 0.0,
                    Err(_) => false,
                };
                if !keep {
                    nonviolators.push(participant.to_string());
                }
            }
            current = remove(&current, &nonviolators);
            excluded.extend(nonviolators);
        }

        (current, excluded)
    }
}

fn remove(set: &TrialSet, participants: &[String]) -> TrialSet {
    if participants.is_empty() {
        return set.clone();
    }
    set.filtered(|_, trial| !participants.iter().any(|p| *p == trial.participant))
}
