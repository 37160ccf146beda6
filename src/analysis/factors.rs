//! Per-participant factor extraction.
//!
//! Factors are the scalar quantities reporting and scatter analyses pair
//! against each other: demographics, RT summaries, distribution spread, and
//! the participant's race-violation value. Each extractor answers for one
//! participant's trials and returns `None` when the factor is not
//! resolvable for that participant (missing column, missing modality,
//! all-NaN values) — skip, never crash.

use crate::config::PercentileWindow;
use crate::data::TrialSet;
use crate::models::RaceModel;
use crate::statistics::{iqr, mean, median};
use crate::types::{AnalysisMode, Modality};

use super::violation::participant_violation_value;

/// Age column names recognized in trial tables, in lookup order.
const AGE_COLUMNS: [&str; 2] = ["SubjectAge", "Age"];

/// A participant-level factor to extract.
#[derive(Debug, Clone, PartialEq)]
pub enum Factor {
    /// Participant age from the `SubjectAge` or `Age` covariate column.
    Age,
    /// Total number of trials.
    TotalTrials,
    /// Mean reaction time within one modality.
    MeanRt(Modality),
    /// Median reaction time within one modality.
    MedianRt(Modality),
    /// Interquartile range of reaction times, overall or within a modality.
    InterquartileRange(Option<Modality>),
    /// The participant's race-violation value (windowed positive sum).
    RaceViolations,
    /// Mean of a custom numeric covariate column.
    Column(String),
}

/// Extract a factor value for one participant's trials.
///
/// `model`, `window`, and `mode` are only consulted for
/// [`Factor::RaceViolations`]; the other factors are pure functions of the
/// trial rows and covariates.
pub fn factor_value(
    participant_set: &TrialSet,
    factor: &Factor,
    model: &RaceModel,
    window: PercentileWindow,
    mode: AnalysisMode,
) -> Option<f64> {
    match factor {
        Factor::Age => age_of(participant_set),
        Factor::TotalTrials => Some(participant_set.len() as f64),
        Factor::MeanRt(modality) => {
            let rts = participant_set.rts(*modality);
            finite(mean(&rts))
        }
        Factor::MedianRt(modality) => {
            let rts = participant_set.rts(*modality);
            finite(median(&rts))
        }
        Factor::InterquartileRange(modality) => {
            let rts = match modality {
                Some(m) => participant_set.rts(*m),
                None => participant_set.all_rts().collect(),
            };
            if rts.is_empty() {
                return None;
            }
            finite(iqr(&rts))
        }
        Factor::RaceViolations => {
            participant_violation_value(participant_set, model, window, mode)
        }
        Factor::Column(name) => {
            let column = participant_set.covariate(name)?;
            let numeric: Vec<f64> = column.iter().filter_map(|c| c.as_numeric()).collect();
            if numeric.is_empty() {
                return None;
            }
            finite(mean(&numeric))
        }
    }
}

/// Age from the first recognized age column with a numeric value.
pub fn age_of(participant_set: &TrialSet) -> Option<f64> {
    let participant = participant_set.trials().first()?.participant.clone();
    for column in AGE_COLUMNS {
        if let Some(cell) = participant_set.participant_covariate(&participant, column) {
            if let Some(age) = cell.as_numeric() {
                return Some(age);
            }
        }
    }
    None
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Covariate, Trial};
    use std::collections::BTreeMap;

    fn participant() -> TrialSet {
        let trials = vec![
            Trial::new("p1", Modality::Audio, 200.0),
            Trial::new("p1", Modality::Audio, 240.0),
            Trial::new("p1", Modality::Visual, 260.0),
            Trial::new("p1", Modality::Visual, 280.0),
            Trial::new("p1", Modality::Audiovisual, 180.0),
            Trial::new("p1", Modality::Audiovisual, 200.0),
        ];
        let mut covariates = BTreeMap::new();
        covariates.insert(
            "SubjectAge".to_string(),
            vec![Covariate::Numeric(27.0); 6],
        );
        covariates.insert(
            "Score".to_string(),
            vec![
                Covariate::Numeric(10.0),
                Covariate::Numeric(20.0),
                Covariate::Missing,
                Covariate::Numeric(30.0),
                Covariate::Missing,
                Covariate::Missing,
            ],
        );
        covariates.insert("Notes".to_string(), vec![Covariate::Text("ok".into()); 6]);
        TrialSet::with_covariates(trials, covariates)
    }

    fn extract(set: &TrialSet, factor: Factor) -> Option<f64> {
        factor_value(
            set,
            &factor,
            &RaceModel::Standard,
            PercentileWindow::full(),
            AnalysisMode::PerParticipant,
        )
    }

    #[test]
    fn rt_summaries() {
        let set = participant();
        assert_eq!(extract(&set, Factor::TotalTrials), Some(6.0));
        assert_eq!(extract(&set, Factor::MeanRt(Modality::Audio)), Some(220.0));
        assert_eq!(extract(&set, Factor::MedianRt(Modality::Visual)), Some(270.0));
    }

    #[test]
    fn age_lookup_prefers_subject_age() {
        let set = participant();
        assert_eq!(extract(&set, Factor::Age), Some(27.0));
    }

    #[test]
    fn custom_column_averages_numeric_cells() {
        let set = participant();
        assert_eq!(extract(&set, Factor::Column("Score".into())), Some(20.0));
        // All-text column has no numeric interpretation.
        assert_eq!(extract(&set, Factor::Column("Notes".into())), None);
        assert_eq!(extract(&set, Factor::Column("Absent".into())), None);
    }

    #[test]
    fn race_violations_factor_matches_participant_value() {
        let set = participant();
        let via_factor = extract(&set, Factor::RaceViolations).unwrap();
        let direct = participant_violation_value(
            &set,
            &RaceModel::Standard,
            PercentileWindow::full(),
            AnalysisMode::PerParticipant,
        )
        .unwrap();
        assert_eq!(via_factor, direct);
    }

    #[test]
    fn missing_modality_mean_is_none() {
        let set = TrialSet::new(vec![Trial::new("p1", Modality::Audio, 200.0)]);
        assert_eq!(extract(&set, Factor::MeanRt(Modality::Visual)), None);
    }
}
