//! Exclusion-layer integration: filters feeding the analyzer.

use coactive::exclusion::{DemographicFilter, ParticipantFilter, TrialFilter};
use coactive::{
    AnalysisMode, Covariate, FilterState, Modality, PercentileWindow, RaceAnalyzer, RaceModel,
    Trial, TrialSet,
};
use std::collections::BTreeMap;

/// Three participants: a young integrator, an older integrator, and a
/// non-violator; the young integrator carries two implausible trials.
fn study() -> TrialSet {
    let mut trials = Vec::new();

    let mut push_block = |id: &str, av_shift: f64| {
        for i in 0..5 {
            let jitter = i as f64 * 14.0;
            trials.push(Trial::new(id, Modality::Audio, 260.0 + jitter));
            trials.push(Trial::new(id, Modality::Visual, 270.0 + jitter));
            trials.push(Trial::new(id, Modality::Audiovisual, 265.0 + av_shift + jitter));
        }
    };
    push_block("s01", -70.0); // strong integration
    push_block("s02", -55.0); // integration
    push_block("s03", 45.0); // AV slower: non-violator

    // Anticipation and lapse trials for s01.
    trials.push(Trial::new("s01", Modality::Audio, 80.0));
    trials.push(Trial::new("s01", Modality::Visual, 3200.0));

    let ages: Vec<Covariate> = trials
        .iter()
        .map(|t| {
            let age = match t.participant.as_str() {
                "s01" => 23.0,
                "s02" => 68.0,
                _ => 30.0,
            };
            Covariate::Numeric(age)
        })
        .collect();
    let mut covariates = BTreeMap::new();
    covariates.insert("Age".to_string(), ages);
    TrialSet::with_covariates(trials, covariates)
}

#[test]
fn trial_filters_clean_before_analysis() {
    let state = FilterState {
        trial: TrialFilter {
            rt_min: Some(100.0),
            rt_max: Some(2000.0),
            ..TrialFilter::none()
        },
        ..FilterState::none()
    };

    let outcome = state.apply(
        &study(),
        &RaceModel::Standard,
        PercentileWindow::full(),
        AnalysisMode::PerParticipant,
    );
    assert_eq!(outcome.excluded_trials.len(), 2);
    assert!(outcome.kept.all_rts().all(|rt| (100.0..=2000.0).contains(&rt)));
    // Filtering trials must not silently drop participants.
    assert_eq!(outcome.kept.participants().len(), 3);
}

#[test]
fn nonviolator_exclusion_composes_with_analysis() {
    let state = FilterState {
        participant: ParticipantFilter {
            exclude_nonviolators: true,
            ..ParticipantFilter::none()
        },
        ..FilterState::none()
    };

    let analyzer = RaceAnalyzer::new();
    let outcome = analyzer.analyze_filtered(&study(), &state).unwrap();
    let result = outcome.completed().unwrap();
    assert_eq!(result.curves.participants_used, 2);
    assert!(result.curves.summary > 0.0);
}

#[test]
fn demographic_and_violation_filters_compose() {
    let state = FilterState {
        participant: ParticipantFilter {
            demographics: vec![DemographicFilter::NumericRange {
                column: "Age".to_string(),
                min: Some(18.0),
                max: Some(65.0),
            }],
            exclude_nonviolators: true,
            ..ParticipantFilter::none()
        },
        ..FilterState::none()
    };

    let outcome = state.apply(
        &study(),
        &RaceModel::Standard,
        PercentileWindow::full(),
        AnalysisMode::PerParticipant,
    );
    // s02 fails the age range, s03 the non-violator rule.
    assert_eq!(outcome.kept.participants(), vec!["s01"]);
    assert_eq!(outcome.excluded_participants.len(), 2);
    assert!(outcome.excluded_participants.contains(&"s02".to_string()));
    assert!(outcome.excluded_participants.contains(&"s03".to_string()));
}

#[test]
fn filters_are_idempotent_and_reversible() {
    let state = FilterState {
        trial: TrialFilter {
            rt_min: Some(100.0),
            rt_max: Some(2000.0),
            zscore_threshold: Some(2.5),
            ..TrialFilter::none()
        },
        participant: ParticipantFilter {
            exclude_nonviolators: true,
            ..ParticipantFilter::none()
        },
    };

    let original = study();
    let run = |set: &TrialSet| {
        state.apply(
            set,
            &RaceModel::Standard,
            PercentileWindow::full(),
            AnalysisMode::PerParticipant,
        )
    };

    let first = run(&original);
    let second = run(&original);
    assert_eq!(first, second, "same state + same store = same exclusions");

    // The store itself is untouched; dropping the state restores everything.
    assert_eq!(original, study());
}

#[test]
fn filtered_and_unfiltered_analyses_differ_as_expected() {
    let analyzer = RaceAnalyzer::new();
    let unfiltered = analyzer.analyze(&study()).unwrap();
    let filtered = analyzer
        .analyze_filtered(
            &study(),
            &FilterState {
                participant: ParticipantFilter {
                    exclude_nonviolators: true,
                    ..ParticipantFilter::none()
                },
                ..FilterState::none()
            },
        )
        .unwrap();

    let all = unfiltered.completed().unwrap();
    let violators_only = filtered.completed().unwrap();
    assert_eq!(all.curves.participants_used, 3);
    assert_eq!(violators_only.curves.participants_used, 2);
    // Dropping the non-violator can only raise the group mean violation.
    assert!(violators_only.curves.summary >= all.curves.summary);
}
