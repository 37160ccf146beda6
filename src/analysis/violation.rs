//! The violation calculator: observed vs predicted audiovisual CDFs.
//!
//! Two aggregation modes. Pooled mode builds one ECDF per modality from all
//! qualifying trials combined. Per-participant mode (the default) computes
//! each qualifying participant's curves on a grid shared across the whole
//! filtered population, then averages ECDFs, predicted curves, and clipped
//! violation curves arithmetically — the shared grid is what makes those
//! averages meaningful.

use crate::config::PercentileWindow;
use crate::constants::MIN_TRIALS_PER_MODALITY;
use crate::data::TrialSet;
use crate::grid::RtGrid;
use crate::models::RaceModel;
use crate::result::{IndeterminateReason, ViolationCurves};
use crate::statistics::ecdf_on_grid;
use crate::types::{AnalysisMode, Modality};

/// Compute the violation curves for a trial set.
///
/// Returns the indeterminate reason instead of a result when a modality is
/// missing or undersized (pooled mode), the RT range has no variability, or
/// no participant passes the coverage check (per-participant mode). Model
/// parameters are assumed validated by the caller.
pub fn compute_violation(
    set: &TrialSet,
    model: &RaceModel,
    window: PercentileWindow,
    mode: AnalysisMode,
) -> Result<ViolationCurves, IndeterminateReason> {
    match mode {
        AnalysisMode::Pooled => compute_pooled(set, model, window),
        AnalysisMode::PerParticipant => compute_per_participant(set, model, window),
    }
}

fn compute_pooled(
    set: &TrialSet,
    model: &RaceModel,
    window: PercentileWindow,
) -> Result<ViolationCurves, IndeterminateReason> {
    let rt_a = set.rts(Modality::Audio);
    let rt_v = set.rts(Modality::Visual);
    let rt_av = set.rts(Modality::Audiovisual);

    for (modality, rts) in [
        (Modality::Audio, &rt_a),
        (Modality::Visual, &rt_v),
        (Modality::Audiovisual, &rt_av),
    ] {
        if rts.is_empty() {
            return Err(IndeterminateReason::MissingModality { modality });
        }
        if rts.len() < MIN_TRIALS_PER_MODALITY {
            return Err(IndeterminateReason::InsufficientTrials {
                modality,
                got: rts.len(),
                min: MIN_TRIALS_PER_MODALITY,
            });
        }
    }

    let grid = RtGrid::from_rts(rt_a.iter().chain(&rt_v).chain(&rt_av).copied())
        .ok_or(IndeterminateReason::DegenerateRtRange)?;

    // Sizes were checked above; the only remaining failure is degeneracy,
    // which grid construction already ruled out.
    let ecdf_a = ecdf_on_grid(&rt_a, &grid).ok_or(IndeterminateReason::DegenerateRtRange)?;
    let ecdf_v = ecdf_on_grid(&rt_v, &grid).ok_or(IndeterminateReason::DegenerateRtRange)?;
    let ecdf_av = ecdf_on_grid(&rt_av, &grid).ok_or(IndeterminateReason::DegenerateRtRange)?;

    let predicted = model.predict(&ecdf_a, &ecdf_v, &grid);
    let violations: Vec<f64> = ecdf_av
        .values()
        .iter()
        .zip(&predicted)
        .map(|(&obs, &pred)| (obs - pred).max(0.0))
        .collect();

    let summary = windowed_mean(&violations, window);
    let participants_used = set.participants().len();

    Ok(ViolationCurves {
        window_is_empty: window.is_empty_for(grid.len()),
        grid,
        ecdf_audio: ecdf_a.values().to_vec(),
        ecdf_visual: ecdf_v.values().to_vec(),
        ecdf_av: ecdf_av.values().to_vec(),
        predicted,
        violations,
        summary,
        participants_used,
    })
}

fn compute_per_participant(
    set: &TrialSet,
    model: &RaceModel,
    window: PercentileWindow,
) -> Result<ViolationCurves, IndeterminateReason> {
    if set.is_empty() {
        return Err(IndeterminateReason::NoTrials);
    }

    // Shared grid bounds come from the full filtered population, so every
    // qualifying participant's curves are directly averageable.
    let grid = RtGrid::from_rts(set.all_rts()).ok_or(IndeterminateReason::DegenerateRtRange)?;

    let n = grid.len();
    let mut sum_a = vec![0.0; n];
    let mut sum_v = vec![0.0; n];
    let mut sum_av = vec![0.0; n];
    let mut sum_pred = vec![0.0; n];
    let mut sum_viol = vec![0.0; n];
    let mut qualifying = 0usize;

    for participant in set.participants() {
        let rt_a = set.participant_rts(participant, Modality::Audio);
        let rt_v = set.participant_rts(participant, Modality::Visual);
        let rt_av = set.participant_rts(participant, Modality::Audiovisual);

        // Coverage check: at least two trials in every modality, otherwise
        // the participant is skipped and contributes nothing.
        let (Some(ecdf_a), Some(ecdf_v), Some(ecdf_av)) = (
            ecdf_on_grid(&rt_a, &grid),
            ecdf_on_grid(&rt_v, &grid),
            ecdf_on_grid(&rt_av, &grid),
        ) else {
            continue;
        };

        let predicted = model.predict(&ecdf_a, &ecdf_v, &grid);
        for i in 0..n {
            sum_a[i] += ecdf_a[i];
            sum_v[i] += ecdf_v[i];
            sum_av[i] += ecdf_av[i];
            sum_pred[i] += predicted[i];
            sum_viol[i] += (ecdf_av[i] - predicted[i]).max(0.0);
        }
        qualifying += 1;
    }

    if qualifying == 0 {
        return Err(IndeterminateReason::NoQualifyingParticipants);
    }

    let scale = 1.0 / qualifying as f64;
    let average = |sums: Vec<f64>| -> Vec<f64> { sums.into_iter().map(|s| s * scale).collect() };

    let violations = average(sum_viol);
    let summary = windowed_mean(&violations, window);

    Ok(ViolationCurves {
        window_is_empty: window.is_empty_for(n),
        grid,
        ecdf_audio: average(sum_a),
        ecdf_visual: average(sum_v),
        ecdf_av: average(sum_av),
        predicted: average(sum_pred),
        violations,
        summary,
        participants_used: qualifying,
    })
}

/// Raw violation value for one participant: the cumulative sum of positive
/// violations inside the percentile window.
///
/// This is the statistic the participant-level value-range filter judges,
/// distinct from the windowed *mean* used as the scalar summary. Returns
/// `None` when any modality is absent or the computation is otherwise
/// indeterminate for this participant.
pub fn participant_violation_value(
    participant_set: &TrialSet,
    model: &RaceModel,
    window: PercentileWindow,
    mode: AnalysisMode,
) -> Option<f64> {
    for modality in Modality::ALL {
        if participant_set.rts(modality).is_empty() {
            return None;
        }
    }

    let curves = compute_violation(participant_set, model, window, mode).ok()?;
    let (lower, upper) = window.index_bounds(curves.grid.len());
    let value = curves.ecdf_av[lower..upper]
        .iter()
        .zip(&curves.predicted[lower..upper])
        .map(|(&obs, &pred)| (obs - pred).max(0.0))
        .sum();
    Some(value)
}

/// Mean of the windowed slice of `values`; NaN for an empty window.
///
/// NaN is deliberate: an empty window has no mean, and downstream
/// comparisons must check for it rather than read it as zero.
pub(crate) fn windowed_mean(values: &[f64], window: PercentileWindow) -> f64 {
    let (lower, upper) = window.index_bounds(values.len());
    if lower >= upper {
        return f64::NAN;
    }
    values[lower..upper].iter().sum::<f64>() / (upper - lower) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Trial;

    fn trials(participant: &str, modality: Modality, rts: &[f64]) -> Vec<Trial> {
        rts.iter().map(|&rt| Trial::new(participant, modality, rt)).collect()
    }

    fn integrating_participant(id: &str) -> Vec<Trial> {
        let mut all = trials(id, Modality::Audio, &[200.0, 220.0, 240.0]);
        all.extend(trials(id, Modality::Visual, &[210.0, 230.0, 250.0]));
        all.extend(trials(id, Modality::Audiovisual, &[150.0, 170.0, 190.0]));
        all
    }

    #[test]
    fn faster_av_produces_positive_violation() {
        // AV responses are uniformly faster than either channel; the
        // standard race model must be violated over the full window.
        let set = TrialSet::new(integrating_participant("p1"));
        let curves = compute_violation(
            &set,
            &RaceModel::Standard,
            PercentileWindow::full(),
            AnalysisMode::PerParticipant,
        )
        .unwrap();

        assert!(curves.summary > 0.0);
        assert_eq!(curves.participants_used, 1);
        assert!(curves.violations.iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn missing_av_modality_is_indeterminate() {
        let mut all = trials("p1", Modality::Audio, &[200.0, 220.0, 240.0]);
        all.extend(trials("p1", Modality::Visual, &[210.0, 230.0, 250.0]));
        let set = TrialSet::new(all);

        let pooled = compute_violation(
            &set,
            &RaceModel::Standard,
            PercentileWindow::full(),
            AnalysisMode::Pooled,
        );
        assert_eq!(
            pooled.unwrap_err(),
            IndeterminateReason::MissingModality {
                modality: Modality::Audiovisual
            }
        );

        let per_participant = compute_violation(
            &set,
            &RaceModel::Standard,
            PercentileWindow::full(),
            AnalysisMode::PerParticipant,
        );
        assert_eq!(
            per_participant.unwrap_err(),
            IndeterminateReason::NoQualifyingParticipants
        );
    }

    #[test]
    fn single_trial_modality_is_indeterminate() {
        let mut all = trials("p1", Modality::Audio, &[200.0, 220.0]);
        all.extend(trials("p1", Modality::Visual, &[210.0, 230.0]));
        all.extend(trials("p1", Modality::Audiovisual, &[150.0]));
        let set = TrialSet::new(all);

        let pooled = compute_violation(
            &set,
            &RaceModel::Standard,
            PercentileWindow::full(),
            AnalysisMode::Pooled,
        );
        assert_eq!(
            pooled.unwrap_err(),
            IndeterminateReason::InsufficientTrials {
                modality: Modality::Audiovisual,
                got: 1,
                min: 2,
            }
        );
    }

    #[test]
    fn degenerate_rt_range_is_indeterminate() {
        let mut all = trials("p1", Modality::Audio, &[300.0, 300.0]);
        all.extend(trials("p1", Modality::Visual, &[300.0, 300.0]));
        all.extend(trials("p1", Modality::Audiovisual, &[300.0, 300.0]));
        let set = TrialSet::new(all);

        for mode in [AnalysisMode::Pooled, AnalysisMode::PerParticipant] {
            let result =
                compute_violation(&set, &RaceModel::Standard, PercentileWindow::full(), mode);
            assert_eq!(result.unwrap_err(), IndeterminateReason::DegenerateRtRange);
        }
    }

    #[test]
    fn empty_window_flags_nan_summary() {
        let set = TrialSet::new(integrating_participant("p1"));
        let curves = compute_violation(
            &set,
            &RaceModel::Standard,
            PercentileWindow::new(50.0, 50.0),
            AnalysisMode::PerParticipant,
        )
        .unwrap();

        assert!(curves.summary.is_nan());
        assert!(curves.window_is_empty);
    }

    #[test]
    fn single_participant_modes_agree() {
        // With one participant, pooled and per-participant modes see the
        // same samples and the same grid bounds.
        let set = TrialSet::new(integrating_participant("p1"));
        let pooled = compute_violation(
            &set,
            &RaceModel::Standard,
            PercentileWindow::full(),
            AnalysisMode::Pooled,
        )
        .unwrap();
        let per = compute_violation(
            &set,
            &RaceModel::Standard,
            PercentileWindow::full(),
            AnalysisMode::PerParticipant,
        )
        .unwrap();

        assert_eq!(pooled.grid, per.grid);
        for i in 0..pooled.grid.len() {
            assert!((pooled.ecdf_av[i] - per.ecdf_av[i]).abs() < 1e-12);
            assert!((pooled.predicted[i] - per.predicted[i]).abs() < 1e-12);
        }
        assert!((pooled.summary - per.summary).abs() < 1e-12);
    }

    #[test]
    fn incomplete_participants_are_skipped_not_fatal() {
        let mut all = integrating_participant("p1");
        // p2 has audio only; must be skipped silently.
        all.extend(trials("p2", Modality::Audio, &[400.0, 420.0]));
        let set = TrialSet::new(all);

        let curves = compute_violation(
            &set,
            &RaceModel::Standard,
            PercentileWindow::full(),
            AnalysisMode::PerParticipant,
        )
        .unwrap();

        assert_eq!(curves.participants_used, 1);
        // p2's trials still stretch the shared grid bounds.
        assert_eq!(curves.grid.max(), 420.0);
    }

    #[test]
    fn averaging_across_participants() {
        let mut all = integrating_participant("p1");
        all.extend(integrating_participant("p2"));
        let set = TrialSet::new(all);

        let curves = compute_violation(
            &set,
            &RaceModel::Standard,
            PercentileWindow::full(),
            AnalysisMode::PerParticipant,
        )
        .unwrap();

        // Identical participants: the average equals the individual curves.
        let single = compute_violation(
            &set.participant_view("p1"),
            &RaceModel::Standard,
            PercentileWindow::full(),
            AnalysisMode::PerParticipant,
        )
        .unwrap();

        assert_eq!(curves.participants_used, 2);
        for i in 0..curves.grid.len() {
            assert!((curves.ecdf_av[i] - single.ecdf_av[i]).abs() < 1e-12);
            assert!((curves.violations[i] - single.violations[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn participant_value_is_windowed_positive_sum() {
        let set = TrialSet::new(integrating_participant("p1"));
        let value = participant_violation_value(
            &set,
            &RaceModel::Standard,
            PercentileWindow::full(),
            AnalysisMode::PerParticipant,
        )
        .unwrap();

        let curves = compute_violation(
            &set,
            &RaceModel::Standard,
            PercentileWindow::full(),
            AnalysisMode::PerParticipant,
        )
        .unwrap();
        let expected: f64 = curves.violations.iter().sum();
        assert!((value - expected).abs() < 1e-9);
        assert!(value > 0.0);
    }

    #[test]
    fn participant_value_requires_all_modalities() {
        let mut all = trials("p1", Modality::Audio, &[200.0, 220.0]);
        all.extend(trials("p1", Modality::Visual, &[210.0, 230.0]));
        let set = TrialSet::new(all);
        assert!(participant_violation_value(
            &set,
            &RaceModel::Standard,
            PercentileWindow::full(),
            AnalysisMode::PerParticipant,
        )
        .is_none());
    }
}
