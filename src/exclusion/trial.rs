//! Trial-level exclusion criteria.
//!
//! Each criterion is optional and judged within a participant × modality
//! cell, so a slow participant's trials are compared against that
//! participant's own distribution. A trial is excluded if it matches ANY
//! enabled criterion in an enabled modality.

use serde::{Deserialize, Serialize};

use crate::data::TrialSet;
use crate::statistics::{percent_deviation_from_median, zscores};
use crate::types::Modality;

/// Which modalities a trial filter applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalityMask {
    /// Apply to audio trials.
    pub audio: bool,
    /// Apply to visual trials.
    pub visual: bool,
    /// Apply to audiovisual trials.
    pub audiovisual: bool,
}

impl Default for ModalityMask {
    fn default() -> Self {
        ModalityMask::all()
    }
}

impl ModalityMask {
    /// All three modalities enabled.
    pub fn all() -> Self {
        ModalityMask {
            audio: true,
            visual: true,
            audiovisual: true,
        }
    }

    /// Whether the mask enables a modality.
    pub fn contains(&self, modality: Modality) -> bool {
        match modality {
            Modality::Audio => self.audio,
            Modality::Visual => self.visual,
            Modality::Audiovisual => self.audiovisual,
        }
    }

    /// Whether no modality is enabled.
    pub fn is_empty(&self) -> bool {
        !(self.audio || self.visual || self.audiovisual)
    }
}

/// Trial-level filter settings.
///
/// Default: no criteria enabled, all modalities in scope — a no-op filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrialFilter {
    /// Exclude trials faster than this RT (milliseconds).
    pub rt_min: Option<f64>,
    /// Exclude trials slower than this RT (milliseconds).
    pub rt_max: Option<f64>,
    /// Exclude trials with `|z| > threshold` within participant × modality.
    pub zscore_threshold: Option<f64>,
    /// Exclude trials deviating more than this percent from the
    /// participant × modality median RT.
    pub percent_deviation: Option<f64>,
    /// Modalities the criteria apply to.
    pub modalities: ModalityMask,
}

impl TrialFilter {
    /// A filter with no criteria enabled.
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether any criterion is enabled.
    pub fn is_active(&self) -> bool {
        !self.modalities.is_empty()
            && (self.rt_min.is_some()
                || self.rt_max.is_some()
                || self.zscore_threshold.is_some()
                || self.percent_deviation.is_some())
    }

    /// Row indices of trials to exclude, ascending.
    pub fn find_exclusions(&self, set: &TrialSet) -> Vec<usize> {
        if !self.is_active() {
            return Vec::new();
        }

        let mut excluded = vec![false; set.len()];

        // Range criteria are judged per trial.
        for (i, trial) in set.trials().iter().enumerate() {
            if !self.modalities.contains(trial.modality) {
                continue;
            }
            if let Some(min) = self.rt_min {
                if trial.rt_ms < min {
                    excluded[i] = true;
                }
            }
            if let Some(max) = self.rt_max {
                if trial.rt_ms > max {
                    excluded[i] = true;
                }
            }
        }

        // Distribution criteria are judged within each participant ×
        // modality cell.
        if self.zscore_threshold.is_some() || self.percent_deviation.is_some() {
            for participant in set.participants() {
                for modality in Modality::ALL {
                    if !self.modalities.contains(modality) {
                        continue;
                    }
                    let rows: Vec<usize> = set
                        .trials()
                        .iter()
                        .enumerate()
                        .filter(|(_, t)| t.participant == participant && t.modality == modality)
                        .map(|(i, _)| i)
                        .collect();
                    if rows.is_empty() {
                        continue;
                    }
                    let rts: Vec<f64> = rows.iter().map(|&i| set.trials()[i].rt_ms).collect();

                    if let Some(threshold) = self.zscore_threshold {
                        if let Some(z) = zscores(&rts) {
                            for (k, &row) in rows.iter().enumerate() {
                                if z[k].abs() > threshold {
                                    excluded[row] = true;
                                }
                            }
                        }
                    }
                    if let Some(threshold) = self.percent_deviation {
                        if let Some(dev) = percent_deviation_from_median(&rts) {
                            for (k, &row) in rows.iter().enumerate() {
                                if dev[k] > threshold {
                                    excluded[row] = true;
                                }
                            }
                        }
                    }
                }
            }
        }

        excluded
            .iter()
            .enumerate()
            .filter(|(_, &e)| e)
            .map(|(i, _)| i)
            .collect()
    }

    /// Copy of the set with matching trials removed.
    pub fn apply(&self, set: &TrialSet) -> TrialSet {
        let excluded = self.find_exclusions(set);
        if excluded.is_empty() {
            return set.clone();
        }
        set.filtered(|i, _| excluded.binary_search(&i).is_err())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Trial;

    fn set() -> TrialSet {
        TrialSet::new(vec![
            Trial::new("p1", Modality::Audio, 90.0),  // below any sane floor
            Trial::new("p1", Modality::Audio, 250.0),
            Trial::new("p1", Modality::Audio, 260.0),
            Trial::new("p1", Modality::Audio, 255.0),
            Trial::new("p1", Modality::Audio, 900.0), // far tail
            Trial::new("p1", Modality::Visual, 300.0),
            Trial::new("p1", Modality::Visual, 1500.0),
        ])
    }

    #[test]
    fn rt_range_criteria() {
        let filter = TrialFilter {
            rt_min: Some(100.0),
            rt_max: Some(1000.0),
            ..TrialFilter::none()
        };
        let excluded = filter.find_exclusions(&set());
        assert_eq!(excluded, vec![0, 6]);

        let kept = filter.apply(&set());
        assert_eq!(kept.len(), 5);
        assert!(kept.trials().iter().all(|t| t.rt_ms >= 100.0 && t.rt_ms <= 1000.0));
    }

    #[test]
    fn zscore_criterion_is_within_modality() {
        let filter = TrialFilter {
            zscore_threshold: Some(1.8),
            ..TrialFilter::none()
        };
        let excluded = filter.find_exclusions(&set());
        // The 900ms audio trial is the extreme point of its cell; the two
        // visual trials have |z| = 1 each and survive.
        assert!(excluded.contains(&4));
        assert!(!excluded.contains(&5));
        assert!(!excluded.contains(&6));
    }

    #[test]
    fn percent_deviation_criterion() {
        let filter = TrialFilter {
            percent_deviation: Some(100.0),
            ..TrialFilter::none()
        };
        let excluded = filter.find_exclusions(&set());
        // Audio median 255: the 900ms trial deviates ~253%, the 90ms trial ~65%.
        assert!(excluded.contains(&4));
        assert!(!excluded.contains(&0));
    }

    #[test]
    fn any_enabled_criterion_excludes() {
        let filter = TrialFilter {
            rt_min: Some(100.0),
            zscore_threshold: Some(1.8),
            ..TrialFilter::none()
        };
        let excluded = filter.find_exclusions(&set());
        assert!(excluded.contains(&0)); // rt_min
        assert!(excluded.contains(&4)); // zscore
    }

    #[test]
    fn modality_mask_limits_scope() {
        let filter = TrialFilter {
            rt_max: Some(1000.0),
            modalities: ModalityMask {
                audio: true,
                visual: false,
                audiovisual: false,
            },
            ..TrialFilter::none()
        };
        let excluded = filter.find_exclusions(&set());
        // The 1500ms visual trial is out of scope.
        assert!(!excluded.contains(&6));
    }

    #[test]
    fn inactive_filter_is_identity() {
        let filter = TrialFilter::none();
        assert!(!filter.is_active());
        assert_eq!(filter.apply(&set()), set());
    }
}
