//! The trial store: tabular trial data plus covariate columns.
//!
//! A [`TrialSet`] is an immutable-per-call view of an experiment's trials.
//! The engine never mutates one; every filter produces a new copy, so
//! discarding a filtered set and recomputing from the original is always a
//! full undo.

mod csv;

pub use csv::{drop_incomplete_participants, load_trials_csv};

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Covariate, Modality, Trial};

/// Errors that can occur while loading trial data.
#[derive(Debug)]
pub enum DataError {
    /// IO error reading the file.
    Io(std::io::Error),

    /// Malformed row at a specific line.
    Parse {
        /// Line number where the error occurred (1-indexed).
        line: usize,
        /// Description of the parse error.
        message: String,
    },

    /// A required column is missing from the header.
    MissingColumn {
        /// The column that was expected.
        name: &'static str,
        /// The columns that were actually found.
        found: Vec<String>,
    },

    /// A cell failed to parse as its required type.
    InvalidValue {
        /// Line number where the invalid value was found (1-indexed).
        line: usize,
        /// Column holding the invalid value.
        column: String,
        /// The offending cell content.
        value: String,
    },
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::Io(e) => write!(f, "IO error: {}", e),
            DataError::Parse { line, message } => {
                write!(f, "Parse error at line {}: {}", line, message)
            }
            DataError::MissingColumn { name, found } => {
                write!(f, "Missing column '{}'. Found columns: {:?}", name, found)
            }
            DataError::InvalidValue { line, column, value } => {
                write!(f, "Invalid value in column '{}' at line {}: '{}'", column, line, value)
            }
        }
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DataError {
    fn from(e: std::io::Error) -> Self {
        DataError::Io(e)
    }
}

/// A collection of trials with optional named covariate columns.
///
/// Covariate columns are aligned 1:1 with the trial rows. Filtering copies
/// both together, so covariates stay attached to their trials.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrialSet {
    trials: Vec<Trial>,
    covariates: BTreeMap<String, Vec<Covariate>>,
}

impl TrialSet {
    /// Create a trial set without covariate columns.
    pub fn new(trials: Vec<Trial>) -> Self {
        TrialSet {
            trials,
            covariates: BTreeMap::new(),
        }
    }

    /// Create a trial set with covariate columns.
    ///
    /// # Panics
    ///
    /// Panics if any column's length differs from the trial count.
    pub fn with_covariates(trials: Vec<Trial>, covariates: BTreeMap<String, Vec<Covariate>>) -> Self {
        for (name, column) in &covariates {
            assert_eq!(
                column.len(),
                trials.len(),
                "covariate column '{}' must align with trials",
                name
            );
        }
        TrialSet { trials, covariates }
    }

    /// Number of trials.
    pub fn len(&self) -> usize {
        self.trials.len()
    }

    /// Whether the set holds no trials.
    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    /// The trial rows.
    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    /// Names of the covariate columns.
    pub fn covariate_columns(&self) -> impl Iterator<Item = &str> {
        self.covariates.keys().map(String::as_str)
    }

    /// A covariate column, aligned with [`TrialSet::trials`].
    pub fn covariate(&self, name: &str) -> Option<&[Covariate]> {
        self.covariates.get(name).map(Vec::as_slice)
    }

    /// Unique participant ids in order of first appearance.
    pub fn participants(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for trial in &self.trials {
            if !seen.contains(&trial.participant.as_str()) {
                seen.push(trial.participant.as_str());
            }
        }
        seen
    }

    /// All reaction times in the set.
    pub fn all_rts(&self) -> impl Iterator<Item = f64> + '_ {
        self.trials.iter().map(|t| t.rt_ms)
    }

    /// Reaction times for one modality, across every participant.
    pub fn rts(&self, modality: Modality) -> Vec<f64> {
        self.trials
            .iter()
            .filter(|t| t.modality == modality)
            .map(|t| t.rt_ms)
            .collect()
    }

    /// Reaction times for one participant and modality.
    pub fn participant_rts(&self, participant: &str, modality: Modality) -> Vec<f64> {
        self.trials
            .iter()
            .filter(|t| t.participant == participant && t.modality == modality)
            .map(|t| t.rt_ms)
            .collect()
    }

    /// The first covariate cell recorded for a participant, if the column
    /// exists. Demographic columns repeat per row; the first row is
    /// authoritative.
    pub fn participant_covariate(&self, participant: &str, column: &str) -> Option<&Covariate> {
        let values = self.covariates.get(column)?;
        self.trials
            .iter()
            .position(|t| t.participant == participant)
            .map(|i| &values[i])
    }

    /// Whether the participant has at least one trial in every modality.
    pub fn has_full_coverage(&self, participant: &str) -> bool {
        Modality::ALL
            .iter()
            .all(|&m| self.trials.iter().any(|t| t.participant == participant && t.modality == m))
    }

    /// Copy of this set restricted to one participant.
    pub fn participant_view(&self, participant: &str) -> TrialSet {
        self.filtered(|_, trial| trial.participant == participant)
    }

    /// Copy of this set keeping only rows where `keep` returns true.
    ///
    /// The predicate receives the row index (for covariate-aware callers)
    /// and the trial. This is the one filtering primitive; the exclusion
    /// layer is built on it.
    pub fn filtered<F>(&self, mut keep: F) -> TrialSet
    where
        F: FnMut(usize, &Trial) -> bool,
    {
        let kept: Vec<usize> = self
            .trials
            .iter()
            .enumerate()
            .filter(|&(i, t)| keep(i, t))
            .map(|(i, _)| i)
            .collect();
        self.select(&kept)
    }

    /// Copy of this set keeping the given row indices, in order.
    pub fn select(&self, indices: &[usize]) -> TrialSet {
        let trials = indices.iter().map(|&i| self.trials[i].clone()).collect();
        let covariates = self
            .covariates
            .iter()
            .map(|(name, column)| {
                (name.clone(), indices.iter().map(|&i| column[i].clone()).collect())
            })
            .collect();
        TrialSet { trials, covariates }
    }
}
