//! CSV parsing for trial tables.
//!
//! The expected layout is the one produced by the experiment-export
//! tooling: a header row naming at least `participant_number`, `modality`
//! (integer codes 1/2/3), and `reaction_time` (milliseconds). Every other
//! column is carried along as a covariate.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::{DataError, TrialSet};
use crate::types::{Covariate, Modality, Trial};

const PARTICIPANT_COLUMN: &str = "participant_number";
const MODALITY_COLUMN: &str = "modality";
const RT_COLUMN: &str = "reaction_time";

/// Load a trial table from a CSV file.
///
/// # Errors
///
/// Returns `DataError` if the file cannot be read, a required column is
/// missing, a modality code is not 1/2/3, or a reaction time is not a
/// positive finite number.
pub fn load_trials_csv(path: &Path) -> Result<TrialSet, DataError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut lines = reader.lines();

    let header_line = match lines.next() {
        Some(line) => line?,
        None => {
            return Err(DataError::Parse {
                line: 1,
                message: "empty file".to_string(),
            })
        }
    };
    let header: Vec<String> = header_line.split(',').map(|h| h.trim().to_string()).collect();

    let find = |name: &'static str| -> Result<usize, DataError> {
        header
            .iter()
            .position(|h| h == name)
            .ok_or(DataError::MissingColumn {
                name,
                found: header.clone(),
            })
    };
    let participant_idx = find(PARTICIPANT_COLUMN)?;
    let modality_idx = find(MODALITY_COLUMN)?;
    let rt_idx = find(RT_COLUMN)?;

    let covariate_indices: Vec<(usize, &str)> = header
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != participant_idx && *i != modality_idx && *i != rt_idx)
        .map(|(i, name)| (i, name.as_str()))
        .collect();

    let mut trials = Vec::new();
    let mut covariates: BTreeMap<String, Vec<Covariate>> = covariate_indices
        .iter()
        .map(|(_, name)| (name.to_string(), Vec::new()))
        .collect();

    for (line_offset, line_result) in lines.enumerate() {
        let line_num = line_offset + 2; // 1-indexed, after the header
        let line = line_result?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let cells: Vec<&str> = line.split(',').map(str::trim).collect();
        if cells.len() != header.len() {
            return Err(DataError::Parse {
                line: line_num,
                message: format!("expected {} columns, got {}", header.len(), cells.len()),
            });
        }

        let participant = cells[participant_idx].to_string();

        let code: i64 = cells[modality_idx].parse().map_err(|_| DataError::InvalidValue {
            line: line_num,
            column: MODALITY_COLUMN.to_string(),
            value: cells[modality_idx].to_string(),
        })?;
        let modality = Modality::from_code(code).ok_or_else(|| DataError::InvalidValue {
            line: line_num,
            column: MODALITY_COLUMN.to_string(),
            value: cells[modality_idx].to_string(),
        })?;

        let rt_ms: f64 = cells[rt_idx].parse().map_err(|_| DataError::InvalidValue {
            line: line_num,
            column: RT_COLUMN.to_string(),
            value: cells[rt_idx].to_string(),
        })?;
        if !rt_ms.is_finite() || rt_ms <= 0.0 {
            return Err(DataError::InvalidValue {
                line: line_num,
                column: RT_COLUMN.to_string(),
                value: cells[rt_idx].to_string(),
            });
        }

        trials.push(Trial {
            participant,
            modality,
            rt_ms,
        });

        for &(idx, name) in &covariate_indices {
            let cell = cells[idx];
            let value = if cell.is_empty() {
                Covariate::Missing
            } else if let Ok(v) = cell.parse::<f64>() {
                Covariate::Numeric(v)
            } else {
                Covariate::Text(cell.to_string())
            };
            covariates.get_mut(name).expect("column preallocated").push(value);
        }
    }

    Ok(TrialSet::with_covariates(trials, covariates))
}

/// Drop participants without trials in all three modalities.
///
/// Applied once at load time; participants that cannot ever produce a
/// race-model result are removed up front. Returns the reduced set and the
/// ids that were dropped.
pub fn drop_incomplete_participants(set: &TrialSet) -> (TrialSet, Vec<String>) {
    let dropped: Vec<String> = set
        .participants()
        .into_iter()
        .filter(|p| !set.has_full_coverage(p))
        .map(String::from)
        .collect();

    if dropped.is_empty() {
        return (set.clone(), dropped);
    }

    let kept = set.filtered(|_, trial| !dropped.iter().any(|d| *d == trial.participant));
    (kept, dropped)
}
