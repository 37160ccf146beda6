//! Core types for trial-level reaction-time data.

use serde::{Deserialize, Serialize};

/// Stimulus modality of a trial.
///
/// Trial tables encode modality as an integer column: 1 = Audio, 2 = Visual,
/// 3 = Audiovisual. Rows with any other code are rejected at the data
/// boundary; the engine itself never sees an unknown modality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modality {
    /// Auditory-only stimulus.
    Audio,
    /// Visual-only stimulus.
    Visual,
    /// Combined audiovisual stimulus.
    Audiovisual,
}

impl Modality {
    /// All three modalities, in wire-code order.
    pub const ALL: [Modality; 3] = [Modality::Audio, Modality::Visual, Modality::Audiovisual];

    /// Parse the integer wire code used in trial tables.
    pub fn from_code(code: i64) -> Option<Modality> {
        match code {
            1 => Some(Modality::Audio),
            2 => Some(Modality::Visual),
            3 => Some(Modality::Audiovisual),
            _ => None,
        }
    }

    /// The integer wire code for this modality.
    pub fn code(&self) -> i64 {
        match self {
            Modality::Audio => 1,
            Modality::Visual => 2,
            Modality::Audiovisual => 3,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Modality::Audio => "Audio",
            Modality::Visual => "Visual",
            Modality::Audiovisual => "Audiovisual",
        }
    }
}

impl std::fmt::Display for Modality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A single reaction-time trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    /// Participant identifier, as it appears in the source table.
    pub participant: String,
    /// Stimulus modality.
    pub modality: Modality,
    /// Reaction time in milliseconds. Positive and finite.
    pub rt_ms: f64,
}

impl Trial {
    /// Construct a trial.
    pub fn new(participant: impl Into<String>, modality: Modality, rt_ms: f64) -> Self {
        Self {
            participant: participant.into(),
            modality,
            rt_ms,
        }
    }
}

/// How the violation curves are aggregated across participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnalysisMode {
    /// Compute per-participant curves on a shared grid and average them.
    ///
    /// Participants without at least two trials in each modality are
    /// silently skipped. Preferred for reporting.
    #[default]
    PerParticipant,
    /// Pool all qualifying trials across participants into one sample per
    /// modality.
    Pooled,
}

/// A covariate cell attached to a trial row.
///
/// Covariate columns (age, demographics, custom columns) are carried
/// alongside trials so participant-level filters and factor extraction can
/// reach them without a second table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Covariate {
    /// Numeric value.
    Numeric(f64),
    /// Free-text / categorical value.
    Text(String),
    /// Missing cell.
    Missing,
}

impl Covariate {
    /// Numeric view of the cell, if it parses as a number.
    ///
    /// Text cells are parsed leniently; NaN counts as missing.
    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            Covariate::Numeric(v) if v.is_finite() => Some(*v),
            Covariate::Numeric(_) => None,
            Covariate::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            Covariate::Missing => None,
        }
    }

    /// Text view of the cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Covariate::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Whether the cell is missing.
    pub fn is_missing(&self) -> bool {
        matches!(self, Covariate::Missing)
    }
}
