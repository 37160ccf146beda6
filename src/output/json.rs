//! JSON serialization for analysis outcomes.

use crate::result::AnalysisOutcome;

/// Serialize an outcome to a compact JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for
/// `AnalysisOutcome`).
pub fn to_json(outcome: &AnalysisOutcome) -> Result<String, serde_json::Error> {
    serde_json::to_string(outcome)
}

/// Serialize an outcome to a pretty-printed JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for
/// `AnalysisOutcome`).
pub fn to_json_pretty(outcome: &AnalysisOutcome) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::RaceAnalyzer;
    use crate::data::TrialSet;
    use crate::result::IndeterminateReason;
    use crate::types::{Modality, Trial};

    fn completed_outcome() -> AnalysisOutcome {
        let mut trials = Vec::new();
        for i in 0..4 {
            let jitter = i as f64 * 20.0;
            trials.push(Trial::new("p1", Modality::Audio, 250.0 + jitter));
            trials.push(Trial::new("p1", Modality::Visual, 260.0 + jitter));
            trials.push(Trial::new("p1", Modality::Audiovisual, 190.0 + jitter));
        }
        RaceAnalyzer::new().analyze(&TrialSet::new(trials)).unwrap()
    }

    #[test]
    fn completed_serializes_with_curves() {
        let json = to_json(&completed_outcome()).unwrap();
        assert!(json.contains("Completed"));
        assert!(json.contains("\"summary\""));
        assert!(json.contains("\"predicted\""));
    }

    #[test]
    fn indeterminate_serializes_with_reason() {
        let outcome = AnalysisOutcome::Indeterminate(IndeterminateReason::MissingModality {
            modality: Modality::Visual,
        });
        let json = to_json(&outcome).unwrap();
        assert!(json.contains("Indeterminate"));
        assert!(json.contains("MissingModality"));
        assert!(json.contains("Visual"));
    }

    #[test]
    fn pretty_output_is_multiline() {
        let json = to_json_pretty(&completed_outcome()).unwrap();
        assert!(json.contains('\n'));
        assert!(json.contains("participants_used"));
    }
}
