//! Violation computation, significance testing, and factor extraction.

pub mod factors;
pub mod permutation;
pub mod violation;

pub use factors::{factor_value, Factor};
pub use permutation::{
    permutation_test, permutation_test_cancellable, CancelToken, PermutationStatus,
};
pub use violation::{compute_violation, participant_violation_value};
