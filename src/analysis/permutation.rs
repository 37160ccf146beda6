//! Permutation significance test for race-model violations.
//!
//! If modality labels carry no information, reshuffling reaction times
//! across them should produce violations as large as the observed one about
//! as often as chance allows. The test pools the unit's RTs across the
//! three modalities, reshuffles K times, re-partitions each shuffle into
//! segments of the original per-modality sample sizes, and recomputes the
//! mean violation magnitude over the full grid with the same model variant
//! and parameters as the observed computation. The one-sided p-value is the
//! fraction of permuted values at or above the observed value.
//!
//! Pooling is shuffle-invariant, so the RT grid is built once from the
//! pooled sample and shared by the observed and every permuted replicate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::config::{PercentileWindow, PermutationConfig};
use crate::constants::{DEFAULT_SEED, MIN_TRIALS_PER_MODALITY};
use crate::data::TrialSet;
use crate::grid::RtGrid;
use crate::models::RaceModel;
use crate::result::{IndeterminateReason, PermutationOutcome};
use crate::statistics::ecdf_on_grid;
use crate::types::Modality;

/// Cooperative cancellation token for the permutation loop.
///
/// The loop checks the token between iterations; cancelling never
/// interrupts an iteration in flight.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Status of a cancellable permutation run.
#[derive(Debug, Clone, PartialEq)]
pub enum PermutationStatus {
    /// All iterations ran; the outcome is final.
    Completed(PermutationOutcome),
    /// The token was cancelled mid-loop.
    Cancelled {
        /// Iterations finished before cancellation.
        completed: usize,
    },
}

/// Run the permutation test synchronously to completion.
///
/// Returns the indeterminate reason when the unit lacks the data for an
/// observed statistic in the first place. Configuration is assumed
/// validated by the caller; every iteration is guaranteed to succeed given
/// valid inputs because it reuses the already-validated sample sizes.
pub fn permutation_test(
    set: &TrialSet,
    model: &RaceModel,
    config: &PermutationConfig,
) -> Result<PermutationOutcome, IndeterminateReason> {
    let status = run(set, model, config, None, &mut |_, _| {})?;
    match status {
        PermutationStatus::Completed(outcome) => Ok(outcome),
        PermutationStatus::Cancelled { .. } => unreachable!("no token was supplied"),
    }
}

/// Run the permutation test with a cancellation token and a progress hook.
///
/// `progress` is called after each iteration with `(done, total)`; the host
/// may use it to interleave reporting between iterations.
pub fn permutation_test_cancellable(
    set: &TrialSet,
    model: &RaceModel,
    config: &PermutationConfig,
    token: &CancelToken,
    progress: &mut dyn FnMut(usize, usize),
) -> Result<PermutationStatus, IndeterminateReason> {
    run(set, model, config, Some(token), progress)
}

fn run(
    set: &TrialSet,
    model: &RaceModel,
    config: &PermutationConfig,
    token: Option<&CancelToken>,
    progress: &mut dyn FnMut(usize, usize),
) -> Result<PermutationStatus, IndeterminateReason> {
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

    let (n_a, n_v) = (rt_a.len(), rt_v.len());

    let mut pooled: Vec<f64> = Vec::with_capacity(rt_a.len() + rt_v.len() + rt_av.len());
    pooled.extend(&rt_a);
    pooled.extend(&rt_v);
    pooled.extend(&rt_av);

    let grid = RtGrid::from_rts(pooled.iter().copied())
        .ok_or(IndeterminateReason::DegenerateRtRange)?;

    let observed = mean_violation(&rt_a, &rt_v, &rt_av, model, &grid)
        .ok_or(IndeterminateReason::DegenerateRtRange)?;

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(config.seed.unwrap_or(DEFAULT_SEED));
    let mut null_distribution = Vec::with_capacity(config.iterations);
    let mut exceedances = 0usize;

    for iteration in 0..config.iterations {
        if let Some(token) = token {
            if token.is_cancelled() {
                return Ok(PermutationStatus::Cancelled {
                    completed: iteration,
                });
            }
        }

        pooled.shuffle(&mut rng);
        let (perm_a, rest) = pooled.split_at(n_a);
        let (perm_v, perm_av) = rest.split_at(n_v);

        // Sample sizes and therefore ECDF viability are preserved by the
        // re-partition; the grid is shuffle-invariant.
        let permuted = mean_violation(perm_a, perm_v, perm_av, model, &grid)
            .expect("validated sizes cannot fail");

        if permuted >= observed {
            exceedances += 1;
        }
        null_distribution.push(permuted);
        progress(iteration + 1, config.iterations);
    }

    let p_value = exceedances as f64 / config.iterations as f64;
    Ok(PermutationStatus::Completed(PermutationOutcome {
        observed,
        p_value,
        significant: p_value < config.alpha,
        alpha: config.alpha,
        null_distribution,
    }))
}

/// Mean violation magnitude over the full grid for one partition.
fn mean_violation(
    rt_a: &[f64],
    rt_v: &[f64],
    rt_av: &[f64],
    model: &RaceModel,
    grid: &RtGrid,
) -> Option<f64> {
    let ecdf_a = ecdf_on_grid(rt_a, grid)?;
    let ecdf_v = ecdf_on_grid(rt_v, grid)?;
    let ecdf_av = ecdf_on_grid(rt_av, grid)?;
    let predicted = model.predict(&ecdf_a, &ecdf_v, grid);

    let violations: Vec<f64> = ecdf_av
        .values()
        .iter()
        .zip(&predicted)
        .map(|(&obs, &pred)| (obs - pred).max(0.0))
        .collect();
    Some(super::violation::windowed_mean(
        &violations,
        PercentileWindow::full(),
    ))
}
