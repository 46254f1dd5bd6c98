//! Diverse, distribution-conforming configuration selection.
//!
//! The engine closes the loop between the coverage tracker, the target
//! distribution and the constraint oracle:
//!
//! 1. Pick the least represented live candidate
//! 2. Draw a bucket from that candidate's private copy of the distribution
//! 3. Ask the oracle for a configuration containing the candidate at that bucket
//! 4. On success, accept it and update the coverage weights; on failure, mark
//!    the (candidate, bucket) pair exhausted and renormalise the candidate's copy
//!
//! The run stops when the requested count is reached or every candidate is
//! exhausted. Ending short is not an error; it is reported through a
//! [`ShortfallReporter`] and the partial sample is returned.
//!
//! # Example
//!
//! ```rust,ignore
//! use spl_sampler::selection::{DiverseSelection, TracingReporter};
//!
//! let engine = DiverseSelection::new().with_seed(42);
//! let outcome = engine.sample(20, &target, &space, candidates, &mut oracle, &mut TracingReporter)?;
//! println!("sampled {} of {}", outcome.configurations.len(), outcome.requested);
//! ```

pub mod report;

pub use report::{CollectingReporter, ShortfallReporter, TracingReporter};

use std::collections::{BTreeMap, BTreeSet};

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::SamplerSettings;
use crate::coverage::{derive_candidates, Candidate, CoverageTracker};
use crate::distance::{Bucket, DistanceSpace, ExhaustionMask};
use crate::distribution::Distribution;
use crate::error::{DistributionError, SamplingError};
use crate::model::{Configuration, FeatureModel};
use crate::oracle::ConfigurationOracle;

/// Result type alias for selection operations.
pub type Result<T> = std::result::Result<T, SamplingError>;

/// The sample produced by one run, in discovery order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleOutcome {
    /// Accepted configurations.
    pub configurations: Vec<Configuration>,
    /// Bucket each configuration was drawn for, parallel to `configurations`.
    pub buckets: Vec<Bucket>,
    /// The number of configurations asked for.
    pub requested: usize,
    /// Oracle queries issued.
    pub oracle_queries: usize,
    /// (candidate, bucket) pairs proven exhausted.
    pub exhausted_pairs: usize,
    /// Candidates removed because every bucket was exhausted for them.
    pub removed_candidates: usize,
}

impl SampleOutcome {
    fn empty(requested: usize) -> Self {
        Self {
            configurations: Vec::new(),
            buckets: Vec::new(),
            requested,
            oracle_queries: 0,
            exhausted_pairs: 0,
            removed_candidates: 0,
        }
    }

    /// Returns true if the requested count was reached.
    pub fn is_complete(&self) -> bool {
        self.configurations.len() >= self.requested
    }

    /// How many configurations are missing from the requested count.
    pub fn shortfall(&self) -> usize {
        self.requested.saturating_sub(self.configurations.len())
    }
}

/// Per-candidate state owned by a single run.
struct CandidateState {
    distribution: Distribution,
    mask: ExhaustionMask,
}

impl CandidateState {
    /// Copies the target and pre-exhausts buckets the target gives no mass.
    fn new(target: &Distribution, space: &DistanceSpace) -> Self {
        let mut mask = ExhaustionMask::new(space.len());
        for (index, bucket) in space.buckets().iter().enumerate() {
            if target.probability(*bucket) <= 0.0 {
                mask.mark(index);
            }
        }
        Self {
            distribution: target.clone(),
            mask,
        }
    }
}

/// Diverse selection engine.
///
/// Holds only run parameters; all mutable state is created per call to
/// [`sample`](DiverseSelection::sample), so one engine can serve many runs.
#[derive(Debug, Clone)]
pub struct DiverseSelection {
    /// Random seed for reproducibility (None = non-deterministic).
    seed: Option<u64>,

    /// Weight added to a candidate each time an accepted configuration contains it.
    weight_increment: u64,

    /// Starting weights for selected candidates; all others start at zero.
    initial_weights: BTreeMap<Candidate, u64>,
}

impl Default for DiverseSelection {
    fn default() -> Self {
        Self::new()
    }
}

impl DiverseSelection {
    /// Creates an unseeded engine with unit weight increments.
    pub fn new() -> Self {
        Self {
            seed: None,
            weight_increment: 1,
            initial_weights: BTreeMap::new(),
        }
    }

    /// Creates an engine from validated settings.
    pub fn from_settings(settings: &SamplerSettings) -> Self {
        Self {
            seed: settings.seed,
            weight_increment: settings.weight_increment,
            initial_weights: BTreeMap::new(),
        }
    }

    /// Sets a random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the coverage weight increment.
    pub fn with_weight_increment(mut self, increment: u64) -> Self {
        self.weight_increment = increment;
        self
    }

    /// Starts `candidate` at `weight` instead of zero, so it is picked only once
    /// the others have caught up. Candidates not in the run are ignored.
    pub fn with_initial_weight(mut self, candidate: Candidate, weight: u64) -> Self {
        self.initial_weights.insert(candidate, weight);
        self
    }

    /// The configured seed.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Samples up to `count` configurations.
    ///
    /// # Arguments
    ///
    /// * `count` - Number of configurations wanted.
    /// * `target` - Target distribution over the buckets of `space`.
    /// * `space` - Achievable buckets, fixed for the run.
    /// * `candidates` - Coverage candidates in tie-break order.
    /// * `oracle` - Constraint oracle; its cache is cleared once when the run ends.
    /// * `reporter` - Receives one line if the run ends short.
    ///
    /// # Errors
    ///
    /// - [`SamplingError::EmptyCandidates`] before any work if `candidates` is empty.
    /// - [`SamplingError::InvariantViolation`] if a drawn bucket is exhausted for
    ///   its candidate or missing from `space`.
    /// - [`SamplingError::NoProbabilityMass`] if a candidate with live buckets has
    ///   nothing left to draw from.
    /// - [`SamplingError::OracleContract`] if the oracle returns a configuration
    ///   without the mandatory options or one already produced for the bucket.
    pub fn sample<O, R>(
        &self,
        count: usize,
        target: &Distribution,
        space: &DistanceSpace,
        candidates: Vec<Candidate>,
        oracle: &mut O,
        reporter: &mut R,
    ) -> Result<SampleOutcome>
    where
        O: ConfigurationOracle + ?Sized,
        R: ShortfallReporter + ?Sized,
    {
        if candidates.is_empty() {
            return Err(SamplingError::EmptyCandidates);
        }

        info!(
            count,
            candidates = candidates.len(),
            buckets = space.len(),
            seed = ?self.seed,
            "Starting diverse selection"
        );

        let outcome = self.run(count, target, space, candidates, oracle);
        oracle.clear_cache();
        let outcome = outcome?;

        if !outcome.is_complete() {
            reporter.report(&format!(
                "Sampled only {} of {} configurations as there are no more configurations.",
                outcome.configurations.len(),
                outcome.requested
            ));
        }

        info!(
            sampled = outcome.configurations.len(),
            requested = outcome.requested,
            queries = outcome.oracle_queries,
            exhausted_pairs = outcome.exhausted_pairs,
            "Diverse selection finished"
        );

        Ok(outcome)
    }

    fn run<O>(
        &self,
        count: usize,
        target: &Distribution,
        space: &DistanceSpace,
        candidates: Vec<Candidate>,
        oracle: &mut O,
    ) -> Result<SampleOutcome>
    where
        O: ConfigurationOracle + ?Sized,
    {
        let mut outcome = SampleOutcome::empty(count);
        let mut rng = self.create_rng();
        if let Some(seed) = self.seed {
            oracle.set_seed(seed);
        }

        let mut tracker = CoverageTracker::new(candidates)
            .with_initial_weights(|c| self.initial_weights.get(c).copied().unwrap_or(0));
        let mut states: Vec<CandidateState> = (0..tracker.len())
            .map(|_| CandidateState::new(target, space))
            .collect();
        let mut latest: Vec<Option<Configuration>> = vec![None; space.len()];
        let mut produced: Vec<BTreeSet<Configuration>> = vec![BTreeSet::new(); space.len()];

        while outcome.configurations.len() < count {
            let Some(index) = tracker.least_weighted() else {
                break;
            };
            let state = &mut states[index];

            if !state.mask.has_live() {
                tracker.remove(index);
                debug!(
                    candidate = %tracker.candidate(index),
                    remaining = tracker.live_count(),
                    "Candidate exhausted, removed"
                );
                outcome.removed_candidates += 1;
                continue;
            }

            let candidate = tracker.candidate(index).clone();
            let draw: f64 = rng.random();
            let bucket = state
                .distribution
                .sample(draw)
                .ok_or_else(|| SamplingError::NoProbabilityMass {
                    candidate: candidate.to_string(),
                })?;
            let position = space
                .index_of(bucket)
                .ok_or_else(|| invariant(&candidate, bucket, "bucket is not in the distance space"))?;
            if state.mask.is_exhausted(position) {
                return Err(invariant(&candidate, bucket, "bucket is already exhausted"));
            }

            outcome.oracle_queries += 1;
            let answer = oracle.generate(&candidate, bucket, latest[position].as_ref());

            let Some(config) = answer else {
                state.mask.mark(position);
                outcome.exhausted_pairs += 1;
                match state.distribution.zero_out(bucket) {
                    Ok(()) => {}
                    Err(DistributionError::ZeroMass) if !state.mask.has_live() => {}
                    Err(DistributionError::ZeroMass) => {
                        return Err(invariant(
                            &candidate,
                            bucket,
                            "distribution lost all mass while buckets remain live",
                        ));
                    }
                    Err(e) => return Err(e.into()),
                }
                debug!(
                    candidate = %candidate,
                    bucket = bucket.value(),
                    live = state.mask.live_count(),
                    "Bucket exhausted for candidate"
                );
                continue;
            };

            if !candidate.is_contained_in(&config) {
                return Err(SamplingError::OracleContract {
                    candidate: candidate.to_string(),
                    bucket: bucket.value(),
                    reason: format!("{config} lacks a mandatory option"),
                });
            }
            if !produced[position].insert(config.clone()) {
                return Err(SamplingError::OracleContract {
                    candidate: candidate.to_string(),
                    bucket: bucket.value(),
                    reason: format!("{config} was already produced for this bucket"),
                });
            }

            tracker.record(&config, self.weight_increment);
            latest[position] = Some(config.clone());
            outcome.configurations.push(config);
            outcome.buckets.push(bucket);
        }

        Ok(outcome)
    }

    /// Creates a random number generator.
    fn create_rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        }
    }
}

fn invariant(candidate: &Candidate, bucket: Bucket, reason: &str) -> SamplingError {
    SamplingError::InvariantViolation {
        candidate: candidate.to_string(),
        bucket: bucket.value(),
        reason: reason.to_string(),
    }
}

/// Runs the engine end to end for a feature model.
///
/// Derives candidates up to the configured interaction depth, builds the
/// configured target distribution over `space`, and samples `settings.count`
/// configurations from `oracle`.
pub fn sample_model<M, O, R>(
    model: &M,
    settings: &SamplerSettings,
    space: &DistanceSpace,
    oracle: &mut O,
    reporter: &mut R,
) -> Result<SampleOutcome>
where
    M: FeatureModel + ?Sized,
    O: ConfigurationOracle + ?Sized,
    R: ShortfallReporter + ?Sized,
{
    let strategy = settings.distribution.strategy(settings.decay)?;
    let target = strategy.create_distribution(space.buckets())?;
    let candidates = derive_candidates(model, settings.interaction_depth);

    debug!(
        strategy = strategy.name(),
        candidates = candidates.len(),
        "Prepared sampling run"
    );

    DiverseSelection::from_settings(settings).sample(
        settings.count,
        &target,
        space,
        candidates,
        oracle,
        reporter,
    )
}
