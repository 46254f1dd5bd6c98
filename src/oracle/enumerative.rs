//! Exhaustive-enumeration oracle for small models.

use std::collections::{BTreeMap, BTreeSet};

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::coverage::Candidate;
use crate::distance::{bucket_of, Bucket, DistanceSpace};
use crate::error::ModelError;
use crate::model::{Configuration, FeatureModel, VariabilityModel};

use super::ConfigurationOracle;

/// Largest model the enumerative oracle accepts (2^20 candidate assignments).
pub const MAX_ENUMERATED_OPTIONS: usize = 20;

/// Answers queries by enumerating every valid configuration up front.
///
/// Buckets use [`bucket_of`]: the number of selected options. The reference
/// configuration only decides where the scan of a bucket starts, so successive
/// answers for one bucket walk through it instead of restarting at the top.
#[derive(Debug, Clone)]
pub struct EnumerativeOracle {
    canonical: BTreeMap<Bucket, Vec<Configuration>>,
    by_bucket: BTreeMap<Bucket, Vec<Configuration>>,
    produced: BTreeMap<Bucket, BTreeSet<Configuration>>,
    queries: usize,
    cache_clears: usize,
}

impl EnumerativeOracle {
    /// Enumerates every valid configuration of `model`.
    pub fn new(model: &VariabilityModel) -> Result<Self, ModelError> {
        let options = model.binary_options();
        if options.len() > MAX_ENUMERATED_OPTIONS {
            return Err(ModelError::TooManyOptions {
                count: options.len(),
                limit: MAX_ENUMERATED_OPTIONS,
            });
        }

        let mut canonical: BTreeMap<Bucket, Vec<Configuration>> = BTreeMap::new();
        for assignment in 0u64..(1u64 << options.len()) {
            let config: Configuration = options
                .iter()
                .enumerate()
                .filter(|(bit, _)| assignment & (1 << bit) != 0)
                .map(|(_, o)| o.clone())
                .collect();
            if model.is_valid(&config) {
                canonical.entry(bucket_of(&config)).or_default().push(config);
            }
        }

        debug!(
            model = model.name(),
            valid = canonical.values().map(Vec::len).sum::<usize>(),
            buckets = canonical.len(),
            "Enumerated configuration space"
        );

        Ok(Self {
            by_bucket: canonical.clone(),
            canonical,
            produced: BTreeMap::new(),
            queries: 0,
            cache_clears: 0,
        })
    }

    /// Every valid configuration, grouped by bucket in ascending order.
    pub fn valid_configurations(&self) -> impl Iterator<Item = &Configuration> {
        self.by_bucket.values().flatten()
    }

    /// Number of valid configurations.
    pub fn population(&self) -> usize {
        self.by_bucket.values().map(Vec::len).sum()
    }

    /// Buckets reached by at least one valid configuration.
    pub fn distance_space(&self) -> DistanceSpace {
        DistanceSpace::from_buckets(self.by_bucket.keys().copied())
    }

    /// Queries answered since construction.
    pub fn queries(&self) -> usize {
        self.queries
    }

    /// Times the per-run cache was released.
    pub fn cache_clears(&self) -> usize {
        self.cache_clears
    }
}

impl ConfigurationOracle for EnumerativeOracle {
    fn generate(
        &mut self,
        mandatory: &Candidate,
        bucket: Bucket,
        reference: Option<&Configuration>,
    ) -> Option<Configuration> {
        self.queries += 1;

        let pool = self.by_bucket.get(&bucket)?;
        let produced = self.produced.entry(bucket).or_default();
        let start = reference
            .and_then(|r| pool.iter().position(|c| c == r))
            .map(|p| p + 1)
            .unwrap_or(0);

        let found = (0..pool.len())
            .map(|offset| &pool[(start + offset) % pool.len()])
            .find(|c| mandatory.is_contained_in(c) && !produced.contains(*c))?
            .clone();
        produced.insert(found.clone());
        Some(found)
    }

    fn clear_cache(&mut self) {
        self.produced.clear();
        self.cache_clears += 1;
    }

    fn set_seed(&mut self, seed: u64) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.by_bucket = self.canonical.clone();
        for pool in self.by_bucket.values_mut() {
            pool.shuffle(&mut rng);
        }
    }
}
