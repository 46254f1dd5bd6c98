//! Distance space for distribution-aware sampling.
//!
//! Configurations are stratified into buckets by a distance metric. The set
//! of buckets that valid configurations actually reach is computed once per
//! run and stays fixed while the engine samples.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::model::Configuration;

/// A discrete distance value.
///
/// Only boolean options take part in sampling, so distances are whole numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Bucket(pub u32);

impl Bucket {
    /// The raw distance value.
    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Bucket {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Distance of a configuration from the empty configuration: the number of
/// selected options.
pub fn bucket_of(config: &Configuration) -> Bucket {
    Bucket(u32::try_from(config.len()).unwrap_or(u32::MAX))
}

/// The ordered set of achievable buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistanceSpace {
    buckets: Vec<Bucket>,
}

impl DistanceSpace {
    /// Builds a space from arbitrary bucket values; duplicates are dropped and
    /// the result is sorted ascending.
    pub fn from_buckets(buckets: impl IntoIterator<Item = Bucket>) -> Self {
        let unique: BTreeSet<Bucket> = buckets.into_iter().collect();
        Self {
            buckets: unique.into_iter().collect(),
        }
    }

    /// Builds the space reached by the given (valid) configurations.
    pub fn from_configurations<'a>(configs: impl IntoIterator<Item = &'a Configuration>) -> Self {
        Self::from_buckets(configs.into_iter().map(bucket_of))
    }

    /// Buckets in ascending order.
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    /// Position of `bucket` in the ordered space.
    pub fn index_of(&self, bucket: Bucket) -> Option<usize> {
        self.buckets.binary_search(&bucket).ok()
    }

    /// Returns true if `bucket` is achievable.
    pub fn contains(&self, bucket: Bucket) -> bool {
        self.index_of(bucket).is_some()
    }

    /// Number of buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns true if no bucket is achievable.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Per-candidate record of buckets proven to hold no further configurations.
///
/// Indexed by bucket position in the [`DistanceSpace`]. Marks are permanent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExhaustionMask {
    exhausted: Vec<bool>,
}

impl ExhaustionMask {
    /// Creates a mask with every bucket live.
    pub fn new(len: usize) -> Self {
        Self {
            exhausted: vec![false; len],
        }
    }

    /// Marks the bucket at `index` exhausted. Out-of-range indices are ignored.
    pub fn mark(&mut self, index: usize) {
        if let Some(slot) = self.exhausted.get_mut(index) {
            *slot = true;
        }
    }

    /// Returns true if the bucket at `index` is exhausted.
    ///
    /// Indices outside the mask count as exhausted.
    pub fn is_exhausted(&self, index: usize) -> bool {
        self.exhausted.get(index).copied().unwrap_or(true)
    }

    /// Returns true while at least one bucket is still live.
    pub fn has_live(&self) -> bool {
        self.exhausted.iter().any(|e| !e)
    }

    /// Number of live buckets.
    pub fn live_count(&self) -> usize {
        self.exhausted.iter().filter(|e| !**e).count()
    }
}
