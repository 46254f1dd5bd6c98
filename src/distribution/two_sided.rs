//! Two-sided geometric distribution.

use std::collections::BTreeMap;

use crate::distance::Bucket;

use super::{Distribution, DistributionStrategy, GeometricDistribution, Result};

/// Sums the geometric baseline with its mirror: rank `i` gets
/// `baseline[i] + baseline[n - 1 - i]`, favouring both extremes over the middle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TwoSidedGeometricDistribution {
    baseline: GeometricDistribution,
}

impl TwoSidedGeometricDistribution {
    /// Builds on the given baseline.
    pub fn new(baseline: GeometricDistribution) -> Self {
        Self { baseline }
    }
}

impl DistributionStrategy for TwoSidedGeometricDistribution {
    fn name(&self) -> &'static str {
        "TWOSIDEDGEOMETRIC"
    }

    fn create_distribution(&self, buckets: &[Bucket]) -> Result<Distribution> {
        let original = self.baseline.create_distribution(buckets)?;
        let n = buckets.len();

        let mut mass = BTreeMap::new();
        for (i, &bucket) in buckets.iter().enumerate() {
            let mirrored = buckets[n - 1 - i];
            mass.insert(
                bucket,
                original.probability(bucket) + original.probability(mirrored),
            );
        }
        Distribution::normalized(mass)
    }
}
