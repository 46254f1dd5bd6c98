//! Mirrored geometric distribution.

use std::collections::BTreeMap;

use crate::distance::Bucket;

use super::{Distribution, DistributionStrategy, GeometricDistribution, Result};

/// The geometric baseline mirrored across the bucket sequence: the bucket at
/// rank `i` receives the mass the baseline gives to rank `n - 1 - i`, so the
/// far buckets are the likely ones.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InverseGeometricDistribution {
    baseline: GeometricDistribution,
}

impl InverseGeometricDistribution {
    /// Mirrors the given baseline.
    pub fn new(baseline: GeometricDistribution) -> Self {
        Self { baseline }
    }
}

impl DistributionStrategy for InverseGeometricDistribution {
    fn name(&self) -> &'static str {
        "INVERSEGEOMETRIC"
    }

    fn create_distribution(&self, buckets: &[Bucket]) -> Result<Distribution> {
        let original = self.baseline.create_distribution(buckets)?;
        let n = buckets.len();

        let mut mass = BTreeMap::new();
        for (i, &bucket) in buckets.iter().enumerate() {
            let mirrored = buckets[n - 1 - i];
            mass.insert(mirrored, original.probability(bucket));
        }
        Distribution::normalized(mass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::SUM_TOLERANCE;

    #[test]
    fn test_mirrors_baseline() {
        let all: Vec<Bucket> = [0, 1, 2, 4, 9].into_iter().map(Bucket).collect();
        let baseline = GeometricDistribution::new(0.6).unwrap();
        let base = baseline.create_distribution(&all).unwrap();
        let mirrored = InverseGeometricDistribution::new(baseline)
            .create_distribution(&all)
            .unwrap();

        let n = all.len();
        for i in 0..n {
            let got = mirrored.probability(all[i]);
            let want = base.probability(all[n - 1 - i]);
            assert!((got - want).abs() < SUM_TOLERANCE, "rank {i}: {got} != {want}");
        }
        assert!((mirrored.total() - 1.0).abs() < SUM_TOLERANCE);
    }

    #[test]
    fn test_favours_far_end() {
        let all: Vec<Bucket> = (0..4).map(Bucket).collect();
        let dist = InverseGeometricDistribution::default()
            .create_distribution(&all)
            .unwrap();
        assert!(dist.probability(Bucket(3)) > dist.probability(Bucket(0)));
    }
}
