//! Geometric baseline distribution.

use std::collections::BTreeMap;

use crate::distance::Bucket;
use crate::error::DistributionError;

use super::{Distribution, DistributionStrategy, Result, DEFAULT_DECAY};

/// Assigns each bucket `decay^rank` before normalisation, so mass strictly
/// decreases as the bucket distance grows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometricDistribution {
    decay: f64,
}

impl Default for GeometricDistribution {
    fn default() -> Self {
        Self {
            decay: DEFAULT_DECAY,
        }
    }
}

impl GeometricDistribution {
    /// Creates the baseline with a decay ratio in the open interval (0, 1).
    pub fn new(decay: f64) -> Result<Self> {
        if !(decay > 0.0 && decay < 1.0) {
            return Err(DistributionError::InvalidDecay(decay));
        }
        Ok(Self { decay })
    }

    /// The decay ratio between neighbouring buckets.
    pub fn decay(&self) -> f64 {
        self.decay
    }
}

impl DistributionStrategy for GeometricDistribution {
    fn name(&self) -> &'static str {
        "GEOMETRIC"
    }

    fn create_distribution(&self, buckets: &[Bucket]) -> Result<Distribution> {
        let mut weight = 1.0;
        let mut mass = BTreeMap::new();
        for &bucket in buckets {
            // Below the smallest normal f64 the tail would round to zero mass.
            if weight < f64::MIN_POSITIVE {
                return Err(DistributionError::DecayUnderflow {
                    decay: self.decay,
                    buckets: buckets.len(),
                });
            }
            mass.insert(bucket, weight);
            weight *= self.decay;
        }
        Distribution::normalized(mass)
    }
}
