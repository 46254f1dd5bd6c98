//! Target distributions over distance buckets.
//!
//! A distribution assigns a probability to every bucket of a
//! [`DistanceSpace`](crate::distance::DistanceSpace). The engine keeps one
//! private copy per candidate and zeroes buckets out of it as they become
//! exhausted, so every strategy and every adjustment funnels through
//! [`adjust_to_one`] to keep the total at exactly one.
//!
//! Three strategies are provided:
//!
//! 1. **Geometric** - mass decays with bucket rank, favouring small distances
//! 2. **Inverse geometric** - the geometric mass mirrored, favouring large distances
//! 3. **Two-sided geometric** - both of the above summed, favouring both extremes

pub mod geometric;
pub mod inverse;
pub mod two_sided;

pub use geometric::GeometricDistribution;
pub use inverse::InverseGeometricDistribution;
pub use two_sided::TwoSidedGeometricDistribution;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::distance::Bucket;
use crate::error::DistributionError;

/// Result type alias for distribution operations.
pub type Result<T> = std::result::Result<T, DistributionError>;

/// Default decay ratio of the geometric baseline.
pub const DEFAULT_DECAY: f64 = 0.5;

/// Tolerance used when checking that probabilities sum to one.
pub const SUM_TOLERANCE: f64 = 1e-9;

/// A probability mass over buckets, iterated in ascending bucket order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Distribution {
    mass: BTreeMap<Bucket, f64>,
}

impl Distribution {
    /// Builds a distribution from non-negative weights, scaling them to sum to one.
    pub fn normalized(mut weights: BTreeMap<Bucket, f64>) -> Result<Self> {
        if weights.is_empty() {
            return Err(DistributionError::EmptyBuckets);
        }
        adjust_to_one(&mut weights)?;
        Ok(Self { mass: weights })
    }

    /// Probability of `bucket` (zero for unknown buckets).
    pub fn probability(&self, bucket: Bucket) -> f64 {
        self.mass.get(&bucket).copied().unwrap_or(0.0)
    }

    /// Sum of all probabilities.
    pub fn total(&self) -> f64 {
        self.mass.values().sum()
    }

    /// Number of buckets, live or not.
    pub fn len(&self) -> usize {
        self.mass.len()
    }

    /// Returns true if the distribution has no buckets.
    pub fn is_empty(&self) -> bool {
        self.mass.is_empty()
    }

    /// Iterates `(bucket, probability)` in bucket order.
    pub fn iter(&self) -> impl Iterator<Item = (Bucket, f64)> + '_ {
        self.mass.iter().map(|(b, p)| (*b, *p))
    }

    /// Removes `bucket` from the distribution and renormalises the rest.
    ///
    /// Fails with [`DistributionError::ZeroMass`] when no other bucket carries
    /// mass; the distribution is left with the bucket zeroed in that case.
    pub fn zero_out(&mut self, bucket: Bucket) -> Result<()> {
        if let Some(p) = self.mass.get_mut(&bucket) {
            *p = 0.0;
        }
        adjust_to_one(&mut self.mass)
    }

    /// Inverse-CDF draw: accumulates probabilities in bucket order and returns
    /// the first bucket at which the accumulated mass exceeds `draw`.
    ///
    /// Buckets without mass are never returned. If rounding leaves the total
    /// just below `draw`, the last bucket with mass is returned. `None` only
    /// when no bucket has mass.
    pub fn sample(&self, draw: f64) -> Option<Bucket> {
        let mut accumulated = 0.0;
        let mut last_live = None;
        for (bucket, p) in self.iter() {
            if p <= 0.0 {
                continue;
            }
            accumulated += p;
            last_live = Some(bucket);
            if accumulated > draw {
                return Some(bucket);
            }
        }
        last_live
    }
}

/// Scales every weight by `1 / Σweights` so the mapping sums to one.
///
/// Weights must be non-negative and at least one must be positive.
pub fn adjust_to_one(weights: &mut BTreeMap<Bucket, f64>) -> Result<()> {
    if let Some((bucket, weight)) = weights.iter().find(|(_, w)| **w < 0.0 || w.is_nan()) {
        return Err(DistributionError::NegativeWeight {
            bucket: bucket.value(),
            weight: *weight,
        });
    }

    let total: f64 = weights.values().sum();
    if total <= 0.0 || !total.is_finite() {
        return Err(DistributionError::ZeroMass);
    }

    for weight in weights.values_mut() {
        *weight /= total;
    }
    Ok(())
}

/// A way of turning the achievable buckets into a target distribution.
pub trait DistributionStrategy {
    /// Stable upper-case name of the strategy.
    fn name(&self) -> &'static str;

    /// Creates the target distribution over `buckets` (ascending, distinct).
    fn create_distribution(&self, buckets: &[Bucket]) -> Result<Distribution>;
}

/// Selectable distribution strategies.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum DistributionKind {
    /// Decreasing mass with bucket distance.
    #[default]
    Geometric,
    /// Increasing mass with bucket distance.
    InverseGeometric,
    /// Mass concentrated at both ends.
    TwoSided,
}

impl DistributionKind {
    /// Builds the strategy for this kind with the given geometric decay.
    pub fn strategy(self, decay: f64) -> Result<Box<dyn DistributionStrategy>> {
        let baseline = GeometricDistribution::new(decay)?;
        Ok(match self {
            Self::Geometric => Box::new(baseline),
            Self::InverseGeometric => Box::new(InverseGeometricDistribution::new(baseline)),
            Self::TwoSided => Box::new(TwoSidedGeometricDistribution::new(baseline)),
        })
    }

    /// Kebab-case identifier, as accepted on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Geometric => "geometric",
            Self::InverseGeometric => "inverse-geometric",
            Self::TwoSided => "two-sided",
        }
    }
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistributionKind {
    type Err = DistributionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "geometric" => Ok(Self::Geometric),
            "inverse-geometric" | "inversegeometric" => Ok(Self::InverseGeometric),
            "two-sided" | "two-sided-geometric" | "twosidedgeometric" => Ok(Self::TwoSided),
            _ => Err(DistributionError::UnknownKind(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights(pairs: &[(u32, f64)]) -> BTreeMap<Bucket, f64> {
        pairs.iter().map(|(b, w)| (Bucket(*b), *w)).collect()
    }

    #[test]
    fn test_adjust_to_one_scales() {
        let mut w = weights(&[(0, 2.0), (1, 1.0), (2, 1.0)]);
        adjust_to_one(&mut w).unwrap();
        assert!((w[&Bucket(0)] - 0.5).abs() < SUM_TOLERANCE);
        assert!((w.values().sum::<f64>() - 1.0).abs() < SUM_TOLERANCE);
    }

    #[test]
    fn test_adjust_to_one_rejects_zero_mass() {
        let mut w = weights(&[(0, 0.0), (1, 0.0)]);
        assert!(matches!(adjust_to_one(&mut w), Err(DistributionError::ZeroMass)));
    }

    #[test]
    fn test_adjust_to_one_rejects_negative() {
        let mut w = weights(&[(0, 1.0), (4, -0.5)]);
        assert!(matches!(
            adjust_to_one(&mut w),
            Err(DistributionError::NegativeWeight { bucket: 4, .. })
        ));
    }

    #[test]
    fn test_sample_inverse_cdf() {
        let dist = Distribution::normalized(weights(&[(0, 0.5), (1, 0.25), (2, 0.25)])).unwrap();
        assert_eq!(dist.sample(0.0), Some(Bucket(0)));
        assert_eq!(dist.sample(0.49), Some(Bucket(0)));
        assert_eq!(dist.sample(0.5), Some(Bucket(1)));
        assert_eq!(dist.sample(0.74), Some(Bucket(1)));
        assert_eq!(dist.sample(0.99), Some(Bucket(2)));
    }

    #[test]
    fn test_sample_skips_zeroed_buckets() {
        let mut dist =
            Distribution::normalized(weights(&[(0, 0.5), (1, 0.25), (2, 0.25)])).unwrap();
        dist.zero_out(Bucket(0)).unwrap();
        assert_eq!(dist.sample(0.0), Some(Bucket(1)));
        assert!((dist.probability(Bucket(1)) - 0.5).abs() < SUM_TOLERANCE);
        assert_eq!(dist.probability(Bucket(0)), 0.0);
        assert!((dist.probability(Bucket(2)) - 0.5).abs() < SUM_TOLERANCE);
    }

    #[test]
    fn test_sample_rounding_tail_returns_last_live() {
        let dist = Distribution::normalized(weights(&[(0, 0.3), (1, 0.3), (2, 0.0)])).unwrap();
        // A draw at the very top of the range never lands on the zero-mass tail.
        assert_eq!(dist.sample(1.0), Some(Bucket(1)));
    }

    #[test]
    fn test_zero_out_last_bucket_is_zero_mass() {
        let mut dist = Distribution::normalized(weights(&[(3, 1.0)])).unwrap();
        assert!(matches!(dist.zero_out(Bucket(3)), Err(DistributionError::ZeroMass)));
        assert_eq!(dist.sample(0.5), None);
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("geometric".parse::<DistributionKind>().unwrap(), DistributionKind::Geometric);
        assert_eq!(
            "INVERSEGEOMETRIC".parse::<DistributionKind>().unwrap(),
            DistributionKind::InverseGeometric
        );
        assert_eq!("two_sided".parse::<DistributionKind>().unwrap(), DistributionKind::TwoSided);
        assert!("uniform".parse::<DistributionKind>().is_err());
    }

    #[test]
    fn test_kind_strategy_names() {
        let names: Vec<&str> = [
            DistributionKind::Geometric,
            DistributionKind::InverseGeometric,
            DistributionKind::TwoSided,
        ]
        .iter()
        .map(|k| k.strategy(DEFAULT_DECAY).unwrap().name())
        .collect();
        assert_eq!(names, vec!["GEOMETRIC", "INVERSEGEOMETRIC", "TWOSIDEDGEOMETRIC"]);
    }
}
