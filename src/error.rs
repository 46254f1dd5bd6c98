//! Error types for spl-sampler operations.
//!
//! Defines error types for the sampling subsystems:
//! - Feature model construction
//! - Target distribution construction and renormalisation
//! - The diverse selection engine and its oracle contract

use thiserror::Error;

/// Errors that can occur while building or querying a feature model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Option '{0}' already exists in the model")]
    DuplicateOption(String),

    #[error("Option '{0}' not found in the model")]
    UnknownOption(String),

    #[error("Option '{0}' cannot reference itself")]
    SelfReference(String),

    #[error("Option '{option}' is not a child of '{parent}'")]
    NotAChild { option: String, parent: String },

    #[error("Alternative group under '{0}' must have at least one member")]
    EmptyAlternativeGroup(String),

    #[error("Option '{option}' already belongs to the alternative group under '{parent}'")]
    AlreadyGrouped { option: String, parent: String },

    #[error("Model has {count} options, exhaustive enumeration supports at most {limit}")]
    TooManyOptions { count: usize, limit: usize },
}

/// Errors that can occur while building a target distribution.
#[derive(Debug, Error)]
pub enum DistributionError {
    #[error("Cannot create a distribution over an empty bucket set")]
    EmptyBuckets,

    #[error("Cannot renormalise a distribution whose total mass is zero")]
    ZeroMass,

    #[error("Decay ratio must lie strictly between 0 and 1, got {0}")]
    InvalidDecay(f64),

    #[error("Decay ratio {decay} is too small for {buckets} buckets: the geometric tail underflows to zero")]
    DecayUnderflow { decay: f64, buckets: usize },

    #[error("Negative weight {weight} for bucket {bucket}")]
    NegativeWeight { bucket: u32, weight: f64 },

    #[error("Unknown distribution '{0}': expected geometric, inverse-geometric or two-sided")]
    UnknownKind(String),
}

/// Errors that terminate a sampling run.
///
/// Everything else the engine meets (an empty oracle answer, an exhausted
/// candidate, a shortfall) is handled inside the loop and never surfaces here.
#[derive(Debug, Error)]
pub enum SamplingError {
    #[error("Diverse selection requires at least one candidate feature")]
    EmptyCandidates,

    #[error("Bookkeeping invariant violated for candidate {candidate}: live buckets remain but none carries probability mass")]
    NoProbabilityMass { candidate: String },

    #[error("Bookkeeping invariant violated for candidate {candidate} at bucket {bucket}: {reason}")]
    InvariantViolation {
        candidate: String,
        bucket: u32,
        reason: String,
    },

    #[error("Oracle broke its contract for candidate {candidate} at bucket {bucket}: {reason}")]
    OracleContract {
        candidate: String,
        bucket: u32,
        reason: String,
    },

    #[error("Distribution error: {0}")]
    Distribution(#[from] DistributionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invariant_violation_message() {
        let err = SamplingError::InvariantViolation {
            candidate: "a*b".to_string(),
            bucket: 3,
            reason: "bucket already exhausted".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("a*b"));
        assert!(msg.contains("bucket 3"));
    }

    #[test]
    fn test_no_probability_mass_names_no_bucket() {
        let err = SamplingError::NoProbabilityMass {
            candidate: "tls".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("tls"));
        assert!(!msg.contains("bucket 0"));
    }

    #[test]
    fn test_distribution_error_converts() {
        let err: SamplingError = DistributionError::ZeroMass.into();
        assert!(matches!(err, SamplingError::Distribution(DistributionError::ZeroMass)));
    }
}
