//! spl-sampler: diverse, distribution-conforming configuration sampling for
//! software product lines.
//!
//! The sampler picks configurations of a boolean feature model so that the
//! number of selected options follows a target distribution while rarely
//! covered options and option combinations are preferred.

pub mod cli;
pub mod config;
pub mod coverage;
pub mod distance;
pub mod distribution;
pub mod error;
pub mod model;
pub mod oracle;
pub mod selection;

// Re-export commonly used types
pub use config::{ConfigError, SamplerSettings};
pub use coverage::{Candidate, CoverageTracker};
pub use distance::{Bucket, DistanceSpace};
pub use distribution::{Distribution, DistributionKind, DistributionStrategy};
pub use error::{DistributionError, ModelError, SamplingError};
pub use model::{BinaryOption, Configuration, FeatureModel, VariabilityModel};
pub use oracle::{ConfigurationOracle, EnumerativeOracle};
pub use selection::{sample_model, DiverseSelection, SampleOutcome, ShortfallReporter};
