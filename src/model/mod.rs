//! Feature model types for spl-sampler.
//!
//! A feature model is a set of boolean options with structural constraints:
//! parent/child nesting, mutually exclusive alternative groups and simple
//! cross-tree `requires`/`excludes` pairs. The sampler only consumes the
//! [`FeatureModel`] trait; [`VariabilityModel`] is the in-memory
//! implementation used by the CLI and by the enumerative oracle.

pub mod alternatives;
pub mod option;
pub mod variability;

pub use alternatives::substitute_alternatives;
pub use option::{BinaryOption, Configuration};
pub use variability::{AlternativeGroup, FeatureModel, VariabilityModel};

use crate::error::ModelError;

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
