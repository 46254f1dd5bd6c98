//! Constraint oracle boundary.
//!
//! The engine never decides satisfiability itself. It asks a
//! [`ConfigurationOracle`] for a configuration containing some mandatory
//! options at a given bucket and treats an empty answer as proof that the
//! (candidate, bucket) pair is exhausted.

pub mod enumerative;

pub use enumerative::{EnumerativeOracle, MAX_ENUMERATED_OPTIONS};

use crate::coverage::Candidate;
use crate::distance::Bucket;
use crate::model::Configuration;

/// A constraint solver answering configuration queries for one sampling run.
///
/// Implementations may cache search state across the many queries of a run;
/// the engine calls [`clear_cache`](ConfigurationOracle::clear_cache) exactly
/// once when the run ends, whatever the outcome.
pub trait ConfigurationOracle {
    /// Produces a valid configuration that selects every option of
    /// `mandatory`, lies at `bucket` (relative to `reference` when one is
    /// given) and has not been produced for `bucket` earlier in this run.
    ///
    /// `None` means no such configuration exists.
    fn generate(
        &mut self,
        mandatory: &Candidate,
        bucket: Bucket,
        reference: Option<&Configuration>,
    ) -> Option<Configuration>;

    /// Releases per-run solver state.
    fn clear_cache(&mut self);

    /// Forces deterministic behaviour for repeated runs. No-op by default.
    fn set_seed(&mut self, _seed: u64) {}
}

impl<T: ConfigurationOracle + ?Sized> ConfigurationOracle for &mut T {
    fn generate(
        &mut self,
        mandatory: &Candidate,
        bucket: Bucket,
        reference: Option<&Configuration>,
    ) -> Option<Configuration> {
        (**self).generate(mandatory, bucket, reference)
    }

    fn clear_cache(&mut self) {
        (**self).clear_cache()
    }

    fn set_seed(&mut self, seed: u64) {
        (**self).set_seed(seed)
    }
}
