//! Feature-interaction coverage.
//!
//! Candidates are single options and option tuples derived once from the
//! feature model. The [`CoverageTracker`] weighs them by how often they have
//! appeared in the sample so far, so the engine can always ask for the least
//! represented one.

pub mod candidate;
pub mod frequency;
pub mod tracker;

pub use candidate::{derive_candidates, Candidate};
pub use frequency::{
    appearance_error, mean_appearance_error, term_frequencies, AppearanceError, TermFrequency,
};
pub use tracker::CoverageTracker;
