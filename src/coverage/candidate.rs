//! Coverage candidates: single features and feature interactions.

use std::fmt;

use itertools::Itertools;
use serde::Serialize;

use crate::model::{BinaryOption, Configuration, FeatureModel};

/// An ordered, deduplicated tuple of options whose joint selection is tracked
/// for coverage.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Candidate(Vec<BinaryOption>);

impl Candidate {
    /// Creates a candidate; options are sorted and duplicates dropped.
    pub fn new(options: impl IntoIterator<Item = BinaryOption>) -> Self {
        let mut options: Vec<BinaryOption> = options.into_iter().collect();
        options.sort();
        options.dedup();
        Self(options)
    }

    /// The options of this candidate, in order.
    pub fn options(&self) -> &[BinaryOption] {
        &self.0
    }

    /// Interaction degree (1 for a single feature).
    pub fn degree(&self) -> usize {
        self.0.len()
    }

    /// Returns true if every option of the candidate is selected in `config`.
    pub fn is_contained_in(&self, config: &Configuration) -> bool {
        config.contains_all(self.0.iter())
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|o| o.name.as_str()).collect();
        f.write_str(&names.join("*"))
    }
}

/// Derives the coverage candidates of a model up to interaction `depth`.
///
/// Singles come first, then pairs, then larger tuples, each level in option
/// declaration order. Tuples containing two siblings of one alternative group
/// can never be selected together and are skipped. The returned order is the
/// tie-break order of the [`CoverageTracker`](super::CoverageTracker).
pub fn derive_candidates<M: FeatureModel + ?Sized>(model: &M, depth: usize) -> Vec<Candidate> {
    let options = model.binary_options();
    let mut candidates = Vec::new();

    for size in 1..=depth.min(options.len()) {
        for tuple in options.iter().combinations(size) {
            let exclusive = tuple
                .iter()
                .tuple_combinations()
                .any(|(a, b)| model.are_exclusive(a, b));
            if !exclusive {
                candidates.push(Candidate::new(tuple.into_iter().cloned()));
            }
        }
    }

    candidates
}
