//! Least-represented candidate tracking.

use crate::model::Configuration;

use super::Candidate;

/// Priority weights over coverage candidates.
///
/// Each candidate's weight counts how often its options have appeared together
/// in accepted configurations. Candidates keep their first-seen position for
/// the whole run; ties on the minimum weight go to the lowest position.
/// Removal is permanent.
#[derive(Debug, Clone)]
pub struct CoverageTracker {
    candidates: Vec<Candidate>,
    weights: Vec<u64>,
    live: Vec<bool>,
}

impl CoverageTracker {
    /// Starts every candidate at weight zero.
    pub fn new(candidates: Vec<Candidate>) -> Self {
        let n = candidates.len();
        Self {
            candidates,
            weights: vec![0; n],
            live: vec![true; n],
        }
    }

    /// Overrides the initial weights with a caller-supplied seed.
    pub fn with_initial_weights(mut self, seed: impl Fn(&Candidate) -> u64) -> Self {
        for (weight, candidate) in self.weights.iter_mut().zip(&self.candidates) {
            *weight = seed(candidate);
        }
        self
    }

    /// Total number of candidates, removed ones included.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Returns true if the tracker was created without candidates.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Number of candidates not yet removed.
    pub fn live_count(&self) -> usize {
        self.live.iter().filter(|l| **l).count()
    }

    /// The candidate at `index`.
    pub fn candidate(&self, index: usize) -> &Candidate {
        &self.candidates[index]
    }

    /// Current weight of the candidate at `index`.
    pub fn weight(&self, index: usize) -> u64 {
        self.weights[index]
    }

    /// The live candidate with the smallest weight; ties go to the earliest.
    pub fn least_weighted(&self) -> Option<usize> {
        (0..self.candidates.len())
            .filter(|&i| self.live[i])
            .min_by_key(|&i| (self.weights[i], i))
    }

    /// Adds `increment` to every live candidate fully contained in `config`.
    ///
    /// Returns the number of candidates updated.
    pub fn record(&mut self, config: &Configuration, increment: u64) -> usize {
        let mut updated = 0;
        for (i, candidate) in self.candidates.iter().enumerate() {
            if self.live[i] && candidate.is_contained_in(config) {
                self.weights[i] = self.weights[i].saturating_add(increment);
                updated += 1;
            }
        }
        updated
    }

    /// Permanently removes the candidate at `index`.
    pub fn remove(&mut self, index: usize) {
        if let Some(live) = self.live.get_mut(index) {
            *live = false;
        }
    }
}
