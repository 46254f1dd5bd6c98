//! Term frequencies over a sample, and how far they stray from the whole
//! population.

use serde::Serialize;

use crate::model::Configuration;

use super::Candidate;

/// How often a term's options were all selected in a sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermFrequency {
    /// The counted term.
    pub term: Candidate,
    /// Configurations containing every option of the term.
    pub count: usize,
    /// `count` divided by the sample size (0.0 for an empty sample).
    pub share: f64,
}

/// Counts, for each term, the configurations of `sample` that contain it.
///
/// Results follow the order of `terms`.
pub fn term_frequencies(sample: &[Configuration], terms: &[Candidate]) -> Vec<TermFrequency> {
    terms
        .iter()
        .map(|term| {
            let count = sample.iter().filter(|c| term.is_contained_in(c)).count();
            let share = if sample.is_empty() {
                0.0
            } else {
                count as f64 / sample.len() as f64
            };
            TermFrequency {
                term: term.clone(),
                count,
                share,
            }
        })
        .collect()
}

/// How closely a sample reproduces a term's share of the whole population.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppearanceError {
    /// The compared term.
    pub term: Candidate,
    /// Share of all valid configurations containing the term.
    pub population_share: f64,
    /// Share of the sample containing the term.
    pub sample_share: f64,
    /// `|population_share - sample_share| / population_share`; `None` when the
    /// term never appears in the population.
    pub relative_error: Option<f64>,
}

/// Compares each term's share of `sample` against its share of `population`.
///
/// Results follow the order of `terms`.
pub fn appearance_error(
    sample: &[Configuration],
    population: &[Configuration],
    terms: &[Candidate],
) -> Vec<AppearanceError> {
    let in_sample = term_frequencies(sample, terms);
    let in_population = term_frequencies(population, terms);

    in_population
        .into_iter()
        .zip(in_sample)
        .map(|(wp, sampled)| {
            let relative_error = (wp.share > 0.0)
                .then(|| (wp.share - sampled.share).abs() / wp.share);
            AppearanceError {
                term: wp.term,
                population_share: wp.share,
                sample_share: sampled.share,
                relative_error,
            }
        })
        .collect()
}

/// Mean relative error over the terms that appear in the population.
///
/// `None` if no term appears in the population.
pub fn mean_appearance_error(errors: &[AppearanceError]) -> Option<f64> {
    let defined: Vec<f64> = errors.iter().filter_map(|e| e.relative_error).collect();
    if defined.is_empty() {
        return None;
    }
    Some(defined.iter().sum::<f64>() / defined.len() as f64)
}
