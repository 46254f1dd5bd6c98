//! Integration tests for the diverse selection engine.
//!
//! The oracles here are scripted stubs, so every run is deterministic and
//! the scenarios can force exhaustion in specific buckets.

use std::collections::BTreeSet;

use spl_sampler::distribution::{
    GeometricDistribution, InverseGeometricDistribution, TwoSidedGeometricDistribution,
    SUM_TOLERANCE,
};
use spl_sampler::selection::CollectingReporter;
use spl_sampler::{
    BinaryOption, Bucket, Candidate, Configuration, ConfigurationOracle, DistanceSpace,
    Distribution, DistributionStrategy, DiverseSelection,
};

/// Succeeds with a fresh configuration for the buckets in `open`, up to
/// `budget` answers in total, and fails for every other bucket.
struct BucketOracle {
    open: BTreeSet<Bucket>,
    budget: usize,
    issued: usize,
    queries: Vec<Bucket>,
}

impl BucketOracle {
    fn new(open: &[u32], budget: usize) -> Self {
        Self {
            open: open.iter().copied().map(Bucket).collect(),
            budget,
            issued: 0,
            queries: Vec::new(),
        }
    }
}

impl ConfigurationOracle for BucketOracle {
    fn generate(
        &mut self,
        mandatory: &Candidate,
        bucket: Bucket,
        _reference: Option<&Configuration>,
    ) -> Option<Configuration> {
        self.queries.push(bucket);
        if !self.open.contains(&bucket) || self.issued >= self.budget {
            return None;
        }
        self.issued += 1;
        let mut options = mandatory.options().to_vec();
        options.push(BinaryOption::new(format!("extra{}", self.issued)));
        Some(Configuration::new(options))
    }

    fn clear_cache(&mut self) {}
}

/// Hands out configurations from a fixed pool, each at most once per run.
struct PoolOracle {
    pool: Vec<Configuration>,
    used: BTreeSet<Configuration>,
}

impl ConfigurationOracle for PoolOracle {
    fn generate(
        &mut self,
        mandatory: &Candidate,
        _bucket: Bucket,
        _reference: Option<&Configuration>,
    ) -> Option<Configuration> {
        let found = self
            .pool
            .iter()
            .find(|c| mandatory.is_contained_in(c) && !self.used.contains(*c))?
            .clone();
        self.used.insert(found.clone());
        Some(found)
    }

    fn clear_cache(&mut self) {
        self.used.clear();
    }
}

/// Replays a fixed script of successes and failures, one entry per query.
struct ScriptedOracle {
    script: Vec<bool>,
    position: usize,
}

impl ConfigurationOracle for ScriptedOracle {
    fn generate(
        &mut self,
        mandatory: &Candidate,
        _bucket: Bucket,
        _reference: Option<&Configuration>,
    ) -> Option<Configuration> {
        let step = self.position;
        self.position += 1;
        if !self.script.get(step).copied().unwrap_or(false) {
            return None;
        }
        let mut options = mandatory.options().to_vec();
        options.push(BinaryOption::new(format!("step{step}")));
        Some(Configuration::new(options))
    }

    fn clear_cache(&mut self) {}
}

fn candidates(names: &[&str]) -> Vec<Candidate> {
    names
        .iter()
        .map(|n| Candidate::new(vec![BinaryOption::new(*n)]))
        .collect()
}

fn config(names: &[&str]) -> Configuration {
    names.iter().map(|n| BinaryOption::new(*n)).collect()
}

fn space(values: &[u32]) -> DistanceSpace {
    DistanceSpace::from_buckets(values.iter().copied().map(Bucket))
}

fn geometric(space: &DistanceSpace) -> Distribution {
    GeometricDistribution::default()
        .create_distribution(space.buckets())
        .unwrap()
}

#[test]
fn test_converges_on_the_only_open_bucket() {
    let space = space(&[0, 1, 2]);
    let target = geometric(&space);
    let mut oracle = BucketOracle::new(&[0], usize::MAX);
    let mut reporter = CollectingReporter::new();

    let outcome = DiverseSelection::new()
        .with_seed(17)
        .sample(8, &target, &space, candidates(&["a", "b", "c"]), &mut oracle, &mut reporter)
        .unwrap();

    assert_eq!(outcome.configurations.len(), 8);
    assert!(outcome.buckets.iter().all(|b| *b == Bucket(0)));
    assert!(reporter.lines().is_empty(), "no shortfall while bucket 0 supplies");
    // Buckets 1 and 2 are asked at most once per candidate before being exhausted.
    let closed = oracle.queries.iter().filter(|b| **b != Bucket(0)).count();
    assert!(closed <= 3 * 2);
}

#[test]
fn test_reports_when_the_open_bucket_runs_dry() {
    let space = space(&[0, 1, 2]);
    let target = geometric(&space);
    let mut oracle = BucketOracle::new(&[0], 4);
    let mut reporter = CollectingReporter::new();

    let outcome = DiverseSelection::new()
        .with_seed(17)
        .sample(8, &target, &space, candidates(&["a", "b"]), &mut oracle, &mut reporter)
        .unwrap();

    assert_eq!(outcome.configurations.len(), 4);
    assert_eq!(outcome.removed_candidates, 2);
    assert_eq!(reporter.lines().len(), 1);
    assert!(reporter.lines()[0].starts_with("Sampled only 4 of 8"));
}

#[test]
fn test_short_pool_returns_partial_sample() {
    let space = space(&[1, 2, 3]);
    let target = geometric(&space);
    let mut oracle = PoolOracle {
        pool: vec![config(&["a"]), config(&["a", "b"]), config(&["a", "b", "c"])],
        used: BTreeSet::new(),
    };
    let mut reporter = CollectingReporter::new();

    let outcome = DiverseSelection::new()
        .with_seed(4)
        .sample(5, &target, &space, candidates(&["a"]), &mut oracle, &mut reporter)
        .unwrap();

    assert_eq!(outcome.configurations.len(), 3);
    assert_eq!(outcome.shortfall(), 2);
    assert_eq!(reporter.lines().len(), 1);
    assert!(oracle.used.is_empty(), "oracle cache is released at the end");
}

#[test]
fn test_same_seed_same_script_same_sample() {
    let space = space(&[0, 1, 2, 3]);
    let target = geometric(&space);
    let script = vec![
        true, false, true, true, false, false, true, false, true, true, false, true,
    ];

    let run = |seed: u64| {
        let mut oracle = ScriptedOracle {
            script: script.clone(),
            position: 0,
        };
        DiverseSelection::new()
            .with_seed(seed)
            .sample(
                6,
                &target,
                &space,
                candidates(&["a", "b", "c"]),
                &mut oracle,
                &mut CollectingReporter::new(),
            )
            .unwrap()
    };

    let first = run(2024);
    let second = run(2024);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_terminates_when_every_query_fails() {
    let space = space(&[0, 1, 2, 3]);
    let target = geometric(&space);
    let mut oracle = BucketOracle::new(&[], usize::MAX);
    let mut reporter = CollectingReporter::new();
    let count = 10;
    let names = ["a", "b", "c"];

    let outcome = DiverseSelection::new()
        .with_seed(8)
        .sample(count, &target, &space, candidates(&names), &mut oracle, &mut reporter)
        .unwrap();

    assert!(outcome.configurations.is_empty());
    // Every (candidate, bucket) pair is asked exactly once before exhaustion.
    assert_eq!(outcome.oracle_queries, names.len() * space.len());
    assert!(outcome.oracle_queries <= count * names.len() * space.len());
    assert_eq!(outcome.exhausted_pairs, names.len() * space.len());
    assert_eq!(outcome.removed_candidates, names.len());
    assert_eq!(reporter.lines().len(), 1);
}

#[test]
fn test_no_repeated_configuration_within_a_bucket() {
    let space = space(&[0, 1, 2]);
    let target = geometric(&space);
    let mut oracle = BucketOracle::new(&[0, 1, 2], usize::MAX);

    let outcome = DiverseSelection::new()
        .with_seed(99)
        .sample(
            20,
            &target,
            &space,
            candidates(&["a", "b", "c", "d"]),
            &mut oracle,
            &mut CollectingReporter::new(),
        )
        .unwrap();

    let pairs: BTreeSet<(Bucket, &Configuration)> = outcome
        .buckets
        .iter()
        .copied()
        .zip(&outcome.configurations)
        .collect();
    assert_eq!(pairs.len(), outcome.configurations.len());
}

#[test]
fn test_strategies_sum_to_one() {
    for n in 1..10u32 {
        let buckets: Vec<Bucket> = (0..n).map(|b| Bucket(b * 2)).collect();
        let baseline = GeometricDistribution::default();
        let strategies: Vec<Box<dyn DistributionStrategy>> = vec![
            Box::new(baseline),
            Box::new(InverseGeometricDistribution::new(baseline)),
            Box::new(TwoSidedGeometricDistribution::new(baseline)),
        ];
        for strategy in strategies {
            let dist = strategy.create_distribution(&buckets).unwrap();
            assert!(
                (dist.total() - 1.0).abs() < SUM_TOLERANCE,
                "{} over {n} buckets",
                strategy.name()
            );
        }
    }
}

#[test]
fn test_mirrored_and_two_sided_relations() {
    let buckets: Vec<Bucket> = [0, 1, 3, 4, 6].into_iter().map(Bucket).collect();
    let baseline = GeometricDistribution::new(0.6).unwrap();
    let base = baseline.create_distribution(&buckets).unwrap();
    let mirrored = InverseGeometricDistribution::new(baseline)
        .create_distribution(&buckets)
        .unwrap();
    let two_sided = TwoSidedGeometricDistribution::new(baseline)
        .create_distribution(&buckets)
        .unwrap();

    let n = buckets.len();
    let sums: Vec<f64> = (0..n)
        .map(|i| base.probability(buckets[i]) + base.probability(buckets[n - 1 - i]))
        .collect();
    let total: f64 = sums.iter().sum();

    for i in 0..n {
        let expected = base.probability(buckets[n - 1 - i]);
        assert!((mirrored.probability(buckets[i]) - expected).abs() < SUM_TOLERANCE);
        assert!((two_sided.probability(buckets[i]) - sums[i] / total).abs() < SUM_TOLERANCE);
    }
}
