//! CLI command definitions for spl-sampler.
//!
//! The model is declared directly on the command line, sampled against the
//! enumerative oracle, and printed as text or JSON.

use anyhow::{bail, Context};
use clap::Parser;
use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::config::SamplerSettings;
use crate::coverage::{
    appearance_error, derive_candidates, mean_appearance_error, term_frequencies, AppearanceError,
    TermFrequency,
};
use crate::distance::{Bucket, DistanceSpace};
use crate::distribution::{DistributionKind, DEFAULT_DECAY};
use crate::model::{Configuration, FeatureModel, VariabilityModel};
use crate::oracle::EnumerativeOracle;
use crate::selection::{sample_model, SampleOutcome, TracingReporter};

/// Diverse, distribution-aware configuration sampler for feature models.
#[derive(Parser)]
#[command(name = "spl-sampler")]
#[command(about = "Sample diverse configurations of a feature model")]
#[command(version)]
#[command(
    long_about = "spl-sampler picks configurations of a boolean feature model so that the number of \
    selected features follows a target distribution while rarely seen features and feature pairs \
    are preferred.\n\nExample usage:\n  spl-sampler sample --option cache --option log \
    --alternative log=text,json --count 5 --seed 42"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Sample configurations from a model declared on the command line.
    Sample(SampleArgs),

    /// Print a target distribution over the given buckets.
    #[command(alias = "dist")]
    Distribution(DistributionArgs),
}

/// Arguments for `spl-sampler sample`.
#[derive(Parser, Debug)]
pub struct SampleArgs {
    /// Top-level optional feature (repeatable).
    #[arg(long = "option", value_name = "NAME")]
    pub options: Vec<String>,

    /// Nested optional feature as CHILD=PARENT (repeatable).
    #[arg(long = "child", value_name = "CHILD=PARENT")]
    pub children: Vec<String>,

    /// Alternative group as PARENT=A,B,C; a missing parent is created (repeatable).
    #[arg(long = "alternative", value_name = "PARENT=MEMBERS")]
    pub alternatives: Vec<String>,

    /// Cross-tree constraint A=B: selecting A requires B (repeatable).
    #[arg(long = "requires", value_name = "A=B")]
    pub requires: Vec<String>,

    /// Cross-tree constraint A=B: A and B exclude each other (repeatable).
    #[arg(long = "excludes", value_name = "A=B")]
    pub excludes: Vec<String>,

    /// YAML settings file; values given as flags take precedence.
    #[arg(long)]
    pub settings: Option<String>,

    /// Number of configurations to sample.
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Random seed for reproducible samples.
    #[arg(short = 's', long)]
    pub seed: Option<u64>,

    /// Target distribution over distance buckets.
    #[arg(short = 'd', long, value_enum)]
    pub distribution: Option<DistributionKind>,

    /// Geometric decay ratio in (0, 1).
    #[arg(long)]
    pub decay: Option<f64>,

    /// Largest feature-interaction degree tracked for coverage.
    #[arg(long)]
    pub depth: Option<usize>,

    /// Output JSON instead of text.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Arguments for `spl-sampler distribution`.
#[derive(Parser, Debug)]
pub struct DistributionArgs {
    /// Distribution to build.
    #[arg(short = 'k', long, value_enum, default_value = "geometric")]
    pub kind: DistributionKind,

    /// Comma-separated bucket distances (e.g. 0,1,2,3).
    #[arg(short = 'b', long)]
    pub buckets: String,

    /// Geometric decay ratio in (0, 1).
    #[arg(long, default_value_t = DEFAULT_DECAY)]
    pub decay: f64,

    /// Output JSON instead of text.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Parse command-line arguments.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI by parsing arguments and executing the command.
///
/// For more control over logging initialization, use `parse_cli()` and `run_with_cli()`.
pub fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli())
}

/// Run the CLI with the parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Sample(args) => run_sample_command(args),
        Commands::Distribution(args) => run_distribution_command(args),
    }
}

#[derive(Debug, Serialize)]
struct SampleOutput {
    model: String,
    population: usize,
    buckets: Vec<Bucket>,
    settings: SamplerSettings,
    outcome: SampleOutcome,
    coverage: Vec<TermFrequency>,
    appearance: Vec<AppearanceError>,
    mean_appearance_error: Option<f64>,
}

fn run_sample_command(args: SampleArgs) -> anyhow::Result<()> {
    let settings = resolve_settings(&args)?;
    let model = build_model(&args)?;

    let mut oracle = EnumerativeOracle::new(&model)?;
    let space = oracle.distance_space();
    info!(
        options = model.binary_options().len(),
        population = oracle.population(),
        buckets = space.len(),
        "Enumerated model"
    );

    let outcome = sample_model(&model, &settings, &space, &mut oracle, &mut TracingReporter)?;
    let terms = derive_candidates(&model, settings.interaction_depth);
    let coverage = term_frequencies(&outcome.configurations, &terms);
    let population: Vec<Configuration> = oracle.valid_configurations().cloned().collect();
    let appearance = appearance_error(&outcome.configurations, &population, &terms);
    let mean_error = mean_appearance_error(&appearance);

    let output = SampleOutput {
        model: model.name().to_string(),
        population: oracle.population(),
        buckets: space.buckets().to_vec(),
        settings,
        outcome,
        coverage,
        appearance,
        mean_appearance_error: mean_error,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_sample(&output);
    Ok(())
}

fn print_sample(output: &SampleOutput) {
    println!("\n=== Diverse Sample ===");
    for (i, (config, bucket)) in output
        .outcome
        .configurations
        .iter()
        .zip(&output.outcome.buckets)
        .enumerate()
    {
        println!("{:>4}  [distance {}]  {}", i + 1, bucket, config);
    }
    println!();
    println!(
        "Sampled:        {} of {}",
        output.outcome.configurations.len(),
        output.outcome.requested
    );
    println!("Population:     {}", output.population);
    println!("Oracle queries: {}", output.outcome.oracle_queries);
    println!("Exhausted:      {}", output.outcome.exhausted_pairs);
    if let Some(error) = output.mean_appearance_error {
        println!("Appearance err: {:.4} (mean relative, vs. population)", error);
    }

    let uncovered: Vec<String> = output
        .coverage
        .iter()
        .filter(|f| f.count == 0)
        .map(|f| f.term.to_string())
        .collect();
    if !uncovered.is_empty() {
        println!("Never selected: {}", uncovered.join(", "));
    }
}

fn run_distribution_command(args: DistributionArgs) -> anyhow::Result<()> {
    let buckets = parse_buckets(&args.buckets)?;
    let space = DistanceSpace::from_buckets(buckets);
    let strategy = args.kind.strategy(args.decay)?;
    let distribution = strategy.create_distribution(space.buckets())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&distribution)?);
        return Ok(());
    }

    println!("{}", strategy.name());
    for (bucket, p) in distribution.iter() {
        println!("{:>6}  {:.6}", bucket.value(), p);
    }
    Ok(())
}

/// Layers settings: file (or environment) first, then explicit flags.
fn resolve_settings(args: &SampleArgs) -> anyhow::Result<SamplerSettings> {
    let base = match &args.settings {
        Some(path) => SamplerSettings::load(Path::new(path))
            .with_context(|| format!("Failed to load settings from {path}"))?,
        None => SamplerSettings::from_env()?,
    };
    apply_overrides(args, base)
}

/// Applies the flags given on the command line over `settings`.
fn apply_overrides(
    args: &SampleArgs,
    mut settings: SamplerSettings,
) -> anyhow::Result<SamplerSettings> {

    if let Some(count) = args.count {
        settings.count = count;
    }
    if let Some(seed) = args.seed {
        settings.seed = Some(seed);
    }
    if let Some(distribution) = args.distribution {
        settings.distribution = distribution;
    }
    if let Some(decay) = args.decay {
        settings.decay = decay;
    }
    if let Some(depth) = args.depth {
        settings.interaction_depth = depth;
    }

    settings.validate()?;
    Ok(settings)
}

fn build_model(args: &SampleArgs) -> anyhow::Result<VariabilityModel> {
    let mut model = VariabilityModel::new("command-line");

    for name in &args.options {
        model.add_option(name.trim())?;
    }
    for spec in &args.children {
        let (child, parent) = split_pair(spec, "--child")?;
        model.add_child(child, parent)?;
    }
    for spec in &args.alternatives {
        let (parent, members) = split_pair(spec, "--alternative")?;
        if model.option(parent).is_none() {
            model.add_option(parent)?;
        }
        let members: Vec<&str> = members
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .collect();
        model.add_alternative_group(parent, &members)?;
    }
    for spec in &args.requires {
        let (a, b) = split_pair(spec, "--requires")?;
        model.add_requires(a, b)?;
    }
    for spec in &args.excludes {
        let (a, b) = split_pair(spec, "--excludes")?;
        model.add_excludes(a, b)?;
    }

    if model.binary_options().is_empty() {
        bail!("The model is empty: declare features with --option or --alternative");
    }
    Ok(model)
}

fn split_pair<'a>(spec: &'a str, flag: &str) -> anyhow::Result<(&'a str, &'a str)> {
    match spec.split_once('=') {
        Some((left, right)) if !left.trim().is_empty() && !right.trim().is_empty() => {
            Ok((left.trim(), right.trim()))
        }
        _ => bail!("Invalid {flag} value '{spec}': expected LEFT=RIGHT"),
    }
}

fn parse_buckets(text: &str) -> anyhow::Result<Vec<Bucket>> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>()
                .map(Bucket)
                .with_context(|| format!("Invalid bucket '{s}'"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_args(extra: &[&str]) -> SampleArgs {
        let mut argv = vec!["sample"];
        argv.extend_from_slice(extra);
        SampleArgs::parse_from(argv)
    }

    #[test]
    fn test_build_model_from_flags() {
        let args = sample_args(&[
            "--option",
            "cache",
            "--alternative",
            "log=text,json",
            "--child",
            "ttl=cache",
            "--requires",
            "ttl=log",
        ]);
        let model = build_model(&args).unwrap();
        assert_eq!(model.binary_options().len(), 5);
        assert_eq!(model.alternative_groups().len(), 1);
        assert_eq!(model.option("ttl").unwrap().parent.as_deref(), Some("cache"));
    }

    #[test]
    fn test_build_model_rejects_empty() {
        assert!(build_model(&sample_args(&[])).is_err());
    }

    #[test]
    fn test_split_pair() {
        assert_eq!(split_pair("a=b", "--x").unwrap(), ("a", "b"));
        assert!(split_pair("a", "--x").is_err());
        assert!(split_pair("=b", "--x").is_err());
    }

    #[test]
    fn test_parse_buckets() {
        assert_eq!(
            parse_buckets("0, 2,5").unwrap(),
            vec![Bucket(0), Bucket(2), Bucket(5)]
        );
        assert!(parse_buckets("1,x").is_err());
    }

    #[test]
    fn test_flags_override_settings() {
        let args = sample_args(&["--option", "a", "-n", "3", "--seed", "11", "-d", "two-sided"]);
        let base = SamplerSettings::from_lookup(|_| None).unwrap();
        let settings = apply_overrides(&args, base).unwrap();
        assert_eq!(settings.count, 3);
        assert_eq!(settings.seed, Some(11));
        assert_eq!(settings.distribution, DistributionKind::TwoSided);
    }

    #[test]
    fn test_settings_file_then_flags() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "count: 4\nseed: 2\ndistribution: inverse-geometric").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let args = sample_args(&["--option", "a", "--settings", &path, "--seed", "9"]);
        let settings = resolve_settings(&args).unwrap();
        assert_eq!(settings.count, 4);
        assert_eq!(settings.seed, Some(9));
        assert_eq!(settings.distribution, DistributionKind::InverseGeometric);
    }

    #[test]
    fn test_invalid_flag_value_fails_validation() {
        let args = sample_args(&["--option", "a", "--decay", "1.5"]);
        assert!(apply_overrides(&args, SamplerSettings::default()).is_err());
    }
}
