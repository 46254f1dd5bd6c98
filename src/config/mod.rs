//! Sampler settings.
//!
//! Settings are an explicit, enumerated structure. They can come from
//! defaults, environment variables, a YAML file, or a plain `name value`
//! settings file; every source goes through the same typed parsers and the
//! same [`SamplerSettings::validate`] pass.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::distribution::{DistributionKind, DEFAULT_DECAY};

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A setting has an invalid value.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// A setting name that does not exist.
    #[error("Unknown setting: {0}")]
    UnknownSetting(String),

    /// A settings line without a value.
    #[error("Malformed settings line {line}: '{content}'")]
    MalformedLine { line: usize, content: String },

    /// Configuration validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    /// IO error while reading configuration.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Names accepted by [`SamplerSettings::apply_setting`].
pub const SETTING_NAMES: [&str; 6] = [
    "count",
    "seed",
    "distribution",
    "decay",
    "interaction_depth",
    "weight_increment",
];

/// Largest supported interaction depth for coverage candidates.
pub const MAX_INTERACTION_DEPTH: usize = 3;

/// Configuration of one sampling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SamplerSettings {
    /// Number of configurations to sample.
    pub count: usize,
    /// Random seed for reproducibility (None = non-deterministic).
    pub seed: Option<u64>,
    /// Target distribution over distance buckets.
    pub distribution: DistributionKind,
    /// Decay ratio of the geometric baseline, in (0, 1).
    pub decay: f64,
    /// Largest feature-interaction degree tracked for coverage.
    pub interaction_depth: usize,
    /// Coverage weight added per accepted configuration.
    pub weight_increment: u64,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            count: 10,
            seed: None,
            distribution: DistributionKind::Geometric,
            decay: DEFAULT_DECAY,
            interaction_depth: 2,
            weight_increment: 1,
        }
    }
}

impl SamplerSettings {
    /// Creates settings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SAMPLER_COUNT`: Configurations to sample (default: 10)
    /// - `SAMPLER_SEED`: Random seed, or `none` (default: none)
    /// - `SAMPLER_DISTRIBUTION`: geometric, inverse-geometric or two-sided (default: geometric)
    /// - `SAMPLER_DECAY`: Geometric decay ratio (default: 0.5)
    /// - `SAMPLER_INTERACTION_DEPTH`: Interaction depth (default: 2)
    /// - `SAMPLER_WEIGHT_INCREMENT`: Coverage weight increment (default: 1)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable has an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) but reads variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut settings = Self::default();
        for name in SETTING_NAMES {
            let key = format!("SAMPLER_{}", name.to_uppercase());
            if let Some(value) = lookup(&key) {
                settings.apply_setting(name, &value)?;
            }
        }
        settings.validate()?;
        Ok(settings)
    }

    /// Parses settings from YAML. Missing keys keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_yaml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads settings from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parses a settings file with one `name value` pair per line.
    ///
    /// Blank lines and lines starting with `#` are skipped.
    pub fn from_key_value_str(text: &str) -> Result<Self, ConfigError> {
        let mut settings = Self::default();
        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (name, value) = line
                .split_once(char::is_whitespace)
                .ok_or_else(|| ConfigError::MalformedLine {
                    line: number + 1,
                    content: line.to_string(),
                })?;
            settings.apply_setting(name, value.trim())?;
        }
        settings.validate()?;
        Ok(settings)
    }

    /// Sets one setting from its textual value.
    ///
    /// Does not validate; call [`validate`](Self::validate) once all settings are applied.
    pub fn apply_setting(&mut self, name: &str, value: &str) -> Result<(), ConfigError> {
        match name {
            "count" => self.count = parse_value(value, name)?,
            "seed" => {
                self.seed = match value.to_lowercase().as_str() {
                    "" | "none" => None,
                    _ => Some(parse_value(value, name)?),
                }
            }
            "distribution" => {
                self.distribution = value.parse().map_err(|e| ConfigError::InvalidValue {
                    key: name.to_string(),
                    message: format!("{e}"),
                })?
            }
            "decay" => self.decay = parse_value(value, name)?,
            "interaction_depth" => self.interaction_depth = parse_value(value, name)?,
            "weight_increment" => self.weight_increment = parse_value(value, name)?,
            _ => return Err(ConfigError::UnknownSetting(name.to_string())),
        }
        Ok(())
    }

    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationFailed` if any value is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.count == 0 {
            return Err(ConfigError::ValidationFailed(
                "count must be greater than 0".to_string(),
            ));
        }

        if !(self.decay > 0.0 && self.decay < 1.0) {
            return Err(ConfigError::ValidationFailed(
                "decay must be strictly between 0.0 and 1.0".to_string(),
            ));
        }

        if !(1..=MAX_INTERACTION_DEPTH).contains(&self.interaction_depth) {
            return Err(ConfigError::ValidationFailed(format!(
                "interaction_depth must be between 1 and {MAX_INTERACTION_DEPTH}"
            )));
        }

        if self.weight_increment == 0 {
            return Err(ConfigError::ValidationFailed(
                "weight_increment must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Builder method to set the sample count.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Builder method to set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder method to set the distribution.
    pub fn with_distribution(mut self, distribution: DistributionKind) -> Self {
        self.distribution = distribution;
        self
    }

    /// Builder method to set the geometric decay.
    pub fn with_decay(mut self, decay: f64) -> Self {
        self.decay = decay;
        self
    }

    /// Builder method to set the interaction depth.
    pub fn with_interaction_depth(mut self, depth: usize) -> Self {
        self.interaction_depth = depth;
        self
    }

    /// Builder method to set the weight increment.
    pub fn with_weight_increment(mut self, increment: u64) -> Self {
        self.weight_increment = increment;
        self
    }
}

impl fmt::Display for SamplerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let seed = self
            .seed
            .map(|s| s.to_string())
            .unwrap_or_else(|| "none".to_string());
        writeln!(f, "count : {}", self.count)?;
        writeln!(f, "seed : {}", seed)?;
        writeln!(f, "distribution : {}", self.distribution)?;
        writeln!(f, "decay : {}", self.decay)?;
        writeln!(f, "interaction_depth : {}", self.interaction_depth)?;
        writeln!(f, "weight_increment : {}", self.weight_increment)
    }
}

/// Parse a textual setting value.
fn parse_value<T: std::str::FromStr>(value: &str, key: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("could not parse '{}'", value),
    })
}
