//! Command-line interface for spl-sampler.
//!
//! Provides commands for sampling a feature model and for inspecting target
//! distributions.

mod commands;

pub use commands::{parse_cli, run, run_with_cli, Cli, Commands};
