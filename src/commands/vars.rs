//! # Vars Command Implementation
//!
//! This module implements the `vars` subcommand, which merges every variable
//! of a variables document whose name matches a pattern. One merged value is
//! printed per pattern.

use anyhow::{Context, Result};
use clap::Args;
use log::debug;
use serde_json::Value;
use std::path::PathBuf;

use dependent_merge::config::{load_document, load_mapping, OutputFormat};
use dependent_merge::merge::variables::{
    merge_variables, MergeVariablesOptions, OverridePolicy, PatternType,
};

/// Merge the variables whose names match patterns
#[derive(Args, Debug)]
pub struct VarsArgs {
    /// Patterns selecting variable names.
    #[arg(value_name = "PATTERN", required = true)]
    pub patterns: Vec<String>,

    /// Document holding the variables.
    #[arg(long, value_name = "FILE")]
    pub vars: PathBuf,

    /// How patterns match names (regex, prefix, suffix).
    #[arg(long, value_name = "TYPE", default_value = "regex")]
    pub pattern_type: PatternType,

    /// Document holding the value the merge starts from.
    #[arg(long, value_name = "FILE")]
    pub initial: Option<PathBuf>,

    /// What to do when a value would be overwritten (error, warn).
    #[arg(long = "override", value_name = "POLICY", default_value = "error")]
    pub on_override: OverridePolicy,
}

/// Execute the `vars` command.
pub fn execute(args: VarsArgs, format: OutputFormat) -> Result<()> {
    let variables = load_mapping(&args.vars)
        .with_context(|| format!("Failed to load {}", args.vars.display()))?;
    let initial_value = match &args.initial {
        Some(path) => Some(
            load_document(path).with_context(|| format!("Failed to load {}", path.display()))?,
        ),
        None => None,
    };

    let options = MergeVariablesOptions {
        pattern_type: args.pattern_type,
        initial_value,
        on_override: args.on_override,
    };
    debug!(
        "merging variables matching {:?} from {} candidates",
        args.patterns,
        variables.len()
    );

    let merged = merge_variables(&variables, &args.patterns, &options)?;
    super::emit(&Value::Array(merged), format)
}
