//! # Expand Command Implementation
//!
//! This module implements the `expand` subcommand. The terms document is a
//! list of one-entry mappings, each naming a dimension and giving either a
//! literal list/mapping or an expression over `item` and the variables file:
//!
//! ```yaml
//! - host: "{{ hosts }}"
//! - port: item.host.value.ports
//! ```
//!
//! Every combination is printed as one record.

use anyhow::{anyhow, Context, Result};
use clap::Args;
use log::{debug, info};
use serde_json::{Map, Value};
use std::path::PathBuf;

use dependent_merge::config::{load_document, load_mapping, OutputFormat};
use dependent_merge::dependent::{expand, parse_terms};
use dependent_merge::expr::PathEvaluator;

/// Expand dependent dimensions into every combination
#[derive(Args, Debug)]
pub struct ExpandArgs {
    /// Document holding the list of dimension terms.
    #[arg(value_name = "TERMS")]
    pub terms: PathBuf,

    /// Document holding the variables expressions can refer to.
    #[arg(long, value_name = "FILE")]
    pub vars: Option<PathBuf>,
}

/// Execute the `expand` command.
pub fn execute(args: ExpandArgs, format: OutputFormat) -> Result<()> {
    let document = load_document(&args.terms)
        .with_context(|| format!("Failed to load {}", args.terms.display()))?;
    let terms = match document {
        Value::Array(terms) => terms,
        other => {
            return Err(anyhow!(
                "{} must contain a list of dimension terms, found {}",
                args.terms.display(),
                other
            ))
        }
    };

    let context = match &args.vars {
        Some(path) => {
            load_mapping(path).with_context(|| format!("Failed to load {}", path.display()))?
        }
        None => Map::new(),
    };

    let dimensions = parse_terms(&terms)?;
    debug!(
        "expanding {} dimensions with {} variables",
        dimensions.len(),
        context.len()
    );

    let records = expand(&dimensions, &context, &PathEvaluator::new())?;
    info!("expanded into {} records", records.len());

    let output = Value::Array(records.into_iter().map(Value::Object).collect());
    super::emit(&output, format)
}
