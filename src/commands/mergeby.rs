//! # Mergeby Command Implementation
//!
//! This module implements the `mergeby` subcommand, which merges lists of
//! records sharing a key field into one sorted list. Each file holds either a
//! list of records or a list of such lists.
//!
//! When the same key appears in several files, the file given first supplies
//! the winning scalar values.

use anyhow::{Context, Result};
use clap::Args;
use log::debug;
use serde_json::Value;
use std::path::PathBuf;

use dependent_merge::config::{load_document, OutputFormat};
use dependent_merge::merge::keyed::lists_mergeby;
use dependent_merge::merge::{ListMerge, MergeOptions};

/// Merge lists of records by a key field
#[derive(Args, Debug)]
pub struct MergebyArgs {
    /// Documents holding record lists, in precedence order.
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// The key field records are grouped by.
    #[arg(short, long, value_name = "KEY")]
    pub index: String,

    /// Merge nested mappings inside records key by key.
    #[arg(long)]
    pub recursive: bool,

    /// How lists inside records are combined
    /// (replace, keep, append, prepend, append_rp, prepend_rp).
    #[arg(long, value_name = "POLICY", default_value = "replace")]
    pub list_merge: ListMerge,
}

/// Execute the `mergeby` command.
pub fn execute(args: MergebyArgs, format: OutputFormat) -> Result<()> {
    let terms = args
        .files
        .iter()
        .map(|path| {
            load_document(path).with_context(|| format!("Failed to load {}", path.display()))
        })
        .collect::<Result<Vec<Value>>>()?;

    let options = MergeOptions::new(args.recursive, args.list_merge);
    debug!(
        "merging {} documents by '{}' with {:?}",
        terms.len(),
        args.index,
        options
    );

    let merged = lists_mergeby(&terms, &args.index, &options)?;
    super::emit(&Value::Array(merged), format)
}
