//! # Merge Command Implementation
//!
//! This module implements the `merge` subcommand, which deep merges two
//! documents. The right document takes precedence on conflicting scalar
//! values and lists are combined according to `--list-merge`.

use anyhow::{Context, Result};
use clap::Args;
use log::debug;
use std::path::PathBuf;

use dependent_merge::config::{load_document, OutputFormat};
use dependent_merge::merge::{merge, ListMerge, MergeOptions};

/// Deep merge two documents
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// The base document.
    #[arg(value_name = "LEFT")]
    pub left: PathBuf,

    /// The document merged on top of LEFT.
    #[arg(value_name = "RIGHT")]
    pub right: PathBuf,

    /// Replace nested mappings wholesale instead of merging them key by key.
    #[arg(long)]
    pub no_recursive: bool,

    /// How lists at the same key are combined
    /// (replace, keep, append, prepend, append_rp, prepend_rp).
    #[arg(long, value_name = "POLICY", default_value = "replace")]
    pub list_merge: ListMerge,
}

/// Execute the `merge` command.
pub fn execute(args: MergeArgs, format: OutputFormat) -> Result<()> {
    let left = load_document(&args.left)
        .with_context(|| format!("Failed to load {}", args.left.display()))?;
    let right = load_document(&args.right)
        .with_context(|| format!("Failed to load {}", args.right.display()))?;

    let options = MergeOptions::new(!args.no_recursive, args.list_merge);
    debug!(
        "merging {} into {} with {:?}",
        args.right.display(),
        args.left.display(),
        options
    );

    super::emit(&merge(&left, &right, &options), format)
}
