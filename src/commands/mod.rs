//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `depmerge` command-line tool. Each subcommand is defined in its own file.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args`, loads the input
//!   documents, calls into the `dependent_merge` library and prints the
//!   result.

pub mod completions;
pub mod expand;
pub mod merge;
pub mod mergeby;
pub mod vars;

use anyhow::Result;
use serde_json::Value;

use dependent_merge::config::{render, OutputFormat};

/// Print a result document to stdout in the requested format.
pub fn emit(value: &Value, format: OutputFormat) -> Result<()> {
    let rendered = render(value, format)?;
    if rendered.ends_with('\n') {
        print!("{}", rendered);
    } else {
        println!("{}", rendered);
    }
    Ok(())
}
