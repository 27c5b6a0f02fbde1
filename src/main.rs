//! # Dependent Merge CLI
//!
//! This is the binary entry point for the `depmerge` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Executing the appropriate command based on the parsed arguments.
//! - Handing top-level errors back to the runtime, which prints them and
//!   exits non-zero.
//!
//! The merge and expansion logic lives in the `dependent_merge` library; the
//! binary is a thin wrapper that loads documents and prints results.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
