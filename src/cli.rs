//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::debug;

use crate::commands;
use dependent_merge::config::OutputFormat;

/// Dependent Merge - merge documents, merge record lists by key and expand
/// dependent cross products
#[derive(Parser, Debug)]
#[command(name = "depmerge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Output format for results (json, yaml)
    #[arg(long, global = true, value_name = "FORMAT", default_value = "json")]
    format: OutputFormat,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        env = "DEPMERGE_LOG",
        default_value = "warn"
    )]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Deep merge two documents
    Merge(commands::merge::MergeArgs),

    /// Merge lists of records by a key field
    Mergeby(commands::mergeby::MergebyArgs),

    /// Expand dependent dimensions into every combination
    Expand(commands::expand::ExpandArgs),

    /// Merge the variables whose names match patterns
    Vars(commands::vars::VarsArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);
        debug!("output format: {:?}", self.format);

        match self.command {
            Commands::Merge(args) => commands::merge::execute(args, self.format),
            Commands::Mergeby(args) => commands::mergeby::execute(args, self.format),
            Commands::Expand(args) => commands::expand::execute(args, self.format),
            Commands::Vars(args) => commands::vars::execute(args, self.format),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

fn init_logging(level: &str) {
    // A logger may already be installed when running inside tests.
    let _ = env_logger::Builder::new()
        .parse_filters(level)
        .format_timestamp(None)
        .try_init();
}
