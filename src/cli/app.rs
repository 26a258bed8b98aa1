//! Main CLI application structure

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::reorder;
use crate::domain::SortMode;

#[derive(Parser)]
#[command(name = "tidytodo")]
#[command(author, version, about = "Plain-text todo-list reorganizer")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Regroup tasks under generated section headers
    Reorder {
        /// Todo file to rewrite ("-" for stdin/stdout)
        file: String,

        /// Grouping key (defaults to the configured mode)
        #[arg(long, value_enum)]
        by: Option<SortMode>,

        /// Header nesting depth: 1, or 2 to nest by the other tag kind
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=2))]
        levels: Option<u8>,

        /// Print the result instead of rewriting the file
        #[arg(long)]
        dry_run: bool,
    },

    /// Move done tasks into the archive section and re-sort
    Archive {
        /// Todo file to rewrite ("-" for stdin/stdout)
        file: String,

        /// Print the result instead of rewriting the file
        #[arg(long)]
        dry_run: bool,
    },
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(cli.format, cli.verbose);

    output.verbose("tidytodo starting");

    match cli.command {
        Commands::Reorder {
            file,
            by,
            levels,
            dry_run,
        } => {
            output.verbose_ctx(
                "reorder",
                &format!("file={}, by={:?}, levels={:?}", file, by, levels),
            );
            reorder::reorder(&output, &file, by, levels, dry_run)?;
        }

        Commands::Archive { file, dry_run } => {
            output.verbose_ctx("archive", &format!("file={}", file));
            reorder::archive(&output, &file, dry_run)?;
        }
    }

    output.verbose("Command completed successfully");
    Ok(())
}
