//! Command-line interface for the Vela compiler.

mod pipeline;
mod repl;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vela")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a source file and report diagnostics
    #[command(visible_alias = "c")]
    Check {
        /// Path to the source file
        file: PathBuf,
    },

    /// Analyze a source file and print its HIR
    #[command(visible_alias = "d")]
    Dump {
        /// Path to the source file
        file: PathBuf,
    },

    /// Start an interactive session
    Repl,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Check { file }) => pipeline::check(&file, false),
        Some(Commands::Dump { file }) => pipeline::check(&file, true),
        Some(Commands::Repl) | None => repl::run(),
    }
}
