//! # gemdex-cli
//!
//! Command-line entry point for gemdex: normalize gemspec metadata, import
//! it into the package database, convert spec index streams to sorted text,
//! and extract package lists from Gemfiles.
//!
//! This binary only does argument parsing, logging setup, and stream
//! plumbing; all semantics live in `gemdex-core` and `gemdex-store`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

mod commands;

/// Normalize gem package metadata and index listings
#[derive(Parser)]
#[command(name = "gemdex", version, about = "Gem metadata normalization tools")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Normalize gemspec YAML files; print a key/value dump or import into
    /// the package database
    Spec {
        /// Import specs into the package database instead of printing
        #[arg(short = 'i', long)]
        import: bool,

        /// Package database root directory
        #[arg(long, env = "GEMDEX_DB", required_if_eq("import", "true"))]
        db: Option<PathBuf>,

        /// Gemspec YAML files (`-` reads standard input)
        #[arg(required = true, value_name = "SPEC")]
        files: Vec<PathBuf>,
    },
    /// Convert a spec index stream to sorted `name version platform` lines
    Index {
        /// Index stream file (defaults to standard input)
        file: Option<PathBuf>,
    },
    /// Convert a Gemfile to a list of installable packages
    Gemfile {
        /// Gemfile path (defaults to standard input)
        path: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    match commands::dispatch(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            eprintln!("gemdex: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "gemdex={},gemdex_core={},gemdex_store={}",
            level, level, level
        ))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
