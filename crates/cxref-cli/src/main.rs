//! cxref-cli: Command-line front for the cxref indexer.

use clap::{Parser, Subcommand};
use cxref_core::{IndexConfig, IndexedFileDiff};
use cxref_index::Pipeline;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "cxref",
    about = "Cross-referencing indexer for C-family source code"
)]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index one translation unit and print the canonical snapshot dump
    Parse {
        /// Source file
        file: PathBuf,

        /// Emit the snapshot as JSON instead of the canonical text dump
        #[arg(long)]
        json: bool,

        /// Compile arguments for the frontend (after `--`)
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Index every supported file under a directory and print a summary
    Index {
        /// Root directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Compile arguments for the frontend (after `--`)
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Diff the snapshots of two versions of one translation unit
    Diff {
        /// The older version
        before: PathBuf,
        /// The newer version
        after: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), cxref_core::IndexError> {
    match cli.command {
        Commands::Parse { file, json, args } => {
            let snapshot = cxref_index::parse(&file.to_string_lossy(), &args)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print!("{}", snapshot.to_text());
            }
        }
        Commands::Index { path, args } => {
            let mut pipeline = Pipeline::new(IndexConfig::load_or_default()).with_args(args);
            let result = pipeline.index_directory(&path)?;
            let (types, funcs, vars) = result.entity_totals();
            println!(
                "{} parsed, {} skipped, {} failed: {} types, {} funcs, {} vars",
                result.files_parsed, result.files_skipped, result.files_failed, types, funcs, vars
            );
        }
        Commands::Diff { before, after } => {
            let old = cxref_index::parse(&before.to_string_lossy(), &[])?;
            let new = cxref_index::parse(&after.to_string_lossy(), &[])?;
            let diff = IndexedFileDiff::between(&old, &new);
            if diff.is_empty() {
                println!("no structural changes");
            } else {
                println!("{}", serde_json::to_string_pretty(&diff)?);
            }
        }
    }
    Ok(())
}
