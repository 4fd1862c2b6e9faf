//! `dimgen`: generates unit-safe C++ dimension headers from JSON specifications.
//!
//! Loads every `--spec` document in order, aggregates the dimensions by name,
//! and writes the per-dimension headers plus the umbrella header under
//! `--out`.
//!
//! **Usage:**
//! ```
//! dimgen [--spec <file>]... [--out <dir>] [--templates <dir>] [--deny-duplicates] [-v]
//! ```
//!
//! Exits non-zero if any record was skipped or any artifact failed.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::error::Error;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use dimgen_codegen::{generate, TemplateSet};
use dimgen_spec::{aggregate, loader};

/// Generate C++ dimension headers.
#[derive(Parser)]
#[command(
    name = "dimgen",
    about = "Generate unit-safe C++ dimension headers from JSON specifications"
)]
struct Args {
    /// Specification documents, read in order.
    #[arg(
        long = "spec",
        value_name = "FILE",
        default_values = ["metadata/FundamentalUnits.json", "metadata/DerivedUnits.json"]
    )]
    specs: Vec<PathBuf>,

    /// Output root; headers are written under `<out>/Dimension/`.
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Directory holding replacement templates (default: built-in).
    #[arg(long, value_name = "DIR")]
    templates: Option<PathBuf>,

    /// Fail the run when two records share a dimension name.
    #[arg(long)]
    deny_duplicates: bool,

    /// Raise log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let templates = match &args.templates {
        Some(dir) => TemplateSet::from_dir(dir)
            .with_context(|| format!("Failed to load templates from {}", dir.display()))?,
        None => TemplateSet::builtin().context("Failed to load built-in templates")?,
    };

    let load = loader::load_files(&args.specs).context("Failed to load specification")?;
    let skipped = load.diagnostics.len();
    let all = aggregate(load.dimensions);

    println!("dimgen Generation Report");
    println!("========================");
    println!();

    for diag in &load.diagnostics {
        let name = diag.name.as_deref().unwrap_or("<unnamed>");
        println!(
            "[SKIP] {}#{} ({}): {}",
            diag.source, diag.index, name, diag.error
        );
    }
    for overwrite in all.overwrites() {
        println!(
            "[DUP]  {}: {} definition replaced by {} definition",
            overwrite.name, overwrite.previous, overwrite.current
        );
    }

    let report = generate(&all, &templates, &args.out);

    for outcome in &report.outcomes {
        match &outcome.error {
            None => println!("[OK]   {}", outcome.path.display()),
            Some(error) => {
                println!("[FAIL] {}: {}", outcome.path.display(), error);
                let mut source = error.source();
                while let Some(cause) = source {
                    println!("       {cause}");
                    source = cause.source();
                }
            }
        }
    }

    let duplicates = all.overwrites().len();
    println!();
    println!(
        "Summary: {} written, {} failed, {} records skipped, {} duplicates",
        report.success_count(),
        report.failure_count(),
        skipped,
        duplicates
    );

    let duplicate_failure = args.deny_duplicates && duplicates > 0;
    if !report.all_succeeded() || skipped > 0 || duplicate_failure {
        eprintln!("Generation FAILED.");
        process::exit(1);
    }

    println!("Generation PASSED.");
    Ok(())
}
