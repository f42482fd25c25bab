//! changelog-check: verifies that a changelog pins the current API dump.
//!
//! Usage:
//! ```bash
//! changelog-check --api-file api.txt --changelog-file CHANGELOG.md
//! ```
//!
//! Exit status: 0 up to date, 10 stale pin, 11 missing pin, 1 fatal error.

use anyhow::Result;
use apilint_core::check_changelog_files;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Checks the `[api-version]` pin of a changelog against an API dump
#[derive(Parser)]
#[command(name = "changelog-check")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// API dump the changelog documents
    #[arg(long, value_name = "PATH")]
    api_file: PathBuf,

    /// Changelog containing the `[api-version]: <sha1>` line
    #[arg(long, value_name = "PATH")]
    changelog_file: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let status = check_changelog_files(&cli.api_file, &cli.changelog_file)?;
    tracing::debug!("Changelog status: {:?}", status);

    if let Some(notice) = status.notice(&cli.changelog_file) {
        println!("{notice}");
    }

    std::process::exit(status.exit_code());
}
