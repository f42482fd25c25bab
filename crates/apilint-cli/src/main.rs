//! apilint CLI tool.
//!
//! Usage:
//! ```bash
//! apilint [OPTIONS] <AFTER> [BEFORE]
//! apilint --list-rules
//! ```
//!
//! Exit status: 0 no change, 10 compatible API change, 77 structural API
//! error, 131 incompatible change, 1 fatal error.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// API compatibility linter for Java API dumps
#[derive(Parser)]
#[command(name = "apilint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// API dump to check
    #[arg(required_unless_present = "list_rules")]
    after: Option<PathBuf>,

    /// Baseline API dump; without it only structural rules run
    before: Option<PathBuf>,

    /// Only report these structural rules (comma-separated codes), or NONE
    #[arg(long, value_name = "RULE|NONE", value_delimiter = ',')]
    filter_errors: Vec<String>,

    /// Also report structural errors already present in the baseline
    #[arg(long)]
    show_noticed: bool,

    /// Write the structured result to this file
    #[arg(long, value_name = "PATH")]
    result_json: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Class exclude patterns (can be specified multiple times)
    #[arg(short, long, value_name = "GLOB")]
    exclude: Vec<String>,

    /// Structural rule preset
    #[arg(long, default_value = "recommended")]
    preset: PresetArg,

    /// List available rules
    #[arg(long)]
    list_rules: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, env = "APILINT_CONFIG")]
    config: Option<PathBuf>,
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output (the structured result).
    Json,
    /// One-line-per-finding compact format.
    Compact,
}

/// Structural rule preset selection.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum PresetArg {
    /// Every structural rule.
    #[default]
    Recommended,
    /// Duplicate declarations only.
    Minimal,
}

impl From<PresetArg> for apilint_rules::Preset {
    fn from(value: PresetArg) -> Self {
        match value {
            PresetArg::Recommended => Self::Recommended,
            PresetArg::Minimal => Self::Minimal,
        }
    }
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

    if cli.list_rules {
        commands::list_rules::run();
        return Ok(());
    }

    let Some(after) = cli.after else {
        anyhow::bail!("missing API dump to check");
    };

    let source = config_resolver::resolve(&after, cli.config.as_deref());

    let args = commands::check::CheckArgs {
        after,
        before: cli.before,
        filter_errors: cli.filter_errors,
        show_noticed: cli.show_noticed,
        result_json: cli.result_json,
        format: cli.format,
        exclude: cli.exclude,
        preset: cli.preset.into(),
    };
    let code = commands::check::run(&args, &source)?;
    std::process::exit(code);
}
