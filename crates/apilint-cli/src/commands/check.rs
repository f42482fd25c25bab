//! Check command implementation.

use anyhow::{Context, Result};
use apilint_core::{parse_str, Analyzer, ApiModel, Config, ErrorFilter};
use apilint_rules::{Preset, COMPAT_RULES};
use std::path::{Path, PathBuf};

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Exit status for I/O, parse and configuration failures.
pub const FATAL_EXIT: i32 = 1;

/// Arguments of one check run.
#[derive(Debug)]
pub struct CheckArgs {
    /// Dump under review.
    pub after: PathBuf,
    /// Baseline dump.
    pub before: Option<PathBuf>,
    /// Raw `--filter-errors` values.
    pub filter_errors: Vec<String>,
    /// Print noticed errors too.
    pub show_noticed: bool,
    /// Where to write the structured result.
    pub result_json: Option<PathBuf>,
    /// Stdout format.
    pub format: OutputFormat,
    /// Extra class exclude globs.
    pub exclude: Vec<String>,
    /// Structural rule preset.
    pub preset: Preset,
}

/// Runs the check command and returns the process exit status.
///
/// A malformed dump is rendered as a diagnostic and yields [`FATAL_EXIT`].
pub fn run(args: &CheckArgs, source: &ConfigSource) -> Result<i32> {
    let config = load_config(source)?;

    let Some(after) = load_dump(&args.after)? else {
        return Ok(FATAL_EXIT);
    };
    let before = match &args.before {
        Some(path) => match load_dump(path)? {
            Some(model) => Some(model),
            None => return Ok(FATAL_EXIT),
        },
        None => None,
    };

    let mut builder = Analyzer::builder()
        .after(after)
        .before(before)
        .compat_rules(COMPAT_RULES)
        .excludes(args.exclude.iter().cloned())
        .error_filter(ErrorFilter::parse(&args.filter_errors.join(",")))
        .config(config);

    for rule in args.preset.rules() {
        builder = builder.rule_box(rule);
    }

    let analyzer = builder.build().context("Failed to build analyzer")?;

    tracing::info!(
        "Checking {} with {} rules",
        args.after.display(),
        analyzer.rule_count()
    );

    let report = analyzer.analyze();

    if let Some(path) = &args.result_json {
        let json = serde_json::to_string_pretty(&report.result_json())?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write result: {}", path.display()))?;
    }

    super::output::print(&report, args.format, args.show_noticed)?;

    Ok(report.exit_code())
}

fn load_config(source: &ConfigSource) -> Result<Config> {
    match source {
        ConfigSource::Default => Ok(Config::default()),
        other => {
            let p = other.path().context("resolved config has no path")?;
            if matches!(source, ConfigSource::Discovered(_)) {
                tracing::info!("Using config: {}", p.display());
            }
            Config::from_file(p).with_context(|| format!("Failed to load config: {}", p.display()))
        }
    }
}

// `Ok(None)` means the dump was malformed and the diagnostic was printed.
fn load_dump(path: &Path) -> Result<Option<ApiModel>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read API dump: {}", path.display()))?;
    match parse_str(&path.display().to_string(), &content) {
        Ok(model) => Ok(Some(model)),
        Err(err) => {
            eprintln!("{:?}", miette::Report::new(err));
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const BEFORE: &str = "package p {\n  public class A {\n    method public void f();\n  }\n}\n";
    const AFTER: &str = "package p {\n  public class A {\n    method public void f();\n    method public void g();\n  }\n}\n";

    fn args(dir: &TempDir, after: &str, before: Option<&str>) -> CheckArgs {
        let after_path = dir.path().join("after.txt");
        fs::write(&after_path, after).unwrap();
        let before_path = before.map(|content| {
            let path = dir.path().join("before.txt");
            fs::write(&path, content).unwrap();
            path
        });
        CheckArgs {
            after: after_path,
            before: before_path,
            filter_errors: Vec::new(),
            show_noticed: false,
            result_json: Some(dir.path().join("result.json")),
            format: OutputFormat::Compact,
            exclude: Vec::new(),
            preset: Preset::Recommended,
        }
    }

    #[test]
    fn addition_exits_with_api_change() {
        let dir = TempDir::new().unwrap();
        let args = args(&dir, AFTER, Some(BEFORE));
        assert_eq!(run(&args, &ConfigSource::Default).unwrap(), 10);

        let written = fs::read_to_string(dir.path().join("result.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(json["failure"], false);
        assert_eq!(json["api_changes"][0]["element"], "p.A#g()");
    }

    #[test]
    fn malformed_dump_is_fatal() {
        let dir = TempDir::new().unwrap();
        let args = args(&dir, "package p {\n  public class A {\n", None);
        assert_eq!(run(&args, &ConfigSource::Default).unwrap(), FATAL_EXIT);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let mut args = args(&dir, AFTER, None);
        args.after = dir.path().join("missing.txt");
        assert!(run(&args, &ConfigSource::Default).is_err());
    }

    #[test]
    fn config_disables_rules() {
        let dir = TempDir::new().unwrap();
        let fields_only = "package p {\n  public class A {\n    field public int x;\n  }\n}\n";
        let args = args(&dir, fields_only, None);
        assert_eq!(run(&args, &ConfigSource::Default).unwrap(), 77);

        let config = dir.path().join("apilint.toml");
        fs::write(&config, "[rules.GV1]\nenabled = false\n").unwrap();
        assert_eq!(run(&args, &ConfigSource::Discovered(config)).unwrap(), 0);
    }

    #[test]
    fn filter_none_drops_structural_errors() {
        let dir = TempDir::new().unwrap();
        let fields_only = "package p {\n  public class A {\n    field public int x;\n  }\n}\n";
        let mut args = args(&dir, fields_only, None);
        args.filter_errors = vec!["NONE".to_string()];
        assert_eq!(run(&args, &ConfigSource::Default).unwrap(), 0);
    }
}
