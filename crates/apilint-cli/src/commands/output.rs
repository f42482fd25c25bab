//! Shared output formatting for lint reports.

use anyhow::Result;
use apilint_core::{LintReport, Verdict};
use std::io::IsTerminal;

use crate::OutputFormat;

/// Print a lint report in the specified format.
pub fn print(report: &LintReport, format: OutputFormat, show_noticed: bool) -> Result<()> {
    match format {
        OutputFormat::Text if std::io::stdout().is_terminal() => print_text(report, show_noticed),
        OutputFormat::Text => print!("{}", report.format_report(show_noticed)),
        OutputFormat::Json => return print_json(report),
        OutputFormat::Compact => print_compact(report, show_noticed),
    }
    Ok(())
}

fn print_text(report: &LintReport, show_noticed: bool) {
    for finding in &report.findings {
        if finding.noticed && !show_noticed {
            continue;
        }

        println!(
            "{} {} {} {}",
            finding.code, finding.rule, finding.kind, finding.element
        );
        println!("  {}: {}", colored(finding.verdict), finding.message);
        if let Some(location) = &finding.location {
            println!("  = at: {location}");
        }
        if finding.noticed {
            println!("  = note: already present in the baseline");
        }
        println!();
    }

    let (incompatible, errors, changes) = report.count_by_verdict();
    let verdict = report.verdict();
    let summary_color = color(verdict);

    let noticed = match report.noticed_count() {
        0 => String::new(),
        n => format!(", {n} noticed error(s)"),
    };
    println!(
        "{summary_color}Found {incompatible} incompatible change(s), {errors} api error(s), {changes} api change(s){noticed} => {verdict}\x1b[0m"
    );
}

fn color(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Incompatible => "\x1b[31m",
        Verdict::ApiError => "\x1b[35m",
        Verdict::ApiChange => "\x1b[33m",
        Verdict::Compatible => "\x1b[32m",
    }
}

fn colored(verdict: Verdict) -> String {
    format!("{}{verdict}\x1b[0m", color(verdict))
}

fn print_json(report: &LintReport) -> Result<()> {
    let json = serde_json::to_string_pretty(&report.result_json())?;
    println!("{json}");
    Ok(())
}

fn print_compact(report: &LintReport, show_noticed: bool) {
    for finding in &report.findings {
        if finding.noticed && !show_noticed {
            continue;
        }
        println!("{finding}");
    }
}
