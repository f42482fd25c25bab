//! Verdicts, findings and the aggregated lint report.

use crate::model::ElementKind;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a finding.
///
/// Ordered by precedence: the run's overall verdict is the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// No effect on consumers.
    Compatible,
    /// Additive change consumers can ignore.
    ApiChange,
    /// API authoring rule violated in a single snapshot.
    ApiError,
    /// Change that can break existing consumers.
    Incompatible,
}

impl Verdict {
    /// Process exit status for a run whose overall verdict is `self`.
    #[must_use]
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Compatible => 0,
            Self::ApiChange => 10,
            Self::ApiError => 77,
            Self::Incompatible => 131,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compatible => write!(f, "compatible"),
            Self::ApiChange => write!(f, "api change"),
            Self::ApiError => write!(f, "api error"),
            Self::Incompatible => write!(f, "incompatible"),
        }
    }
}

/// Which dump a location refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Snapshot {
    /// The baseline dump.
    Before,
    /// The dump under review.
    After,
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Before => write!(f, "before"),
            Self::After => write!(f, "after"),
        }
    }
}

/// Position of a declaration in one of the dumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Dump the line belongs to.
    pub snapshot: Snapshot,
    /// Line number (1-indexed).
    pub line: usize,
}

impl Location {
    /// Creates a new location.
    #[must_use]
    pub fn new(snapshot: Snapshot, line: usize) -> Self {
        Self { snapshot, line }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.snapshot, self.line)
    }
}

/// One classified difference or structural violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Rule code (e.g., "C1", "GV1").
    pub code: String,
    /// Rule name (e.g., "removed-element").
    pub rule: String,
    /// Classification.
    pub verdict: Verdict,
    /// Qualified element name (`pkg.Class#member(args)`).
    pub element: String,
    /// Kind of the element.
    pub kind: ElementKind,
    /// Human-readable message.
    pub message: String,
    /// Declaration position, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Structural error that the baseline already had.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub noticed: bool,
}

impl Finding {
    /// Creates a new finding.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        rule: impl Into<String>,
        verdict: Verdict,
        element: impl Into<String>,
        kind: ElementKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            rule: rule.into(),
            verdict,
            element: element.into(),
            kind,
            message: message.into(),
            location: None,
            noticed: false,
        }
    }

    /// Sets the declaration position.
    #[must_use]
    pub fn with_location(mut self, location: Option<Location>) -> Self {
        self.location = location;
        self
    }

    /// Marks the finding as already present in the baseline.
    #[must_use]
    pub fn with_noticed(mut self, noticed: bool) -> Self {
        self.noticed = noticed;
        self
    }

    /// Formats the finding for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        use std::fmt::Write;
        let mut output = format!("{} {} {} {}\n", self.code, self.rule, self.kind, self.element);
        let _ = writeln!(output, "  {}: {}", self.verdict, self.message);
        if let Some(location) = &self.location {
            let _ = writeln!(output, "  = at: {location}");
        }
        if self.noticed {
            let _ = writeln!(output, "  = note: already present in the baseline");
        }
        output
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}: {}",
            self.verdict, self.code, self.element, self.message
        )?;
        if let Some(location) = &self.location {
            write!(f, " ({location})")?;
        }
        Ok(())
    }
}

/// Machine-readable summary written by `--result-json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultJson {
    /// Whether any (unnoticed) structural error was found.
    pub failure: bool,
    /// Unnoticed structural errors.
    pub failures: Vec<Finding>,
    /// Incompatible changes.
    pub compat_failures: Vec<Finding>,
    /// Compatible API changes.
    pub api_changes: Vec<Finding>,
    /// Structural errors already present in the baseline.
    pub noticed: Vec<Finding>,
}

/// Result of one lint run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LintReport {
    /// All findings, diff findings first, in element order.
    pub findings: Vec<Finding>,
    /// Whether a baseline was compared.
    pub compared: bool,
}

impl LintReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Findings that count towards the outcome (noticed errors excluded).
    pub fn active(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| !f.noticed)
    }

    /// Returns active findings with the given verdict.
    #[must_use]
    pub fn by_verdict(&self, verdict: Verdict) -> Vec<&Finding> {
        self.active().filter(|f| f.verdict == verdict).collect()
    }

    /// Counts active findings as (incompatible, api errors, api changes).
    #[must_use]
    pub fn count_by_verdict(&self) -> (usize, usize, usize) {
        let count = |verdict: Verdict| self.active().filter(|f| f.verdict == verdict).count();
        (
            count(Verdict::Incompatible),
            count(Verdict::ApiError),
            count(Verdict::ApiChange),
        )
    }

    /// Number of noticed structural errors.
    #[must_use]
    pub fn noticed_count(&self) -> usize {
        self.findings.iter().filter(|f| f.noticed).count()
    }

    /// Returns true if there are unnoticed structural errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.active().any(|f| f.verdict == Verdict::ApiError)
    }

    /// Highest-precedence verdict among active findings.
    #[must_use]
    pub fn verdict(&self) -> Verdict {
        self.active()
            .map(|f| f.verdict)
            .max()
            .unwrap_or(Verdict::Compatible)
    }

    /// Process exit status for this report.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        self.verdict().exit_code()
    }

    /// Builds the structured result.
    #[must_use]
    pub fn result_json(&self) -> ResultJson {
        let cloned = |verdict| -> Vec<Finding> { self.by_verdict(verdict).into_iter().cloned().collect() };
        ResultJson {
            failure: self.has_errors(),
            failures: cloned(Verdict::ApiError),
            compat_failures: cloned(Verdict::Incompatible),
            api_changes: cloned(Verdict::ApiChange),
            noticed: self.findings.iter().filter(|f| f.noticed).cloned().collect(),
        }
    }

    /// Formats the report as plain text, one block per finding.
    #[must_use]
    pub fn format_report(&self, show_noticed: bool) -> String {
        use std::fmt::Write;

        let mut report = String::new();
        for finding in &self.findings {
            if finding.noticed && !show_noticed {
                continue;
            }
            let _ = writeln!(report, "{}", finding.format());
        }

        let (incompatible, errors, changes) = self.count_by_verdict();
        let _ = write!(
            report,
            "Total: {incompatible} incompatible change(s), {errors} api error(s), {changes} api change(s)"
        );
        if self.noticed_count() > 0 {
            let _ = write!(report, ", {} noticed error(s)", self.noticed_count());
        }
        let _ = writeln!(report, " => {}", self.verdict());
        report
    }
}
