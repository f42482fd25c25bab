//! Core analyzer for orchestrating lint execution.

use crate::config::Config;
use crate::context::SnapshotContext;
use crate::diff::{diff, DiffItem};
use crate::model::ApiModel;
use crate::rule::{classify, CompatRule, ErrorFilter, StructuralRule, StructuralRuleBox};
use crate::types::{Finding, LintReport, Snapshot, Verdict};

use glob::Pattern;
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Code attached to diff items no table row matched.
pub const UNCLASSIFIED: &str = "C0";

/// Errors that can occur while setting up an analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// No snapshot to check was given.
    #[error("no API snapshot to check")]
    MissingSnapshot,

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    after: Option<ApiModel>,
    before: Option<ApiModel>,
    compat_rules: &'static [CompatRule],
    structural_rules: Vec<StructuralRuleBox>,
    exclude_patterns: Vec<String>,
    error_filter: ErrorFilter,
    config: Option<Config>,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the snapshot under review.
    #[must_use]
    pub fn after(mut self, model: ApiModel) -> Self {
        self.after = Some(model);
        self
    }

    /// Sets the baseline snapshot. Without one only structural rules run.
    #[must_use]
    pub fn before(mut self, model: Option<ApiModel>) -> Self {
        self.before = model;
        self
    }

    /// Sets the ordered compatibility table.
    #[must_use]
    pub fn compat_rules(mut self, table: &'static [CompatRule]) -> Self {
        self.compat_rules = table;
        self
    }

    /// Adds a structural rule to the analyzer.
    #[must_use]
    pub fn structural_rule<R: StructuralRule + 'static>(mut self, rule: R) -> Self {
        self.structural_rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed structural rule to the analyzer.
    #[must_use]
    pub fn rule_box(mut self, rule: StructuralRuleBox) -> Self {
        self.structural_rules.push(rule);
        self
    }

    /// Adds a class exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple class exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Restricts which structural findings are reported.
    #[must_use]
    pub fn error_filter(mut self, filter: ErrorFilter) -> Self {
        self.error_filter = filter;
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if no snapshot was set or an exclude glob is invalid.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let after = self.after.ok_or(AnalyzerError::MissingSnapshot)?;
        let config = self.config.unwrap_or_default();

        let mut exclude = self
            .exclude_patterns
            .iter()
            .map(|p| Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        exclude.extend(config.exclude_patterns()?);

        Ok(Analyzer {
            after,
            before: self.before,
            compat_rules: self.compat_rules,
            structural_rules: self.structural_rules,
            exclude,
            error_filter: self.error_filter,
            config,
        })
    }
}

/// The main analyzer that orchestrates lint execution.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    after: ApiModel,
    before: Option<ApiModel>,
    compat_rules: &'static [CompatRule],
    structural_rules: Vec<StructuralRuleBox>,
    exclude: Vec<Pattern>,
    error_filter: ErrorFilter,
    config: Config,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.compat_rules.len() + self.structural_rules.len()
    }

    /// Whether a baseline will be compared.
    #[must_use]
    pub fn has_baseline(&self) -> bool {
        self.before.is_some()
    }

    /// Runs the diff, the compatibility table and the structural rules.
    #[must_use]
    pub fn analyze(&self) -> LintReport {
        info!(
            "Starting analysis: {} classes, baseline: {}",
            self.after.classes().count(),
            self.has_baseline()
        );

        let mut report = LintReport::new();
        report.compared = self.before.is_some();

        if let Some(before) = &self.before {
            let result = diff(before, &self.after, &self.exclude);
            info!("Found {} differences", result.len());
            report
                .findings
                .extend(result.items().iter().map(|item| self.classify_item(item)));
        }

        let baseline: BTreeSet<(String, String)> = self
            .before
            .as_ref()
            .map(|before| {
                self.structural(before, Snapshot::Before)
                    .into_iter()
                    .map(|f| (f.code, f.element))
                    .collect()
            })
            .unwrap_or_default();

        for finding in self.structural(&self.after, Snapshot::After) {
            let noticed = baseline.contains(&(finding.code.clone(), finding.element.clone()));
            if noticed {
                debug!("Already in baseline: {} {}", finding.code, finding.element);
            }
            report.findings.push(finding.with_noticed(noticed));
        }

        let (incompatible, errors, changes) = report.count_by_verdict();
        info!(
            "Analysis complete: {} incompatible, {} errors, {} changes, {} noticed",
            incompatible,
            errors,
            changes,
            report.noticed_count()
        );
        report
    }

    fn classify_item(&self, item: &DiffItem) -> Finding {
        if let Some(rule) = classify(self.compat_rules, item) {
            debug!("{} {}: {}", rule.code, item.path, item.change);
            return rule.finding(item);
        }
        warn!("No rule matches {}: {}", item.path, item.change);
        CompatRule {
            code: UNCLASSIFIED,
            name: "unclassified-change",
            description: "Difference no rule matched",
            verdict: Verdict::Incompatible,
            applies: |_| true,
        }
        .finding(item)
    }

    fn structural(&self, model: &ApiModel, snapshot: Snapshot) -> Vec<Finding> {
        let ctx = SnapshotContext::new(model, snapshot);
        let mut findings = Vec::new();

        for rule in &self.structural_rules {
            if !self.config.is_rule_enabled(rule.code()) {
                debug!("Skipping disabled rule: {}", rule.code());
                continue;
            }
            if !self.error_filter.allows(rule.code()) {
                debug!("Filtered rule: {}", rule.code());
                continue;
            }
            findings.extend(rule.check(&ctx));
        }

        findings.sort_by(|a, b| a.element.cmp(&b.element).then(a.code.cmp(&b.code)));
        findings
    }
}
