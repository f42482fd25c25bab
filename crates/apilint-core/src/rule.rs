//! Rule types: the compatibility table rows and structural rules.

use crate::context::SnapshotContext;
use crate::diff::{Change, DiffItem};
use crate::types::{Finding, Location, Snapshot, Verdict};

use std::collections::BTreeSet;
use std::fmt;

/// One row of the compatibility table.
///
/// Rows are plain data evaluated in order; the first row whose predicate
/// matches a diff item decides its verdict.
///
/// # Example
///
/// ```ignore
/// use apilint_core::{CompatRule, Verdict, Change};
///
/// pub static TABLE: &[CompatRule] = &[CompatRule {
///     code: "C1",
///     name: "removed-element",
///     description: "A package, class or member was removed",
///     verdict: Verdict::Incompatible,
///     applies: |item| matches!(item.change, Change::Removed { .. }),
/// }];
/// ```
#[derive(Clone, Copy)]
pub struct CompatRule {
    /// Rule code (e.g., "C1").
    pub code: &'static str,
    /// Kebab-case rule name.
    pub name: &'static str,
    /// Brief description of the condition.
    pub description: &'static str,
    /// Verdict assigned to matching items.
    pub verdict: Verdict,
    /// Predicate over a diff item.
    pub applies: fn(&DiffItem) -> bool,
}

impl CompatRule {
    /// Builds the finding for an item this row matched.
    #[must_use]
    pub fn finding(&self, item: &DiffItem) -> Finding {
        Finding::new(
            self.code,
            self.name,
            self.verdict,
            item.path.to_string(),
            item.kind,
            item.change.to_string(),
        )
        .with_location(item_location(item))
    }
}

impl fmt::Debug for CompatRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompatRule")
            .field("code", &self.code)
            .field("name", &self.name)
            .field("verdict", &self.verdict)
            .finish_non_exhaustive()
    }
}

/// Returns the first row of `table` that matches `item`.
#[must_use]
pub fn classify<'t>(table: &'t [CompatRule], item: &DiffItem) -> Option<&'t CompatRule> {
    table.iter().find(|rule| (rule.applies)(item))
}

// Removals point into the baseline; everything else into the newer dump.
fn item_location(item: &DiffItem) -> Option<Location> {
    let before = item.before_line.map(|l| Location::new(Snapshot::Before, l));
    let after = item.after_line.map(|l| Location::new(Snapshot::After, l));
    match item.change {
        Change::Removed { .. } => before.or(after),
        _ => after.or(before),
    }
}

/// A baseline-independent rule checked against a single snapshot.
///
/// Findings should carry [`Verdict::ApiError`].
///
/// # Example
///
/// ```ignore
/// use apilint_core::{StructuralRule, SnapshotContext, Finding, Verdict, ElementKind};
///
/// pub struct NoEmptyPackages;
///
/// impl StructuralRule for NoEmptyPackages {
///     fn name(&self) -> &'static str { "no-empty-packages" }
///     fn code(&self) -> &'static str { "PK1" }
///
///     fn check(&self, ctx: &SnapshotContext) -> Vec<Finding> {
///         ctx.model
///             .packages()
///             .values()
///             .filter(|p| p.classes.is_empty())
///             .map(|p| Finding::new(self.code(), self.name(), Verdict::ApiError,
///                 &p.name, ElementKind::Package, "package declares no classes"))
///             .collect()
///     }
/// }
/// ```
pub trait StructuralRule: Send + Sync {
    /// Returns the kebab-case name of this rule (e.g., "fields-only-class").
    fn name(&self) -> &'static str;

    /// Returns the rule code (e.g., "GV1").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Checks one snapshot and returns any violations found.
    fn check(&self, ctx: &SnapshotContext) -> Vec<Finding>;
}

/// Type alias for boxed `StructuralRule` trait objects.
pub type StructuralRuleBox = Box<dyn StructuralRule>;

/// Which structural rule codes are reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ErrorFilter {
    /// Every structural finding.
    #[default]
    All,
    /// No structural findings.
    None,
    /// Only findings with one of these codes.
    Only(BTreeSet<String>),
}

impl ErrorFilter {
    /// Parses a filter value: `NONE`, or a comma separated list of codes.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("none") {
            return Self::None;
        }
        let codes: BTreeSet<String> = value
            .split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(String::from)
            .collect();
        if codes.is_empty() {
            Self::All
        } else {
            Self::Only(codes)
        }
    }

    /// Whether findings from rule `code` are kept.
    #[must_use]
    pub fn allows(&self, code: &str) -> bool {
        match self {
            Self::All => true,
            Self::None => false,
            Self::Only(codes) => codes.contains(code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ElementKind, ElementPath};
    use crate::types::Verdict;

    static TABLE: &[CompatRule] = &[
        CompatRule {
            code: "T1",
            name: "removed",
            description: "Removed element",
            verdict: Verdict::Incompatible,
            applies: |item| matches!(item.change, Change::Removed { .. }),
        },
        CompatRule {
            code: "T2",
            name: "anything",
            description: "Catch-all",
            verdict: Verdict::ApiChange,
            applies: |_| true,
        },
    ];

    fn item(change: Change) -> DiffItem {
        DiffItem {
            path: ElementPath::class("p", "p.A").member("f()"),
            kind: ElementKind::Method,
            change,
            before_line: Some(4),
            after_line: Some(9),
        }
    }

    #[test]
    fn test_first_match_wins() {
        let removed = item(Change::Removed {
            signature_survives: false,
        });
        assert_eq!(classify(TABLE, &removed).map(|r| r.code), Some("T1"));
        assert_eq!(classify(TABLE, &item(Change::Added)).map(|r| r.code), Some("T2"));
        assert!(classify(&TABLE[..1], &item(Change::Added)).is_none());
    }

    #[test]
    fn test_finding_location() {
        let removed = item(Change::Removed {
            signature_survives: false,
        });
        let finding = TABLE[0].finding(&removed);
        assert_eq!(finding.element, "p.A#f()");
        assert_eq!(finding.location, Some(Location::new(Snapshot::Before, 4)));

        let added = TABLE[1].finding(&item(Change::Added));
        assert_eq!(added.location, Some(Location::new(Snapshot::After, 9)));
    }

    #[test]
    fn test_error_filter() {
        assert_eq!(ErrorFilter::parse("NONE"), ErrorFilter::None);
        assert!(!ErrorFilter::parse("none").allows("GV1"));

        let only = ErrorFilter::parse("GV1, DUP1");
        assert!(only.allows("GV1"));
        assert!(only.allows("DUP1"));
        assert!(!only.allows("GV2"));

        assert_eq!(ErrorFilter::parse(""), ErrorFilter::All);
        assert!(ErrorFilter::default().allows("GV2"));
    }
}
