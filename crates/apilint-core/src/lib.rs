//! # apilint-core
//!
//! Core framework for API compatibility linting of Java API dumps.
//!
//! This crate provides the model, parsers and comparison machinery. It
//! includes:
//!
//! - [`parse_str`] to read a dump into an [`ApiModel`]
//! - [`diff`] to compare two snapshots, including members moved along the
//!   class hierarchy
//! - [`CompatRule`] rows forming the ordered compatibility table
//! - [`StructuralRule`] trait for single-snapshot authoring rules
//! - [`Analyzer`] for orchestrating lint execution
//! - [`LintReport`] and [`Finding`] for representing results
//!
//! ## Example
//!
//! ```ignore
//! use apilint_core::{parse_str, Analyzer};
//!
//! let before = parse_str("before.txt", &before_text)?;
//! let after = parse_str("after.txt", &after_text)?;
//!
//! let report = Analyzer::builder()
//!     .after(after)
//!     .before(Some(before))
//!     .compat_rules(COMPAT_TABLE)
//!     .structural_rule(FieldsOnlyClass::new())
//!     .build()?
//!     .analyze();
//!
//! std::process::exit(report.exit_code());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod canonical;
mod changelog;
mod config;
mod context;
mod diff;
mod dump;
mod hierarchy;
mod model;
mod rule;
mod typeref;
mod types;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError, UNCLASSIFIED};
pub use canonical::{to_dump, Canonical};
pub use changelog::{
    api_digest, check as check_changelog, check_files as check_changelog_files,
    find_api_version, ChangelogError, ChangelogStatus,
};
pub use config::{AnalyzerConfig, Config, ConfigError, RuleConfig};
pub use context::SnapshotContext;
pub use diff::{diff, Change, DiffCategory, DiffItem, DiffResult};
pub use dump::{parse_str, ParseError, ParseErrorKind};
pub use hierarchy::HierarchyIndex;
pub use model::{
    Annotation, Anomaly, ApiModel, ClassDef, ClassKind, ElementKind, ElementPath, FieldDef,
    Member, MethodDef, Modifier, ModifierSet, PackageDef, ParamDef, Visibility,
};
pub use rule::{classify, CompatRule, ErrorFilter, StructuralRule, StructuralRuleBox};
pub use typeref::{collect_chunks, collect_chunks_exact, TypeError, TypeRef, MAX_NESTING};
pub use types::{Finding, LintReport, Location, ResultJson, Snapshot, Verdict};
