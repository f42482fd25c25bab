//! # apilint-rules
//!
//! Built-in rules for apilint.
//!
//! This crate provides the ordered compatibility table applied to diff
//! items and the structural rules applied to a single snapshot.
//!
//! ## Structural Rules
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | GV1 | `fields-only-class` | Public non-final fields only, no declared constructor |
//! | GV2 | `final-fields-only-class` | Same, on a final class without a private constructor |
//! | DUP1 | `duplicate-declaration` | Class or member signature declared twice |
//!
//! ## Compatibility Table
//!
//! [`COMPAT_RULES`] rows `C1`..`C18` are incompatible changes; rows
//! `A1`..`A11` are compatible API changes. The first matching row wins.
//!
//! ## Usage
//!
//! ```ignore
//! use apilint_core::Analyzer;
//! use apilint_rules::{all_rules, COMPAT_RULES};
//!
//! let mut builder = Analyzer::builder()
//!     .after(after)
//!     .before(Some(before))
//!     .compat_rules(COMPAT_RULES);
//! for rule in all_rules() {
//!     builder = builder.rule_box(rule);
//! }
//! let report = builder.build()?.analyze();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod compat;
mod duplicate;
mod fields_only;
mod presets;

pub use compat::{compat_rule, COMPAT_RULES};
pub use duplicate::DuplicateDeclaration;
pub use fields_only::{FieldsOnlyClass, FinalFieldsOnlyClass};
pub use presets::{all_rules, minimal_rules, recommended_rules, Preset};

/// Re-export core types for convenience.
pub use apilint_core::{CompatRule, Finding, StructuralRule, Verdict};
