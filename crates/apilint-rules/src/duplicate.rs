//! Rule that reports duplicate declarations in a dump.
//!
//! The parser keeps the first of two declarations with the same class name
//! or member signature and records the second as an anomaly. Each anomaly
//! becomes one finding here.

use apilint_core::{Finding, Location, SnapshotContext, StructuralRule, Verdict};
use tracing::debug;

/// Rule code for duplicate-declaration.
pub const CODE: &str = "DUP1";

/// Rule name for duplicate-declaration.
pub const NAME: &str = "duplicate-declaration";

/// Reports classes and members declared more than once.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicateDeclaration;

impl DuplicateDeclaration {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl StructuralRule for DuplicateDeclaration {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "A class or member signature is declared more than once"
    }

    fn check(&self, ctx: &SnapshotContext) -> Vec<Finding> {
        ctx.model
            .anomalies()
            .iter()
            .map(|anomaly| {
                debug!("Duplicate at line {}: {}", anomaly.line, anomaly.path);
                Finding::new(
                    CODE,
                    NAME,
                    Verdict::ApiError,
                    anomaly.path.to_string(),
                    anomaly.kind,
                    anomaly.message.clone(),
                )
                .with_location(Some(Location::new(ctx.snapshot, anomaly.line)))
            })
            .collect()
    }
}
