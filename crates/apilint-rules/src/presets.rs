//! Rule presets for common configurations.

use crate::{DuplicateDeclaration, FieldsOnlyClass, FinalFieldsOnlyClass};
use apilint_core::StructuralRuleBox;

/// Preset configurations for apilint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Every structural rule.
    Recommended,
    /// Only dump integrity checks, for libraries that predate the
    /// authoring rules.
    Minimal,
}

impl Preset {
    /// Returns the rules for this preset.
    #[must_use]
    pub fn rules(self) -> Vec<StructuralRuleBox> {
        match self {
            Self::Recommended => recommended_rules(),
            Self::Minimal => minimal_rules(),
        }
    }
}

/// Returns the recommended set of structural rules.
///
/// Includes:
/// - `fields-only-class` (GV1)
/// - `final-fields-only-class` (GV2)
/// - `duplicate-declaration` (DUP1)
#[must_use]
pub fn recommended_rules() -> Vec<StructuralRuleBox> {
    all_rules()
}

/// Returns the minimal set of structural rules.
///
/// Only includes `duplicate-declaration` (DUP1).
#[must_use]
pub fn minimal_rules() -> Vec<StructuralRuleBox> {
    vec![Box::new(DuplicateDeclaration::new())]
}

/// Returns all available structural rules.
#[must_use]
pub fn all_rules() -> Vec<StructuralRuleBox> {
    vec![
        Box::new(FieldsOnlyClass::new()),
        Box::new(FinalFieldsOnlyClass::new()),
        Box::new(DuplicateDeclaration::new()),
    ]
}
