//! Rules for classes that are bags of public mutable fields.
//!
//! # Rationale
//!
//! A class whose whole API is public non-final fields cannot evolve: every
//! field is frozen into the API, and without a constructor the class gets
//! an implicit public one that can never be removed.
//!
//! # Detected Patterns
//!
//! An exposed class (kind `class`) with no methods, at least one field, and
//! only public non-final fields:
//!
//! - `GV1`: the class is not final and declares no constructor
//! - `GV2`: the class is final but declares no private constructor
//!
//! # Good Patterns
//!
//! ```text
//! public class Settings {
//!   ctor public Settings();
//!   method public int timeout();
//!   method public Settings timeout(int);
//! }
//! ```

use apilint_core::{
    ClassDef, ClassKind, ElementKind, ElementPath, Finding, SnapshotContext, StructuralRule,
    Verdict,
};
use tracing::debug;

/// Rule code for fields-only-class.
pub const CODE: &str = "GV1";

/// Rule name for fields-only-class.
pub const NAME: &str = "fields-only-class";

/// Rule code for final-fields-only-class.
pub const FINAL_CODE: &str = "GV2";

/// Rule name for final-fields-only-class.
pub const FINAL_NAME: &str = "final-fields-only-class";

/// Flags non-final fields-only classes without a declared constructor.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldsOnlyClass;

impl FieldsOnlyClass {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl StructuralRule for FieldsOnlyClass {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Classes with only public non-final fields must declare a constructor"
    }

    fn check(&self, ctx: &SnapshotContext) -> Vec<Finding> {
        ctx.model
            .classes()
            .filter(|class| is_fields_only(class) && !class.modifiers.is_final)
            .filter(|class| class.ctors.is_empty())
            .map(|class| {
                violation(
                    ctx,
                    class,
                    CODE,
                    NAME,
                    format!(
                        "`{}` exposes only public non-final fields and has an implicit public constructor",
                        class.simple_name
                    ),
                )
            })
            .collect()
    }
}

/// Flags final fields-only classes without a private constructor.
#[derive(Debug, Clone, Copy, Default)]
pub struct FinalFieldsOnlyClass;

impl FinalFieldsOnlyClass {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl StructuralRule for FinalFieldsOnlyClass {
    fn name(&self) -> &'static str {
        FINAL_NAME
    }

    fn code(&self) -> &'static str {
        FINAL_CODE
    }

    fn description(&self) -> &'static str {
        "Final classes with only public non-final fields must declare a private constructor"
    }

    fn check(&self, ctx: &SnapshotContext) -> Vec<Finding> {
        ctx.model
            .classes()
            .filter(|class| is_fields_only(class) && class.modifiers.is_final)
            .filter(|class| !class.ctors.values().any(|c| c.modifiers.is_private))
            .map(|class| {
                violation(
                    ctx,
                    class,
                    FINAL_CODE,
                    FINAL_NAME,
                    format!(
                        "`{}` exposes only public non-final fields but has no private constructor",
                        class.simple_name
                    ),
                )
            })
            .collect()
    }
}

fn is_fields_only(class: &ClassDef) -> bool {
    if class.kind != ClassKind::Class || !class.is_exposed() {
        return false;
    }
    let fields_only = class.methods.is_empty()
        && !class.fields.is_empty()
        && class
            .fields
            .values()
            .all(|f| f.modifiers.is_public && !f.modifiers.is_final);
    if fields_only {
        debug!("Fields-only class: {}", class.name);
    }
    fields_only
}

fn violation(
    ctx: &SnapshotContext,
    class: &ClassDef,
    code: &str,
    name: &str,
    message: String,
) -> Finding {
    let path = ElementPath::class(&class.package, &class.name);
    Finding::new(
        code,
        name,
        Verdict::ApiError,
        path.to_string(),
        ElementKind::Class,
        message,
    )
    .with_location(ctx.location(&path))
}
