//! The compatibility table.
//!
//! Rows are evaluated top to bottom and the first match decides. Breaking
//! rows come first; a diff item no row matches is treated as incompatible by
//! the analyzer.

use apilint_core::{Change, CompatRule, DiffItem, ElementKind, Modifier, Verdict};

/// Ordered compatibility rows.
pub static COMPAT_RULES: &[CompatRule] = &[
    CompatRule {
        code: "C1",
        name: "removed-element",
        description: "A package, class, constructor, method or field was removed",
        verdict: Verdict::Incompatible,
        applies: removed_element,
    },
    CompatRule {
        code: "C2",
        name: "return-type-changed",
        description: "A method's return type changed",
        verdict: Verdict::Incompatible,
        applies: return_type_changed,
    },
    CompatRule {
        code: "C3",
        name: "final-added",
        description: "`final` was added to an element existing code may override or assign",
        verdict: Verdict::Incompatible,
        applies: final_added_with_risk,
    },
    CompatRule {
        code: "C4",
        name: "moved-to-subtype",
        description: "A member moved down to a subclass",
        verdict: Verdict::Incompatible,
        applies: moved_to_child,
    },
    CompatRule {
        code: "C5",
        name: "constant-value-changed",
        description: "A field's constant value changed",
        verdict: Verdict::Incompatible,
        applies: constant_value_changed,
    },
    CompatRule {
        code: "C6",
        name: "field-type-changed",
        description: "A field's type changed",
        verdict: Verdict::Incompatible,
        applies: field_type_changed,
    },
    CompatRule {
        code: "C7",
        name: "signature-changed",
        description: "No member with the old signature remains, though the name does",
        verdict: Verdict::Incompatible,
        applies: signature_changed,
    },
    CompatRule {
        code: "C8",
        name: "annotation-changed",
        description: "An annotation was added to or removed from a member or parameter, or removed from a class",
        verdict: Verdict::Incompatible,
        applies: annotation_changed,
    },
    CompatRule {
        code: "C9",
        name: "enum-constant-removed",
        description: "An enum constant was removed",
        verdict: Verdict::Incompatible,
        applies: enum_constant_removed,
    },
    CompatRule {
        code: "C10",
        name: "parameters-changed",
        description: "Generic arguments or varargs of a method's parameters changed",
        verdict: Verdict::Incompatible,
        applies: parameters_changed,
    },
    CompatRule {
        code: "C11",
        name: "kind-changed",
        description: "A type changed between class, interface, enum and annotation type",
        verdict: Verdict::Incompatible,
        applies: kind_changed,
    },
    CompatRule {
        code: "C12",
        name: "supertype-removed",
        description: "A superclass or interface was removed",
        verdict: Verdict::Incompatible,
        applies: supertype_removed,
    },
    CompatRule {
        code: "C13",
        name: "type-parameters-changed",
        description: "Generic type parameters changed",
        verdict: Verdict::Incompatible,
        applies: type_parameters_changed,
    },
    CompatRule {
        code: "C14",
        name: "visibility-reduced",
        description: "An element became less accessible",
        verdict: Verdict::Incompatible,
        applies: visibility_reduced,
    },
    CompatRule {
        code: "C15",
        name: "static-changed",
        description: "`static` was added or removed",
        verdict: Verdict::Incompatible,
        applies: static_changed,
    },
    CompatRule {
        code: "C16",
        name: "implementation-required",
        description: "`abstract` was added or a `default` implementation was removed",
        verdict: Verdict::Incompatible,
        applies: implementation_required,
    },
    CompatRule {
        code: "C17",
        name: "throws-added",
        description: "An exception was added to a throws clause",
        verdict: Verdict::Incompatible,
        applies: throws_added,
    },
    CompatRule {
        code: "C18",
        name: "default-value-changed",
        description: "An annotation element's default value was changed or removed",
        verdict: Verdict::Incompatible,
        applies: default_value_changed,
    },
    CompatRule {
        code: "A1",
        name: "enum-constant-added",
        description: "An enum constant was added",
        verdict: Verdict::ApiChange,
        applies: enum_constant_added,
    },
    CompatRule {
        code: "A2",
        name: "final-removed",
        description: "`final` was removed",
        verdict: Verdict::ApiChange,
        applies: final_removed,
    },
    CompatRule {
        code: "A3",
        name: "final-added-safe",
        description: "`final` was added where nothing could override it",
        verdict: Verdict::ApiChange,
        applies: final_added_safe,
    },
    CompatRule {
        code: "A4",
        name: "moved-to-supertype",
        description: "A member moved up to a superclass or interface",
        verdict: Verdict::ApiChange,
        applies: moved_to_parent,
    },
    CompatRule {
        code: "A5",
        name: "element-added",
        description: "A package, class, constructor, method or field was added",
        verdict: Verdict::ApiChange,
        applies: added,
    },
    CompatRule {
        code: "A6",
        name: "class-annotation-added",
        description: "An annotation was added to a class",
        verdict: Verdict::ApiChange,
        applies: class_annotation_added,
    },
    CompatRule {
        code: "A7",
        name: "supertype-added",
        description: "A superclass or interface was added",
        verdict: Verdict::ApiChange,
        applies: supertype_added,
    },
    CompatRule {
        code: "A8",
        name: "visibility-widened",
        description: "An element became more accessible",
        verdict: Verdict::ApiChange,
        applies: visibility_widened,
    },
    CompatRule {
        code: "A9",
        name: "modifier-relaxed",
        description: "`abstract` removed, `default` added or deprecation toggled",
        verdict: Verdict::ApiChange,
        applies: modifier_relaxed,
    },
    CompatRule {
        code: "A10",
        name: "throws-removed",
        description: "An exception was removed from a throws clause",
        verdict: Verdict::ApiChange,
        applies: throws_removed,
    },
    CompatRule {
        code: "A11",
        name: "default-value-added",
        description: "An annotation element gained a default value",
        verdict: Verdict::ApiChange,
        applies: default_value_added,
    },
];

/// Looks up a compatibility row by code.
#[must_use]
pub fn compat_rule(code: &str) -> Option<&'static CompatRule> {
    COMPAT_RULES.iter().find(|rule| rule.code == code)
}

fn removed_element(item: &DiffItem) -> bool {
    item.kind != ElementKind::EnumConstant
        && matches!(
            item.change,
            Change::Removed {
                signature_survives: false
            }
        )
}

fn return_type_changed(item: &DiffItem) -> bool {
    matches!(item.change, Change::ReturnType { .. })
}

fn final_added_with_risk(item: &DiffItem) -> bool {
    matches!(
        item.change,
        Change::FinalAdded {
            override_risk: true
        }
    )
}

fn moved_to_child(item: &DiffItem) -> bool {
    matches!(item.change, Change::MovedToChild { .. })
}

fn constant_value_changed(item: &DiffItem) -> bool {
    matches!(item.change, Change::ConstantValue { .. })
}

fn field_type_changed(item: &DiffItem) -> bool {
    matches!(item.change, Change::FieldType { .. })
}

fn signature_changed(item: &DiffItem) -> bool {
    matches!(
        item.change,
        Change::Removed {
            signature_survives: true
        }
    )
}

fn annotation_changed(item: &DiffItem) -> bool {
    match item.change {
        Change::AnnotationRemoved(_) => true,
        Change::AnnotationAdded(_) => item.kind != ElementKind::Class,
        Change::ParameterAnnotationAdded { .. } | Change::ParameterAnnotationRemoved { .. } => true,
        _ => false,
    }
}

fn enum_constant_removed(item: &DiffItem) -> bool {
    item.kind == ElementKind::EnumConstant && matches!(item.change, Change::Removed { .. })
}

fn parameters_changed(item: &DiffItem) -> bool {
    matches!(item.change, Change::ParameterTypes { .. })
}

fn kind_changed(item: &DiffItem) -> bool {
    matches!(item.change, Change::KindChanged { .. })
}

fn supertype_removed(item: &DiffItem) -> bool {
    matches!(item.change, Change::SupertypeRemoved(_))
}

fn type_parameters_changed(item: &DiffItem) -> bool {
    matches!(item.change, Change::TypeParameters { .. })
}

fn visibility_reduced(item: &DiffItem) -> bool {
    matches!(item.change, Change::VisibilityReduced { .. })
}

fn static_changed(item: &DiffItem) -> bool {
    matches!(
        item.change,
        Change::ModifierAdded(Modifier::Static) | Change::ModifierRemoved(Modifier::Static)
    )
}

fn implementation_required(item: &DiffItem) -> bool {
    matches!(
        item.change,
        Change::ModifierAdded(Modifier::Abstract) | Change::ModifierRemoved(Modifier::Default)
    )
}

fn throws_added(item: &DiffItem) -> bool {
    matches!(item.change, Change::ThrowsAdded(_))
}

fn default_value_changed(item: &DiffItem) -> bool {
    matches!(item.change, Change::DefaultValue { old: Some(_), .. })
}

fn enum_constant_added(item: &DiffItem) -> bool {
    item.kind == ElementKind::EnumConstant && item.change == Change::Added
}

fn final_removed(item: &DiffItem) -> bool {
    item.change == Change::FinalRemoved
}

fn final_added_safe(item: &DiffItem) -> bool {
    matches!(
        item.change,
        Change::FinalAdded {
            override_risk: false
        }
    )
}

fn moved_to_parent(item: &DiffItem) -> bool {
    matches!(item.change, Change::MovedToParent { .. })
}

fn added(item: &DiffItem) -> bool {
    item.change == Change::Added
}

fn class_annotation_added(item: &DiffItem) -> bool {
    item.kind == ElementKind::Class && matches!(item.change, Change::AnnotationAdded(_))
}

fn supertype_added(item: &DiffItem) -> bool {
    matches!(item.change, Change::SupertypeAdded(_))
}

fn visibility_widened(item: &DiffItem) -> bool {
    matches!(item.change, Change::VisibilityWidened { .. })
}

fn modifier_relaxed(item: &DiffItem) -> bool {
    matches!(
        item.change,
        Change::ModifierRemoved(Modifier::Abstract)
            | Change::ModifierAdded(Modifier::Default)
            | Change::ModifierAdded(Modifier::Deprecated)
            | Change::ModifierRemoved(Modifier::Deprecated)
    )
}

fn throws_removed(item: &DiffItem) -> bool {
    matches!(item.change, Change::ThrowsRemoved(_))
}

fn default_value_added(item: &DiffItem) -> bool {
    matches!(item.change, Change::DefaultValue { old: None, .. })
}
