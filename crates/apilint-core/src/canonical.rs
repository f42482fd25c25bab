//! Canonical dump rendering.
//!
//! Writes a model back in the dump grammar with fixed member order, fixed
//! modifier order and fully qualified names. Parsing the output yields a
//! model equal to the input.

use crate::model::{Annotation, ApiModel, ClassDef, ClassKind, FieldDef, MethodDef, ModifierSet};
use crate::typeref::TypeRef;

use std::fmt::{self, Display, Formatter};

const INDENT: &str = "  ";

/// Display adapter that renders an [`ApiModel`] as a canonical dump.
#[derive(Debug, Clone, Copy)]
pub struct Canonical<'a>(pub &'a ApiModel);

/// Renders `model` as a canonical dump.
#[must_use]
pub fn to_dump(model: &ApiModel) -> String {
    Canonical(model).to_string()
}

impl Display for Canonical<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for package in self.0.packages().values() {
            writeln!(f, "package {} {{", package.name)?;
            writeln!(f)?;
            for class in package.classes.values() {
                write_class(f, class)?;
            }
            writeln!(f, "}}")?;
            writeln!(f)?;
        }
        Ok(())
    }
}

fn write_class(f: &mut Formatter<'_>, class: &ClassDef) -> fmt::Result {
    f.write_str(INDENT)?;
    write_prefix(f, &class.annotations, &class.modifiers)?;
    write!(f, "{} {}", class.kind, class.simple_name)?;
    write_type_params(f, &class.type_params)?;
    if let Some(superclass) = &class.superclass {
        write!(f, " extends {superclass}")?;
    }
    if !class.interfaces.is_empty() {
        f.write_str(" implements ")?;
        write_list(f, &class.interfaces, " ")?;
    }
    writeln!(f, " {{")?;

    for ctor in class.ctors.values() {
        write_method(f, "ctor", ctor)?;
    }
    let method_tag = match class.kind {
        ClassKind::AnnotationType => "element",
        _ => "method",
    };
    for method in class.methods.values() {
        write_method(f, method_tag, method)?;
    }
    for constant in class.enum_constants.values() {
        write_field(f, "enum_constant", constant)?;
    }
    for field in class.fields.values() {
        write_field(f, "field", field)?;
    }

    writeln!(f, "{INDENT}}}")?;
    writeln!(f)
}

fn write_method(f: &mut Formatter<'_>, tag: &str, method: &MethodDef) -> fmt::Result {
    write!(f, "{INDENT}{INDENT}{tag} ")?;
    write_prefix(f, &method.annotations, &method.modifiers)?;
    if !method.type_params.is_empty() {
        write_type_params(f, &method.type_params)?;
        f.write_str(" ")?;
    }
    if let Some(return_type) = &method.return_type {
        write!(f, "{return_type} ")?;
    }
    write!(f, "{}{}", method.name, method.params_text())?;
    if !method.throws.is_empty() {
        f.write_str(" throws ")?;
        write_list(f, &method.throws, ", ")?;
    }
    if let Some(value) = &method.default_value {
        write!(f, " default {value}")?;
    }
    writeln!(f, ";")
}

fn write_field(f: &mut Formatter<'_>, tag: &str, field: &FieldDef) -> fmt::Result {
    write!(f, "{INDENT}{INDENT}{tag} ")?;
    write_prefix(f, &field.annotations, &field.modifiers)?;
    write!(f, "{} {}", field.type_ref, field.name)?;
    if let Some(value) = &field.value {
        write!(f, " = {value}")?;
    }
    writeln!(f, ";")
}

fn write_prefix(
    f: &mut Formatter<'_>,
    annotations: &[Annotation],
    modifiers: &ModifierSet,
) -> fmt::Result {
    for annotation in annotations {
        write!(f, "{annotation} ")?;
    }
    for keyword in modifiers.keywords() {
        write!(f, "{keyword} ")?;
    }
    Ok(())
}

fn write_type_params(f: &mut Formatter<'_>, params: &[TypeRef]) -> fmt::Result {
    if params.is_empty() {
        return Ok(());
    }
    f.write_str("<")?;
    write_list(f, params, ", ")?;
    f.write_str(">")
}

fn write_list(f: &mut Formatter<'_>, types: &[TypeRef], sep: &str) -> fmt::Result {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{ty}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dump::parse_str;
    use pretty_assertions::assert_eq;

    const MESSY: &str = "\
import java.util.Map;

package org.example {

      @Deprecated   public final class Registry<K extends java.lang.Comparable<K> & java.io.Serializable, V> implements java.lang.Iterable<V> {
    field public static final java.lang.String NAME = \"registry\";
    method public <T> Map<K, T> view(java.util.function.Function<? super V, ? extends T>, int...) throws java.io.IOException;
    ctor protected Registry();

    public static interface Listener {
      method public abstract void onChange(@androidx.annotation.Nullable K, java.util.Map<K, V>.Entry<K, V>);
    }
  }

  public enum Mode {
    enum_constant public static final org.example.Mode FAST;
  }

  public @interface Tag {
    element public abstract java.lang.String value() default \"\";
  }
}
";

    #[test]
    fn round_trips_to_an_equal_model() {
        let model = parse_str("messy.txt", MESSY).unwrap();
        let canonical = to_dump(&model);
        let reparsed = parse_str("canonical.txt", &canonical).unwrap();
        assert_eq!(model, reparsed);
        assert_eq!(canonical, to_dump(&reparsed));
    }

    #[test]
    fn keeps_element_defaults() {
        let model = parse_str("messy.txt", MESSY).unwrap();
        assert!(to_dump(&model).contains("element public abstract java.lang.String value() default \"\";"));
    }

    #[test]
    fn renders_fixed_layout() {
        let model = parse_str(
            "api.txt",
            "package p {\n  public class A {\n    method public static final void f(int,  java.lang.String);\n  }\n}\n",
        )
        .unwrap();
        insta::assert_snapshot!(
            to_dump(&model).lines().nth(3).unwrap_or_default().trim(),
            @"method public static final void f(int, java.lang.String);"
        );
    }
}
