//! Structural comparison of two API snapshots.
//!
//! Classes match by qualified name and members by canonical signature. A
//! member that disappears from its class is first looked up along the
//! class's ancestor and descendant chains in the newer snapshot; only when
//! no equivalent member exists anywhere is it reported as removed.

use crate::model::{
    Annotation, ApiModel, ClassDef, ClassKind, ElementKind, ElementPath, FieldDef, Member,
    MethodDef, Modifier, ModifierSet, PackageDef, Visibility,
};
use crate::typeref::TypeRef;

use glob::Pattern;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::debug;

/// What happened to one element between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// The element is new.
    Added,
    /// The element is gone.
    Removed {
        /// A member with the same name but a different signature exists in
        /// the newer snapshot.
        signature_survives: bool,
    },
    /// The member now lives on a supertype.
    MovedToParent {
        /// Qualified name of the class that now declares it.
        to: String,
    },
    /// The member now lives on a subtype.
    MovedToChild {
        /// Qualified name of the class that now declares it.
        to: String,
    },
    /// Method return type differs.
    ReturnType {
        /// Previous type.
        old: String,
        /// Current type.
        new: String,
    },
    /// Generic arguments or varargs of the parameters differ.
    ParameterTypes {
        /// Previous parameter list.
        old: String,
        /// Current parameter list.
        new: String,
    },
    /// Field type differs.
    FieldType {
        /// Previous type.
        old: String,
        /// Current type.
        new: String,
    },
    /// Field constant value differs.
    ConstantValue {
        /// Previous value.
        old: Option<String>,
        /// Current value.
        new: Option<String>,
    },
    /// `final` was added.
    FinalAdded {
        /// Whether existing code could have overridden or assigned the
        /// element.
        override_risk: bool,
    },
    /// `final` was removed.
    FinalRemoved,
    /// A non-visibility, non-final modifier was added.
    ModifierAdded(Modifier),
    /// A non-visibility, non-final modifier was removed.
    ModifierRemoved(Modifier),
    /// Access level narrowed.
    VisibilityReduced {
        /// Previous level.
        old: Visibility,
        /// Current level.
        new: Visibility,
    },
    /// Access level widened.
    VisibilityWidened {
        /// Previous level.
        old: Visibility,
        /// Current level.
        new: Visibility,
    },
    /// An annotation was added.
    AnnotationAdded(String),
    /// An annotation was removed.
    AnnotationRemoved(String),
    /// Class kind differs (e.g. class became interface).
    KindChanged {
        /// Previous kind.
        old: ClassKind,
        /// Current kind.
        new: ClassKind,
    },
    /// A superclass or interface was added.
    SupertypeAdded(String),
    /// A superclass or interface was removed.
    SupertypeRemoved(String),
    /// Generic type parameters differ.
    TypeParameters {
        /// Previous parameter list.
        old: String,
        /// Current parameter list.
        new: String,
    },
    /// A declared exception was added.
    ThrowsAdded(String),
    /// A declared exception was removed.
    ThrowsRemoved(String),
    /// An annotation was added to a parameter.
    ParameterAnnotationAdded {
        /// 1-based parameter position.
        index: usize,
        /// The annotation.
        annotation: String,
    },
    /// An annotation was removed from a parameter.
    ParameterAnnotationRemoved {
        /// 1-based parameter position.
        index: usize,
        /// The annotation.
        annotation: String,
    },
    /// The `default` value of an annotation-type element differs.
    DefaultValue {
        /// Previous value.
        old: Option<String>,
        /// Current value.
        new: Option<String>,
    },
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => f.write_str("added"),
            Self::Removed {
                signature_survives: false,
            } => f.write_str("removed"),
            Self::Removed {
                signature_survives: true,
            } => f.write_str("signature changed; no member with the old signature remains"),
            Self::MovedToParent { to } => write!(f, "moved to supertype `{to}`"),
            Self::MovedToChild { to } => write!(f, "moved to subtype `{to}`"),
            Self::ReturnType { old, new } => {
                write!(f, "return type changed from `{old}` to `{new}`")
            }
            Self::ParameterTypes { old, new } => {
                write!(f, "parameters changed from `{old}` to `{new}`")
            }
            Self::FieldType { old, new } => write!(f, "type changed from `{old}` to `{new}`"),
            Self::ConstantValue { old, new } => write!(
                f,
                "constant value changed from `{}` to `{}`",
                old.as_deref().unwrap_or("<none>"),
                new.as_deref().unwrap_or("<none>")
            ),
            Self::FinalAdded { .. } => f.write_str("`final` added"),
            Self::FinalRemoved => f.write_str("`final` removed"),
            Self::ModifierAdded(m) => write!(f, "`{m}` added"),
            Self::ModifierRemoved(m) => write!(f, "`{m}` removed"),
            Self::VisibilityReduced { old, new } => {
                write!(f, "visibility reduced from {old} to {new}")
            }
            Self::VisibilityWidened { old, new } => {
                write!(f, "visibility widened from {old} to {new}")
            }
            Self::AnnotationAdded(a) => write!(f, "annotation `{a}` added"),
            Self::AnnotationRemoved(a) => write!(f, "annotation `{a}` removed"),
            Self::KindChanged { old, new } => write!(f, "changed from {old} to {new}"),
            Self::SupertypeAdded(s) => write!(f, "supertype `{s}` added"),
            Self::SupertypeRemoved(s) => write!(f, "supertype `{s}` removed"),
            Self::TypeParameters { old, new } => {
                write!(f, "type parameters changed from `{old}` to `{new}`")
            }
            Self::ThrowsAdded(t) => write!(f, "`{t}` added to throws clause"),
            Self::ThrowsRemoved(t) => write!(f, "`{t}` removed from throws clause"),
            Self::ParameterAnnotationAdded { index, annotation } => {
                write!(f, "annotation `{annotation}` added to parameter {index}")
            }
            Self::ParameterAnnotationRemoved { index, annotation } => {
                write!(f, "annotation `{annotation}` removed from parameter {index}")
            }
            Self::DefaultValue { old, new } => write!(
                f,
                "default value changed from `{}` to `{}`",
                old.as_deref().unwrap_or("<none>"),
                new.as_deref().unwrap_or("<none>")
            ),
        }
    }
}

/// Coarse grouping of diff items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffCategory {
    /// New elements.
    Added,
    /// Removed elements.
    Removed,
    /// Elements present in both snapshots, including moves.
    Changed,
}

/// One difference between the snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffItem {
    /// Element the difference concerns.
    pub path: ElementPath,
    /// Kind of that element.
    pub kind: ElementKind,
    /// What changed.
    pub change: Change,
    /// Declaration line in the older snapshot.
    pub before_line: Option<usize>,
    /// Declaration line in the newer snapshot.
    pub after_line: Option<usize>,
}

impl DiffItem {
    /// Added, Removed or Changed.
    #[must_use]
    pub fn category(&self) -> DiffCategory {
        match self.change {
            Change::Added => DiffCategory::Added,
            Change::Removed { .. } => DiffCategory::Removed,
            _ => DiffCategory::Changed,
        }
    }
}

/// All differences, sorted by element path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    items: Vec<DiffItem>,
}

impl DiffResult {
    /// Every item in report order.
    #[must_use]
    pub fn items(&self) -> &[DiffItem] {
        &self.items
    }

    /// Items in the Added category.
    pub fn added(&self) -> impl Iterator<Item = &DiffItem> {
        self.in_category(DiffCategory::Added)
    }

    /// Items in the Removed category.
    pub fn removed(&self) -> impl Iterator<Item = &DiffItem> {
        self.in_category(DiffCategory::Removed)
    }

    /// Items in the Changed category.
    pub fn changed(&self) -> impl Iterator<Item = &DiffItem> {
        self.in_category(DiffCategory::Changed)
    }

    /// Whether the snapshots are equivalent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    fn in_category(&self, category: DiffCategory) -> impl Iterator<Item = &DiffItem> {
        self.items.iter().filter(move |i| i.category() == category)
    }
}

/// Compares two snapshots.
///
/// Classes whose qualified name matches one of `exclude` are ignored on both
/// sides.
#[must_use]
pub fn diff(before: &ApiModel, after: &ApiModel, exclude: &[Pattern]) -> DiffResult {
    let mut differ = Differ {
        before,
        after,
        exclude,
        items: Vec::new(),
        removals: Vec::new(),
    };
    differ.packages();
    differ.resolve_removals();

    let mut items = differ.items;
    items.sort_by(|a, b| a.path.cmp(&b.path));
    debug!(items = items.len(), "diff complete");
    DiffResult { items }
}

struct Removal {
    path: ElementPath,
    kind: ElementKind,
    class: String,
    key: String,
    signature_survives: bool,
}

struct Differ<'a> {
    before: &'a ApiModel,
    after: &'a ApiModel,
    exclude: &'a [Pattern],
    items: Vec<DiffItem>,
    removals: Vec<Removal>,
}

impl<'a> Differ<'a> {
    fn excluded(&self, class: &ClassDef) -> bool {
        self.exclude.iter().any(|p| p.matches(&class.name))
    }

    fn has_api(&self, package: &PackageDef) -> bool {
        package
            .classes
            .values()
            .any(|c| c.is_exposed() && !self.excluded(c))
    }

    fn push(&mut self, path: ElementPath, kind: ElementKind, change: Change) {
        let before_line = self.before.line_of(&path);
        let after_line = self.after.line_of(&path);
        self.items.push(DiffItem {
            path,
            kind,
            change,
            before_line,
            after_line,
        });
    }

    fn packages(&mut self) {
        let names: BTreeSet<&'a String> = self
            .before
            .packages()
            .keys()
            .chain(self.after.packages().keys())
            .collect();
        for name in names {
            match (self.before.package(name), self.after.package(name)) {
                (Some(old), Some(new)) => self.classes(old, new),
                (Some(old), None) if self.has_api(old) => self.push(
                    ElementPath::package(name),
                    ElementKind::Package,
                    Change::Removed {
                        signature_survives: false,
                    },
                ),
                (None, Some(new)) if self.has_api(new) => {
                    self.push(ElementPath::package(name), ElementKind::Package, Change::Added);
                }
                _ => {}
            }
        }
    }

    fn classes(&mut self, old_package: &'a PackageDef, new_package: &'a PackageDef) {
        let names: BTreeSet<&'a String> = old_package
            .classes
            .keys()
            .chain(new_package.classes.keys())
            .collect();
        for name in names {
            let old = old_package.classes.get(name).filter(|c| !self.excluded(c));
            let new = new_package.classes.get(name).filter(|c| !self.excluded(c));
            match (old, new) {
                (Some(old), Some(new)) => self.class_pair(old, new),
                (Some(old), None) if old.is_exposed() && !enclosed_by_missing(old, new_package) => {
                    self.push(
                        ElementPath::class(&old.package, &old.name),
                        ElementKind::Class,
                        Change::Removed {
                            signature_survives: false,
                        },
                    );
                }
                (None, Some(new)) if new.is_exposed() && !enclosed_by_missing(new, old_package) => {
                    self.push(
                        ElementPath::class(&new.package, &new.name),
                        ElementKind::Class,
                        Change::Added,
                    );
                }
                _ => {}
            }
        }
    }

    fn class_pair(&mut self, old: &'a ClassDef, new: &'a ClassDef) {
        let path = ElementPath::class(&new.package, &new.name);
        match (old.is_exposed(), new.is_exposed()) {
            (false, false) => return,
            (false, true) => return self.push(path, ElementKind::Class, Change::Added),
            (true, false) => {
                let change = Change::VisibilityReduced {
                    old: old.modifiers.visibility(),
                    new: new.modifiers.visibility(),
                };
                return self.push(path, ElementKind::Class, change);
            }
            (true, true) => {}
        }

        let mut changes = Vec::new();
        if old.kind != new.kind {
            changes.push(Change::KindChanged {
                old: old.kind,
                new: new.kind,
            });
        }
        modifier_changes(&old.modifiers, &new.modifiers, old.is_extensible(), &mut changes);
        annotation_changes(&old.annotations, &new.annotations, &mut changes);

        let old_supers: BTreeSet<String> = old.supertypes().map(ToString::to_string).collect();
        let new_supers: BTreeSet<String> = new.supertypes().map(ToString::to_string).collect();
        changes.extend(
            old_supers
                .difference(&new_supers)
                .map(|s| Change::SupertypeRemoved(s.clone())),
        );
        changes.extend(
            new_supers
                .difference(&old_supers)
                .map(|s| Change::SupertypeAdded(s.clone())),
        );
        if old.type_params != new.type_params {
            changes.push(Change::TypeParameters {
                old: type_params_text(&old.type_params),
                new: type_params_text(&new.type_params),
            });
        }
        for change in changes {
            self.push(path.clone(), ElementKind::Class, change);
        }

        self.members(ElementKind::Constructor, &old.ctors, &new.ctors, old, new, &path);
        self.members(ElementKind::Method, &old.methods, &new.methods, old, new, &path);
        self.members(ElementKind::Field, &old.fields, &new.fields, old, new, &path);
        self.members(
            ElementKind::EnumConstant,
            &old.enum_constants,
            &new.enum_constants,
            old,
            new,
            &path,
        );
    }

    fn members<M: MemberDef>(
        &mut self,
        kind: ElementKind,
        old_members: &BTreeMap<String, M>,
        new_members: &BTreeMap<String, M>,
        old_class: &ClassDef,
        new_class: &ClassDef,
        class_path: &ElementPath,
    ) {
        let keys: BTreeSet<&String> = old_members.keys().chain(new_members.keys()).collect();
        for key in keys {
            let path = class_path.member(key.as_str());
            let old = old_members
                .get(key)
                .filter(|m| old_class.exposes(m.modifiers()));
            let new = new_members
                .get(key)
                .filter(|m| new_class.exposes(m.modifiers()));
            match (old, new) {
                (Some(old), Some(new)) => {
                    let mut changes = Vec::new();
                    old.compare(new, old_class, &mut changes);
                    for change in changes {
                        self.push(path.clone(), kind, change);
                    }
                }
                (Some(old), None) => match new_members.get(key) {
                    Some(hidden) => {
                        let change = Change::VisibilityReduced {
                            old: old.modifiers().visibility(),
                            new: hidden.modifiers().visibility(),
                        };
                        self.push(path, kind, change);
                    }
                    None => {
                        let name = old.name();
                        let signature_survives = new_members
                            .values()
                            .any(|m| m.name() == name && new_class.exposes(m.modifiers()));
                        self.removals.push(Removal {
                            path,
                            kind,
                            class: new_class.name.clone(),
                            key: key.clone(),
                            signature_survives,
                        });
                    }
                },
                (None, Some(_)) => self.push(path, kind, Change::Added),
                (None, None) => {}
            }
        }
    }

    // A moved member is also compared with its new declaration; differences
    // are reported on the original path next to the move itself.
    fn resolve_removals(&mut self) {
        for removal in std::mem::take(&mut self.removals) {
            let moved = match removal.kind {
                ElementKind::Method | ElementKind::Field => self.find_move(&removal),
                _ => None,
            };
            let Some((change, target)) = moved else {
                let change = Change::Removed {
                    signature_survives: removal.signature_survives,
                };
                self.push(removal.path, removal.kind, change);
                continue;
            };
            let drift = self.compare_moved(&removal, &target);
            self.push(removal.path.clone(), removal.kind, change);
            for change in drift {
                self.push(removal.path.clone(), removal.kind, change);
            }
        }
    }

    fn find_move(&mut self, removal: &Removal) -> Option<(Change, ElementPath)> {
        let after = self.after;
        let hierarchy = after.hierarchy();
        for ancestor in hierarchy.ancestors(&removal.class) {
            if let Some(target) = self.declares(&ancestor, removal) {
                debug!(element = %removal.path, to = %ancestor, "member moved to supertype");
                self.consume_added(&target);
                return Some((Change::MovedToParent { to: ancestor }, target));
            }
        }
        for descendant in hierarchy.descendants(&removal.class) {
            if let Some(target) = self.declares(&descendant, removal) {
                debug!(element = %removal.path, to = %descendant, "member moved to subtype");
                self.consume_added(&target);
                return Some((Change::MovedToChild { to: descendant }, target));
            }
        }
        None
    }

    fn compare_moved(&self, removal: &Removal, target: &ElementPath) -> Vec<Change> {
        let mut out = Vec::new();
        let old_class = self.before.class(&removal.class);
        let new_class = target.class.as_deref().and_then(|name| self.after.class(name));
        let (Some(old_class), Some(new_class)) = (old_class, new_class) else {
            return out;
        };
        match (
            old_class.member(removal.kind, &removal.key),
            new_class.member(removal.kind, &removal.key),
        ) {
            (Some(Member::Method(old)), Some(Member::Method(new))) => {
                old.compare(new, old_class, &mut out);
            }
            (Some(Member::Field(old)), Some(Member::Field(new))) => {
                old.compare(new, old_class, &mut out);
            }
            _ => {}
        }
        if !out.is_empty() {
            debug!(element = %removal.path, changes = out.len(), "moved member also changed");
        }
        out
    }

    fn declares(&self, class_name: &str, removal: &Removal) -> Option<ElementPath> {
        let class = self.after.class(class_name)?;
        if self.excluded(class) {
            return None;
        }
        let modifiers = match class.member(removal.kind, &removal.key)? {
            Member::Method(m) => &m.modifiers,
            Member::Field(f) => &f.modifiers,
        };
        class
            .exposes(modifiers)
            .then(|| ElementPath::class(&class.package, &class.name).member(removal.key.as_str()))
    }

    fn consume_added(&mut self, target: &ElementPath) {
        self.items
            .retain(|item| !(item.path == *target && item.change == Change::Added));
    }
}

// A nested class whose enclosing class is missing on the other side is
// covered by the enclosing class's own item.
fn enclosed_by_missing(class: &ClassDef, other: &PackageDef) -> bool {
    class
        .simple_name
        .rsplit_once('.')
        .is_some_and(|(outer, _)| !other.classes.contains_key(&format!("{}.{outer}", class.package)))
}

trait MemberDef {
    fn name(&self) -> &str;
    fn modifiers(&self) -> &ModifierSet;
    fn compare(&self, new: &Self, old_class: &ClassDef, out: &mut Vec<Change>);
}

impl MemberDef for MethodDef {
    fn name(&self) -> &str {
        &self.name
    }

    fn modifiers(&self) -> &ModifierSet {
        &self.modifiers
    }

    fn compare(&self, new: &Self, old_class: &ClassDef, out: &mut Vec<Change>) {
        if self.return_type != new.return_type {
            out.push(Change::ReturnType {
                old: type_text(self.return_type.as_ref()),
                new: type_text(new.return_type.as_ref()),
            });
        }
        let same_types = self.params.len() == new.params.len()
            && self.params.iter().zip(&new.params).all(|(a, b)| a.same_type(b));
        if !same_types {
            out.push(Change::ParameterTypes {
                old: self.param_types_text(),
                new: new.param_types_text(),
            });
        }
        if self.type_params != new.type_params {
            out.push(Change::TypeParameters {
                old: type_params_text(&self.type_params),
                new: type_params_text(&new.type_params),
            });
        }
        let override_risk = !self.modifiers.is_static && old_class.is_extensible();
        modifier_changes(&self.modifiers, &new.modifiers, override_risk, out);
        annotation_changes(&self.annotations, &new.annotations, out);
        for (index, (old_param, new_param)) in self.params.iter().zip(&new.params).enumerate() {
            let index = index + 1;
            out.extend(
                new_param
                    .annotations
                    .iter()
                    .filter(|a| !old_param.annotations.contains(a))
                    .map(|a| Change::ParameterAnnotationAdded {
                        index,
                        annotation: a.to_string(),
                    }),
            );
            out.extend(
                old_param
                    .annotations
                    .iter()
                    .filter(|a| !new_param.annotations.contains(a))
                    .map(|a| Change::ParameterAnnotationRemoved {
                        index,
                        annotation: a.to_string(),
                    }),
            );
        }
        if self.default_value != new.default_value {
            out.push(Change::DefaultValue {
                old: self.default_value.clone(),
                new: new.default_value.clone(),
            });
        }

        let old_throws: BTreeSet<String> = self.throws.iter().map(ToString::to_string).collect();
        let new_throws: BTreeSet<String> = new.throws.iter().map(ToString::to_string).collect();
        out.extend(
            new_throws
                .difference(&old_throws)
                .map(|t| Change::ThrowsAdded(t.clone())),
        );
        out.extend(
            old_throws
                .difference(&new_throws)
                .map(|t| Change::ThrowsRemoved(t.clone())),
        );
    }
}

impl MemberDef for FieldDef {
    fn name(&self) -> &str {
        &self.name
    }

    fn modifiers(&self) -> &ModifierSet {
        &self.modifiers
    }

    fn compare(&self, new: &Self, _old_class: &ClassDef, out: &mut Vec<Change>) {
        if self.type_ref != new.type_ref {
            out.push(Change::FieldType {
                old: self.type_ref.to_string(),
                new: new.type_ref.to_string(),
            });
        }
        if self.value != new.value {
            out.push(Change::ConstantValue {
                old: self.value.clone(),
                new: new.value.clone(),
            });
        }
        modifier_changes(&self.modifiers, &new.modifiers, true, out);
        annotation_changes(&self.annotations, &new.annotations, out);
    }
}

const TOGGLED: [Modifier; 4] = [
    Modifier::Static,
    Modifier::Abstract,
    Modifier::Default,
    Modifier::Deprecated,
];

fn modifier_changes(
    old: &ModifierSet,
    new: &ModifierSet,
    override_risk: bool,
    out: &mut Vec<Change>,
) {
    match (old.is_final, new.is_final) {
        (false, true) => out.push(Change::FinalAdded { override_risk }),
        (true, false) => out.push(Change::FinalRemoved),
        _ => {}
    }
    for modifier in TOGGLED {
        match (old.has(modifier), new.has(modifier)) {
            (false, true) => out.push(Change::ModifierAdded(modifier)),
            (true, false) => out.push(Change::ModifierRemoved(modifier)),
            _ => {}
        }
    }
    let (old_vis, new_vis) = (old.visibility(), new.visibility());
    if new_vis < old_vis {
        out.push(Change::VisibilityReduced {
            old: old_vis,
            new: new_vis,
        });
    } else if new_vis > old_vis {
        out.push(Change::VisibilityWidened {
            old: old_vis,
            new: new_vis,
        });
    }
}

fn annotation_changes(old: &[Annotation], new: &[Annotation], out: &mut Vec<Change>) {
    out.extend(
        new.iter()
            .filter(|a| !old.contains(a))
            .map(|a| Change::AnnotationAdded(a.to_string())),
    );
    out.extend(
        old.iter()
            .filter(|a| !new.contains(a))
            .map(|a| Change::AnnotationRemoved(a.to_string())),
    );
}

fn type_text(ty: Option<&TypeRef>) -> String {
    ty.map_or_else(|| "void".to_string(), ToString::to_string)
}

fn type_params_text(params: &[TypeRef]) -> String {
    let params: Vec<String> = params.iter().map(ToString::to_string).collect();
    format!("<{}>", params.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dump::parse_str;
    use pretty_assertions::assert_eq;

    fn run(before: &str, after: &str) -> DiffResult {
        let before = parse_str("before.txt", before).unwrap();
        let after = parse_str("after.txt", after).unwrap();
        diff(&before, &after, &[])
    }

    fn changes(result: &DiffResult) -> Vec<String> {
        result
            .items()
            .iter()
            .map(|i| format!("{} {}", i.path, i.change))
            .collect()
    }

    const BASE: &str = "\
package p {
  public class Parent {
    ctor public Parent();
  }
  public class Child extends p.Parent {
    ctor public Child();
    method public void run(int);
    field public int count;
  }
  public class GrandChild extends p.Child {
    ctor public GrandChild();
  }
}
";

    #[test]
    fn identical_models_produce_nothing() {
        let result = run(BASE, BASE);
        assert!(result.is_empty());
    }

    #[test]
    fn whitespace_and_order_are_ignored() {
        let shuffled = "\
package p {
  public class GrandChild extends p.Child {
        ctor   public GrandChild();
  }
  public class Child extends p.Parent {
    field public int count;
    method public void run(int);
    ctor public Child();
  }
  public class Parent {
    ctor public Parent();
  }
}
";
        assert!(run(BASE, shuffled).is_empty());
    }

    #[test]
    fn removal_is_keyed_by_signature() {
        let after = BASE.replace("    method public void run(int);\n", "");
        let result = run(BASE, &after);
        assert_eq!(changes(&result), ["p.Child#run(int) removed"]);
        assert_eq!(result.removed().count(), 1);
        assert_eq!(result.items()[0].before_line, Some(7));
    }

    #[test]
    fn signature_change_is_a_removed_added_pair() {
        let after = BASE.replace("run(int)", "run(long)");
        let result = run(BASE, &after);
        assert_eq!(result.added().count(), 1);
        assert_eq!(
            result.removed().next().map(|i| i.change.clone()),
            Some(Change::Removed {
                signature_survives: true
            })
        );
    }

    #[test]
    fn move_to_parent_consumes_the_addition() {
        let after = BASE
            .replace("    method public void run(int);\n", "")
            .replace(
                "    ctor public Parent();\n",
                "    ctor public Parent();\n    method public void run(int);\n",
            );
        let result = run(BASE, &after);
        assert_eq!(changes(&result), ["p.Child#run(int) moved to supertype `p.Parent`"]);
    }

    #[test]
    fn move_to_child_is_detected() {
        let after = BASE
            .replace("    method public void run(int);\n", "")
            .replace(
                "    ctor public GrandChild();\n",
                "    ctor public GrandChild();\n    method public void run(int);\n",
            );
        let result = run(BASE, &after);
        assert_eq!(
            changes(&result),
            ["p.Child#run(int) moved to subtype `p.GrandChild`"]
        );
    }

    #[test]
    fn moved_member_is_compared_with_its_new_declaration() {
        let after = BASE
            .replace("    method public void run(int);\n", "")
            .replace(
                "    ctor public Parent();\n",
                "    ctor public Parent();\n    method protected static long run(int);\n",
            );
        let result = run(BASE, &after);
        assert_eq!(
            changes(&result),
            [
                "p.Child#run(int) moved to supertype `p.Parent`",
                "p.Child#run(int) return type changed from `void` to `long`",
                "p.Child#run(int) `static` added",
                "p.Child#run(int) visibility reduced from public to protected",
            ]
        );
    }

    #[test]
    fn parameter_annotations_and_element_defaults() {
        let before = "package p {\n  public class A {\n    method public void f(java.lang.String, int);\n  }\n  public @interface T {\n    element public abstract int v() default 1;\n  }\n}\n";
        let after = "package p {\n  public class A {\n    method public void f(@androidx.annotation.Nullable java.lang.String, int);\n  }\n  public @interface T {\n    element public abstract int v() default 2;\n  }\n}\n";
        let result = run(before, after);
        assert_eq!(
            changes(&result),
            [
                "p.A#f(java.lang.String,int) annotation `@androidx.annotation.Nullable` added to parameter 1",
                "p.T#v() default value changed from `1` to `2`",
            ]
        );
        assert!(run(after, after).is_empty());
    }

    #[test]
    fn removed_class_yields_one_item() {
        let before = "package p {\n  public class A {\n    method public void f();\n  }\n  public static class A.B {\n  }\n  public class C {\n  }\n}\n";
        let after = "package p {\n  public class C {\n  }\n}\n";
        let result = run(before, after);
        assert_eq!(changes(&result), ["p.A removed"]);
    }

    #[test]
    fn removed_package_yields_one_item() {
        let after = "package q {\n  public class Q {\n  }\n}\n";
        let result = run(BASE, after);
        assert_eq!(changes(&result), ["p removed", "q added"]);
    }

    #[test]
    fn member_changes() {
        let before = "package p {\n  public final class A {\n    method public int f(java.util.List<java.lang.String>);\n    field public static final int X = 1;\n    field public java.lang.String s;\n  }\n}\n";
        let after = "package p {\n  public final class A {\n    method public long f(java.util.List<java.lang.Integer>) throws java.io.IOException;\n    field public static final int X = 2;\n    field public final java.lang.Object s;\n  }\n}\n";
        let result = run(before, after);
        assert_eq!(
            changes(&result),
            [
                "p.A#X constant value changed from `1` to `2`",
                "p.A#f(java.util.List) return type changed from `int` to `long`",
                "p.A#f(java.util.List) parameters changed from `(java.util.List<java.lang.String>)` to `(java.util.List<java.lang.Integer>)`",
                "p.A#f(java.util.List) `java.io.IOException` added to throws clause",
                "p.A#s type changed from `java.lang.String` to `java.lang.Object`",
                "p.A#s `final` added",
            ]
        );
    }

    #[test]
    fn final_override_risk_follows_extensibility() {
        let before = "package p {\n  public class Open {\n    ctor public Open();\n    method public void f();\n  }\n  public class Sealed {\n    ctor private Sealed();\n    method public void f();\n  }\n}\n";
        let after = before.replace("public void f()", "public final void f()");
        let result = run(before, &after);
        let risks: Vec<_> = result
            .items()
            .iter()
            .map(|i| (i.path.to_string(), i.change.clone()))
            .collect();
        assert_eq!(
            risks,
            [
                (
                    "p.Open#f()".to_string(),
                    Change::FinalAdded {
                        override_risk: true
                    }
                ),
                (
                    "p.Sealed#f()".to_string(),
                    Change::FinalAdded {
                        override_risk: false
                    }
                ),
            ]
        );
    }

    #[test]
    fn hidden_members_are_not_diffed() {
        let before = "package p {\n  public class A {\n    method private void secret();\n  }\n  class Hidden {\n    method public void f();\n  }\n}\n";
        let after = "package p {\n  public class A {\n  }\n}\n";
        assert!(run(before, after).is_empty());
    }

    #[test]
    fn class_header_changes() {
        let before = "package p {\n  public class A implements java.lang.Runnable {\n  }\n}\n";
        let after = "package p {\n  @java.lang.FunctionalInterface public interface A<T> extends java.io.Closeable {\n  }\n}\n";
        let result = run(before, &after);
        assert_eq!(
            changes(&result),
            [
                "p.A changed from class to interface",
                "p.A annotation `@java.lang.FunctionalInterface` added",
                "p.A supertype `java.lang.Runnable` removed",
                "p.A supertype `java.io.Closeable` added",
                "p.A type parameters changed from `<>` to `<T>`",
            ]
        );
    }

    #[test]
    fn exclude_patterns_skip_classes() {
        let after = BASE.replace("    method public void run(int);\n", "");
        let before = parse_str("before.txt", BASE).unwrap();
        let after = parse_str("after.txt", &after).unwrap();
        let exclude = [Pattern::new("p.Chi*").unwrap()];
        assert!(diff(&before, &after, &exclude).is_empty());
    }
}
