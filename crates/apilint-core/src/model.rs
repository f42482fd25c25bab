//! Immutable API model built from one dump.
//!
//! An [`ApiModel`] is a snapshot: packages own classes, classes own their
//! members keyed by canonical signature. Members refer back to their owner
//! by qualified name only. Nothing here is mutated after
//! [`crate::dump::parse_str`] returns.

use crate::hierarchy::HierarchyIndex;
use crate::typeref::TypeRef;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The four kinds of Java type declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassKind {
    /// `class`
    Class,
    /// `interface`
    Interface,
    /// `enum`
    Enum,
    /// `@interface`
    AnnotationType,
}

impl ClassKind {
    /// Maps a dump keyword to a kind.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "class" => Some(Self::Class),
            "interface" => Some(Self::Interface),
            "enum" => Some(Self::Enum),
            "@interface" => Some(Self::AnnotationType),
            _ => None,
        }
    }
}

impl fmt::Display for ClassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Enum => "enum",
            Self::AnnotationType => "@interface",
        })
    }
}

/// Access level, ordered from most to least restrictive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// `private`
    Private,
    /// No modifier.
    Package,
    /// `protected`
    Protected,
    /// `public`
    Public,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Private => "private",
            Self::Package => "package-private",
            Self::Protected => "protected",
            Self::Public => "public",
        })
    }
}

/// Non-visibility modifiers whose transitions are diffed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    /// `static`
    Static,
    /// `final`
    Final,
    /// `abstract`
    Abstract,
    /// `default`
    Default,
    /// `deprecated` / `@Deprecated`
    Deprecated,
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Static => "static",
            Self::Final => "final",
            Self::Abstract => "abstract",
            Self::Default => "default",
            Self::Deprecated => "deprecated",
        })
    }
}

/// Modifier flags of a declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[allow(clippy::struct_excessive_bools)]
pub struct ModifierSet {
    /// `public`
    pub is_public: bool,
    /// `protected`
    pub is_protected: bool,
    /// `private`
    pub is_private: bool,
    /// `static`
    pub is_static: bool,
    /// `final`
    pub is_final: bool,
    /// `abstract`
    pub is_abstract: bool,
    /// `default` (interface default methods)
    pub is_default: bool,
    /// Deprecated, by keyword or annotation.
    pub is_deprecated: bool,
}

/// Java modifiers that carry no API meaning for this linter.
const IGNORED_MODIFIERS: &[&str] = &[
    "synchronized",
    "native",
    "transient",
    "volatile",
    "strictfp",
    "sealed",
    "non-sealed",
];

impl ModifierSet {
    /// Applies a modifier keyword. Returns `false` if `keyword` is not a
    /// modifier at all.
    pub fn apply_keyword(&mut self, keyword: &str) -> bool {
        match keyword {
            "public" => self.is_public = true,
            "protected" => self.is_protected = true,
            "private" => self.is_private = true,
            "static" => self.is_static = true,
            "final" => self.is_final = true,
            "abstract" => self.is_abstract = true,
            "default" => self.is_default = true,
            "deprecated" => self.is_deprecated = true,
            other => return IGNORED_MODIFIERS.contains(&other),
        }
        true
    }

    /// Returns the declared access level.
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        if self.is_public {
            Visibility::Public
        } else if self.is_protected {
            Visibility::Protected
        } else if self.is_private {
            Visibility::Private
        } else {
            Visibility::Package
        }
    }

    /// Whether the flag for `modifier` is set.
    #[must_use]
    pub fn has(&self, modifier: Modifier) -> bool {
        match modifier {
            Modifier::Static => self.is_static,
            Modifier::Final => self.is_final,
            Modifier::Abstract => self.is_abstract,
            Modifier::Default => self.is_default,
            Modifier::Deprecated => self.is_deprecated,
        }
    }

    /// Keywords in canonical dump order.
    #[must_use]
    pub fn keywords(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        match self.visibility() {
            Visibility::Public => out.push("public"),
            Visibility::Protected => out.push("protected"),
            Visibility::Private => out.push("private"),
            Visibility::Package => {}
        }
        let flags = [
            (self.is_abstract, "abstract"),
            (self.is_default, "default"),
            (self.is_static, "static"),
            (self.is_final, "final"),
            (self.is_deprecated, "deprecated"),
        ];
        out.extend(flags.iter().filter(|(set, _)| *set).map(|(_, kw)| *kw));
        out
    }
}

/// An annotation on a declaration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Annotation {
    /// Qualified (or as-written) annotation name, without `@`.
    pub name: String,
    /// Raw argument text between the parentheses, if any.
    pub arguments: Option<String>,
}

impl Annotation {
    /// Whether this annotation marks deprecation.
    #[must_use]
    pub fn is_deprecation(&self) -> bool {
        matches!(self.name.as_str(), "Deprecated" | "java.lang.Deprecated")
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name)?;
        if let Some(args) = &self.arguments {
            write!(f, "({args})")?;
        }
        Ok(())
    }
}

/// A field or enum constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// Field name.
    pub name: String,
    /// Qualified name of the declaring class.
    pub owner: String,
    /// Declared type.
    pub type_ref: TypeRef,
    /// Modifiers.
    pub modifiers: ModifierSet,
    /// Constant initializer, as written.
    pub value: Option<String>,
    /// Annotations, sorted.
    pub annotations: Vec<Annotation>,
}

/// One method or constructor parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParamDef {
    /// Parameter type (without the varargs ellipsis).
    pub type_ref: TypeRef,
    /// Declared as `T...`.
    pub varargs: bool,
    /// Annotations on the parameter, sorted.
    pub annotations: Vec<Annotation>,
}

impl ParamDef {
    /// Erased type as it appears in a canonical signature.
    #[must_use]
    pub fn erasure(&self) -> String {
        let mut erased = self.type_ref.erasure();
        if self.varargs {
            erased.push_str("[]");
        }
        erased
    }

    /// Whether both parameters declare the same type, ignoring annotations.
    #[must_use]
    pub fn same_type(&self, other: &Self) -> bool {
        self.type_ref == other.type_ref && self.varargs == other.varargs
    }
}

impl fmt::Display for ParamDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for annotation in &self.annotations {
            write!(f, "{annotation} ")?;
        }
        write!(f, "{}", self.type_ref)?;
        if self.varargs {
            f.write_str("...")?;
        }
        Ok(())
    }
}

/// A method, constructor or annotation-type element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDef {
    /// Method name; the simple class name for constructors.
    pub name: String,
    /// Qualified name of the declaring class.
    pub owner: String,
    /// Method-level type parameters.
    pub type_params: Vec<TypeRef>,
    /// Parameters in declaration order.
    pub params: Vec<ParamDef>,
    /// Return type; `None` for constructors.
    pub return_type: Option<TypeRef>,
    /// Modifiers.
    pub modifiers: ModifierSet,
    /// Annotations, sorted.
    pub annotations: Vec<Annotation>,
    /// Declared exceptions.
    pub throws: Vec<TypeRef>,
    /// `default` value of an annotation-type element, as written.
    pub default_value: Option<String>,
}

impl MethodDef {
    /// Whether this is a constructor.
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.return_type.is_none()
    }

    /// Canonical signature: name plus erased parameter types.
    #[must_use]
    pub fn signature(&self) -> String {
        let params: Vec<String> = self.params.iter().map(ParamDef::erasure).collect();
        format!("{}({})", self.name, params.join(","))
    }

    /// Full parameter list including generic arguments and annotations.
    #[must_use]
    pub fn params_text(&self) -> String {
        let params: Vec<String> = self.params.iter().map(ToString::to_string).collect();
        format!("({})", params.join(", "))
    }

    /// Parameter list with generic arguments but without annotations.
    #[must_use]
    pub fn param_types_text(&self) -> String {
        let params: Vec<String> = self
            .params
            .iter()
            .map(|p| format!("{}{}", p.type_ref, if p.varargs { "..." } else { "" }))
            .collect();
        format!("({})", params.join(", "))
    }
}

/// A class, interface, enum or annotation type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDef {
    /// Fully qualified name (`org.example.Outer.Inner`).
    pub name: String,
    /// Name relative to the package (`Outer.Inner`).
    pub simple_name: String,
    /// Owning package.
    pub package: String,
    /// Declaration kind.
    pub kind: ClassKind,
    /// Modifiers.
    pub modifiers: ModifierSet,
    /// Annotations, sorted.
    pub annotations: Vec<Annotation>,
    /// Generic type parameters.
    pub type_params: Vec<TypeRef>,
    /// `extends` clause of a class.
    pub superclass: Option<TypeRef>,
    /// Implemented interfaces (or extended interfaces, for interfaces).
    pub interfaces: Vec<TypeRef>,
    /// Constructors keyed by signature.
    pub ctors: BTreeMap<String, MethodDef>,
    /// Methods keyed by signature.
    pub methods: BTreeMap<String, MethodDef>,
    /// Fields keyed by name.
    pub fields: BTreeMap<String, FieldDef>,
    /// Enum constants keyed by name.
    pub enum_constants: BTreeMap<String, FieldDef>,
}

impl ClassDef {
    /// Whether the class is part of the API surface (public or protected).
    #[must_use]
    pub fn is_exposed(&self) -> bool {
        self.modifiers.visibility() >= Visibility::Protected
    }

    /// Whether a member of this class with `modifiers` is part of the API.
    ///
    /// Interface and annotation-type members are implicitly public.
    #[must_use]
    pub fn exposes(&self, modifiers: &ModifierSet) -> bool {
        matches!(self.kind, ClassKind::Interface | ClassKind::AnnotationType)
            || modifiers.visibility() >= Visibility::Protected
    }

    /// Whether code outside the library can subclass this class.
    #[must_use]
    pub fn is_extensible(&self) -> bool {
        self.kind == ClassKind::Class
            && !self.modifiers.is_final
            && self.ctors.values().any(|c| self.exposes(&c.modifiers))
    }

    /// Superclass and interfaces, in declaration order.
    pub fn supertypes(&self) -> impl Iterator<Item = &TypeRef> {
        self.superclass.iter().chain(self.interfaces.iter())
    }

    /// Looks up a member by element kind and key.
    #[must_use]
    pub fn member(&self, kind: ElementKind, key: &str) -> Option<Member<'_>> {
        match kind {
            ElementKind::Constructor => self.ctors.get(key).map(Member::Method),
            ElementKind::Method => self.methods.get(key).map(Member::Method),
            ElementKind::Field => self.fields.get(key).map(Member::Field),
            ElementKind::EnumConstant => self.enum_constants.get(key).map(Member::Field),
            ElementKind::Package | ElementKind::Class => None,
        }
    }
}

/// Borrowed view of a class member.
#[derive(Debug, Clone, Copy)]
pub enum Member<'a> {
    /// Method or constructor.
    Method(&'a MethodDef),
    /// Field or enum constant.
    Field(&'a FieldDef),
}

/// A package and its classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDef {
    /// Package name.
    pub name: String,
    /// Classes keyed by qualified name.
    pub classes: BTreeMap<String, ClassDef>,
}

/// The kind of element a path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    /// A package.
    Package,
    /// A class-like declaration.
    Class,
    /// A constructor.
    Constructor,
    /// A method or annotation-type element.
    Method,
    /// A field.
    Field,
    /// An enum constant.
    EnumConstant,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Package => "package",
            Self::Class => "class",
            Self::Constructor => "constructor",
            Self::Method => "method",
            Self::Field => "field",
            Self::EnumConstant => "enum constant",
        })
    }
}

/// Address of an element inside a model: package, class, member key.
///
/// Ordering is (package, class, member), which is the report order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ElementPath {
    /// Package name.
    pub package: String,
    /// Qualified class name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    /// Member key (canonical signature or field name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<String>,
}

impl ElementPath {
    /// Path to a package.
    #[must_use]
    pub fn package(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            class: None,
            member: None,
        }
    }

    /// Path to a class.
    #[must_use]
    pub fn class(package: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            class: Some(class.into()),
            member: None,
        }
    }

    /// Path to a member of this path's class.
    #[must_use]
    pub fn member(&self, key: impl Into<String>) -> Self {
        Self {
            package: self.package.clone(),
            class: self.class.clone(),
            member: Some(key.into()),
        }
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.class, &self.member) {
            (Some(class), Some(member)) => write!(f, "{class}#{member}"),
            (Some(class), None) => f.write_str(class),
            (None, _) => f.write_str(&self.package),
        }
    }
}

/// A recoverable oddity found while parsing (e.g. a duplicate signature).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anomaly {
    /// Element the anomaly concerns.
    pub path: ElementPath,
    /// Kind of that element.
    pub kind: ElementKind,
    /// 1-based dump line of the offending declaration.
    pub line: usize,
    /// Human-readable description.
    pub message: String,
}

/// One parsed API snapshot.
#[derive(Debug, Clone)]
pub struct ApiModel {
    packages: BTreeMap<String, PackageDef>,
    imports: BTreeMap<String, String>,
    positions: BTreeMap<ElementPath, usize>,
    anomalies: Vec<Anomaly>,
    hierarchy: HierarchyIndex,
}

impl PartialEq for ApiModel {
    fn eq(&self, other: &Self) -> bool {
        self.packages == other.packages
    }
}

impl Eq for ApiModel {}

impl Default for ApiModel {
    fn default() -> Self {
        Self::new(BTreeMap::new(), BTreeMap::new(), BTreeMap::new(), Vec::new())
    }
}

impl ApiModel {
    /// Assembles a model and builds its inheritance index.
    #[must_use]
    pub fn new(
        packages: BTreeMap<String, PackageDef>,
        imports: BTreeMap<String, String>,
        positions: BTreeMap<ElementPath, usize>,
        anomalies: Vec<Anomaly>,
    ) -> Self {
        let hierarchy = HierarchyIndex::build(&packages);
        Self {
            packages,
            imports,
            positions,
            anomalies,
            hierarchy,
        }
    }

    /// Packages keyed by name.
    #[must_use]
    pub fn packages(&self) -> &BTreeMap<String, PackageDef> {
        &self.packages
    }

    /// Looks up a package.
    #[must_use]
    pub fn package(&self, name: &str) -> Option<&PackageDef> {
        self.packages.get(name)
    }

    /// Looks up a class by qualified name.
    #[must_use]
    pub fn class(&self, qualified: &str) -> Option<&ClassDef> {
        self.packages
            .values()
            .find_map(|package| package.classes.get(qualified))
    }

    /// All classes, ordered by package then name.
    pub fn classes(&self) -> impl Iterator<Item = &ClassDef> {
        self.packages.values().flat_map(|p| p.classes.values())
    }

    /// Import table of the dump (simple name → qualified name).
    #[must_use]
    pub fn imports(&self) -> &BTreeMap<String, String> {
        &self.imports
    }

    /// Dump line an element was declared on.
    #[must_use]
    pub fn line_of(&self, path: &ElementPath) -> Option<usize> {
        self.positions.get(path).copied()
    }

    /// Parse anomalies, in dump order.
    #[must_use]
    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    /// Resolved inheritance index.
    #[must_use]
    pub fn hierarchy(&self) -> &HierarchyIndex {
        &self.hierarchy
    }

    /// Whether the model holds no packages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_keywords_round_trip() {
        let mut mods = ModifierSet::default();
        for kw in ["final", "static", "public", "synchronized"] {
            assert!(mods.apply_keyword(kw));
        }
        assert!(!mods.apply_keyword("void"));
        assert_eq!(mods.keywords(), ["public", "static", "final"]);
        assert_eq!(mods.visibility(), Visibility::Public);
    }

    #[test]
    fn visibility_ordering() {
        assert!(Visibility::Public > Visibility::Protected);
        assert!(Visibility::Protected > Visibility::Package);
        assert!(Visibility::Package > Visibility::Private);
    }

    #[test]
    fn varargs_erase_to_arrays() {
        let method = MethodDef {
            name: "format".to_string(),
            owner: "a.B".to_string(),
            type_params: Vec::new(),
            params: vec![
                ParamDef {
                    type_ref: TypeRef::parse("java.util.List<T>").unwrap(),
                    varargs: false,
                    annotations: vec![Annotation {
                        name: "androidx.annotation.NonNull".to_string(),
                        arguments: None,
                    }],
                },
                ParamDef {
                    type_ref: TypeRef::simple("int"),
                    varargs: true,
                    annotations: Vec::new(),
                },
            ],
            return_type: Some(TypeRef::simple("void")),
            modifiers: ModifierSet::default(),
            annotations: Vec::new(),
            throws: Vec::new(),
            default_value: None,
        };
        assert_eq!(method.signature(), "format(java.util.List,int[])");
        assert_eq!(
            method.params_text(),
            "(@androidx.annotation.NonNull java.util.List<T>, int...)"
        );
        assert_eq!(method.param_types_text(), "(java.util.List<T>, int...)");
        assert!(method.params[0].same_type(&ParamDef {
            annotations: Vec::new(),
            ..method.params[0].clone()
        }));
    }

    #[test]
    fn element_path_display_and_order() {
        let class = ElementPath::class("org.example", "org.example.Foo");
        let member = class.member("bar(int)");
        assert_eq!(member.to_string(), "org.example.Foo#bar(int)");
        assert_eq!(ElementPath::package("org.example").to_string(), "org.example");
        assert!(class < member);
    }
}
