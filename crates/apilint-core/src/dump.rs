//! Parser for the textual API dump.
//!
//! The dump is line oriented: `package` and class headers open blocks that
//! a lone `}` closes, and every member sits on one line terminated by `;`.
//!
//! ```text
//! import java.util.List;
//!
//! package org.example {
//!   @Deprecated
//!   public class Widget<T> extends org.example.Base implements java.io.Closeable {
//!     ctor public Widget();
//!     method public <R> List<R> map(java.util.function.Function<T,R>) throws java.io.IOException;
//!     field public static final int MAX = 10;
//!   }
//! }
//! ```

use crate::model::{
    Annotation, Anomaly, ApiModel, ClassDef, ClassKind, ElementKind, ElementPath, FieldDef,
    MethodDef, ModifierSet, PackageDef, ParamDef,
};
use crate::typeref::{collect_chunks, TypeError, TypeRef};

use miette::{Diagnostic, NamedSource, SourceSpan};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::debug;

static PACKAGE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^package\s+([\w.$]+)\s*\{$").expect("valid regex"));

static IMPORT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^import\s+([\w.$]+)\s*;$").expect("valid regex"));

/// What went wrong on a dump line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    /// A type expression on the line is malformed.
    #[error(transparent)]
    Type(#[from] TypeError),

    /// A member declaration appears outside any class block.
    #[error("member declared outside of a class")]
    MemberOutsideClass,

    /// A class header appears outside any package block.
    #[error("class declared outside of a package")]
    ClassOutsidePackage,

    /// A package block opened inside another block.
    #[error("package blocks cannot be nested")]
    NestedPackage,

    /// A `}` with no open block.
    #[error("unbalanced `}}`")]
    UnbalancedBrace,

    /// The file ended with blocks still open.
    #[error("{what} is never closed")]
    Unclosed {
        /// Description of the open block.
        what: String,
    },

    /// A declaration that does not follow the dump grammar.
    #[error("{0}")]
    Malformed(String),

    /// A line that matches no construct at all.
    #[error("unrecognized line")]
    UnexpectedLine,
}

/// A fatal dump syntax error.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("line {line}: {kind}")]
#[diagnostic(code(apilint::parse))]
pub struct ParseError {
    /// 1-based line number.
    pub line: usize,
    /// The offending line, trimmed.
    pub text: String,
    /// The specific failure.
    pub kind: ParseErrorKind,
    #[source_code]
    source_code: NamedSource<String>,
    #[label("{kind}")]
    span: SourceSpan,
}

const MEMBER_TAGS: &[&str] = &["ctor", "method", "field", "enum_constant", "element"];

/// Parses a complete dump.
///
/// `name` only labels diagnostics (usually the file path).
///
/// # Errors
///
/// Returns a [`ParseError`] for the first non-conforming line.
pub fn parse_str(name: &str, content: &str) -> Result<ApiModel, ParseError> {
    let mut parser = Parser::new(name, content);
    let mut offset = 0;
    for (index, raw) in content.split_inclusive('\n').enumerate() {
        let line = index + 1;
        let start = offset + (raw.len() - raw.trim_start().len());
        offset += raw.len();
        let text = raw.trim();
        if text.is_empty() || text.starts_with("//") {
            continue;
        }
        parser
            .line(text, line)
            .map_err(|kind| parser.error(line, start, text, kind))?;
    }

    if let Some(frame) = parser.stack.last() {
        let (line, what) = match frame {
            Frame::Package { name, line } => (*line, format!("package `{name}`")),
            Frame::Class { class, line } => (*line, format!("class `{}`", class.name)),
        };
        let (start, text) = locate(content, line);
        return Err(parser.error(line, start, text, ParseErrorKind::Unclosed { what }));
    }

    let model = parser.finish();
    debug!(
        dump = name,
        packages = model.packages().len(),
        classes = model.classes().count(),
        anomalies = model.anomalies().len(),
        "parsed dump"
    );
    Ok(model)
}

enum Frame {
    Package { name: String, line: usize },
    Class { class: Box<ClassDef>, line: usize },
}

struct Parser<'a> {
    name: &'a str,
    content: &'a str,
    imports: BTreeMap<String, String>,
    packages: BTreeMap<String, PackageDef>,
    positions: BTreeMap<ElementPath, usize>,
    anomalies: Vec<Anomaly>,
    stack: Vec<Frame>,
    pending: Vec<Annotation>,
}

type LineResult<T> = Result<T, ParseErrorKind>;

impl<'a> Parser<'a> {
    fn new(name: &'a str, content: &'a str) -> Self {
        Self {
            name,
            content,
            imports: BTreeMap::new(),
            packages: BTreeMap::new(),
            positions: BTreeMap::new(),
            anomalies: Vec::new(),
            stack: Vec::new(),
            pending: Vec::new(),
        }
    }

    fn error(&self, line: usize, start: usize, text: &str, kind: ParseErrorKind) -> ParseError {
        ParseError {
            line,
            text: text.to_string(),
            kind,
            source_code: NamedSource::new(self.name, self.content.to_string()),
            span: SourceSpan::from((start, text.len())),
        }
    }

    fn finish(self) -> ApiModel {
        ApiModel::new(self.packages, self.imports, self.positions, self.anomalies)
    }

    fn line(&mut self, text: &str, line: usize) -> LineResult<()> {
        let text = text.replace('\t', " ");
        let text = text.as_str();

        if text == "}" {
            return self.close();
        }
        if let Some(caps) = IMPORT_LINE.captures(text) {
            let qualified = caps[1].to_string();
            let simple = qualified.rsplit('.').next().unwrap_or(&qualified).to_string();
            self.imports.insert(simple, qualified);
            return Ok(());
        }
        if let Some(caps) = PACKAGE_LINE.captures(text) {
            return self.open_package(&caps[1], line);
        }

        let (tag, rest) = text.split_once(' ').unwrap_or((text, ""));
        if MEMBER_TAGS.contains(&tag) {
            return self.member(tag, rest.trim(), line);
        }
        if let Some(header) = text.strip_suffix('{') {
            return self.open_class(header.trim(), line);
        }
        if text.starts_with('@') {
            let tokens = collect_chunks(text, " ")?;
            if tokens.iter().all(|t| t.starts_with('@')) {
                for token in tokens {
                    let annotation = self.annotation(token)?;
                    self.pending.push(annotation);
                }
                return Ok(());
            }
        }
        Err(ParseErrorKind::UnexpectedLine)
    }

    fn open_package(&mut self, name: &str, line: usize) -> LineResult<()> {
        if !self.stack.is_empty() {
            return Err(ParseErrorKind::NestedPackage);
        }
        self.packages
            .entry(name.to_string())
            .or_insert_with(|| PackageDef {
                name: name.to_string(),
                classes: BTreeMap::new(),
            });
        self.positions
            .entry(ElementPath::package(name))
            .or_insert(line);
        self.stack.push(Frame::Package {
            name: name.to_string(),
            line,
        });
        Ok(())
    }

    fn close(&mut self) -> LineResult<()> {
        let frame = self.stack.pop().ok_or(ParseErrorKind::UnbalancedBrace)?;
        if !self.pending.is_empty() {
            debug!(count = self.pending.len(), "dropping dangling annotations");
            self.pending.clear();
        }
        let Frame::Class { class, line } = frame else {
            return Ok(());
        };

        let path = ElementPath::class(&class.package, &class.name);
        let Some(package) = self.packages.get_mut(&class.package) else {
            return Err(ParseErrorKind::ClassOutsidePackage);
        };
        if package.classes.contains_key(&class.name) {
            self.anomalies.push(Anomaly {
                message: format!("duplicate declaration of class `{}`", class.name),
                path,
                kind: ElementKind::Class,
                line,
            });
        } else {
            self.positions.entry(path).or_insert(line);
            package.classes.insert(class.name.clone(), *class);
        }
        Ok(())
    }

    fn open_class(&mut self, header: &str, line: usize) -> LineResult<()> {
        let (package, outer) = match self.stack.last() {
            Some(Frame::Package { name, .. }) => (name.clone(), None),
            Some(Frame::Class { class, .. }) => {
                (class.package.clone(), Some(class.simple_name.clone()))
            }
            None => return Err(ParseErrorKind::ClassOutsidePackage),
        };

        let tokens = collect_chunks(header, " ")?;
        let mut annotations = std::mem::take(&mut self.pending);
        let mut modifiers = ModifierSet::default();
        let mut kind = None;
        let mut rest = tokens.iter().copied();
        let mut name_token = None;
        for token in rest.by_ref() {
            if let Some(found) = ClassKind::from_keyword(token) {
                kind.get_or_insert(found);
            } else if token.starts_with('@') {
                annotations.push(self.annotation(token)?);
            } else if !modifiers.apply_keyword(token) {
                name_token = Some(token);
                break;
            }
        }
        let mut kind = kind.ok_or_else(|| malformed("class header without a kind keyword"))?;
        let name_token = name_token.ok_or_else(|| malformed("class header without a name"))?;

        let (name, type_params) = match name_token.find('<') {
            Some(open) => (
                &name_token[..open],
                TypeRef::parse_params(&name_token[open..])?,
            ),
            None => (name_token, Vec::new()),
        };
        let name = TypeRef::parse(name)?.name;

        let mut extends = Vec::new();
        let mut implements = Vec::new();
        let mut clause: Option<&mut Vec<TypeRef>> = None;
        for token in rest {
            match token {
                "extends" => clause = Some(&mut extends),
                "implements" => clause = Some(&mut implements),
                _ => {
                    let list = clause
                        .as_deref_mut()
                        .ok_or_else(|| malformed(format!("unexpected `{token}` in class header")))?;
                    for part in collect_chunks(token, ",")? {
                        if !part.is_empty() {
                            list.push(self.type_ref(part)?);
                        }
                    }
                }
            }
        }

        let (superclass, interfaces) = match kind {
            ClassKind::Interface | ClassKind::AnnotationType => {
                extends.extend(implements);
                (None, extends)
            }
            ClassKind::Class | ClassKind::Enum => {
                if extends.len() > 1 {
                    return Err(malformed("a class extends at most one superclass"));
                }
                (extends.pop(), implements)
            }
        };
        if kind == ClassKind::Class
            && superclass
                .as_ref()
                .is_some_and(|s| s.name == "java.lang.Enum")
        {
            kind = ClassKind::Enum;
        }

        let simple_name = match outer {
            Some(outer) if !name.starts_with(&format!("{outer}.")) => format!("{outer}.{name}"),
            _ => name,
        };
        fold_deprecation(&mut annotations, &mut modifiers);

        let class = ClassDef {
            name: format!("{package}.{simple_name}"),
            simple_name,
            package,
            kind,
            modifiers,
            annotations,
            type_params,
            superclass,
            interfaces,
            ctors: BTreeMap::new(),
            methods: BTreeMap::new(),
            fields: BTreeMap::new(),
            enum_constants: BTreeMap::new(),
        };
        self.stack.push(Frame::Class {
            class: Box::new(class),
            line,
        });
        Ok(())
    }

    fn member(&mut self, tag: &str, rest: &str, line: usize) -> LineResult<()> {
        let Some(Frame::Class { class, .. }) = self.stack.last() else {
            return Err(ParseErrorKind::MemberOutsideClass);
        };
        let owner = class.name.clone();
        let owner_simple = class.simple_name.clone();
        let owner_kind = class.kind;
        let path = ElementPath::class(&class.package, &class.name);

        let body = rest
            .strip_suffix(';')
            .ok_or_else(|| malformed("member declaration must end with `;`"))?
            .trim();
        let mut annotations = std::mem::take(&mut self.pending);

        let (kind, entry) = match tag {
            "field" | "enum_constant" => {
                let field = self.field(body, &owner, &mut annotations)?;
                let is_constant = tag == "enum_constant"
                    || (owner_kind == ClassKind::Enum && is_implicit_constant(&field, &owner, &owner_simple));
                if is_constant {
                    (ElementKind::EnumConstant, Entry::Field(field))
                } else {
                    (ElementKind::Field, Entry::Field(field))
                }
            }
            _ => {
                let method = self.method(tag, body, &owner, &mut annotations)?;
                if method.is_constructor() {
                    (ElementKind::Constructor, Entry::Method(method))
                } else {
                    (ElementKind::Method, Entry::Method(method))
                }
            }
        };

        let key = match &entry {
            Entry::Field(field) => field.name.clone(),
            Entry::Method(method) => method.signature(),
        };
        let member_path = path.member(&key);

        let Some(Frame::Class { class, .. }) = self.stack.last_mut() else {
            return Err(ParseErrorKind::MemberOutsideClass);
        };
        let inserted = match (kind, entry) {
            (ElementKind::Constructor, Entry::Method(m)) => insert_new(&mut class.ctors, &key, m),
            (ElementKind::EnumConstant, Entry::Field(f)) => {
                insert_new(&mut class.enum_constants, &key, f)
            }
            (_, Entry::Field(f)) => insert_new(&mut class.fields, &key, f),
            (_, Entry::Method(m)) => insert_new(&mut class.methods, &key, m),
        };

        if inserted {
            self.positions.entry(member_path).or_insert(line);
        } else {
            self.anomalies.push(Anomaly {
                message: format!("duplicate declaration of {kind} `{key}` in `{owner}`"),
                path: member_path,
                kind,
                line,
            });
        }
        Ok(())
    }

    fn method(
        &self,
        tag: &str,
        body: &str,
        owner: &str,
        annotations: &mut Vec<Annotation>,
    ) -> LineResult<MethodDef> {
        let (body, default_value) = match collect_chunks(body, "default")?.as_slice() {
            [decl, value] if tag == "element" && decl.ends_with(')') => {
                if value.is_empty() {
                    return Err(malformed("missing value after `default`"));
                }
                (*decl, Some((*value).to_string()))
            }
            _ => (body, None),
        };
        let tokens = collect_chunks(body, " ")?;
        let call = tokens
            .iter()
            .position(|t| !t.starts_with('@') && t.contains('('))
            .ok_or_else(|| malformed("missing parameter list"))?;

        let (name, params_token, head_end) = match tokens[call].find('(') {
            Some(0) if call > 0 => (tokens[call - 1], tokens[call], call - 1),
            Some(open) if open > 0 => (&tokens[call][..open], &tokens[call][open..], call),
            _ => return Err(malformed("missing member name")),
        };
        let params_text = params_token
            .strip_prefix('(')
            .and_then(|p| p.strip_suffix(')'))
            .ok_or_else(|| malformed("malformed parameter list"))?;

        let mut modifiers = ModifierSet::default();
        let mut type_params = Vec::new();
        let mut types = Vec::new();
        for token in &tokens[..head_end] {
            if token.starts_with('@') {
                annotations.push(self.annotation(token)?);
            } else if token.starts_with('<') && types.is_empty() {
                type_params = TypeRef::parse_params(token)?;
            } else if !modifiers.apply_keyword(token) {
                types.push(self.type_ref(token)?);
            }
        }

        let return_type = match (tag, types.len()) {
            ("ctor", 0) => None,
            ("ctor", _) => return Err(malformed("constructors have no return type")),
            (_, 1) => types.pop(),
            _ => return Err(malformed("expected exactly one return type")),
        };

        let mut throws = Vec::new();
        let tail = &tokens[call + 1..];
        match tail.split_first() {
            None => {}
            Some((&"throws", types)) if !types.is_empty() => {
                for token in types {
                    for part in collect_chunks(token, ",")? {
                        if !part.is_empty() {
                            throws.push(self.type_ref(part)?);
                        }
                    }
                }
                throws.sort_by_key(ToString::to_string);
            }
            Some(_) => return Err(malformed("unexpected text after parameter list")),
        }

        let params = if params_text.trim().is_empty() {
            Vec::new()
        } else {
            collect_chunks(params_text, ",")?
                .into_iter()
                .map(|param| self.param(param))
                .collect::<LineResult<Vec<_>>>()?
        };

        let mut annotations = std::mem::take(annotations);
        fold_deprecation(&mut annotations, &mut modifiers);
        Ok(MethodDef {
            name: name.to_string(),
            owner: owner.to_string(),
            type_params,
            params,
            return_type,
            modifiers,
            annotations,
            throws,
            default_value,
        })
    }

    fn param(&self, text: &str) -> LineResult<ParamDef> {
        let mut annotations = Vec::new();
        let mut tokens = Vec::new();
        for token in collect_chunks(text, " ")? {
            if token.starts_with('@') {
                annotations.push(self.annotation(token)?);
            } else if token != "final" {
                tokens.push(token);
            }
        }
        annotations.sort();
        annotations.dedup();
        let ty = match tokens.as_slice() {
            [ty] | [ty, _] => *ty,
            _ => return Err(malformed(format!("malformed parameter `{text}`"))),
        };
        let (ty, varargs) = match ty.strip_suffix("...") {
            Some(element) => (element, true),
            None => (ty, false),
        };
        Ok(ParamDef {
            type_ref: self.type_ref(ty)?,
            varargs,
            annotations,
        })
    }

    fn field(
        &self,
        body: &str,
        owner: &str,
        annotations: &mut Vec<Annotation>,
    ) -> LineResult<FieldDef> {
        let (decl, value) = match split_initializer(body) {
            Some((decl, value)) => (decl, Some(value.to_string())),
            None => (body, None),
        };
        if value.as_deref() == Some("") {
            return Err(malformed("missing constant value after `=`"));
        }

        let mut modifiers = ModifierSet::default();
        let mut rest = Vec::new();
        for token in collect_chunks(decl, " ")? {
            if token.starts_with('@') && rest.is_empty() {
                annotations.push(self.annotation(token)?);
            } else if rest.is_empty() && modifiers.apply_keyword(token) {
                continue;
            } else {
                rest.push(token);
            }
        }
        let [ty, name] = rest.as_slice() else {
            return Err(malformed("expected `<type> <name>` in field declaration"));
        };

        let mut annotations = std::mem::take(annotations);
        fold_deprecation(&mut annotations, &mut modifiers);
        Ok(FieldDef {
            name: (*name).to_string(),
            owner: owner.to_string(),
            type_ref: self.type_ref(ty)?,
            modifiers,
            value,
            annotations,
        })
    }

    fn type_ref(&self, text: &str) -> LineResult<TypeRef> {
        Ok(TypeRef::parse(text)?.resolved(&self.imports))
    }

    fn annotation(&self, token: &str) -> LineResult<Annotation> {
        let body = &token[1..];
        let (name, arguments) = match body.find('(') {
            Some(open) => {
                let args = body[open + 1..]
                    .strip_suffix(')')
                    .ok_or_else(|| malformed(format!("malformed annotation `{token}`")))?;
                (&body[..open], Some(args.trim().to_string()))
            }
            None => (body, None),
        };
        let name = TypeRef::parse(name)?.resolved(&self.imports).name;
        Ok(Annotation { name, arguments })
    }
}

// Byte offset and trimmed text of a 1-based line.
fn locate(content: &str, line: usize) -> (usize, &str) {
    let mut offset = 0;
    for raw in content.split_inclusive('\n').take(line.saturating_sub(1)) {
        offset += raw.len();
    }
    let raw = content[offset..].lines().next().unwrap_or_default();
    (offset + raw.len() - raw.trim_start().len(), raw.trim())
}

enum Entry {
    Method(MethodDef),
    Field(FieldDef),
}

fn malformed(message: impl Into<String>) -> ParseErrorKind {
    ParseErrorKind::Malformed(message.into())
}

fn insert_new<T>(map: &mut BTreeMap<String, T>, key: &str, value: T) -> bool {
    if map.contains_key(key) {
        return false;
    }
    map.insert(key.to_string(), value);
    true
}

fn fold_deprecation(annotations: &mut Vec<Annotation>, modifiers: &mut ModifierSet) {
    if annotations.iter().any(Annotation::is_deprecation) {
        modifiers.is_deprecated = true;
        annotations.retain(|a| !a.is_deprecation());
    }
    annotations.sort();
    annotations.dedup();
}

// `public static final Color RED;` inside `enum Color`.
fn is_implicit_constant(field: &FieldDef, owner: &str, owner_simple: &str) -> bool {
    let m = &field.modifiers;
    m.is_public
        && m.is_static
        && m.is_final
        && field.value.is_none()
        && field.type_ref.dimensions == 0
        && (field.type_ref.name == owner || field.type_ref.name == owner_simple)
}

// First `=` outside annotation arguments.
fn split_initializer(body: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    for (i, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '=' if depth == 0 => return Some((body[..i].trim(), body[i + 1..].trim())),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Visibility;

    const SAMPLE: &str = "\
import java.util.List;

package org.example {
  @Deprecated
  public abstract class Widget<T extends java.lang.Comparable<T>> extends org.example.Base implements java.io.Closeable java.lang.Runnable {
    ctor public Widget(int, java.lang.String...);
    method @androidx.annotation.NonNull public <R> List<R> map(java.util.function.Function<T, R> fn) throws java.io.IOException, java.lang.InterruptedException;
    method public abstract void run();
    field public static final int MAX = 10;
    field protected java.lang.String label;

    public static class Builder {
      method public org.example.Widget build();
    }

  }

  public class Base {
  }

  public enum Color {
    enum_constant public static final org.example.Color RED;
    field public static final org.example.Color GREEN;
  }

  public @interface Marker {
    element public abstract int value() default 3;
  }
}
";

    fn sample() -> ApiModel {
        parse_str("api.txt", SAMPLE).unwrap()
    }

    #[test]
    fn parses_class_headers() {
        let model = sample();
        let widget = model.class("org.example.Widget").unwrap();
        assert_eq!(widget.kind, ClassKind::Class);
        assert!(widget.modifiers.is_abstract);
        assert!(widget.modifiers.is_deprecated);
        assert!(widget.annotations.is_empty());
        assert_eq!(widget.type_params[0].to_string(), "T extends java.lang.Comparable<T>");
        assert_eq!(widget.superclass.as_ref().unwrap().name, "org.example.Base");
        assert_eq!(widget.interfaces.len(), 2);
    }

    #[test]
    fn parses_members_with_signatures() {
        let model = sample();
        let widget = model.class("org.example.Widget").unwrap();
        assert!(widget.ctors.contains_key("Widget(int,java.lang.String[])"));

        let map = &widget.methods["map(java.util.function.Function)"];
        assert_eq!(map.return_type.as_ref().unwrap().to_string(), "java.util.List<R>");
        assert_eq!(map.type_params[0].name, "R");
        assert_eq!(map.throws.len(), 2);
        assert_eq!(map.annotations[0].name, "androidx.annotation.NonNull");

        assert_eq!(widget.fields["MAX"].value.as_deref(), Some("10"));
        assert_eq!(
            widget.fields["label"].modifiers.visibility(),
            Visibility::Protected
        );
    }

    #[test]
    fn nests_inner_classes() {
        let model = sample();
        let builder = model.class("org.example.Widget.Builder").unwrap();
        assert_eq!(builder.simple_name, "Widget.Builder");
        assert!(builder.methods.contains_key("build()"));
    }

    #[test]
    fn recognizes_enum_constants_and_elements() {
        let model = sample();
        let color = model.class("org.example.Color").unwrap();
        assert_eq!(color.kind, ClassKind::Enum);
        assert_eq!(
            color.enum_constants.keys().collect::<Vec<_>>(),
            ["GREEN", "RED"]
        );
        assert!(color.fields.is_empty());

        let marker = model.class("org.example.Marker").unwrap();
        assert_eq!(marker.kind, ClassKind::AnnotationType);
        assert!(marker.methods.contains_key("value()"));
    }

    #[test]
    fn records_positions() {
        let model = sample();
        let widget = ElementPath::class("org.example", "org.example.Widget");
        assert_eq!(model.line_of(&widget), Some(5));
        assert_eq!(model.line_of(&widget.member("run()")), Some(8));
    }

    #[test]
    fn duplicates_become_anomalies() {
        let model = parse_str(
            "api.txt",
            "package p {\n  public class A {\n    method public void f();\n    method public void f();\n  }\n}\n",
        )
        .unwrap();
        assert_eq!(model.anomalies().len(), 1);
        let anomaly = &model.anomalies()[0];
        assert_eq!(anomaly.line, 4);
        assert_eq!(anomaly.kind, ElementKind::Method);
        assert_eq!(anomaly.path.to_string(), "p.A#f()");
    }

    #[test]
    fn keeps_parameter_annotations_and_element_defaults() {
        let model = parse_str(
            "api.txt",
            "import androidx.annotation.Nullable;\npackage p {\n  public class A {\n    method public void f(@Nullable java.lang.String, final int count);\n    method public <K, V> java.util.Map<K,V>.Entry<K,V> entry();\n  }\n  public @interface Tag {\n    element public abstract java.lang.String name() default \"a b\";\n    element public abstract int size();\n  }\n}\n",
        )
        .unwrap();
        let a = model.class("p.A").unwrap();
        let f = &a.methods["f(java.lang.String,int)"];
        assert_eq!(f.params[0].annotations[0].name, "androidx.annotation.Nullable");
        assert!(f.params[1].annotations.is_empty());
        assert_eq!(
            a.methods["entry()"].return_type.as_ref().unwrap().erasure(),
            "java.util.Map.Entry"
        );

        let tag = model.class("p.Tag").unwrap();
        assert_eq!(tag.methods["name()"].default_value.as_deref(), Some("\"a b\""));
        assert_eq!(tag.methods["size()"].default_value, None);
    }

    #[test]
    fn member_outside_class_is_an_error() {
        let err = parse_str("api.txt", "package p {\n  method public void f();\n}\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.kind, ParseErrorKind::MemberOutsideClass);
        assert_eq!(err.text, "method public void f();");
    }

    #[test]
    fn unbalanced_and_unclosed_blocks_fail() {
        let err = parse_str("api.txt", "package p {\n}\n}\n").unwrap_err();
        assert_eq!((err.line, err.kind), (3, ParseErrorKind::UnbalancedBrace));

        let err = parse_str("api.txt", "package p {\n  public class A {\n  }\n").unwrap_err();
        assert_eq!(err.line, 1);
        assert!(matches!(err.kind, ParseErrorKind::Unclosed { .. }));
    }

    #[test]
    fn malformed_types_carry_the_line() {
        let err = parse_str(
            "api.txt",
            "package p {\n  public class A {\n    method public java.util.List<T f();\n  }\n}\n",
        )
        .unwrap_err();
        assert_eq!(err.line, 3);
        assert!(matches!(err.kind, ParseErrorKind::Type(_)));
    }

    #[test]
    fn unknown_lines_are_rejected() {
        let err = parse_str("api.txt", "package p {\n  whatever\n}\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedLine);
    }
}
