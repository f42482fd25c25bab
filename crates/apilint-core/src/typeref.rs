//! Generic-aware type expressions.
//!
//! Dumps spell types the way Java source does: `java.util.Map<K,V>`,
//! `T extends java.lang.Runnable & java.lang.Cloneable`, `int[][]`,
//! `java.util.List<? super T>`. [`TypeRef::parse`] turns that text into a
//! tree by bracket-aware recursive descent built on [`collect_chunks`].

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Maximum generic nesting accepted by [`TypeRef::parse`].
pub const MAX_NESTING: usize = 64;

/// Errors produced while parsing a type expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    /// The expression (or one of its parts) is empty.
    #[error("empty type expression")]
    Empty,

    /// `<`/`>` or `(`/`)` do not pair up.
    #[error("unbalanced brackets in `{text}`")]
    Unbalanced {
        /// The offending text.
        text: String,
    },

    /// A split produced a different number of chunks than the grammar allows.
    #[error("expected {expected} chunk(s) splitting `{text}` on `{separator}`, found {found}")]
    ChunkCount {
        /// The text that was split.
        text: String,
        /// The separator token.
        separator: String,
        /// How many chunks the grammar allows.
        expected: usize,
        /// How many chunks were found.
        found: usize,
    },

    /// Nesting exceeds [`MAX_NESTING`].
    #[error("generic nesting exceeds the limit of {limit} in `{text}`")]
    TooDeep {
        /// The offending text.
        text: String,
        /// The nesting limit.
        limit: usize,
    },

    /// The type name contains characters that cannot appear in a Java type.
    #[error("invalid type name `{text}`")]
    InvalidName {
        /// The offending name.
        text: String,
    },
}

/// Splits `text` on `separator`, treating balanced `<...>` and `(...)` spans
/// as atomic.
///
/// Chunks are trimmed. Alphabetic separators (`extends`, `super`) only match
/// on word boundaries, and whitespace separators drop the empty chunks that
/// runs of blanks produce. Any other empty chunk is kept so the caller can
/// reject it.
///
/// # Errors
///
/// Returns [`TypeError::Unbalanced`] if brackets do not pair up.
pub fn collect_chunks<'a>(text: &'a str, separator: &str) -> Result<Vec<&'a str>, TypeError> {
    let bytes = text.as_bytes();
    let sep = separator.as_bytes();
    let is_word = !sep.is_empty() && sep.iter().all(u8::is_ascii_alphabetic);
    let is_blank = !sep.is_empty() && sep.iter().all(u8::is_ascii_whitespace);

    let unbalanced = || TypeError::Unbalanced {
        text: text.to_string(),
    };

    let mut chunks = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if depth == 0
            && !sep.is_empty()
            && bytes[i..].starts_with(sep)
            && (!is_word || on_word_boundary(bytes, i, sep.len()))
        {
            chunks.push(text[start..i].trim());
            i += sep.len();
            start = i;
            continue;
        }

        match bytes[i] {
            b'<' | b'(' => depth += 1,
            b'>' | b')' => depth = depth.checked_sub(1).ok_or_else(unbalanced)?,
            _ => {}
        }
        i += 1;
    }

    if depth != 0 {
        return Err(unbalanced());
    }
    chunks.push(text[start..].trim());

    if is_blank {
        chunks.retain(|c| !c.is_empty());
    }
    Ok(chunks)
}

/// Like [`collect_chunks`] but requires exactly `expected` chunks.
///
/// # Errors
///
/// Returns [`TypeError::ChunkCount`] when the count differs, or
/// [`TypeError::Unbalanced`] for malformed nesting.
pub fn collect_chunks_exact<'a>(
    text: &'a str,
    separator: &str,
    expected: usize,
) -> Result<Vec<&'a str>, TypeError> {
    let chunks = collect_chunks(text, separator)?;
    if chunks.len() != expected {
        return Err(TypeError::ChunkCount {
            text: text.to_string(),
            separator: separator.to_string(),
            expected,
            found: chunks.len(),
        });
    }
    Ok(chunks)
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b == b'.'
}

fn on_word_boundary(bytes: &[u8], at: usize, len: usize) -> bool {
    let before = at == 0 || !is_ident_byte(bytes[at - 1]);
    let after = bytes.get(at + len).map_or(true, |&b| !is_ident_byte(b));
    before && after
}

/// A parsed type expression.
///
/// Equality and hashing are structural; the original spelling kept in
/// [`TypeRef::raw`] does not take part, so `Map<K, V>` equals `Map<K,V>`.
#[derive(Debug, Clone)]
pub struct TypeRef {
    /// Qualified (or simple, if unresolved) name, `?` for wildcards.
    pub name: String,
    /// Generic type arguments, in order.
    pub generics: Vec<TypeRef>,
    /// Upper bounds (`T extends A & B`).
    pub extends: Vec<TypeRef>,
    /// Lower bounds (`? super A`).
    pub super_bounds: Vec<TypeRef>,
    /// Number of trailing `[]`.
    pub dimensions: usize,
    /// Parameterized enclosing type, as in `Map<K,V>.Entry<K,V>`.
    pub outer: Option<Box<TypeRef>>,
    /// The text this type was parsed from.
    pub raw: String,
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.generics == other.generics
            && self.extends == other.extends
            && self.super_bounds == other.super_bounds
            && self.dimensions == other.dimensions
            && self.outer == other.outer
    }
}

impl Eq for TypeRef {}

impl Hash for TypeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.generics.hash(state);
        self.extends.hash(state);
        self.super_bounds.hash(state);
        self.dimensions.hash(state);
        self.outer.hash(state);
    }
}

impl TypeRef {
    /// Creates a plain, non-generic type.
    #[must_use]
    pub fn simple(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            raw: name.clone(),
            name,
            generics: Vec::new(),
            extends: Vec::new(),
            super_bounds: Vec::new(),
            dimensions: 0,
            outer: None,
        }
    }

    /// Parses a type expression.
    ///
    /// # Errors
    ///
    /// Returns a [`TypeError`] for malformed bracket nesting, wrong chunk
    /// counts, invalid names, or nesting deeper than [`MAX_NESTING`].
    pub fn parse(text: &str) -> Result<Self, TypeError> {
        parse_at(text, 0)
    }

    /// Parses a `<A, B extends C>` type-parameter list.
    ///
    /// # Errors
    ///
    /// Returns a [`TypeError`] when the list is not bracketed or any
    /// parameter fails to parse.
    pub fn parse_params(text: &str) -> Result<Vec<Self>, TypeError> {
        let text = text.trim();
        let inner = text
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .ok_or_else(|| TypeError::Unbalanced {
                text: text.to_string(),
            })?;
        collect_chunks(inner, ",")?
            .into_iter()
            .map(|chunk| parse_at(chunk, 1))
            .collect()
    }

    /// Returns the erased form used in canonical signatures: the name
    /// without generic arguments, plus array dimensions.
    #[must_use]
    pub fn erasure(&self) -> String {
        let mut out = self.name.clone();
        for _ in 0..self.dimensions {
            out.push_str("[]");
        }
        out
    }

    /// Returns the last dotted segment of the name.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Expands names whose first segment matches an import.
    ///
    /// `imports` maps a simple name (`List`) to its qualified form
    /// (`java.util.List`).
    #[must_use]
    pub fn resolved(mut self, imports: &BTreeMap<String, String>) -> Self {
        self.resolve_in_place(imports);
        self
    }

    // Name relative to the enclosing type, or the full name.
    fn segment(&self) -> &str {
        self.outer
            .as_ref()
            .and_then(|outer| self.name.strip_prefix(outer.name.as_str()))
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(&self.name)
    }

    fn resolve_in_place(&mut self, imports: &BTreeMap<String, String>) {
        if let Some(outer) = self.outer.as_mut() {
            let segment = self
                .name
                .strip_prefix(&format!("{}.", outer.name))
                .map(str::to_string);
            outer.resolve_in_place(imports);
            if let Some(segment) = segment {
                self.name = format!("{}.{segment}", outer.name);
            }
        } else if !imports.is_empty() {
            let (head, rest) = match self.name.split_once('.') {
                Some((head, rest)) => (head, Some(rest)),
                None => (self.name.as_str(), None),
            };
            if let Some(qualified) = imports.get(head) {
                self.name = match rest {
                    Some(rest) => format!("{qualified}.{rest}"),
                    None => qualified.clone(),
                };
            }
        }
        for child in self
            .generics
            .iter_mut()
            .chain(self.extends.iter_mut())
            .chain(self.super_bounds.iter_mut())
        {
            child.resolve_in_place(imports);
        }
    }
}

fn parse_at(text: &str, depth: usize) -> Result<TypeRef, TypeError> {
    let text = text.trim();
    if depth > MAX_NESTING {
        return Err(TypeError::TooDeep {
            text: text.to_string(),
            limit: MAX_NESTING,
        });
    }
    if text.is_empty() {
        return Err(TypeError::Empty);
    }

    let (head, extends, super_bounds) = split_bounds(text, depth)?;

    let mut core = head;
    let mut dimensions = 0;
    while let Some(stripped) = core.strip_suffix("[]") {
        dimensions += 1;
        core = stripped.trim_end();
    }

    let (outer, core) = match split_outer(core) {
        Some((outer, segment)) => (Some(Box::new(parse_at(outer, depth + 1)?)), segment),
        None => (None, core),
    };

    let (name, generics) = match core.find('<') {
        Some(open) => {
            let inner = core[open + 1..]
                .strip_suffix('>')
                .ok_or_else(|| TypeError::Unbalanced {
                    text: text.to_string(),
                })?;
            let generics = collect_chunks(inner, ",")?
                .into_iter()
                .map(|arg| parse_at(arg, depth + 1))
                .collect::<Result<Vec<_>, _>>()?;
            (core[..open].trim(), generics)
        }
        None if core.contains('>') => {
            return Err(TypeError::Unbalanced {
                text: text.to_string(),
            })
        }
        None => (core, Vec::new()),
    };

    validate_name(name)?;
    let name = match &outer {
        Some(outer) => format!("{}.{name}", outer.name),
        None => name.to_string(),
    };

    Ok(TypeRef {
        name,
        generics,
        extends,
        super_bounds,
        dimensions,
        outer,
        raw: text.to_string(),
    })
}

// Splits `A<X>.B<Y>` at the last top-level `>.` into `A<X>` and `B<Y>`.
fn split_outer(core: &str) -> Option<(&str, &str)> {
    let bytes = core.as_bytes();
    let mut depth = 0usize;
    let mut split = None;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'<' => depth += 1,
            b'>' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 && bytes.get(i + 1) == Some(&b'.') {
                    split = Some(i);
                }
            }
            _ => {}
        }
    }
    split.map(|i| (&core[..=i], &core[i + 2..]))
}

type Bounds<'a> = (&'a str, Vec<TypeRef>, Vec<TypeRef>);

fn split_bounds(text: &str, depth: usize) -> Result<Bounds<'_>, TypeError> {
    let parse_list = |list: &str| -> Result<Vec<TypeRef>, TypeError> {
        collect_chunks(list, "&")?
            .into_iter()
            .map(|bound| parse_at(bound, depth + 1))
            .collect()
    };

    let upper = collect_chunks(text, "extends")?;
    match upper.as_slice() {
        [head, list] => return Ok((*head, parse_list(*list)?, Vec::new())),
        [_] => {}
        _ => {
            return Err(TypeError::ChunkCount {
                text: text.to_string(),
                separator: "extends".to_string(),
                expected: 2,
                found: upper.len(),
            })
        }
    }

    let lower = collect_chunks(text, "super")?;
    match lower.as_slice() {
        [head, list] => Ok((*head, Vec::new(), parse_list(*list)?)),
        [head] => Ok((*head, Vec::new(), Vec::new())),
        _ => Err(TypeError::ChunkCount {
            text: text.to_string(),
            separator: "super".to_string(),
            expected: 2,
            found: lower.len(),
        }),
    }
}

fn validate_name(name: &str) -> Result<(), TypeError> {
    if name.is_empty() {
        return Err(TypeError::Empty);
    }
    let valid = name == "?"
        || (name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '$' || c == '.')
            && !name.starts_with('.')
            && !name.ends_with('.'));
    if valid {
        Ok(())
    } else {
        Err(TypeError::InvalidName {
            text: name.to_string(),
        })
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(outer) = &self.outer {
            write!(f, "{outer}.")?;
        }
        f.write_str(self.segment())?;
        if !self.generics.is_empty() {
            f.write_str("<")?;
            write_joined(f, &self.generics, ",")?;
            f.write_str(">")?;
        }
        for _ in 0..self.dimensions {
            f.write_str("[]")?;
        }
        if !self.extends.is_empty() {
            f.write_str(" extends ")?;
            write_joined(f, &self.extends, " & ")?;
        }
        if !self.super_bounds.is_empty() {
            f.write_str(" super ")?;
            write_joined(f, &self.super_bounds, " & ")?;
        }
        Ok(())
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, types: &[TypeRef], sep: &str) -> fmt::Result {
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

    fn chunks(text: &str, separator: &str) -> Vec<String> {
        collect_chunks(text, separator)
            .unwrap()
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn collect_chunks_splits_outside_brackets() {
        assert_eq!(chunks("T extends F", "extends"), ["T", "F"]);
        assert_eq!(
            chunks("java.lang.Map<T extends F, K>", "extends"),
            ["java.lang.Map<T extends F, K>"]
        );
        assert_eq!(
            chunks("java.lang.Map<T extends F, H extends G>", "extends"),
            ["java.lang.Map<T extends F, H extends G>"]
        );
        assert_eq!(chunks("public <T>", " "), ["public", "<T>"]);
    }

    #[test]
    fn collect_chunks_treats_annotation_arguments_as_atomic() {
        assert_eq!(
            chunks("@Foo(a = 1, b = 2) java.lang.String", " "),
            ["@Foo(a = 1, b = 2)", "java.lang.String"]
        );
    }

    #[test]
    fn collect_chunks_respects_word_boundaries() {
        assert_eq!(chunks("Superb", "super"), ["Superb"]);
        assert_eq!(chunks("a.extendsB", "extends"), ["a.extendsB"]);
    }

    #[test]
    fn collect_chunks_rejects_unbalanced_input() {
        assert!(matches!(
            collect_chunks("Map<K, V", ","),
            Err(TypeError::Unbalanced { .. })
        ));
        assert!(matches!(
            collect_chunks("Map>K<", ","),
            Err(TypeError::Unbalanced { .. })
        ));
    }

    #[test]
    fn collect_chunks_exact_counts() {
        assert_eq!(collect_chunks_exact("A, B", ",", 2).unwrap(), ["A", "B"]);
        assert_eq!(
            collect_chunks_exact("A, B, C", ",", 2),
            Err(TypeError::ChunkCount {
                text: "A, B, C".to_string(),
                separator: ",".to_string(),
                expected: 2,
                found: 3,
            })
        );
    }

    #[test]
    fn type_extends() {
        let ty = TypeRef::parse("java.lang.Map<T extends F>").unwrap();
        assert_eq!(ty.name, "java.lang.Map");
        assert_eq!(ty.generics.len(), 1);
        assert_eq!(ty.generics[0].name, "T");
        assert_eq!(ty.generics[0].extends.len(), 1);
        assert_eq!(ty.generics[0].extends[0].name, "F");
        assert!(ty.extends.is_empty());
    }

    #[test]
    fn type_extends_multiple() {
        let ty = TypeRef::parse("java.lang.Map<T extends a.b.F & a.d.G>").unwrap();
        assert_eq!(ty.generics.len(), 1);
        let bounds: Vec<_> = ty.generics[0].extends.iter().map(|b| &b.name).collect();
        assert_eq!(bounds, ["a.b.F", "a.d.G"]);
    }

    #[test]
    fn type_nested_generic_extends() {
        let ty = TypeRef::parse("java.lang.Map<T extends F, H extends G>").unwrap();
        assert_eq!(ty.name, "java.lang.Map");
        assert_eq!(ty.generics.len(), 2);
        assert_eq!(ty.generics[0].name, "T");
        assert_eq!(ty.generics[0].extends[0].name, "F");
        assert_eq!(ty.generics[1].name, "H");
        assert_eq!(ty.generics[1].extends[0].name, "G");
    }

    #[test]
    fn type_nested_generic() {
        let ty = TypeRef::parse("A<B<C<D,F>, C<G,H>>>").unwrap();
        assert_eq!(ty.name, "A");
        let b = &ty.generics[0];
        assert_eq!(b.name, "B");
        assert_eq!(b.generics.len(), 2);
        let first: Vec<_> = b.generics[0].generics.iter().map(|t| &t.name).collect();
        let second: Vec<_> = b.generics[1].generics.iter().map(|t| &t.name).collect();
        assert_eq!(first, ["D", "F"]);
        assert_eq!(second, ["G", "H"]);
    }

    #[test]
    fn array_dimensions_and_wildcards() {
        let ty = TypeRef::parse("java.util.List<? super T>[][]").unwrap();
        assert_eq!(ty.dimensions, 2);
        assert_eq!(ty.generics[0].name, "?");
        assert_eq!(ty.generics[0].super_bounds[0].name, "T");
        assert_eq!(ty.erasure(), "java.util.List[][]");
    }

    #[test]
    fn display_is_canonical() {
        let ty = TypeRef::parse("Map< K ,  java.util.List<? extends V> >").unwrap();
        assert_eq!(ty.to_string(), "Map<K,java.util.List<? extends V>>");
        assert_eq!(TypeRef::parse(&ty.to_string()).unwrap(), ty);
    }

    #[test]
    fn rejects_malformed_types() {
        assert!(matches!(
            TypeRef::parse("List<String"),
            Err(TypeError::Unbalanced { .. })
        ));
        assert!(matches!(
            TypeRef::parse("List<String,>"),
            Err(TypeError::Empty)
        ));
        assert!(matches!(
            TypeRef::parse("public int"),
            Err(TypeError::InvalidName { .. })
        ));
        assert!(matches!(
            TypeRef::parse("T extends A extends B"),
            Err(TypeError::ChunkCount { .. })
        ));
    }

    #[test]
    fn deep_nesting_is_bounded() {
        let depth = MAX_NESTING + 5;
        let text = format!("{}X{}", "A<".repeat(depth), ">".repeat(depth));
        assert!(matches!(
            TypeRef::parse(&text),
            Err(TypeError::TooDeep { .. })
        ));
    }

    #[test]
    fn resolves_imports() {
        let imports = BTreeMap::from([
            ("List".to_string(), "java.util.List".to_string()),
            ("Map".to_string(), "java.util.Map".to_string()),
        ]);
        let ty = TypeRef::parse("Map.Entry<List<String>, int>")
            .unwrap()
            .resolved(&imports);
        assert_eq!(ty.to_string(), "java.util.Map.Entry<java.util.List<String>,int>");
    }

    #[test]
    fn generic_outer_type() {
        let ty = TypeRef::parse("java.util.Map<K, V>.Entry<K, V>").unwrap();
        assert_eq!(ty.name, "java.util.Map.Entry");
        assert_eq!(ty.generics.len(), 2);
        let outer = ty.outer.as_deref().unwrap();
        assert_eq!(outer.name, "java.util.Map");
        assert_eq!(outer.generics.len(), 2);
        assert_eq!(ty.erasure(), "java.util.Map.Entry");
        assert_eq!(ty.to_string(), "java.util.Map<K,V>.Entry<K,V>");
        assert_eq!(TypeRef::parse(&ty.to_string()).unwrap(), ty);
    }

    #[test]
    fn generic_outer_type_resolves_through_the_outer_name() {
        let imports = BTreeMap::from([("Map".to_string(), "java.util.Map".to_string())]);
        let ty = TypeRef::parse("Map<K,V>.Entry<K,V>[]")
            .unwrap()
            .resolved(&imports);
        assert_eq!(ty.name, "java.util.Map.Entry");
        assert_eq!(ty.dimensions, 1);
        assert_eq!(ty.to_string(), "java.util.Map<K,V>.Entry<K,V>[]");
    }

    #[test]
    fn parse_params_reads_bounds() {
        let params = TypeRef::parse_params("<T extends java.lang.Runnable & java.lang.Cloneable, U>")
            .unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].extends.len(), 2);
        assert_eq!(params[1].name, "U");
    }
}
