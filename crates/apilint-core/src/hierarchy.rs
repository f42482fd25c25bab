//! Inheritance index over the classes of one model.
//!
//! Supertype names in a dump may be qualified, package-relative or bare
//! simple names. The index resolves each to a class of the same model when
//! it can and keeps a parent/child adjacency keyed by qualified name.
//! Types outside the model (e.g. `java.lang.Object`) are simply absent.

use crate::model::PackageDef;

use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Resolved parent/child relationships between classes of one model.
#[derive(Debug, Clone, Default)]
pub struct HierarchyIndex {
    parents: BTreeMap<String, Vec<String>>,
    children: BTreeMap<String, Vec<String>>,
}

impl HierarchyIndex {
    /// Builds the index from a model's packages.
    #[must_use]
    pub fn build(packages: &BTreeMap<String, PackageDef>) -> Self {
        let known: BTreeSet<&str> = packages
            .values()
            .flat_map(|p| p.classes.keys())
            .map(String::as_str)
            .collect();

        let mut by_simple: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for package in packages.values() {
            for class in package.classes.values() {
                by_simple
                    .entry(class.simple_name.as_str())
                    .or_default()
                    .push(class.name.as_str());
            }
        }

        let mut index = Self::default();
        for package in packages.values() {
            for class in package.classes.values() {
                let mut resolved = Vec::new();
                for supertype in class.supertypes() {
                    let Some(target) =
                        resolve(&supertype.name, &package.name, &known, &by_simple)
                    else {
                        continue;
                    };
                    if target != class.name && !resolved.contains(&target) {
                        resolved.push(target);
                    }
                }
                for parent in &resolved {
                    index
                        .children
                        .entry(parent.clone())
                        .or_default()
                        .push(class.name.clone());
                }
                if !resolved.is_empty() {
                    index.parents.insert(class.name.clone(), resolved);
                }
            }
        }
        index
    }

    /// Direct supertypes of `class` that are part of the model.
    #[must_use]
    pub fn parents(&self, class: &str) -> &[String] {
        self.parents.get(class).map(Vec::as_slice).unwrap_or_default()
    }

    /// Direct subtypes of `class`.
    #[must_use]
    pub fn children(&self, class: &str) -> &[String] {
        self.children.get(class).map(Vec::as_slice).unwrap_or_default()
    }

    /// All transitive supertypes, nearest first.
    #[must_use]
    pub fn ancestors(&self, class: &str) -> Vec<String> {
        walk(class, |name| self.parents(name))
    }

    /// All transitive subtypes, nearest first.
    #[must_use]
    pub fn descendants(&self, class: &str) -> Vec<String> {
        walk(class, |name| self.children(name))
    }
}

fn resolve(
    name: &str,
    package: &str,
    known: &BTreeSet<&str>,
    by_simple: &BTreeMap<&str, Vec<&str>>,
) -> Option<String> {
    if known.contains(name) {
        return Some(name.to_string());
    }
    let relative = format!("{package}.{name}");
    if known.contains(relative.as_str()) {
        return Some(relative);
    }
    match by_simple.get(name).map(Vec::as_slice) {
        Some([only]) => Some((*only).to_string()),
        _ => None,
    }
}

// Breadth-first; cycles in malformed dumps terminate via `seen`.
fn walk<'a, F>(start: &str, next: F) -> Vec<String>
where
    F: Fn(&str) -> &'a [String],
{
    let mut seen = BTreeSet::new();
    seen.insert(start.to_string());
    let mut queue: VecDeque<&str> = next(start).iter().map(String::as_str).collect();
    let mut out = Vec::new();
    while let Some(name) = queue.pop_front() {
        if !seen.insert(name.to_string()) {
            continue;
        }
        out.push(name.to_string());
        queue.extend(next(name).iter().map(String::as_str));
    }
    out
}
