//! Registries of known types and enums.
//!
//! Both catalogs are keyed by qualified name (`a::b::Name`, without a leading `::`)
//! and kept in a `BTreeMap`, so every scan visits names in lexicographic order. When a
//! short name matches several entries the first one visited, i.e. the smallest
//! qualified name, is the one used.
//!
//! # Resolution
//!
//! | reference | lookup |
//! |-----------|--------|
//! | `::a::Foo` / `a::Foo` | exact `a::Foo` |
//! | `Foo` inside namespace `n` | exact `n::Foo` |
//! | otherwise | every entry ending in `Foo` at a `::` boundary |

use crate::options::RuntimeNames;
use crate::types::Category;
use std::collections::BTreeMap;

/// Qualify `name` in `namespace` unless it is already qualified.
///
/// A leading `::` is dropped because catalog keys never carry it.
pub fn canonicalize(namespace: &str, name: &str) -> String {
    if name.contains("::") {
        name.strip_prefix("::").unwrap_or(name).to_string()
    } else if !namespace.is_empty() && !name.is_empty() {
        format!("{}::{}", namespace, name)
    } else {
        name.to_string()
    }
}

/// True if `qname` ends with `name` and the match starts at a scope boundary.
pub fn suffix_matches(qname: &str, name: &str) -> bool {
    if name.is_empty() || !qname.ends_with(name) {
        return false;
    }
    let prefix = &qname[..qname.len() - name.len()];
    prefix.is_empty() || prefix.ends_with(':')
}

/// Outcome of a name lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Unresolved,
    Resolved(String),
    /// Candidates in catalog order; the first one is used.
    Ambiguous(Vec<String>),
}

impl Lookup {
    fn from_candidates(mut candidates: Vec<String>) -> Self {
        match candidates.len() {
            0 => Lookup::Unresolved,
            1 => Lookup::Resolved(candidates.remove(0)),
            _ => Lookup::Ambiguous(candidates),
        }
    }

    /// The qualified name to use, if any.
    pub fn first(&self) -> Option<&str> {
        match self {
            Lookup::Unresolved => None,
            Lookup::Resolved(name) => Some(name),
            Lookup::Ambiguous(candidates) => candidates.first().map(String::as_str),
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Lookup::Ambiguous(_))
    }

    /// All candidates joined for a diagnostic message.
    pub fn candidates(&self) -> String {
        match self {
            Lookup::Unresolved => String::new(),
            Lookup::Resolved(name) => name.clone(),
            Lookup::Ambiguous(candidates) => candidates.join("', '"),
        }
    }
}

fn resolve_in<V>(entries: &BTreeMap<String, V>, name: &str, namespace: &str) -> Lookup {
    if name.is_empty() {
        return Lookup::Unresolved;
    }
    let exact = canonicalize(namespace, name);
    if entries.contains_key(&exact) {
        return Lookup::Resolved(exact);
    }
    Lookup::from_candidates(
        entries
            .keys()
            .filter(|qname| suffix_matches(qname, name))
            .cloned()
            .collect(),
    )
}

/// Where a catalog entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Pre-seeded runtime type.
    Builtin,
    /// Forward declaration (`class Foo;`).
    Declared,
    /// Full definition.
    Defined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TypeEntry {
    category: Category,
    origin: Origin,
}

/// Effect of [`TypeCatalog::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Added,
    /// Already known with the same category.
    Unchanged,
    /// A forward-declared object type was finalized by its definition.
    Upgraded { from: Category },
    /// Known with a different category; the existing entry was kept.
    Conflict { existing: Category },
}

/// Qualified type name -> category.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    entries: BTreeMap<String, TypeEntry>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog that already knows the runtime object model.
    pub fn with_builtins(runtime: &RuntimeNames) -> Self {
        let mut catalog = Self::new();
        for (qname, category) in [
            (runtime.root_object(), Category::PlainObject),
            (runtime.named_object(), Category::NamedObject),
            (runtime.owned_object(), Category::OwnedObject),
            (runtime.message(), Category::OwnedObject),
            (runtime.packet(), Category::OwnedObject),
        ] {
            catalog.register(&qname, category, Origin::Builtin);
        }
        catalog
    }

    /// Record `qname` with `category`.
    ///
    /// A name keeps its first category. The only exception is a forward-declared
    /// object type, which its full definition may move to another object category once.
    pub fn register(&mut self, qname: &str, category: Category, origin: Origin) -> Registration {
        let Some(entry) = self.entries.get_mut(qname) else {
            tracing::debug!(name = qname, %category, "registered type");
            self.entries
                .insert(qname.to_string(), TypeEntry { category, origin });
            return Registration::Added;
        };

        if entry.category == category {
            if origin == Origin::Defined && entry.origin == Origin::Declared {
                entry.origin = Origin::Defined;
            }
            return Registration::Unchanged;
        }

        if entry.origin == Origin::Declared
            && origin == Origin::Defined
            && entry.category.is_object()
            && category.is_object()
        {
            let from = entry.category;
            *entry = TypeEntry { category, origin };
            tracing::debug!(name = qname, %from, to = %category, "finalized forward declaration");
            return Registration::Upgraded { from };
        }

        Registration::Conflict {
            existing: entry.category,
        }
    }

    pub fn classify(&self, qname: &str) -> Option<Category> {
        self.entries.get(qname).map(|e| e.category)
    }

    pub fn origin(&self, qname: &str) -> Option<Origin> {
        self.entries.get(qname).map(|e| e.origin)
    }

    pub fn contains(&self, qname: &str) -> bool {
        self.entries.contains_key(qname)
    }

    /// Resolve a type reference written inside `namespace`.
    pub fn resolve(&self, name: &str, namespace: &str) -> Lookup {
        resolve_in(&self.entries, name, namespace)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Qualified enum name -> items (empty for forward declarations).
#[derive(Debug, Clone, Default)]
pub struct EnumCatalog {
    entries: BTreeMap<String, Vec<(String, String)>>,
}

impl EnumCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Announce an enum without items; an existing entry is left alone.
    pub fn declare(&mut self, qname: &str) {
        self.entries.entry(qname.to_string()).or_default();
    }

    /// Record a defined enum. A second definition of the same name replaces the first.
    pub fn register(&mut self, qname: &str, items: Vec<(String, String)>) {
        if self.entries.insert(qname.to_string(), items).is_some() {
            tracing::debug!(name = qname, "enum registered again, replacing previous items");
        }
    }

    /// Resolve an enum reference. An empty reference means "no enum" and yields `None`.
    pub fn resolve(&self, name: &str, namespace: &str) -> Option<Lookup> {
        if name.is_empty() {
            None
        } else {
            Some(resolve_in(&self.entries, name, namespace))
        }
    }

    pub fn items(&self, qname: &str) -> Option<&[(String, String)]> {
        self.entries.get(qname).map(Vec::as_slice)
    }

    pub fn contains(&self, qname: &str) -> bool {
        self.entries.contains_key(qname)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
