//! Property bag attached to declarations and fields.
//!
//! A property (`@name(...)`) maps keys to value lists; the value of a property is the
//! value list of its default (empty) key. Typed accessors apply the defaulting rules in
//! one place so call sites never interpret raw strings themselves.

use crate::ast::{AstNode, Tag};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use std::collections::BTreeMap;

/// One property: key -> ordered values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Property {
    keys: BTreeMap<String, Vec<String>>,
}

impl Property {
    /// Values of the default key.
    pub fn values(&self) -> &[String] {
        self.keys.get("").map(Vec::as_slice).unwrap_or(&[])
    }

    /// Values of a named key.
    pub fn key(&self, name: &str) -> &[String] {
        self.keys.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The property value as one string (default-key values joined with `,`).
    pub fn value(&self) -> String {
        self.values().join(",")
    }

    /// Iterate all keys with their values, the default key first.
    pub fn keys(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.keys.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// Name -> property, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: BTreeMap<String, Property>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the `property` children of `node`.
    ///
    /// A property repeated on the same element is reported and the first one kept.
    /// Children of a property other than keys and comments are unexpected.
    pub fn from_node(node: &AstNode, diagnostics: &mut Diagnostics) -> Self {
        let mut props = Self::new();
        for child in node.children.iter().filter(|c| c.tag == Tag::Property) {
            let name = child.name().to_string();
            let mut property = Property::default();
            for key in &child.children {
                match key.tag {
                    Tag::PropertyKey => {
                        let values = property.keys.entry(key.name().to_string()).or_default();
                        if let Some(value) = key.attrs.get("value") {
                            values.push(value.clone());
                        }
                    }
                    Tag::Comment => {}
                    _ => diagnostics.error(
                        DiagnosticKind::UnexpectedElement,
                        &key.location,
                        format!("unaccepted element '{}' in property '{}'", key.tag, name),
                    ),
                }
            }
            if props.entries.contains_key(&name) {
                diagnostics.error(
                    DiagnosticKind::DuplicateProperty,
                    &child.location,
                    format!("the property '{}' is duplicated", name),
                );
            } else {
                props.entries.insert(name, property);
            }
        }
        props
    }

    /// Set a property to a single value, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let mut property = Property::default();
        property.keys.insert(String::new(), vec![value.into()]);
        self.entries.insert(name.into(), property);
    }

    pub fn get(&self, name: &str) -> Option<&Property> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Absent -> `default`; `false` -> false; anything else, including an empty
    /// value as in `@customize`, -> true.
    pub fn bool_property(&self, name: &str, default: bool) -> bool {
        match self.entries.get(name) {
            None => default,
            Some(p) => p.value() != "false",
        }
    }

    /// The property value, or `default` when absent.
    pub fn string_property(&self, name: &str, default: &str) -> String {
        self.entries
            .get(name)
            .map(Property::value)
            .unwrap_or_else(|| default.to_string())
    }

    /// The property value split at commas, trimmed, empty items dropped.
    pub fn list_property(&self, name: &str) -> Vec<String> {
        self.entries
            .get(name)
            .map(|p| {
                p.values()
                    .iter()
                    .flat_map(|v| v.split(','))
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Name and joined value of every property, ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, String)> {
        self.entries.iter().map(|(k, p)| (k.as_str(), p.value()))
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SourceLocation;

    fn props_of(node: AstNode) -> (Properties, Diagnostics) {
        let mut diags = Diagnostics::new();
        let props = Properties::from_node(&node, &mut diags);
        (props, diags)
    }

    #[test]
    fn test_bool_property_defaults() {
        let (props, _) = props_of(
            AstNode::declaration(Tag::Message, "M")
                .with_property("customize", &[])
                .with_property("existingClass", &["false"])
                .with_property("descriptor", &["readonly"]),
        );
        assert!(props.bool_property("customize", false));
        assert!(!props.bool_property("existingClass", true));
        assert!(props.bool_property("descriptor", false));
        assert!(props.bool_property("missing", true));
        assert!(!props.bool_property("missing", false));
    }

    #[test]
    fn test_string_and_list_properties() {
        let (props, _) = props_of(
            AstNode::declaration(Tag::Class, "C")
                .with_property("implements", &["IFoo, IBar", "IBaz"])
                .with_property("fieldNameSuffix", &["_m"]),
        );
        assert_eq!(props.string_property("fieldNameSuffix", ""), "_m");
        assert_eq!(props.string_property("absent", "dflt"), "dflt");
        assert_eq!(props.list_property("implements"), vec!["IFoo", "IBar", "IBaz"]);
        assert!(props.list_property("absent").is_empty());
    }

    #[test]
    fn test_named_keys_are_kept_apart() {
        let node = AstNode::declaration(Tag::Message, "M").with_child(
            AstNode::property("unit", &[]).with_child(
                AstNode::new(Tag::PropertyKey)
                    .with_attr("name", "scale")
                    .with_attr("value", "1000"),
            ),
        );
        let (props, _) = props_of(node);
        let unit = props.get("unit").unwrap();
        assert_eq!(unit.value(), "");
        assert_eq!(unit.key("scale"), ["1000".to_string()]);
    }

    #[test]
    fn test_duplicate_property_keeps_first() {
        let node = AstNode::declaration(Tag::Message, "M")
            .with_property("getter", &["first"])
            .with_child(AstNode::property("getter", &["second"]).at("m.msg", 9));
        let (props, diags) = props_of(node);
        assert_eq!(props.string_property("getter", ""), "first");
        assert_eq!(diags.count_of(DiagnosticKind::DuplicateProperty), 1);
        assert_eq!(
            diags.iter().next().unwrap().location,
            SourceLocation::new("m.msg", 9)
        );
    }

    #[test]
    fn test_unexpected_child_of_property() {
        let node = AstNode::declaration(Tag::Message, "M")
            .with_child(AstNode::property("p", &["1"]).with_child(AstNode::field("x", "int")));
        let (props, diags) = props_of(node);
        assert!(props.contains("p"));
        assert_eq!(diags.count_of(DiagnosticKind::UnexpectedElement), 1);
    }

    #[test]
    fn test_set_overrides_value() {
        let mut props = Properties::new();
        props.set("enum", "Color");
        props.set("enum", "gfx::Color");
        assert_eq!(props.string_property("enum", ""), "gfx::Color");
        assert_eq!(props.len(), 1);
    }
}
