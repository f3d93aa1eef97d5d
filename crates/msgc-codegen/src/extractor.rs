//! Declaration extractor: turns one declaration node into a normalized record.
//!
//! Nothing here consults the catalogs. Records keep names exactly as written; the
//! preparation step resolves them.

use crate::ast::{AstNode, SourceLocation, Tag};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::properties::Properties;
use crate::session::CompilationSession;
use std::fmt;

/// Kind of struct/class declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Struct,
    Class,
    Message,
    Packet,
}

impl Keyword {
    /// Keyword of a definition or forward-declaration tag.
    pub fn from_tag(tag: &Tag) -> Option<Self> {
        match tag {
            Tag::Struct | Tag::StructDecl => Some(Keyword::Struct),
            Tag::Class | Tag::ClassDecl => Some(Keyword::Class),
            Tag::Message | Tag::MessageDecl => Some(Keyword::Message),
            Tag::Packet | Tag::PacketDecl => Some(Keyword::Packet),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Struct => "struct",
            Keyword::Class => "class",
            Keyword::Message => "message",
            Keyword::Packet => "packet",
        }
    }

    /// Messages and packets take a message kind in their constructor.
    pub fn has_kind(self) -> bool {
        matches!(self, Keyword::Message | Keyword::Packet)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field as written in a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRecord {
    pub name: String,
    /// Declared type without any pointer marker; empty for inherited placeholders.
    pub data_type: String,
    /// Empty when no default was given.
    pub default_value: String,
    pub is_abstract: bool,
    pub is_pointer: bool,
    pub is_array: bool,
    /// Empty for dynamic arrays.
    pub array_size: String,
    pub properties: Properties,
    pub location: SourceLocation,
}

/// A struct, class, message or packet definition.
#[derive(Debug, Clone)]
pub struct ClassRecord<'a> {
    pub node: &'a AstNode,
    pub keyword: Keyword,
    pub name: String,
    /// Base reference as written; empty when there is none, `void` for foreign types.
    pub base: String,
    pub properties: Properties,
    pub fields: Vec<FieldRecord>,
    /// Fields without a type: new defaults for inherited fields.
    pub base_overrides: Vec<FieldRecord>,
    pub location: SourceLocation,
}

/// One enum item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumItem {
    pub name: String,
    pub value: String,
}

/// An enum definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumRecord {
    pub name: String,
    pub qname: String,
    pub items: Vec<EnumItem>,
    pub location: SourceLocation,
}

impl EnumRecord {
    /// Items as `(name, value)` pairs for the enum catalog.
    pub fn item_pairs(&self) -> Vec<(String, String)> {
        self.items
            .iter()
            .map(|i| (i.name.clone(), i.value.clone()))
            .collect()
    }
}

/// A forward declaration (`struct-decl`, `class-decl`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardDecl {
    pub keyword: Keyword,
    pub name: String,
    pub base: String,
    /// False for `class noncobject Foo;`.
    pub is_object: bool,
    pub location: SourceLocation,
}

fn extract_field(node: &AstNode, diagnostics: &mut Diagnostics) -> FieldRecord {
    let mut data_type = node.attr("data-type").trim().to_string();
    let is_pointer = data_type.ends_with('*');
    if is_pointer {
        let stripped = data_type.trim_end_matches(|c: char| c == '*' || c.is_whitespace());
        data_type = stripped.to_string();
    }
    for child in &node.children {
        if !matches!(child.tag, Tag::Property | Tag::Comment) {
            diagnostics.error(
                DiagnosticKind::UnexpectedElement,
                &child.location,
                format!("unaccepted element '{}' in field '{}'", child.tag, node.name()),
            );
        }
    }
    FieldRecord {
        name: node.name().to_string(),
        data_type,
        default_value: node.attr("default-value").to_string(),
        is_abstract: node.flag("is-abstract"),
        is_pointer,
        is_array: node.flag("is-vector"),
        array_size: node.attr("vector-size").trim().to_string(),
        properties: Properties::from_node(node, diagnostics),
        location: node.location.clone(),
    }
}

/// Extract a struct/class/message/packet definition.
///
/// Returns `None` only when `node` is not such a definition at all.
pub fn extract_class<'a>(node: &'a AstNode, session: &mut CompilationSession) -> Option<ClassRecord<'a>> {
    let keyword = match Keyword::from_tag(&node.tag) {
        Some(keyword) if node.tag.is_definition() => keyword,
        _ => {
            session.diagnostics.error(
                DiagnosticKind::InternalError,
                &node.location,
                format!("invalid declaration keyword '{}'", node.tag),
            );
            return None;
        }
    };

    let name = node.name().to_string();
    session.check_reserved(&name, "type", &node.location);

    let diagnostics = &mut session.diagnostics;
    let properties = Properties::from_node(node, diagnostics);
    let mut fields = Vec::new();
    let mut base_overrides = Vec::new();

    for child in &node.children {
        match child.tag {
            Tag::Field => {
                let field = extract_field(child, diagnostics);
                if field.data_type.is_empty() {
                    base_overrides.push(field);
                } else {
                    fields.push(field);
                }
            }
            Tag::Property | Tag::Comment => {}
            _ => diagnostics.error(
                DiagnosticKind::UnexpectedElement,
                &child.location,
                format!("unaccepted element '{}' in {} '{}'", child.tag, keyword, name),
            ),
        }
    }

    Some(ClassRecord {
        node,
        keyword,
        name,
        base: node.attr("extends-name").trim().to_string(),
        properties,
        fields,
        base_overrides,
        location: node.location.clone(),
    })
}

/// Extract an enum definition; its qualified name is taken from the current namespace.
pub fn extract_enum(node: &AstNode, session: &mut CompilationSession) -> EnumRecord {
    let name = node.name().to_string();
    session.check_reserved(&name, "enum", &node.location);

    let mut items = Vec::new();
    for child in &node.children {
        match child.tag {
            Tag::Field => items.push(EnumItem {
                name: child.name().to_string(),
                value: child.attr("value").to_string(),
            }),
            Tag::Comment => {}
            _ => session.diagnostics.error(
                DiagnosticKind::UnexpectedElement,
                &child.location,
                format!("unaccepted element '{}' in enum '{}'", child.tag, name),
            ),
        }
    }

    EnumRecord {
        qname: session.qualify(&name),
        name,
        items,
        location: node.location.clone(),
    }
}

/// Extract a forward declaration.
pub fn extract_forward(node: &AstNode, session: &mut CompilationSession) -> Option<ForwardDecl> {
    let keyword = match Keyword::from_tag(&node.tag) {
        Some(keyword) if node.tag.is_forward_declaration() => keyword,
        _ => {
            session.diagnostics.error(
                DiagnosticKind::InternalError,
                &node.location,
                format!("invalid forward declaration '{}'", node.tag),
            );
            return None;
        }
    };
    for child in node.children.iter().filter(|c| c.tag != Tag::Comment) {
        session.diagnostics.error(
            DiagnosticKind::UnexpectedElement,
            &child.location,
            format!("unaccepted element '{}' in declaration of '{}'", child.tag, node.name()),
        );
    }
    Some(ForwardDecl {
        keyword,
        name: node.name().to_string(),
        base: node.attr("extends-name").trim().to_string(),
        is_object: node.attr("is-cobject") != "false",
        location: node.location.clone(),
    })
}
