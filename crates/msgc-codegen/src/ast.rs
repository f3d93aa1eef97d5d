//! Input tree consumed by the compiler.
//!
//! The textual parser lives outside this crate. It hands over an already-parsed tree in
//! which every node carries a tag, a string-keyed attribute map, ordered children and a
//! source location used for diagnostics. The same tree can be serialized to and loaded
//! from JSON, which is how fixtures and external front-ends feed the compiler:
//!
//! ```json
//! {
//!   "filename": "job.msg",
//!   "nodes": [
//!     { "tag": "namespace", "attrs": { "name": "sched" } },
//!     {
//!       "tag": "message",
//!       "attrs": { "name": "Job" },
//!       "location": { "file": "job.msg", "line": 3 },
//!       "children": [
//!         { "tag": "field", "attrs": { "name": "priority", "data-type": "int" } }
//!       ]
//!     }
//!   ]
//! }
//! ```

use crate::error::LoadError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Node kind. Unknown tag names are kept verbatim so they can be reported.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Tag {
    Namespace,
    VerbatimBlock,
    StructDecl,
    ClassDecl,
    MessageDecl,
    PacketDecl,
    EnumDecl,
    Struct,
    Class,
    Message,
    Packet,
    Enum,
    Field,
    Property,
    PropertyKey,
    Comment,
    Other(String),
}

impl Tag {
    pub fn as_str(&self) -> &str {
        match self {
            Tag::Namespace => "namespace",
            Tag::VerbatimBlock => "verbatim-block",
            Tag::StructDecl => "struct-decl",
            Tag::ClassDecl => "class-decl",
            Tag::MessageDecl => "message-decl",
            Tag::PacketDecl => "packet-decl",
            Tag::EnumDecl => "enum-decl",
            Tag::Struct => "struct",
            Tag::Class => "class",
            Tag::Message => "message",
            Tag::Packet => "packet",
            Tag::Enum => "enum",
            Tag::Field => "field",
            Tag::Property => "property",
            Tag::PropertyKey => "property-key",
            Tag::Comment => "comment",
            Tag::Other(name) => name,
        }
    }

    /// Full struct/class/message/packet definitions.
    pub fn is_definition(&self) -> bool {
        matches!(self, Tag::Struct | Tag::Class | Tag::Message | Tag::Packet)
    }

    /// Forward declarations of struct/class/message/packet types.
    pub fn is_forward_declaration(&self) -> bool {
        matches!(
            self,
            Tag::StructDecl | Tag::ClassDecl | Tag::MessageDecl | Tag::PacketDecl
        )
    }
}

impl From<String> for Tag {
    fn from(name: String) -> Self {
        match name.as_str() {
            "namespace" => Tag::Namespace,
            "verbatim-block" => Tag::VerbatimBlock,
            "struct-decl" => Tag::StructDecl,
            "class-decl" => Tag::ClassDecl,
            "message-decl" => Tag::MessageDecl,
            "packet-decl" => Tag::PacketDecl,
            "enum-decl" => Tag::EnumDecl,
            "struct" => Tag::Struct,
            "class" => Tag::Class,
            "message" => Tag::Message,
            "packet" => Tag::Packet,
            "enum" => Tag::Enum,
            "field" => Tag::Field,
            "property" => Tag::Property,
            "property-key" => Tag::PropertyKey,
            "comment" => Tag::Comment,
            _ => Tag::Other(name),
        }
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.as_str().to_string()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File and line a node was parsed from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub line: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// One node of the input tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AstNode {
    pub tag: Tag,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub children: Vec<AstNode>,
    #[serde(default)]
    pub location: SourceLocation,
}

impl AstNode {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            attrs: BTreeMap::new(),
            children: Vec::new(),
            location: SourceLocation::default(),
        }
    }

    /// A `namespace` node.
    pub fn namespace(name: &str) -> Self {
        Self::new(Tag::Namespace).with_attr("name", name)
    }

    /// A `verbatim-block` node whose body is copied into the interface artifact.
    pub fn verbatim(body: &str) -> Self {
        Self::new(Tag::VerbatimBlock).with_attr("body", body)
    }

    /// A declaration or definition node (`message`, `struct-decl`, `enum`, ...).
    pub fn declaration(tag: Tag, name: &str) -> Self {
        Self::new(tag).with_attr("name", name)
    }

    /// A field of a struct/class/message/packet.
    pub fn field(name: &str, data_type: &str) -> Self {
        Self::new(Tag::Field)
            .with_attr("name", name)
            .with_attr("data-type", data_type)
    }

    /// An item of an enum.
    pub fn enum_item(name: &str, value: &str) -> Self {
        Self::new(Tag::Field)
            .with_attr("name", name)
            .with_attr("value", value)
    }

    /// A property with values on its default key, e.g. `@customize(true)`.
    pub fn property(name: &str, values: &[&str]) -> Self {
        let mut node = Self::new(Tag::Property).with_attr("name", name);
        if values.is_empty() {
            node.children.push(Self::new(Tag::PropertyKey).with_attr("name", ""));
        }
        for value in values {
            node.children.push(
                Self::new(Tag::PropertyKey)
                    .with_attr("name", "")
                    .with_attr("value", value),
            );
        }
        node
    }

    pub fn comment(text: &str) -> Self {
        Self::new(Tag::Comment).with_attr("text", text)
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_child(mut self, child: AstNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = AstNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Attach a property (`@name(values)`) to this node.
    pub fn with_property(self, name: &str, values: &[&str]) -> Self {
        self.with_child(Self::property(name, values))
    }

    pub fn extends(self, base: &str) -> Self {
        self.with_attr("extends-name", base)
    }

    pub fn with_default(self, value: &str) -> Self {
        self.with_attr("default-value", value)
    }

    /// Mark a field as an array; `None` makes it a dynamic array.
    pub fn as_array(self, size: Option<&str>) -> Self {
        self.with_attr("is-vector", "true")
            .with_attr("vector-size", size.unwrap_or(""))
    }

    pub fn as_abstract(self) -> Self {
        self.with_attr("is-abstract", "true")
    }

    pub fn at(mut self, file: &str, line: u32) -> Self {
        self.location = SourceLocation::new(file, line);
        self
    }

    /// Attribute value, or the empty string when absent.
    pub fn attr(&self, name: &str) -> &str {
        self.attrs.get(name).map(String::as_str).unwrap_or("")
    }

    /// Attribute interpreted as a flag: only `"true"` is true.
    pub fn flag(&self, name: &str) -> bool {
        self.attr(name) == "true"
    }

    pub fn name(&self) -> &str {
        self.attr("name")
    }
}

/// One input file: its name and its top-level nodes in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgFile {
    pub filename: String,
    #[serde(default)]
    pub nodes: Vec<AstNode>,
}

impl MsgFile {
    pub fn new(filename: impl Into<String>, nodes: Vec<AstNode>) -> Self {
        Self {
            filename: filename.into(),
            nodes,
        }
    }

    /// The first `namespace` node of the file, if any.
    pub fn first_namespace(&self) -> Option<&AstNode> {
        self.nodes.iter().find(|n| n.tag == Tag::Namespace)
    }

    /// Parse a file from its JSON form.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load a file from a JSON document on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Recursively load every `*.json` file below `dir`, sorted by path.
pub fn load_dir(dir: impl AsRef<Path>) -> Result<Vec<MsgFile>, LoadError> {
    let mut paths: Vec<_> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.extension().map(|e| e == "json").unwrap_or(false))
        .collect();
    paths.sort();
    paths.iter().map(MsgFile::load).collect()
}
